use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/buy.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Journal to append to; located through `LEDGER_FILE`/`~/.ledgerrc` when unset.
    pub ledger_file: Option<String>,
    /// Price database; located like the journal when unset.
    pub price_file: Option<String>,
    pub preferences_path: String,
    pub log_file: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_file: None,
            price_file: None,
            preferences_path: "~/.ledgerhelpers.json".to_string(),
            log_file: "~/.ledgerhelpers.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn ledger_file(&self) -> Option<PathBuf> {
        self.ledger_file.as_deref().map(expand_home)
    }

    pub fn price_file(&self) -> Option<PathBuf> {
        self.price_file.as_deref().map(expand_home)
    }

    pub fn preferences_path(&self) -> PathBuf {
        expand_home(&self.preferences_path)
    }

    pub fn log_file(&self) -> PathBuf {
        expand_home(&self.log_file)
    }
}

/// What this run was asked to do, as opposed to how it is configured.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Record nothing: log the transaction and skip saving preferences.
    pub dry_run: bool,
    pub description: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "buy", about = "Record a purchase in a ledger journal")]
struct Args {
    /// Do not write the journal or the preferences, only log.
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the journal path.
    #[arg(long)]
    ledger_file: Option<String>,
    /// Override the price database path.
    #[arg(long)]
    price_file: Option<String>,
    /// Override the preferences file path.
    #[arg(long)]
    preferences: Option<String>,
    /// Override the log file path.
    #[arg(long)]
    log_file: Option<String>,
    /// Description of the items purchased.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    description: Vec<String>,
}

pub fn load() -> Result<(AppConfig, Invocation)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("BUY"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(ledger_file) = args.ledger_file {
        settings.ledger_file = Some(ledger_file);
    }
    if let Some(price_file) = args.price_file {
        settings.price_file = Some(price_file);
    }
    if let Some(preferences) = args.preferences {
        settings.preferences_path = preferences;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    let description = args.description.join(" ");
    let invocation = Invocation {
        dry_run: args.dry_run,
        description: (!description.trim().is_empty()).then_some(description),
    };

    Ok((settings, invocation))
}

fn expand_home(path: &str) -> PathBuf {
    match (Path::new(path).strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
