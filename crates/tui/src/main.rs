mod app;
mod config;
mod error;
mod logging;
mod ui;

use std::process::ExitCode;

use chrono::Local;
use engine::{DryRunSink, Journal, JournalSink, Preferences, PurchaseForm, PurchaseSink};

use crate::{
    config::{AppConfig, Invocation},
    error::{AppError, Result},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let (config, invocation) = match config::load() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("buy: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(&config) {
        eprintln!("buy: {err}");
    }

    match run(&config, invocation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            if !err.is_startup() || ui::show_fatal(&err.to_string()).is_err() {
                eprintln!("buy: {err}");
            }
            err.exit_code()
        }
    }
}

async fn run(config: &AppConfig, invocation: Invocation) -> Result<()> {
    let ledger_file = match config.ledger_file() {
        Some(path) => path,
        None => engine::find_ledger_file().map_err(AppError::LedgerNotFound)?,
    };
    let price_file = config.price_file().or_else(|| match engine::find_price_file() {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::debug!("no price database: {err}");
            None
        }
    });

    let journal =
        Journal::from_file(&ledger_file, price_file.as_deref()).map_err(AppError::Journal)?;
    tracing::info!(
        journal = %ledger_file.display(),
        prices = journal.prices().len(),
        dry_run = invocation.dry_run,
        "journal opened"
    );

    let preferences_path = config.preferences_path();
    let preferences =
        Preferences::load_or_defaults(&preferences_path).map_err(AppError::Preferences)?;

    let sink: Box<dyn PurchaseSink + Send> = if invocation.dry_run {
        Box::new(DryRunSink)
    } else {
        Box::new(JournalSink::new(&ledger_file, &preferences_path))
    };

    let form = PurchaseForm::new(preferences, Local::now().date_naive());
    let mut app = app::App::new(
        journal,
        form,
        sink,
        invocation.dry_run,
        invocation.description,
    );
    app.run().await
}
