//! Finds the journal and price file the same way `ledger` itself does: an
//! environment variable first, then the options in `~/.ledgerrc`.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{EngineError, ResultEngine};

const LEDGER_FILE_ENV: &str = "LEDGER_FILE";
const PRICE_DB_ENV: &str = "LEDGER_PRICE_DB";
const LEDGERRC: &str = ".ledgerrc";

pub fn find_ledger_file() -> ResultEngine<PathBuf> {
    locate(LEDGER_FILE_ENV, &["--file", "-f"]).ok_or_else(|| {
        EngineError::LedgerNotFound(format!(
            "no ledger file: set {LEDGER_FILE_ENV} or add --file to ~/{LEDGERRC}"
        ))
    })
}

pub fn find_price_file() -> ResultEngine<PathBuf> {
    locate(PRICE_DB_ENV, &["--price-db"]).ok_or_else(|| {
        EngineError::LedgerNotFound(format!(
            "no price file: set {PRICE_DB_ENV} or add --price-db to ~/{LEDGERRC}"
        ))
    })
}

fn locate(env_var: &str, flags: &[&str]) -> Option<PathBuf> {
    let home = dirs::home_dir();
    if let Some(value) = env::var_os(env_var).filter(|v| !v.is_empty()) {
        return Some(expand_home(Path::new(&value), home.as_deref()));
    }
    let home = home?;
    let rc = fs::read_to_string(home.join(LEDGERRC)).ok()?;
    rc_option(&rc, flags).map(|value| expand_home(Path::new(&value), Some(&home)))
}

/// Returns the value of the last matching option in a ledgerrc file.
/// Accepts `--flag value`, `--flag=value` and `-f value`.
fn rc_option(rc: &str, flags: &[&str]) -> Option<String> {
    let mut found = None;
    for line in rc.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some((key, value)) if !key.contains(char::is_whitespace) => (key, value),
            _ => line
                .split_once(char::is_whitespace)
                .unwrap_or((line, "")),
        };
        let value = value.trim();
        if flags.contains(&key) && !value.is_empty() {
            found = Some(value.to_string());
        }
    }
    found
}

/// Expands a leading `~` and anchors relative paths at the home directory.
fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    if let Ok(rest) = path.strip_prefix("~") {
        return home.join(rest);
    }
    if path.is_relative() {
        return home.join(path);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_option_reads_both_spellings() {
        let rc = "# comment\n--file ~/books/main.ledger\n--price-db=~/books/prices.db\n";
        assert_eq!(
            rc_option(rc, &["--file", "-f"]).as_deref(),
            Some("~/books/main.ledger")
        );
        assert_eq!(
            rc_option(rc, &["--price-db"]).as_deref(),
            Some("~/books/prices.db")
        );
    }

    #[test]
    fn rc_option_last_occurrence_wins() {
        let rc = "-f first.ledger\n--file second.ledger\n";
        assert_eq!(
            rc_option(rc, &["--file", "-f"]).as_deref(),
            Some("second.ledger")
        );
        assert_eq!(rc_option("--strict\n", &["--file"]), None);
    }

    #[test]
    fn expand_home_handles_tilde_and_relative_paths() {
        let home = Path::new("/home/me");
        assert_eq!(
            expand_home(Path::new("~/main.ledger"), Some(home)),
            PathBuf::from("/home/me/main.ledger")
        );
        assert_eq!(
            expand_home(Path::new("books/main.ledger"), Some(home)),
            PathBuf::from("/home/me/books/main.ledger")
        );
        assert_eq!(
            expand_home(Path::new("/srv/main.ledger"), Some(home)),
            PathBuf::from("/srv/main.ledger")
        );
    }
}
