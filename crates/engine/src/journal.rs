//! Read access to the journal and its price file, and the single write
//! operation this program performs on it: appending a transaction block.

use std::{
    collections::{BTreeSet, HashMap},
    fs::{self, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use ledger_parser::{Ledger, LedgerItem};

use crate::{Amount, Commodity, EngineError, ResultEngine};

/// A market price (`P` directive) from the price file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Price {
    pub date: NaiveDate,
    pub commodity: String,
    pub amount: Amount,
}

/// Accounts known to the journal and the commodity last used with each of
/// them. Computed once, off the UI thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JournalSnapshot {
    pub accounts: Vec<String>,
    pub commodities: HashMap<String, Commodity>,
}

/// A parsed journal. Parsing happens eagerly in [`Journal::from_file`] so an
/// unreadable journal is reported before the form is shown.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    ledger: Ledger,
    prices: Vec<Price>,
}

impl Journal {
    /// Opens and parses `path`. A `price_file` that does not exist is
    /// treated as "no price data"; one that exists must parse.
    pub fn from_file(path: &Path, price_file: Option<&Path>) -> ResultEngine<Self> {
        let ledger = parse_file(path)?;

        let prices = match price_file {
            Some(price_path) if price_path.is_file() => {
                let prices = collect_prices(&parse_file(price_path)?);
                tracing::debug!(path = %price_path.display(), count = prices.len(), "loaded prices");
                prices
            }
            Some(price_path) => {
                tracing::warn!(path = %price_path.display(), "price file not found, ignoring");
                Vec::new()
            }
            None => Vec::new(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            ledger,
            prices,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prices(&self) -> &[Price] {
        &self.prices
    }

    /// Sorted account list and the last commodity posted to each account,
    /// in file order (later postings win).
    #[must_use]
    pub fn snapshot(&self) -> JournalSnapshot {
        let mut accounts = BTreeSet::new();
        let mut commodities = HashMap::new();

        for item in &self.ledger.items {
            let LedgerItem::Transaction(transaction) = item else {
                continue;
            };
            for posting in &transaction.postings {
                accounts.insert(posting.account.clone());
                let commodity = posting
                    .amount
                    .as_ref()
                    .and_then(|amount| Commodity::from_ledger(&amount.amount.commodity));
                if let Some(commodity) = commodity {
                    commodities.insert(posting.account.clone(), commodity);
                }
            }
        }

        JournalSnapshot {
            accounts: accounts.into_iter().collect(),
            commodities,
        }
    }
}

fn parse_file(path: &Path) -> ResultEngine<Ledger> {
    let content = fs::read_to_string(path).map_err(|err| EngineError::io(path, err))?;
    ledger_parser::parse(&content).map_err(|err| EngineError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn collect_prices(ledger: &Ledger) -> Vec<Price> {
    ledger
        .items
        .iter()
        .filter_map(|item| match item {
            LedgerItem::CommodityPrice(price) => Some(Price {
                date: price.datetime.date(),
                commodity: price.commodity_name.clone(),
                amount: Amount::from(&price.amount),
            }),
            _ => None,
        })
        .collect()
}

/// Appends `text` to the file at `path`, separated from the existing content
/// by a blank line. A missing trailing newline in the file is repaired first.
pub fn append_to_file(path: &Path, text: &str) -> ResultEngine<()> {
    let io_err = |err| EngineError::io(path, err);

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    let len = file.metadata().map_err(io_err)?.len();
    let mut block = String::new();
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(io_err)?;
        file.read_exact(&mut last).map_err(io_err)?;
        if last[0] != b'\n' {
            block.push('\n');
        }
        block.push('\n');
    }
    block.push_str(text);
    if !text.ends_with('\n') {
        block.push('\n');
    }

    file.write_all(block.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    tracing::info!(path = %path.display(), bytes = block.len(), "appended transaction");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_separates_blocks_and_repairs_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.ledger");
        fs::write(&path, "2024/01/01 seed\n    A  1 USD\n    B").unwrap();

        append_to_file(&path, "2024/01/02 next\n    A\n    B").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "2024/01/01 seed\n    A  1 USD\n    B\n\n2024/01/02 next\n    A\n    B\n"
        );
    }

    #[test]
    fn append_to_empty_file_has_no_leading_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ledger");
        fs::write(&path, "").unwrap();

        append_to_file(&path, "2024/01/02 first\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "2024/01/02 first\n");
    }

    #[test]
    fn append_requires_an_existing_journal() {
        let dir = tempfile::tempdir().unwrap();
        let err = append_to_file(&dir.path().join("missing.ledger"), "x").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
