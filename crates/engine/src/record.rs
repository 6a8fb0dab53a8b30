//! Ledger text for a single transaction.
//!
//! ```text
//! 2024/01/05=2024/01/06 milk
//!     Assets:Cash         -3.50 USD
//!     Expenses:Groceries   3.50 USD
//! ```

use std::fmt;

use chrono::NaiveDate;

use crate::Amount;

pub const DATE_FORMAT: &str = "%Y/%m/%d";

const INDENT: &str = "    ";
const GAP: &str = "  ";

/// One `account  amount` line. A posting without amount renders as a bare
/// account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    pub account: String,
    pub amount: Option<Amount>,
}

/// A transaction as it is written to the journal. Built for previews and
/// submissions, never edited afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub clearing_date: Option<NaiveDate>,
    pub description: String,
    pub postings: Vec<Posting>,
}

impl TransactionRecord {
    /// A purchase paid from `asset` into `expense`. The asset posting carries
    /// the negated amount, so the two postings always net to zero.
    #[must_use]
    pub fn purchase(
        date: NaiveDate,
        clearing_date: Option<NaiveDate>,
        description: &str,
        amount: Option<&Amount>,
        expense: &str,
        asset: &str,
    ) -> Self {
        Self {
            date,
            clearing_date,
            description: description.to_string(),
            postings: vec![
                Posting {
                    account: asset.to_string(),
                    amount: amount.map(|a| -a),
                },
                Posting {
                    account: expense.to_string(),
                    amount: amount.cloned(),
                },
            ],
        }
    }

    fn header(&self) -> String {
        let mut header = self.date.format(DATE_FORMAT).to_string();
        if let Some(clearing) = self.clearing_date {
            header.push('=');
            header.push_str(&clearing.format(DATE_FORMAT).to_string());
        }
        if !self.description.is_empty() {
            header.push(' ');
            header.push_str(&self.description);
        }
        header
    }

    /// Header plus aligned posting lines, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let amounts: Vec<String> = self
            .postings
            .iter()
            .map(|p| p.amount.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        let account_width = self
            .postings
            .iter()
            .map(|p| p.account.chars().count())
            .max()
            .unwrap_or(0);
        let amount_width = amounts.iter().map(|a| a.chars().count()).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(self.postings.len() + 1);
        lines.push(self.header());
        for (posting, amount) in self.postings.iter().zip(&amounts) {
            let line = if amount.is_empty() {
                format!("{INDENT}{}", posting.account)
            } else {
                format!(
                    "{INDENT}{:<account_width$}{GAP}{:>amount_width$}",
                    posting.account, amount
                )
            };
            lines.push(line.trim_end().to_string());
        }
        lines
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
