//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`LedgerNotFound`] thrown when no journal (or price file) can be located.
//! - [`Parse`] thrown when a journal or price file is not valid ledger text.
//! - [`InvalidAmount`] thrown when user input is not a ledger amount.
//! - [`InvalidTransaction`] thrown when a record would not parse back.
//! - [`Preferences`] thrown when the preferences file cannot be decoded.
//!
//!  [`LedgerNotFound`]: EngineError::LedgerNotFound
//!  [`Parse`]: EngineError::Parse
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidTransaction`]: EngineError::InvalidTransaction
//!  [`Preferences`]: EngineError::Preferences
use std::path::PathBuf;

use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    LedgerNotFound(String),
    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Transaction would not parse: {0}")]
    InvalidTransaction(String),
    #[error("Invalid preferences: {0}")]
    Preferences(#[from] serde_json::Error),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::LedgerNotFound(a), Self::LedgerNotFound(b)) => a == b,
            (
                Self::Parse {
                    path: pa,
                    message: ma,
                },
                Self::Parse {
                    path: pb,
                    message: mb,
                },
            ) => pa == pb && ma == mb,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidTransaction(a), Self::InvalidTransaction(b)) => a == b,
            (Self::Preferences(a), Self::Preferences(b)) => a.to_string() == b.to_string(),
            (Self::Io { path: pa, source: a }, Self::Io { path: pb, source: b }) => {
                pa == pb && a.kind() == b.kind()
            }
            _ => false,
        }
    }
}
