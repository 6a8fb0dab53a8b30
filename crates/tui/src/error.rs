use std::process::ExitCode;

use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    LedgerNotFound(EngineError),
    #[error("Cannot open ledger file: {0}")]
    Journal(EngineError),
    #[error("Cannot read preferences: {0}")]
    Preferences(EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Process exit status for an error that ends the program.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::LedgerNotFound(_) => ExitCode::from(4),
            Self::Journal(_) => ExitCode::from(5),
            _ => ExitCode::FAILURE,
        }
    }

    /// Whether the error is shown in the blocking startup dialog.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::LedgerNotFound(_) | Self::Journal(_) | Self::Preferences(_)
        )
    }
}
