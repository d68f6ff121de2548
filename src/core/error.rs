use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SipataniError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Rule violation: {0}")]
    RuleViolation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl SipataniError {
    /// Storage failures are the only kind that can leave a transaction open.
    pub fn is_storage(&self) -> bool {
        matches!(self, SipataniError::RusqliteError(_) | SipataniError::IoError(_))
    }
}
