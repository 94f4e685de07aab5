//! Error types and Result alias for the snipe bot

use thiserror::Error;

/// Main error type for the snipe bot
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid token address: {0}")]
    InvalidAddress(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Cannot enable snipe: {0}")]
    EnableRejected(String),

    #[error("Snipe config not found: {0}")]
    ConfigNotFound(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Shorthand for an out-of-range field error
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
