//! Common error types for VDFD

use thiserror::Error;

/// Common result type for VDFD operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the lead service
#[derive(Error, Debug)]
pub enum Error {
    /// Local database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input, rejected before any write
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote document store error
    ///
    /// Only ever returned by `RemoteStore` implementations; services turn it
    /// into `RemoteOutcome::Failed`.
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Export rendering error
    #[error("Export error: {0}")]
    Export(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Remote(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Export(err.to_string())
    }
}
