//! Error types for Stowage.

use thiserror::Error;

/// Common error type for Stowage.
#[derive(Error, Debug)]
pub enum StowageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Object store error.
    ///
    /// Wraps failures reported by the backing store (network, credentials,
    /// non-success status codes). The message is passed through to API
    /// callers as-is.
    #[error("storage error: {0}")]
    Storage(String),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),
}

impl From<reqwest::Error> for StowageError {
    fn from(e: reqwest::Error) -> Self {
        StowageError::Http(e.to_string())
    }
}

impl From<s3::error::S3Error> for StowageError {
    fn from(e: s3::error::S3Error) -> Self {
        StowageError::Storage(e.to_string())
    }
}

/// Result type alias for Stowage operations.
pub type Result<T> = std::result::Result<T, StowageError>;
