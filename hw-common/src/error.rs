//! Common error types for Holy Writings

use thiserror::Error;

/// Common result type for Holy Writings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the reader service
#[derive(Error, Debug)]
pub enum Error {
    /// Local store operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding of a stored value failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote query endpoint failure
    #[error("HTTP error: {0}")]
    Http(String),
}
