//! Common error types for readycheck

use thiserror::Error;

/// Common result type for readycheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across readycheck crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON column or body (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (or not owned by the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource already exists (duplicate registration)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authentication failure, deliberately undifferentiated
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
