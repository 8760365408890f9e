//! Store error types
//!
//! Defines all errors that can occur in the persistence layer.

use thiserror::Error;

/// Errors that can occur in the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite error
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// I/O operation failed (image files, data directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness or state conflict (duplicate email, second report for a date)
    #[error("{0}")]
    Conflict(String),

    /// Input rejected before touching the database
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Password(String),

    /// Connection mutex was poisoned
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<bcrypt::BcryptError> for StoreError {
    fn from(err: bcrypt::BcryptError) -> Self {
        StoreError::Password(err.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
