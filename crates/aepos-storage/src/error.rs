//! Error types for the storage layer.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key not found.
    #[error("key not found")]
    NotFound,

    /// Backend failure.
    #[error("database error: {0}")]
    Backend(String),

    /// Stored value could not be decoded.
    #[error("corrupted value under key {key}: {reason}")]
    Corrupted { key: String, reason: String },
}

impl StorageError {
    /// Whether this error is the not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
