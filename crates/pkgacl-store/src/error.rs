//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached. Surfaced to the caller and
    /// never retried silently; a stale cached rendering remains servable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity with the same key already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
