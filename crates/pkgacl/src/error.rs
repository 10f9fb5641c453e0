//! Error types for the export facade.

use pkgacl_export::UnknownTarget;
use pkgacl_store::StoreError;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Invalid consumer or format identifier. A client error; not retried.
    #[error(transparent)]
    UnknownTarget(#[from] UnknownTarget),

    /// Storage error. Transient; a stale cached rendering, where one
    /// exists, remains servable.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
