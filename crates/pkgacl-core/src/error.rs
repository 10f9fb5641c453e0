//! Error types for the core model.

use thiserror::Error;

/// Errors raised when decoding persisted model data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A grant references a role outside the closed set.
    ///
    /// Readers treat this as a data-integrity fault: the grant is skipped
    /// and the fault logged, the export proceeds with the remaining graph.
    #[error("unknown acl role: {0}")]
    UnknownRole(String),

    /// A persisted status string does not match any known variant.
    #[error("unknown {kind} status: {value}")]
    UnknownStatus { kind: &'static str, value: String },
}
