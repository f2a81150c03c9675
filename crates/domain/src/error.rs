//! Domain error types

use thiserror::Error;

/// Domain-level errors raised by the pure reconciliation logic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Commit was attempted while conflicts still lack a decision.
    #[error("{pending} conflict(s) have no resolution")]
    ConflictsUnresolved {
        /// Number of conflict records without a decision.
        pending: usize,
    },

    /// A decision referenced a conflict record that does not exist.
    #[error("unknown conflict index: {0}")]
    UnknownConflict(usize),

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A collection item has an invalid structure.
    #[error("invalid collection item: {0}")]
    InvalidCollectionItem(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
