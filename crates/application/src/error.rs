//! Application error types

use thiserror::Error;
use portage_domain::{DomainError, ImportError, ImportFormat};

use crate::ports::{FileSystemError, StoreError};
use crate::use_cases::ExecutionError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain rule was violated.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The file picker only admits `.json` and `.env` files.
    #[error("unsupported file type: {0} (expected .json or .env)")]
    UnsupportedFile(String),

    /// The document exceeds the configured size limit.
    #[error("document is {size} bytes, above the {limit} byte limit")]
    TooLarge {
        /// Document size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Content matched no dialect, or matched one below the acceptance threshold.
    #[error("{}", detection_message(*format, *confidence))]
    Detection {
        /// Best candidate, if any.
        format: Option<ImportFormat>,
        /// Confidence of the best candidate.
        confidence: f64,
    },

    /// The document is not valid for its detected dialect.
    #[error("parse error: {0}")]
    Parse(ImportError),

    /// Commit was attempted while conflicts lack a decision.
    #[error("{pending} conflict(s) still need a decision")]
    ConflictsUnresolved {
        /// Number of undecided conflicts.
        pending: usize,
    },

    /// A store call failed mid-commit.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A store call failed outside a commit.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Reading or writing a file failed.
    #[error("file system error: {0}")]
    FileSystem(#[from] FileSystemError),

    /// The operation is not allowed in the session's current state.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

fn detection_message(format: Option<ImportFormat>, confidence: f64) -> String {
    match format {
        Some(format) => format!(
            "document looks like {} but confidence {confidence:.2} is below the acceptance threshold",
            format.display_name()
        ),
        None => "unrecognized document format".to_string(),
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_messages() {
        let unknown = ApplicationError::Detection {
            format: None,
            confidence: 0.0,
        };
        assert_eq!(unknown.to_string(), "unrecognized document format");

        let weak = ApplicationError::Detection {
            format: Some(ImportFormat::PostmanV1),
            confidence: 0.25,
        };
        assert!(weak.to_string().contains("0.25"));
    }
}
