//! CLI error type.

use thiserror::Error;

use portage_application::ApplicationError;
use portage_application::ports::{FileSystemError, StoreError};
use portage_infrastructure::ExportError;

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A use case failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The snapshot could not be exported in the requested format.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// The store could not be read.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The export could not be written.
    #[error("could not write output: {0}")]
    Output(#[from] FileSystemError),

    /// Conflicts remain after applying the operator's decisions.
    #[error(
        "{pending} conflict(s) need a decision; pass --duplicates or --resolve INDEX=RESOLUTION\n{listing}"
    )]
    PendingConflicts {
        /// Number of undecided conflicts.
        pending: usize,
        /// One line per undecided conflict.
        listing: String,
    },
}

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
