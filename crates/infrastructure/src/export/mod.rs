//! Export infrastructure.
//!
//! Each exporter walks a [`WorkspaceSnapshot`] and serializes it as the
//! mirror of the matching import dialect.

mod dotenv;
mod native;
mod postman;

pub use dotenv::DotEnvExporter;
pub use native::NativeExporter;
pub use postman::{PostmanEnvironmentExporter, PostmanV2Exporter};

use portage_domain::{
    EnvironmentRecord, ExportFormat, ExportOptions, ExportResult, ImportWarning,
    WarningCode, WorkspaceSnapshot,
};
use thiserror::Error;

use crate::serialization::SerializationError;

/// Export error type.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
    /// The format carries a collection and the snapshot has none.
    #[error("{format} export requires a collection")]
    MissingCollection {
        /// The requested format.
        format: ExportFormat,
    },
    /// Nothing in the snapshot can be written in this format.
    #[error("Nothing to export as {format}")]
    NothingToExport {
        /// The requested format.
        format: ExportFormat,
    },
}

/// Export a snapshot in the format named by `options`.
///
/// # Errors
///
/// Returns an error if the snapshot holds nothing the format can carry or
/// serialization fails.
pub fn export_snapshot(
    snapshot: &WorkspaceSnapshot,
    options: &ExportOptions,
) -> Result<ExportResult, ExportError> {
    let result = match options.format {
        ExportFormat::Native => NativeExporter::export(snapshot, options),
        ExportFormat::PostmanV2 => PostmanV2Exporter::export(snapshot, options),
        ExportFormat::PostmanEnvironment => PostmanEnvironmentExporter::export(snapshot, options),
        ExportFormat::DotEnv => DotEnvExporter::export(snapshot, options),
    }?;
    tracing::info!(
        format = %result.format,
        requests = result.request_count,
        environments = result.environment_count,
        warnings = result.warnings.len(),
        "Export complete"
    );
    Ok(result)
}

/// Single-environment targets write the first environment and report the rest.
fn single_environment<'s>(
    snapshot: &'s WorkspaceSnapshot,
    format: ExportFormat,
    result: &mut ExportResult,
) -> Result<&'s EnvironmentRecord, ExportError> {
    let (first, rest) = snapshot
        .environments
        .split_first()
        .ok_or(ExportError::NothingToExport { format })?;
    for skipped in rest {
        result.add_warning(ImportWarning::warning(
            WarningCode::FieldDropped,
            &skipped.name,
            format!(
                "{} holds one environment; '{}' was not exported",
                format.display_name(),
                skipped.name
            ),
        ));
    }
    Ok(first)
}
