//! Subcommand handlers.
//!
//! Each handler returns the text to print on stdout. Logs go to stderr.

use std::path::Path;

use tracing::info;

use portage_application::ApplicationError;
use portage_application::ports::{DocumentReader, FileSystem, WorkspaceStore};
use portage_application::use_cases::{
    ConflictView, DuplicateHandling, EnvironmentMode, ImportPreview, ImportSession, LoadSnapshot,
    ReadDocument, SnapshotScope,
};
use portage_domain::{
    DetectionResult, ExportOptions, ImportWarning, RawDocument, Resolution, WarningStats,
    WorkspaceSnapshot,
};
use portage_infrastructure::{DialectRegistry, JsonFileStore, TokioFileSystem, export_snapshot};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

type Store = JsonFileStore<TokioFileSystem>;

/// Parses configuration and runs one subcommand.
///
/// # Errors
///
/// Returns the first error raised by configuration, the use cases, the
/// store or the exporter.
pub async fn run(cli: Cli) -> CliResult<String> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    match cli.command {
        Commands::Detect { file, dropped } => detect(&config, &file, dropped).await,
        Commands::Preview { file, dropped } => preview(&config, &file, dropped).await,
        Commands::Import {
            file,
            environment_mode,
            duplicates,
            include_disabled,
            decisions,
            dropped,
        } => {
            let request = ImportRequest {
                environment_mode,
                duplicates,
                include_disabled,
                decisions,
                dropped,
            };
            import(&config, &file, request).await
        }
        Commands::Export {
            collection_id,
            environment,
            format,
            output,
            compact,
            exclude_disabled,
            ..
        } => {
            let scope = match (collection_id, environment) {
                (Some(id), _) => SnapshotScope::Collection(id),
                (None, Some(name)) => SnapshotScope::Environment(name),
                (None, None) => SnapshotScope::GlobalEnvironments,
            };
            let options = ExportOptions {
                format,
                pretty_print: !compact,
                include_disabled: !exclude_disabled,
            };
            export(&config, &scope, &options, output.as_deref()).await
        }
        Commands::List => list(&config).await,
    }
}

/// Flags of the `import` subcommand, layered over the configuration.
#[derive(Debug, Default)]
pub struct ImportRequest {
    /// Overrides `environment_mode`.
    pub environment_mode: Option<EnvironmentMode>,
    /// Overrides `duplicate_handling`.
    pub duplicates: Option<DuplicateHandling>,
    /// Forces `include_disabled` on.
    pub include_disabled: bool,
    /// Per-conflict decisions, applied before the default.
    pub decisions: Vec<(usize, Resolution)>,
    /// Skip the file-picker extension check.
    pub dropped: bool,
}

fn store(config: &AppConfig) -> Store {
    JsonFileStore::new(TokioFileSystem::new(), &config.store_path)
}

async fn read(config: &AppConfig, file: &Path, dropped: bool) -> CliResult<RawDocument> {
    let reader = ReadDocument::new(TokioFileSystem::new(), config.import.max_file_size);
    Ok(reader.execute(file, dropped).await?)
}

/// Reports the detected dialect without parsing.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn detect(config: &AppConfig, file: &Path, dropped: bool) -> CliResult<String> {
    let document = read(config, file, dropped).await?;
    let registry = DialectRegistry::new(config.import.clone());
    Ok(render_detection(&registry.detect(&document)))
}

/// Parses a document and reports the preview without writing anything.
///
/// # Errors
///
/// Returns an error if the file cannot be read, detected or parsed, or the
/// store cannot be listed for conflicts.
pub async fn preview(config: &AppConfig, file: &Path, dropped: bool) -> CliResult<String> {
    let document = read(config, file, dropped).await?;
    let mut session = ImportSession::new(
        DialectRegistry::new(config.import.clone()),
        store(config),
        config.import_options(),
    );
    let preview = session.select(document).await?;
    Ok(render_preview(&preview))
}

/// Imports a document into the store.
///
/// # Errors
///
/// Returns `PendingConflicts` when decisions are missing, and otherwise the
/// first read, parse or store error.
pub async fn import(config: &AppConfig, file: &Path, request: ImportRequest) -> CliResult<String> {
    let mut options = config.import_options();
    if let Some(mode) = request.environment_mode {
        options.environment_mode = mode;
    }
    if let Some(duplicates) = request.duplicates {
        options.duplicate_handling = duplicates;
    }
    options.include_disabled |= request.include_disabled;

    let document = read(config, file, request.dropped).await?;
    let mut session = ImportSession::new(
        DialectRegistry::new(config.import.clone()),
        store(config),
        options,
    );
    session.select(document).await?;
    for (index, resolution) in request.decisions {
        session.decide(index, resolution)?;
    }

    let preview = session
        .preview()
        .ok_or_else(|| ApplicationError::InvalidState("no document loaded".to_string()))?;
    let pending: Vec<&ConflictView> = preview
        .conflicts
        .iter()
        .filter(|c| c.decision.is_none())
        .collect();
    if !pending.is_empty() {
        return Err(CliError::PendingConflicts {
            pending: pending.len(),
            listing: pending.iter().map(|c| render_conflict(c)).collect(),
        });
    }

    let result = session.commit().await?;
    info!(
        file = %file.display(),
        requests = result.request_count,
        environments = result.environment_count,
        "Import committed"
    );

    let mut out = String::new();
    if let Some(id) = &result.collection_id {
        out.push_str(&format!("collection: {id}\n"));
    }
    out.push_str(&format!(
        "imported {} folder(s), {} request(s), {} environment(s)\n",
        result.folder_count, result.request_count, result.environment_count
    ));
    out.push_str(&render_warnings(&result.warnings));
    Ok(out)
}

/// Exports one scope of the store.
///
/// With `output` the content is written to that file, or into that directory
/// under a name derived from the snapshot, and a summary is returned.
/// Otherwise the content itself is returned.
///
/// # Errors
///
/// Returns an error if the scope is missing, the format cannot carry the
/// snapshot, or the output file cannot be written.
pub async fn export(
    config: &AppConfig,
    scope: &SnapshotScope,
    options: &ExportOptions,
    output: Option<&Path>,
) -> CliResult<String> {
    let snapshot = LoadSnapshot::new(store(config)).execute(scope).await?;
    let result = export_snapshot(&snapshot, options)?;
    for warning in &result.warnings {
        tracing::warn!(%warning, "Export warning");
    }

    let Some(output) = output else {
        return Ok(result.content);
    };
    let target = if output.is_dir() {
        output.join(result.suggested_filename(&base_name(&snapshot)))
    } else {
        output.to_path_buf()
    };
    TokioFileSystem::new()
        .write_file(&target, result.content.as_bytes())
        .await?;
    let mut out = format!(
        "wrote {} ({}, {} request(s), {} environment(s))\n",
        target.display(),
        result.format.display_name(),
        result.request_count,
        result.environment_count
    );
    out.push_str(&render_warnings(&result.warnings));
    Ok(out)
}

/// Lists stored collections and environments with their ids.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(config: &AppConfig) -> CliResult<String> {
    let store = store(config);
    let mut out = String::new();
    for collection in store.list_collections().await? {
        out.push_str(&format!(
            "collection  {}  {}\n",
            collection.id.as_deref().unwrap_or("-"),
            collection.name
        ));
    }
    for environment in store.list_environments().await? {
        let scope = environment
            .collection_id
            .as_deref()
            .map_or_else(|| "global".to_string(), |id| format!("collection {id}"));
        out.push_str(&format!(
            "environment  {}  {} ({scope})\n",
            environment.id.as_deref().unwrap_or("-"),
            environment.name
        ));
    }
    Ok(out)
}

/// File stem for an export written into a directory.
fn base_name(snapshot: &WorkspaceSnapshot) -> String {
    let name = snapshot
        .collection
        .as_ref()
        .map(|c| c.name.as_str())
        .or_else(|| snapshot.environments.first().map(|e| e.name.as_str()))
        .unwrap_or("export");
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

fn render_detection(detection: &DetectionResult) -> String {
    let Some(format) = detection.format else {
        return "unrecognized\n".to_string();
    };
    let version = detection
        .version
        .as_deref()
        .map_or_else(String::new, |v| format!(" {v}"));
    let verdict = if detection.is_valid {
        "accepted"
    } else {
        "below threshold"
    };
    format!(
        "{}{version} (confidence {:.2}, {verdict})\n",
        format.display_name(),
        detection.confidence
    )
}

fn render_preview(preview: &ImportPreview) -> String {
    let mut out = format!(
        "format: {} (confidence {:.2})\n",
        preview.format.display_name(),
        preview.confidence
    );
    if let Some(name) = &preview.collection_name {
        out.push_str(&format!("collection: {name}\n"));
    }
    out.push_str(&format!(
        "{} folder(s), {} request(s), {} environment(s), {} variable(s)\n",
        preview.folder_count,
        preview.request_count,
        preview.environment_count,
        preview.variable_count
    ));
    out.push('\n');
    out.push_str(&preview.tree.render());
    out.push_str(&render_warnings(&preview.warnings));
    if !preview.conflicts.is_empty() {
        out.push_str("\nconflicts:\n");
        for conflict in &preview.conflicts {
            out.push_str(&render_conflict(conflict));
        }
    }
    out
}

fn render_conflict(conflict: &ConflictView) -> String {
    let decision = conflict
        .decision
        .map_or_else(|| "undecided".to_string(), |r| r.to_string());
    format!(
        "  [{}] {} '{}' exists as {} ({decision})\n",
        conflict.index, conflict.kind, conflict.entity_name, conflict.existing_id
    )
}

fn render_warnings(warnings: &[ImportWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let stats = WarningStats::from_warnings(warnings);
    let mut out = format!(
        "\n{} warning(s) ({} error, {} warning, {} info):\n",
        stats.total(),
        stats.error_count,
        stats.warning_count,
        stats.info_count
    );
    for warning in warnings {
        out.push_str(&format!("  {warning}\n"));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use portage_domain::{
        CollectionRecord, EntityKind, EnvironmentRecord, ImportFormat, WarningCode,
    };

    #[test]
    fn test_render_detection() {
        assert_eq!(render_detection(&DetectionResult::unrecognized()), "unrecognized\n");

        let detection =
            DetectionResult::recognized(ImportFormat::PostmanV2, Some("2.1.0".to_string()), 0.9, 0.5);
        let text = render_detection(&detection);
        assert!(text.starts_with("Postman Collection v2"));
        assert!(text.contains("2.1.0"));
        assert!(text.contains("0.90"));
        assert!(text.contains("accepted"));
    }

    #[test]
    fn test_base_name() {
        let snapshot = WorkspaceSnapshot {
            collection: Some(CollectionRecord::new("Pet Store v2")),
            ..WorkspaceSnapshot::default()
        };
        assert_eq!(base_name(&snapshot), "Pet-Store-v2");

        let snapshot = WorkspaceSnapshot {
            environments: vec![EnvironmentRecord::new("staging")],
            ..WorkspaceSnapshot::default()
        };
        assert_eq!(base_name(&snapshot), "staging");
        assert_eq!(base_name(&WorkspaceSnapshot::default()), "export");
    }

    #[test]
    fn test_render_warnings_counts_by_severity() {
        assert_eq!(render_warnings(&[]), "");
        let warnings = vec![
            ImportWarning::error(WarningCode::ItemSkipped, "C/Bad", "skipped"),
            ImportWarning::warning(WarningCode::NameDefaulted, "C/item 2", "defaulted"),
        ];
        let text = render_warnings(&warnings);
        assert!(text.starts_with("\n2 warning(s) (1 error, 1 warning, 0 info):\n"));
        assert!(text.contains("C/Bad"));
    }

    #[test]
    fn test_render_conflict() {
        let conflict = ConflictView {
            index: 1,
            kind: EntityKind::Environment,
            entity_name: "dev".to_string(),
            existing_id: "e1".to_string(),
            decision: Some(Resolution::Rename),
        };
        let text = render_conflict(&conflict);
        assert!(text.contains("[1]"));
        assert!(text.contains("'dev'"));
        assert!(text.contains("rename"));
    }
}
