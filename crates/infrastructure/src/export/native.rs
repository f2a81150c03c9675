//! Native export writer.

use chrono::Utc;

use portage_domain::persistence::active_entries;
use portage_domain::{ExportFormat, ExportOptions, ExportResult, WorkspaceSnapshot};

use super::ExportError;
use crate::native::{
    NATIVE_TYPE, NATIVE_VERSION, NativeCollection, NativeDocument, NativeEnvironment,
    NativeFolder, NativeRequest,
};
use crate::serialization::to_json;

/// Writes `portage-collection-export` documents.
pub struct NativeExporter;

impl NativeExporter {
    /// Export the snapshot. Environments-only snapshots are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is empty or serialization fails.
    pub fn export(
        snapshot: &WorkspaceSnapshot,
        options: &ExportOptions,
    ) -> Result<ExportResult, ExportError> {
        if snapshot.collection.is_none() && snapshot.environments.is_empty() {
            return Err(ExportError::NothingToExport {
                format: ExportFormat::Native,
            });
        }
        let document = Self::build(snapshot, options.include_disabled);
        let content = to_json(&document, options.pretty_print)?;

        let mut result = ExportResult::new(content, ExportFormat::Native, document.requests.len());
        result.environment_count = document.environments.len();
        Ok(result)
    }

    fn build(snapshot: &WorkspaceSnapshot, include_disabled: bool) -> NativeDocument {
        let folders = snapshot
            .folders
            .iter()
            .enumerate()
            .map(|(i, folder)| NativeFolder {
                id: folder
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("folder-{}", i + 1)),
                name: folder.name.clone(),
                description: folder.description.clone(),
                parent_id: folder.parent_id.clone(),
                order: folder.order,
            })
            .collect();

        let requests = snapshot
            .requests
            .iter()
            .enumerate()
            .map(|(i, request)| NativeRequest {
                id: request
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("request-{}", i + 1)),
                name: request.name.clone(),
                method: request.method.clone(),
                url: request.url.clone(),
                headers: active_entries(&request.headers, include_disabled),
                query_params: active_entries(&request.query_params, include_disabled),
                body: request.body.clone(),
                auth: request.auth.clone(),
                folder_id: request.folder_id.clone(),
                order: request.order,
            })
            .collect();

        let environments = snapshot
            .environments
            .iter()
            .map(|env| NativeEnvironment {
                name: env.name.clone(),
                display_name: (env.display_name != env.name).then(|| env.display_name.clone()),
                variables: env.variables.clone(),
            })
            .collect();

        NativeDocument {
            doc_type: NATIVE_TYPE.to_string(),
            version: NATIVE_VERSION.to_string(),
            exported_at: Some(Utc::now().to_rfc3339()),
            collection: snapshot.collection.as_ref().map(|c| NativeCollection {
                name: c.name.clone(),
                description: c.description.clone(),
                variables: c.variables.clone(),
            }),
            folders,
            requests,
            environments,
        }
    }
}
