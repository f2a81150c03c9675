//! Import executor
//!
//! Commits a resolved IR to the store in dependency order: collection,
//! folders top-down, requests, environments. Writes are strictly sequential;
//! each folder is submitted only after its parent's id came back.

use thiserror::Error;
use tracing::{debug, info, warn};

use portage_domain::persistence::active_entries;
use portage_domain::{
    CanonicalCollection, CollectionRecord, EnvironmentRecord, FolderGraph, FolderRecord, Id,
    ImportIr, ImportWarning, RequestRecord, ResolvedEnvironment, WarningCode, WriteTarget,
};

use super::options::{EnvironmentMode, ImportOptions};
use crate::ports::{StoreError, WorkspaceStore};

/// Collection name used when a document carries entities but no collection.
const FALLBACK_COLLECTION_NAME: &str = "Imported Collection";

/// Commit stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    /// Creating the collection.
    Collection,
    /// Creating folders.
    Folders,
    /// Creating requests.
    Requests,
    /// Writing environments.
    Environments,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "collection"),
            Self::Folders => write!(f, "folders"),
            Self::Requests => write!(f, "requests"),
            Self::Environments => write!(f, "environments"),
        }
    }
}

/// Entities already written when the executor stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    /// Collections created (0 or 1).
    pub collections: usize,
    /// Folders created.
    pub folders: usize,
    /// Requests created.
    pub requests: usize,
    /// Environments created or overwritten.
    pub environments: usize,
}

impl std::fmt::Display for StageCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} collection(s), {} folder(s), {} request(s), {} environment(s)",
            self.collections, self.folders, self.requests, self.environments
        )
    }
}

/// A store call failed mid-commit. Nothing already written is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("import halted at {stage} stage after committing {committed}: {source}")]
pub struct ExecutionError {
    /// Stage whose store call failed.
    pub stage: ImportStage,
    /// Entities committed before the failure.
    pub committed: StageCounts,
    /// The store's error.
    #[source]
    pub source: StoreError,
}

/// Outcome of a completed commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Persisted id of the new collection, if the document carried one.
    pub collection_id: Option<Id>,
    /// Folders created.
    pub folder_count: usize,
    /// Requests created.
    pub request_count: usize,
    /// Environments created or overwritten.
    pub environment_count: usize,
    /// Warnings raised while committing.
    pub warnings: Vec<ImportWarning>,
}

/// Commits resolved import data to a [`WorkspaceStore`].
pub struct ExecuteImport<S> {
    store: S,
}

impl<S: WorkspaceStore> ExecuteImport<S> {
    /// Creates a new `ExecuteImport` use case.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The store this executor writes to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Executes the use case.
    ///
    /// `environments` must already have passed conflict resolution; they are
    /// ignored when the effective environment mode is `Skip`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] on the first failed store call.
    pub async fn execute(
        &self,
        ir: &ImportIr,
        environments: &[ResolvedEnvironment],
        options: &ImportOptions,
    ) -> Result<ExecutionResult, ExecutionError> {
        let mut committed = StageCounts::default();
        let mut warnings = Vec::new();

        let collection = match &ir.collection {
            Some(collection) => Some(collection.clone()),
            None if !ir.folders.is_empty() || !ir.requests.is_empty() => {
                Some(CanonicalCollection {
                    name: FALLBACK_COLLECTION_NAME.to_string(),
                    ..CanonicalCollection::default()
                })
            }
            None => None,
        };

        // 1. Collection
        let collection_id = match &collection {
            Some(collection) => {
                let record = CollectionRecord {
                    description: collection.description.clone(),
                    id: None,
                    name: collection.name.clone(),
                    variables: collection.variables.clone(),
                };
                let id = self
                    .store
                    .save_collection(&record)
                    .await
                    .map_err(|source| halt(ImportStage::Collection, committed, source))?;
                committed.collections = 1;
                debug!(collection_id = %id, name = %collection.name, "collection committed");
                Some(id)
            }
            None => None,
        };

        // 2. Folders, parents strictly before children
        let (graph, graph_warnings) = FolderGraph::resolve(&ir.folders);
        warnings.extend(graph_warnings);
        let mut folder_ids: Vec<Option<Id>> = vec![None; ir.folders.len()];

        if let Some(collection_id) = &collection_id {
            for index in graph.top_down() {
                let folder = &ir.folders[index];
                let mut record = FolderRecord::new(collection_id.clone(), folder.name.clone())
                    .with_order(folder.order);
                record.description.clone_from(&folder.description);
                record.parent_id = graph.parent(index).and_then(|p| folder_ids[p].clone());

                let id = self
                    .store
                    .save_folder(&record)
                    .await
                    .map_err(|source| halt(ImportStage::Folders, committed, source))?;
                folder_ids[index] = Some(id);
                committed.folders += 1;
            }
            debug!(count = committed.folders, "folders committed");

            // 3. Requests
            let (attachments, request_warnings) = graph.attach_requests(&ir.requests);
            warnings.extend(request_warnings);

            for (request, attachment) in ir.requests.iter().zip(attachments) {
                let record = RequestRecord {
                    auth: request.auth.clone(),
                    body: request.body.clone(),
                    collection_id: collection_id.clone(),
                    folder_id: attachment.and_then(|folder| folder_ids[folder].clone()),
                    headers: active_entries(&request.headers, options.include_disabled),
                    id: None,
                    method: request.method.clone(),
                    name: request.name.clone(),
                    order: request.order,
                    query_params: active_entries(&request.query_params, options.include_disabled),
                    url: request.url.clone(),
                };
                self.store
                    .save_request(&record)
                    .await
                    .map_err(|source| halt(ImportStage::Requests, committed, source))?;
                committed.requests += 1;
            }
            debug!(count = committed.requests, "requests committed");
        }

        // 4. Environments
        let mode = options.effective_environment_mode(collection_id.is_some());
        if mode != options.environment_mode && !environments.is_empty() {
            warnings.push(ImportWarning::info(
                WarningCode::EnvironmentScopeChanged,
                "environments",
                "No collection to attach environments to; imported as global environments",
            ));
        }

        let scope = match mode {
            EnvironmentMode::Skip => None,
            EnvironmentMode::Global => Some(None),
            EnvironmentMode::Collection => Some(collection_id.clone()),
        };
        if let Some(scope) = scope {
            for resolved in environments {
                let env = &resolved.environment;
                let record = EnvironmentRecord {
                    collection_id: scope.clone(),
                    display_name: env.display_name.clone(),
                    id: match &resolved.target {
                        WriteTarget::Create => None,
                        WriteTarget::Overwrite(id) => Some(id.clone()),
                    },
                    name: env.name.clone(),
                    variables: env.committed_variables(options.include_disabled),
                };
                self.store
                    .save_environment(&record)
                    .await
                    .map_err(|source| halt(ImportStage::Environments, committed, source))?;
                committed.environments += 1;
            }
        }

        info!(
            collection_id = collection_id.as_deref().unwrap_or("-"),
            folders = committed.folders,
            requests = committed.requests,
            environments = committed.environments,
            "import committed"
        );

        Ok(ExecutionResult {
            collection_id,
            folder_count: committed.folders,
            request_count: committed.requests,
            environment_count: committed.environments,
            warnings,
        })
    }
}

fn halt(stage: ImportStage, committed: StageCounts, source: StoreError) -> ExecutionError {
    warn!(%stage, %committed, error = %source, "store call failed; import halted");
    ExecutionError {
        stage,
        committed,
        source,
    }
}
