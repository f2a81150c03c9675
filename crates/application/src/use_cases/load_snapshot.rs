//! Load snapshot use case
//!
//! Walks live store state for one export scope.

use tracing::debug;

use portage_domain::{Id, WorkspaceSnapshot};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{StoreError, WorkspaceStore};

/// What to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotScope {
    /// One collection with its folders, requests and collection-bound environments.
    Collection(Id),
    /// Every global environment.
    GlobalEnvironments,
    /// One environment, looked up by its stable name.
    Environment(String),
}

/// Loads a [`WorkspaceSnapshot`] from the store.
pub struct LoadSnapshot<S> {
    store: S,
}

impl<S: WorkspaceStore> LoadSnapshot<S> {
    /// Creates a new `LoadSnapshot` use case.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Executes the use case.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the scope names a missing collection or
    /// environment, and `Storage` when a list call fails.
    pub async fn execute(&self, scope: &SnapshotScope) -> ApplicationResult<WorkspaceSnapshot> {
        let snapshot = match scope {
            SnapshotScope::Collection(id) => {
                let collection = self.store.find_collection(id).await.map_err(|e| match e {
                    StoreError::NotFound(what) => ApplicationError::NotFound(what),
                    other => other.into(),
                })?;
                let folders = self.store.list_folders(id).await?;
                let requests = self.store.list_requests(id).await?;
                let environments = self
                    .store
                    .list_environments()
                    .await?
                    .into_iter()
                    .filter(|e| e.collection_id.as_deref() == Some(id.as_str()))
                    .collect();
                WorkspaceSnapshot {
                    collection: Some(collection),
                    folders,
                    requests,
                    environments,
                }
            }
            SnapshotScope::GlobalEnvironments => WorkspaceSnapshot {
                environments: self
                    .store
                    .list_environments()
                    .await?
                    .into_iter()
                    .filter(|e| e.is_global())
                    .collect(),
                ..WorkspaceSnapshot::default()
            },
            SnapshotScope::Environment(name) => {
                let environment = self
                    .store
                    .list_environments()
                    .await?
                    .into_iter()
                    .find(|e| &e.name == name)
                    .ok_or_else(|| ApplicationError::NotFound(format!("environment {name}")))?;
                WorkspaceSnapshot {
                    environments: vec![environment],
                    ..WorkspaceSnapshot::default()
                }
            }
        };

        debug!(
            folders = snapshot.folders.len(),
            requests = snapshot.requests.len(),
            environments = snapshot.environments.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}
