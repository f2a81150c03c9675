//! Single-file workspace store.
//!
//! The whole workspace lives in one JSON document:
//! ```text
//! workspace.json
//!   { "version": 1, "collections": [...], "folders": [...],
//!     "requests": [...], "environments": [...] }
//! ```
//! The file is read on first access and rewritten through a temporary file
//! plus rename on every save, so a crash never leaves a half-written file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use portage_application::ports::{FileSystem, FileSystemError, StoreError, WorkspaceStore};
use portage_domain::{
    CollectionRecord, EnvironmentRecord, FolderRecord, Id, RequestRecord, generate_id,
};

use crate::serialization::{from_json, to_json_stable};

const FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WorkspaceFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    collections: Vec<CollectionRecord>,
    #[serde(default)]
    folders: Vec<FolderRecord>,
    #[serde(default)]
    requests: Vec<RequestRecord>,
    #[serde(default)]
    environments: Vec<EnvironmentRecord>,
}

impl WorkspaceFile {
    fn has_collection(&self, id: &str) -> bool {
        self.collections.iter().any(|c| c.id.as_deref() == Some(id))
    }

    fn folder_in(&self, id: &str, collection_id: &str) -> bool {
        self.folders
            .iter()
            .any(|f| f.id.as_deref() == Some(id) && f.collection_id == collection_id)
    }
}

/// Replaces the record with the same id, or appends it.
fn upsert<T>(items: &mut Vec<T>, item: T, id: &str, id_of: impl Fn(&T) -> Option<&str>) {
    match items.iter().position(|existing| id_of(existing) == Some(id)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

fn require_name(kind: &str, name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Rejected(format!("{kind} name must not be empty")));
    }
    Ok(())
}

fn io_error(e: &FileSystemError) -> StoreError {
    StoreError::Io(e.to_string())
}

/// [`WorkspaceStore`] backed by one JSON file.
pub struct JsonFileStore<F> {
    fs: F,
    path: PathBuf,
    state: Mutex<Option<WorkspaceFile>>,
}

impl<F: FileSystem> JsonFileStore<F> {
    /// Creates a store over `path`. Nothing is read until first use.
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            state: Mutex::new(None),
        }
    }

    /// Location of the workspace file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<WorkspaceFile, StoreError> {
        match self.fs.read_file_string(&self.path).await {
            Ok(content) => {
                from_json(&content).map_err(|e| StoreError::Serialization(e.to_string()))
            }
            Err(FileSystemError::NotFound(_)) => {
                tracing::debug!(path = %self.path.display(), "No workspace file yet; starting empty");
                Ok(WorkspaceFile {
                    version: FILE_VERSION,
                    ..WorkspaceFile::default()
                })
            }
            Err(e) => Err(io_error(&e)),
        }
    }

    async fn loaded<'a>(
        &self,
        slot: &'a mut Option<WorkspaceFile>,
    ) -> Result<&'a mut WorkspaceFile, StoreError> {
        if slot.is_none() {
            *slot = Some(self.read().await?);
        }
        slot.as_mut()
            .ok_or_else(|| StoreError::Io("workspace could not be loaded".to_string()))
    }

    async fn persist(&self, data: &WorkspaceFile) -> Result<(), StoreError> {
        let content =
            to_json_stable(data).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        self.fs
            .write_file(&tmp, content.as_bytes())
            .await
            .map_err(|e| io_error(&e))?;
        self.fs
            .rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&e))
    }

    /// Applies `change` and writes the file. A failed write drops the cached
    /// state so the next call re-reads what is actually on disk.
    async fn mutate<R>(
        &self,
        change: impl FnOnce(&mut WorkspaceFile) -> Result<R, StoreError> + Send,
    ) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        let data = self.loaded(&mut state).await?;
        let result = change(data)?;
        data.version = FILE_VERSION;
        if let Err(e) = self.persist(data).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Workspace write failed");
            *state = None;
            return Err(e);
        }
        Ok(result)
    }

    async fn view<R>(&self, read: impl FnOnce(&WorkspaceFile) -> R + Send) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        let data = self.loaded(&mut state).await?;
        Ok(read(data))
    }
}

impl<F> std::fmt::Debug for JsonFileStore<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F: FileSystem> WorkspaceStore for JsonFileStore<F> {
    async fn save_collection(&self, collection: &CollectionRecord) -> Result<Id, StoreError> {
        require_name("Collection", &collection.name)?;
        let mut record = collection.clone();
        let id = record.id.get_or_insert_with(generate_id).clone();
        self.mutate(move |data| {
            upsert(&mut data.collections, record, &id, |c| c.id.as_deref());
            Ok(id)
        })
        .await
    }

    async fn save_folder(&self, folder: &FolderRecord) -> Result<Id, StoreError> {
        require_name("Folder", &folder.name)?;
        let mut record = folder.clone();
        let id = record.id.get_or_insert_with(generate_id).clone();
        self.mutate(move |data| {
            if !data.has_collection(&record.collection_id) {
                return Err(StoreError::Rejected(format!(
                    "unknown collection {}",
                    record.collection_id
                )));
            }
            if let Some(parent) = record.parent_id.as_deref() {
                if parent == id || !data.folder_in(parent, &record.collection_id) {
                    return Err(StoreError::Rejected(format!("invalid parent folder {parent}")));
                }
            }
            upsert(&mut data.folders, record, &id, |f| f.id.as_deref());
            Ok(id)
        })
        .await
    }

    async fn save_request(&self, request: &RequestRecord) -> Result<Id, StoreError> {
        require_name("Request", &request.name)?;
        if request.method.trim().is_empty() {
            return Err(StoreError::Rejected("request method must not be empty".to_string()));
        }
        let mut record = request.clone();
        let id = record.id.get_or_insert_with(generate_id).clone();
        self.mutate(move |data| {
            if !data.has_collection(&record.collection_id) {
                return Err(StoreError::Rejected(format!(
                    "unknown collection {}",
                    record.collection_id
                )));
            }
            if let Some(folder) = record.folder_id.as_deref() {
                if !data.folder_in(folder, &record.collection_id) {
                    return Err(StoreError::Rejected(format!("unknown folder {folder}")));
                }
            }
            upsert(&mut data.requests, record, &id, |r| r.id.as_deref());
            Ok(id)
        })
        .await
    }

    async fn save_environment(&self, environment: &EnvironmentRecord) -> Result<Id, StoreError> {
        require_name("Environment", &environment.name)?;
        let mut record = environment.clone();
        let id = record.id.get_or_insert_with(generate_id).clone();
        self.mutate(move |data| {
            if let Some(collection) = record.collection_id.as_deref() {
                if !data.has_collection(collection) {
                    return Err(StoreError::Rejected(format!("unknown collection {collection}")));
                }
            }
            let taken = data.environments.iter().any(|e| {
                e.name == record.name
                    && e.collection_id == record.collection_id
                    && e.id.as_deref() != Some(id.as_str())
            });
            if taken {
                return Err(StoreError::Rejected(format!(
                    "environment '{}' already exists in this scope",
                    record.name
                )));
            }
            upsert(&mut data.environments, record, &id, |e| e.id.as_deref());
            Ok(id)
        })
        .await
    }

    async fn list_collections(&self) -> Result<Vec<CollectionRecord>, StoreError> {
        self.view(|data| data.collections.clone()).await
    }

    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, StoreError> {
        self.view(|data| {
            data.folders
                .iter()
                .filter(|f| f.collection_id == collection_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn list_requests(&self, collection_id: &str) -> Result<Vec<RequestRecord>, StoreError> {
        self.view(|data| {
            data.requests
                .iter()
                .filter(|r| r.collection_id == collection_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn list_environments(&self) -> Result<Vec<EnvironmentRecord>, StoreError> {
        self.view(|data| data.environments.clone()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::TokioFileSystem;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonFileStore<TokioFileSystem> {
        JsonFileStore::new(TokioFileSystem::new(), dir.path().join("workspace.json"))
    }

    #[tokio::test]
    async fn test_save_assigns_ids_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let collection_id = store
            .save_collection(&CollectionRecord::new("Users API"))
            .await
            .unwrap();
        let folder_id = store
            .save_folder(&FolderRecord::new(&collection_id, "Admin"))
            .await
            .unwrap();
        store
            .save_request(&RequestRecord::new(&collection_id, "Promote", "POST", "/admin").in_folder(&folder_id))
            .await
            .unwrap();

        let reopened = self::store(&dir);
        let requests = reopened.list_requests(&collection_id).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].folder_id.as_deref(), Some(folder_id.as_str()));
        assert!(requests[0].id.is_some());
        assert!(!dir.path().join("workspace.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.list_collections().await.unwrap().is_empty());
        assert!(store.list_environments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_dangling_references() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let folder = store.save_folder(&FolderRecord::new("nope", "Orphan")).await;
        assert!(matches!(folder, Err(StoreError::Rejected(_))));

        let collection_id = store.save_collection(&CollectionRecord::new("C")).await.unwrap();
        let request = store
            .save_request(&RequestRecord::new(&collection_id, "R", "GET", "/").in_folder("ghost"))
            .await;
        assert!(matches!(request, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_existing_id_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let id = store
            .save_environment(&EnvironmentRecord::new("dev").with_variable("A", "1"))
            .await
            .unwrap();

        let mut replacement = EnvironmentRecord::new("dev").with_variable("A", "2");
        replacement.id = Some(id.clone());
        assert_eq!(store.save_environment(&replacement).await.unwrap(), id);

        let environments = store.list_environments().await.unwrap();
        assert_eq!(environments.len(), 1);
        assert_eq!(environments[0].variables["A"], "2");
    }

    #[tokio::test]
    async fn test_duplicate_environment_name_in_scope_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save_environment(&EnvironmentRecord::new("dev")).await.unwrap();
        let second = store.save_environment(&EnvironmentRecord::new("dev")).await;
        assert!(matches!(second, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = store(&dir).save_collection(&CollectionRecord::new("  ")).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("workspace.json"), "{not json").unwrap();
        let result = store(&dir).list_collections().await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
