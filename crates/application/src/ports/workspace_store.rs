//! Workspace store port
//!
//! The store owns durable identifiers and write semantics. The engine treats
//! every call as an opaque asynchronous operation that may be rejected.

use async_trait::async_trait;
use std::sync::Arc;

use portage_domain::{CollectionRecord, EnvironmentRecord, FolderRecord, Id, RequestRecord};

/// Errors reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the write.
    #[error("Store rejected the write: {0}")]
    Rejected(String),

    /// A referenced record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The backing medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence collaborator for collections, folders, requests and environments.
///
/// A record whose `id` is `None` is created and receives a fresh id. A record
/// carrying an id replaces the stored record with that id in place.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Creates or replaces a collection, returning its persisted id.
    async fn save_collection(&self, collection: &CollectionRecord) -> Result<Id, StoreError>;

    /// Creates or replaces a folder, returning its persisted id.
    async fn save_folder(&self, folder: &FolderRecord) -> Result<Id, StoreError>;

    /// Creates or replaces a request, returning its persisted id.
    async fn save_request(&self, request: &RequestRecord) -> Result<Id, StoreError>;

    /// Creates or replaces an environment, returning its persisted id.
    async fn save_environment(&self, environment: &EnvironmentRecord) -> Result<Id, StoreError>;

    /// Lists all collections.
    async fn list_collections(&self) -> Result<Vec<CollectionRecord>, StoreError>;

    /// Lists the folders of a collection.
    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, StoreError>;

    /// Lists the requests of a collection.
    async fn list_requests(&self, collection_id: &str) -> Result<Vec<RequestRecord>, StoreError>;

    /// Lists every environment, global and collection-scoped.
    async fn list_environments(&self) -> Result<Vec<EnvironmentRecord>, StoreError>;

    /// Looks up a collection by id.
    async fn find_collection(&self, id: &str) -> Result<CollectionRecord, StoreError> {
        self.list_collections()
            .await?
            .into_iter()
            .find(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(format!("collection {id}")))
    }
}

#[async_trait]
impl<S: WorkspaceStore + ?Sized> WorkspaceStore for Arc<S> {
    async fn save_collection(&self, collection: &CollectionRecord) -> Result<Id, StoreError> {
        (**self).save_collection(collection).await
    }

    async fn save_folder(&self, folder: &FolderRecord) -> Result<Id, StoreError> {
        (**self).save_folder(folder).await
    }

    async fn save_request(&self, request: &RequestRecord) -> Result<Id, StoreError> {
        (**self).save_request(request).await
    }

    async fn save_environment(&self, environment: &EnvironmentRecord) -> Result<Id, StoreError> {
        (**self).save_environment(environment).await
    }

    async fn list_collections(&self) -> Result<Vec<CollectionRecord>, StoreError> {
        (**self).list_collections().await
    }

    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, StoreError> {
        (**self).list_folders(collection_id).await
    }

    async fn list_requests(&self, collection_id: &str) -> Result<Vec<RequestRecord>, StoreError> {
        (**self).list_requests(collection_id).await
    }

    async fn list_environments(&self) -> Result<Vec<EnvironmentRecord>, StoreError> {
        (**self).list_environments().await
    }
}
