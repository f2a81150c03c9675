//! In-memory store fake shared by use case tests.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::significant_drop_tightening
)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use portage_domain::{
    CollectionRecord, DetectionResult, EnvironmentRecord, FolderRecord, Id, ImportFormat,
    ImportIr, ParseOutcome, RawDocument, RequestRecord,
};

use crate::ports::{DocumentReader, StoreError, WorkspaceStore};

/// One call observed by the fake, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SaveCollection { name: String, id: Id },
    SaveFolder { name: String, parent_id: Option<Id>, id: Id },
    SaveRequest { name: String, folder_id: Option<Id>, id: Id },
    SaveEnvironment { name: String, collection_id: Option<Id>, id: Id },
    List(&'static str),
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    saves: usize,
    fail_at_save: Option<usize>,
    strict: bool,
    collections: Vec<CollectionRecord>,
    folders: Vec<FolderRecord>,
    requests: Vec<RequestRecord>,
    environments: Vec<EnvironmentRecord>,
}

#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the save call with this zero-based position.
    pub fn failing_at_save(self, position: usize) -> Self {
        self.inner.lock().expect("Lock poisoned").fail_at_save = Some(position);
        self
    }

    /// Rejects blank names and environment names already taken in their
    /// scope, as the file-backed store does.
    pub fn enforcing_names(self) -> Self {
        self.inner.lock().expect("Lock poisoned").strict = true;
        self
    }

    pub fn clear_failure(&self) {
        self.inner.lock().expect("Lock poisoned").fail_at_save = None;
    }

    pub fn with_environment(self, name: &str, id: &str) -> Self {
        let mut env = EnvironmentRecord::new(name);
        env.id = Some(id.to_string());
        self.inner.lock().expect("Lock poisoned").environments.push(env);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().expect("Lock poisoned").calls.clone()
    }

    pub fn save_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .collect()
    }

    pub fn environments(&self) -> Vec<EnvironmentRecord> {
        self.inner.lock().expect("Lock poisoned").environments.clone()
    }

    fn begin_save(inner: &mut Inner, kind: &str, name: &str) -> Result<Id, StoreError> {
        if inner.strict && name.trim().is_empty() {
            return Err(StoreError::Rejected(format!("{kind} name must not be empty")));
        }
        let position = inner.saves;
        inner.saves += 1;
        if inner.fail_at_save == Some(position) {
            return Err(StoreError::Rejected(format!("{kind} save failed")));
        }
        Ok(format!("{kind}-{position}"))
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: T, id: &str, id_of: impl Fn(&T) -> Option<&str>) {
    match items.iter().position(|existing| id_of(existing) == Some(id)) {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

#[async_trait]
impl WorkspaceStore for MockStore {
    async fn save_collection(&self, collection: &CollectionRecord) -> Result<Id, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        let fresh = Self::begin_save(&mut inner, "collection", &collection.name)?;
        let id = collection.id.clone().unwrap_or(fresh);
        let mut stored = collection.clone();
        stored.id = Some(id.clone());
        upsert(&mut inner.collections, stored, &id, |c| c.id.as_deref());
        inner.calls.push(Call::SaveCollection {
            name: collection.name.clone(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn save_folder(&self, folder: &FolderRecord) -> Result<Id, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        let fresh = Self::begin_save(&mut inner, "folder", &folder.name)?;
        let id = folder.id.clone().unwrap_or(fresh);
        let mut stored = folder.clone();
        stored.id = Some(id.clone());
        upsert(&mut inner.folders, stored, &id, |f| f.id.as_deref());
        inner.calls.push(Call::SaveFolder {
            name: folder.name.clone(),
            parent_id: folder.parent_id.clone(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn save_request(&self, request: &RequestRecord) -> Result<Id, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        let fresh = Self::begin_save(&mut inner, "request", &request.name)?;
        let id = request.id.clone().unwrap_or(fresh);
        let mut stored = request.clone();
        stored.id = Some(id.clone());
        upsert(&mut inner.requests, stored, &id, |r| r.id.as_deref());
        inner.calls.push(Call::SaveRequest {
            name: request.name.clone(),
            folder_id: request.folder_id.clone(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn save_environment(&self, environment: &EnvironmentRecord) -> Result<Id, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        let fresh = Self::begin_save(&mut inner, "environment", &environment.name)?;
        let id = environment.id.clone().unwrap_or(fresh);
        let taken = inner.environments.iter().any(|e| {
            e.name == environment.name
                && e.collection_id == environment.collection_id
                && e.id.as_deref() != Some(id.as_str())
        });
        if inner.strict && taken {
            return Err(StoreError::Rejected(format!(
                "environment '{}' already exists in this scope",
                environment.name
            )));
        }
        let mut stored = environment.clone();
        stored.id = Some(id.clone());
        upsert(&mut inner.environments, stored, &id, |e| e.id.as_deref());
        inner.calls.push(Call::SaveEnvironment {
            name: environment.name.clone(),
            collection_id: environment.collection_id.clone(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn list_collections(&self) -> Result<Vec<CollectionRecord>, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        inner.calls.push(Call::List("collections"));
        Ok(inner.collections.clone())
    }

    async fn list_folders(&self, collection_id: &str) -> Result<Vec<FolderRecord>, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        inner.calls.push(Call::List("folders"));
        Ok(inner
            .folders
            .iter()
            .filter(|f| f.collection_id == collection_id)
            .cloned()
            .collect())
    }

    async fn list_requests(&self, collection_id: &str) -> Result<Vec<RequestRecord>, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        inner.calls.push(Call::List("requests"));
        Ok(inner
            .requests
            .iter()
            .filter(|r| r.collection_id == collection_id)
            .cloned()
            .collect())
    }

    async fn list_environments(&self) -> Result<Vec<EnvironmentRecord>, StoreError> {
        let mut inner = self.inner.lock().expect("Lock poisoned");
        inner.calls.push(Call::List("environments"));
        Ok(inner.environments.clone())
    }
}

/// Reader returning a fixed outcome regardless of content.
pub struct FixedReader {
    pub detection: DetectionResult,
    pub outcome: ParseOutcome,
}

impl FixedReader {
    pub fn parsed(format: ImportFormat, ir: ImportIr) -> Self {
        Self {
            detection: DetectionResult::recognized(format, None, 1.0, 0.5),
            outcome: ParseOutcome::parsed(ir, Vec::new()),
        }
    }
}

impl DocumentReader for FixedReader {
    fn detect(&self, _: &RawDocument) -> DetectionResult {
        self.detection.clone()
    }

    fn parse(&self, _: &RawDocument, _: ImportFormat) -> ParseOutcome {
        self.outcome.clone()
    }
}
