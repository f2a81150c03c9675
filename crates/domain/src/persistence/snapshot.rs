//! Point-in-time view of live store state used by exporters.

use super::collection::CollectionRecord;
use super::environment::EnvironmentRecord;
use super::folder::FolderRecord;
use super::request::RequestRecord;

/// Everything an exporter needs for one scope.
///
/// A collection scope carries the collection, its folders, requests and
/// collection-bound environments; an environment scope carries only
/// environments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSnapshot {
    /// The exported collection, if the scope is a collection.
    pub collection: Option<CollectionRecord>,
    /// Folders of the collection, in any order.
    pub folders: Vec<FolderRecord>,
    /// Requests of the collection, in any order.
    pub requests: Vec<RequestRecord>,
    /// Environments in scope.
    pub environments: Vec<EnvironmentRecord>,
}

impl WorkspaceSnapshot {
    /// Children folders of `parent` (root when `None`), sorted by `order` then by position.
    #[must_use]
    pub fn child_folders(&self, parent: Option<&str>) -> Vec<&FolderRecord> {
        let mut children: Vec<(usize, &FolderRecord)> = self
            .folders
            .iter()
            .enumerate()
            .filter(|(_, f)| f.parent_id.as_deref() == parent)
            .collect();
        children.sort_by_key(|(index, f)| (f.order, *index));
        children.into_iter().map(|(_, f)| f).collect()
    }

    /// Requests directly under `folder` (root when `None`), sorted by `order` then by position.
    #[must_use]
    pub fn child_requests(&self, folder: Option<&str>) -> Vec<&RequestRecord> {
        let mut children: Vec<(usize, &RequestRecord)> = self
            .requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.folder_id.as_deref() == folder)
            .collect();
        children.sort_by_key(|(index, r)| (r.order, *index));
        children.into_iter().map(|(_, r)| r).collect()
    }
}
