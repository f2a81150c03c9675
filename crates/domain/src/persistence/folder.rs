//! Folder record.

use serde::{Deserialize, Serialize};

use super::common::Id;

/// A folder as exchanged with the store.
///
/// Folders organize requests hierarchically within a collection. A folder
/// with no `parent_id` sits at the collection root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    /// Owning collection.
    pub collection_id: Id,

    /// Human-readable description of the folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Persisted identifier; `None` when submitting a new folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    /// Human-readable folder name.
    pub name: String,

    /// Position among siblings.
    #[serde(default)]
    pub order: u32,

    /// Persisted id of the parent folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
}

impl FolderRecord {
    /// Creates a new root-level folder.
    #[must_use]
    pub fn new(collection_id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            description: None,
            id: None,
            name: name.into(),
            order: 0,
            parent_id: None,
        }
    }

    /// Places the folder under a parent folder.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<Id>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the sibling position.
    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}
