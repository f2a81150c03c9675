//! Collection record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::Id;

/// A collection as exchanged with the store.
///
/// Fields are ordered alphabetically for deterministic serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// Human-readable description of the collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Persisted identifier; `None` when submitting a new collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    /// Human-readable collection name.
    pub name: String,

    /// Collection-scoped variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl CollectionRecord {
    /// Creates a new, not yet persisted collection.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            description: None,
            id: None,
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Sets the collection description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Adds a variable to the collection.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}
