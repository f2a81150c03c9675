//! Environment record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::Id;

/// An environment as exchanged with the store.
///
/// `name` is the stable key that name-uniqueness is enforced on;
/// `display_name` is free text shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    /// Collection owning this environment; `None` for global environments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<Id>,

    /// Name shown to the operator.
    pub display_name: String,

    /// Persisted identifier; `None` when submitting a new environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    /// Stable unique name within the scope.
    pub name: String,

    /// Variables as key/value pairs.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl EnvironmentRecord {
    /// Creates a new global environment whose display name equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            collection_id: None,
            display_name: name.clone(),
            id: None,
            name,
            variables: BTreeMap::new(),
        }
    }

    /// Adds a variable.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Returns true when the environment is not bound to a collection.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.collection_id.is_none()
    }
}
