//! Postman Environment Type Definitions
//!
//! This module defines the types that represent a Postman Environment JSON file.

use serde::{Deserialize, Serialize};

use crate::import::parser::lenient_string;

/// Environment header fields. `values` entries are decoded one at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanEnvironment {
    /// Environment ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Environment name
    #[serde(default)]
    pub name: Option<String>,
    /// Environment variables
    #[serde(default)]
    pub values: Vec<PostmanEnvVariable>,
    /// Scope marker written by Postman ("environment" or "globals")
    #[serde(rename = "_postman_variable_scope", default, skip_serializing_if = "Option::is_none")]
    pub postman_variable_scope: Option<String>,
    /// Export timestamp written by Postman
    #[serde(rename = "_postman_exported_at", default, skip_serializing_if = "Option::is_none")]
    pub postman_exported_at: Option<String>,
}

/// Postman environment variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanEnvVariable {
    /// Variable key/name
    pub key: String,
    /// Variable value
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    /// Whether the variable is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Variable type (default, secret, any)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
}

impl PostmanEnvVariable {
    /// An enabled variable of the default type.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
            var_type: Some("default".to_string()),
        }
    }
}

const fn default_true() -> bool {
    true
}
