//! Portage's own export document.
//!
//! Folders and requests are stored flat with parent pointers, the same shape
//! the store uses, so an export can be re-imported without loss of names,
//! methods, URLs or ordering.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use portage_domain::{AuthConfig, KeyValue, RequestBody};

/// Discriminator written to every native export.
pub const NATIVE_TYPE: &str = "portage-collection-export";

/// Current native document version.
pub const NATIVE_VERSION: &str = "1.0";

/// Top-level native export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<NativeCollection>,
    #[serde(default)]
    pub folders: Vec<NativeFolder>,
    #[serde(default)]
    pub requests: Vec<NativeRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<NativeEnvironment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCollection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFolder {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeRequest {
    pub id: String,
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    #[serde(default, skip_serializing_if = "AuthConfig::is_none")]
    pub auth: AuthConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeEnvironment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_field_names() {
        let request = NativeRequest {
            id: "r".to_string(),
            name: "Get".to_string(),
            method: "GET".to_string(),
            url: "/".to_string(),
            headers: Vec::new(),
            query_params: vec![KeyValue::new("q", "1")],
            body: None,
            auth: AuthConfig::None,
            folder_id: Some("f".to_string()),
            order: 3,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["folderId"], json!("f"));
        assert_eq!(value["queryParams"][0]["key"], json!("q"));
        assert!(value.get("auth").is_none());
    }

    #[test]
    fn test_document_defaults() {
        let doc: NativeDocument = serde_json::from_value(json!({
            "type": NATIVE_TYPE,
            "version": NATIVE_VERSION
        }))
        .unwrap();
        assert!(doc.collection.is_none());
        assert!(doc.requests.is_empty());
    }
}
