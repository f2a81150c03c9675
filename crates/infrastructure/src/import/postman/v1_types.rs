//! Legacy Postman Collection v1 Type Definitions
//!
//! v1 documents keep folders and requests in flat arrays cross-referenced by
//! id: `order` lists request ids, `folders_order` lists sub-folder ids.

#![allow(missing_docs)]

use serde::Deserialize;

use super::types::{PostmanAuth, PostmanEvent, PostmanGraphQL};
use crate::import::parser::{lenient_opt_string, lenient_string};

/// A v1 folder.
#[derive(Debug, Clone, Deserialize)]
pub struct PostmanV1Folder {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Request ids in display order.
    #[serde(default)]
    pub order: Vec<String>,
    /// Sub-folder ids in display order.
    #[serde(default)]
    pub folders_order: Vec<String>,
    /// Parent folder id, written by later v1 exporters.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub auth: Option<PostmanAuth>,
    #[serde(default)]
    pub events: Vec<PostmanEvent>,
}

/// A v1 request.
#[derive(Debug, Clone, Deserialize)]
pub struct PostmanV1Request {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub url: String,
    /// Headers as `Key: Value` lines; `//` prefixes a disabled header.
    #[serde(default)]
    pub headers: String,
    /// Structured headers, preferred over `headers` when present.
    #[serde(rename = "headerData", default)]
    pub header_data: Option<Vec<PostmanV1Pair>>,
    #[serde(rename = "queryParams", default)]
    pub query_params: Vec<PostmanV1Pair>,
    #[serde(rename = "dataMode", default)]
    pub data_mode: Option<String>,
    /// Body fields for the `params` and `urlencoded` modes.
    #[serde(default)]
    pub data: Option<Vec<PostmanV1Pair>>,
    #[serde(rename = "rawModeData", default)]
    pub raw_mode_data: Option<String>,
    #[serde(rename = "graphqlModeData", default)]
    pub graphql_mode_data: Option<PostmanGraphQL>,
    /// Containing folder id.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub auth: Option<PostmanAuth>,
    #[serde(default)]
    pub events: Vec<PostmanEvent>,
    #[serde(rename = "preRequestScript", default)]
    pub pre_request_script: Option<String>,
    #[serde(default)]
    pub tests: Option<String>,
}

impl PostmanV1Request {
    /// Returns true if any script form is attached.
    #[must_use]
    pub fn has_scripts(&self) -> bool {
        let non_blank = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        !self.events.is_empty() || non_blank(&self.pre_request_script) || non_blank(&self.tests)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// Key/value entry as v1 writes them (`enabled` instead of `disabled`).
#[derive(Debug, Clone, Deserialize)]
pub struct PostmanV1Pair {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub pair_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub src: Option<String>,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let request: PostmanV1Request = serde_json::from_str(
            r#"{
                "id": "r1",
                "name": "Get",
                "url": "https://api.test",
                "headers": "Accept: */*\n",
                "dataMode": "raw",
                "rawModeData": "hello",
                "tests": "pm.test()"
            }"#,
        )
        .unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.data_mode.as_deref(), Some("raw"));
        assert!(request.has_scripts());
    }

    #[test]
    fn test_pair_defaults_enabled() {
        let pair: PostmanV1Pair = serde_json::from_str(r#"{"key": "a", "value": 1}"#).unwrap();
        assert!(pair.enabled);
        assert_eq!(pair.value, "1");
    }
}
