//! Request record.

use serde::{Deserialize, Serialize};

use super::auth::AuthConfig;
use super::body::RequestBody;
use super::common::{Id, KeyValue};

/// A saved HTTP request as exchanged with the store.
///
/// Variables use `{{variable_name}}` syntax and are resolved at execution time.
/// Fields are ordered alphabetically for deterministic serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Request authentication.
    #[serde(default, skip_serializing_if = "AuthConfig::is_none")]
    pub auth: AuthConfig,

    /// Request body (JSON, form data, raw text, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,

    /// Owning collection.
    pub collection_id: Id,

    /// Persisted id of the containing folder; `None` for root requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Id>,

    /// HTTP headers in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<KeyValue>,

    /// Persisted identifier; `None` when submitting a new request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    /// HTTP method, upper-cased.
    pub method: String,

    /// Human-readable request name.
    pub name: String,

    /// Position among siblings.
    #[serde(default)]
    pub order: u32,

    /// URL query parameters in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_params: Vec<KeyValue>,

    /// Request URL. May contain `{{variables}}`.
    pub url: String,
}

impl RequestRecord {
    /// Creates a new root-level request with required fields.
    #[must_use]
    pub fn new(
        collection_id: impl Into<Id>,
        name: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            auth: AuthConfig::None,
            body: None,
            collection_id: collection_id.into(),
            folder_id: None,
            headers: Vec::new(),
            id: None,
            method: method.into().to_uppercase(),
            name: name.into(),
            order: 0,
            query_params: Vec::new(),
            url: url.into(),
        }
    }

    /// Places the request inside a folder.
    #[must_use]
    pub fn in_folder(mut self, folder_id: impl Into<Id>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    /// Adds a header to the request.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }

    /// Sets the sibling position.
    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_new_uppercases_method() {
        let request = RequestRecord::new("col", "Get Users", "get", "https://api.test/users");
        assert_eq!(request.method, "GET");
        assert!(request.folder_id.is_none());
        assert!(request.auth.is_none());
    }

    #[test]
    fn test_request_builders() {
        let request = RequestRecord::new("col", "Create", "POST", "https://api.test")
            .in_folder("f-1")
            .with_header("Content-Type", "application/json")
            .with_order(2);

        assert_eq!(request.folder_id.as_deref(), Some("f-1"));
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.order, 2);
    }
}
