//! Request body types for various content formats.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::common::KeyValue;

/// Request body with multiple format support.
///
/// The `type` field is used as the discriminator for JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    /// JSON body with structured content.
    Json {
        /// The JSON content (can be object, array, or primitive).
        content: JsonValue,
    },

    /// Plain text body.
    Text {
        /// The text content. May contain `{{variables}}`.
        content: String,
    },

    /// URL-encoded form data (application/x-www-form-urlencoded).
    FormUrlencoded {
        /// Form fields in source order.
        fields: Vec<KeyValue>,
    },

    /// Multipart form data (multipart/form-data).
    FormData {
        /// Form fields (text values or file references).
        fields: Vec<FormDataField>,
    },

    /// Binary file body. The file content itself is never imported.
    Binary {
        /// Original file reference, if the source carried one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },

    /// GraphQL query body.
    Graphql {
        /// The GraphQL query string.
        query: String,
        /// GraphQL variables as raw JSON text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variables: Option<String>,
    },
}

impl RequestBody {
    /// Creates a JSON body from a `serde_json::Value`.
    #[must_use]
    pub const fn json(content: JsonValue) -> Self {
        Self::Json { content }
    }

    /// Creates a text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Renders the body as raw text, the way it would be sent.
    ///
    /// Form and binary bodies have no single raw representation and return `None`.
    #[must_use]
    pub fn raw_text(&self) -> Option<String> {
        match self {
            Self::Json { content } => serde_json::to_string_pretty(content).ok(),
            Self::Text { content } => Some(content.clone()),
            Self::Graphql { query, .. } => Some(query.clone()),
            Self::FormUrlencoded { .. } | Self::FormData { .. } | Self::Binary { .. } => None,
        }
    }
}

/// A field in a multipart form-data body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormDataField {
    /// Text field.
    Text {
        /// Field name.
        key: String,
        /// Field value.
        value: String,
        /// Whether the field is sent.
        #[serde(default = "default_true")]
        enabled: bool,
    },

    /// File reference. Only the reference is kept, never the content.
    File {
        /// Field name.
        key: String,
        /// Source path as recorded by the exporting tool.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        /// Whether the field is sent.
        #[serde(default = "default_true")]
        enabled: bool,
    },
}

impl FormDataField {
    /// Field name.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Text { key, .. } | Self::File { key, .. } => key,
        }
    }

    /// Whether the field is sent.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        match self {
            Self::Text { enabled, .. } | Self::File { enabled, .. } => *enabled,
        }
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_tagged() {
        let body = RequestBody::json(serde_json::json!({"name": "test"}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "json");
        assert_eq!(json["content"]["name"], "test");
    }

    #[test]
    fn test_raw_text() {
        assert_eq!(RequestBody::text("hi").raw_text(), Some("hi".to_string()));
        assert_eq!(RequestBody::Binary { filename: None }.raw_text(), None);
    }

    #[test]
    fn test_form_data_field_accessors() {
        let field: FormDataField =
            serde_json::from_str(r#"{"type": "file", "key": "upload"}"#).unwrap();
        assert_eq!(field.key(), "upload");
        assert!(field.enabled());
    }
}
