//! Postman Collection v2.x Type Definitions
//!
//! These types are read item by item during import and written whole during
//! export. Optional fields default liberally to absorb format variations.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::import::parser::{lenient_opt_string, lenient_string, value_to_string};

/// Schema URL written into exported collections.
pub const SCHEMA_V2_1: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Root structure for Postman Collection v2.x
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: PostmanInfo,
    #[serde(default)]
    pub item: Vec<PostmanItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<PostmanVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PostmanAuth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<PostmanEvent>,
}

/// Collection metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<PostmanDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// Descriptions are either plain strings or `{content, type}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanDescription {
    Text(String),
    Rich {
        #[serde(default)]
        content: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },
}

impl PostmanDescription {
    /// The description text, `None` when blank.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let text = match self {
            Self::Text(text) | Self::Rich { content: text, .. } => text,
        };
        (!text.trim().is_empty()).then(|| text.clone())
    }
}

/// An item can be either a folder (containing more items) or a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<PostmanDescription>,
    /// If present, this item is a folder containing sub-items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Self>>,
    /// If present, this item is a request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<PostmanRequest>,
    /// Events (scripts) attached to this item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<PostmanEvent>,
    /// Item-level auth override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PostmanAuth>,
}

/// Postman Request definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanRequest {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub url: PostmanUrl,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<PostmanHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PostmanBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PostmanAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<PostmanDescription>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// URL can be either a simple string or a structured object
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum PostmanUrl {
    #[default]
    Empty,
    Simple(String),
    Structured(PostmanUrlStructured),
}

impl PostmanUrl {
    /// Get the raw URL string
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Simple(s) => s.clone(),
            Self::Structured(s) => s.raw.clone().unwrap_or_default(),
        }
    }

    /// Get query parameters if available
    #[must_use]
    pub fn query_params(&self) -> &[PostmanQueryParam] {
        match self {
            Self::Structured(s) => &s.query,
            _ => &[],
        }
    }
}

/// Structured URL object
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostmanUrlStructured {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<PostmanQueryParam>,
}

/// Query parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanQueryParam {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// Request header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanHeader {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanBody {
    #[serde(default)]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urlencoded: Vec<PostmanFormParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formdata: Vec<PostmanFormParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PostmanBodyFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphql: Option<PostmanGraphQL>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PostmanBodyOptions>,
}

/// Urlencoded or form-data parameter; form-data may reference a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanFormParam {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl PostmanFormParam {
    /// Returns true if this parameter references a file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.param_type.as_deref() == Some("file")
    }
}

/// Binary file body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanBodyFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// GraphQL body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanGraphQL {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<String>,
}

/// Body options (e.g., raw language)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanBodyOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<PostmanRawOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanRawOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanAuth {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(default, deserialize_with = "auth_params", skip_serializing_if = "Vec::is_empty")]
    pub basic: Vec<PostmanAuthParam>,
    #[serde(default, deserialize_with = "auth_params", skip_serializing_if = "Vec::is_empty")]
    pub bearer: Vec<PostmanAuthParam>,
    #[serde(default, deserialize_with = "auth_params", skip_serializing_if = "Vec::is_empty")]
    pub apikey: Vec<PostmanAuthParam>,
    #[serde(default, deserialize_with = "auth_params", skip_serializing_if = "Vec::is_empty")]
    pub oauth2: Vec<PostmanAuthParam>,
}

/// v2.1 writes auth parameters as `[{key, value}]`, v2.0 as a plain object.
fn auth_params<'de, D>(deserializer: D) -> Result<Vec<PostmanAuthParam>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Params {
        List(Vec<PostmanAuthParam>),
        Map(serde_json::Map<String, serde_json::Value>),
    }

    Ok(match Option::<Params>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Params::List(params)) => params,
        Some(Params::Map(map)) => map
            .into_iter()
            .map(|(key, value)| PostmanAuthParam {
                key,
                value: Some(value_to_string(&value)),
                param_type: None,
            })
            .collect(),
    })
}

impl PostmanAuth {
    /// An auth block of `auth_type` with no parameters.
    #[must_use]
    pub fn of_type(auth_type: impl Into<String>) -> Self {
        Self {
            auth_type: auth_type.into(),
            basic: Vec::new(),
            bearer: Vec::new(),
            apikey: Vec::new(),
            oauth2: Vec::new(),
        }
    }

    /// Get a parameter value by key
    #[must_use]
    pub fn get_param(params: &[PostmanAuthParam], key: &str) -> Option<String> {
        params
            .iter()
            .find(|p| p.key == key)
            .and_then(|p| p.value.clone())
    }
}

/// Auth parameter (key-value pair)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanAuthParam {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

impl PostmanAuthParam {
    /// A string-typed parameter.
    #[must_use]
    pub fn string(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value.into()),
            param_type: Some("string".to_string()),
        }
    }
}

/// Variable definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanVariable {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub value: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// Event (pre-request or test script). Only its presence matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanEvent {
    #[serde(default)]
    pub listen: String,
}
