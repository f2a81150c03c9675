//! Authentication configuration carried by requests.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
///
/// The `type` field is used as the discriminator for JSON serialization.
/// All string values may contain `{{variables}}` for dynamic resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,

    /// Bearer token authentication.
    Bearer {
        /// The bearer token value.
        token: String,
    },

    /// HTTP Basic authentication.
    Basic {
        /// Username for basic auth.
        username: String,
        /// Password for basic auth.
        password: String,
    },

    /// API Key authentication.
    ApiKey {
        /// Header or query parameter name.
        key: String,
        /// The API key value.
        value: String,
        /// Where to send the key.
        location: ApiKeyLocation,
    },

    /// `OAuth2`, carried partially (token and token endpoint only).
    Oauth2 {
        /// Previously issued access token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token: Option<String>,
        /// Token endpoint URL.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
    },
}

impl AuthConfig {
    /// Creates a bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a basic authentication.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns true when no authentication is configured.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short type label, matching the serialized discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer { .. } => "bearer",
            Self::Basic { .. } => "basic",
            Self::ApiKey { .. } => "api_key",
            Self::Oauth2 { .. } => "oauth2",
        }
    }
}

/// Location for API key authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    /// Send API key in HTTP header.
    #[default]
    Header,
    /// Send API key in query parameters.
    Query,
}
