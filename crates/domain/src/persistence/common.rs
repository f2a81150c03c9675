//! Common types shared across store records and the import model.

use serde::{Deserialize, Serialize};

/// A store-issued identifier.
/// Kept as a plain string so every store backend can choose its own format.
pub type Id = String;

/// An ordered key/value pair with an enabled flag (headers, query params, form fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Entry name.
    pub key: String,
    /// Entry value. May contain `{{variables}}`.
    #[serde(default)]
    pub value: String,
    /// Disabled entries are kept for round-tripping but excluded from the active set.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl KeyValue {
    /// Creates an enabled entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a disabled entry.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Keeps only enabled entries unless `include_disabled` is set.
#[must_use]
pub fn active_entries(entries: &[KeyValue], include_disabled: bool) -> Vec<KeyValue> {
    entries
        .iter()
        .filter(|kv| include_disabled || kv.enabled)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_defaults_to_enabled() {
        let kv: KeyValue = serde_json::from_str(r#"{"key": "Accept"}"#).unwrap();
        assert_eq!(kv.key, "Accept");
        assert!(kv.enabled);
        assert_eq!(kv.value, "");
    }

    #[test]
    fn test_active_entries_filters_disabled() {
        let entries = vec![KeyValue::new("a", "1"), KeyValue::disabled("b", "2")];
        assert_eq!(active_entries(&entries, false).len(), 1);
        assert_eq!(active_entries(&entries, true).len(), 2);
    }
}
