//! JSON serialization helpers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),
    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to two-space indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Serializes pretty via [`to_json_stable`], or on a single line.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, SerializationError> {
    if pretty {
        to_json_stable(value)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// Deserializes JSON from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stable_output_is_indented_with_trailing_newline() {
        let mut map = BTreeMap::new();
        map.insert("key", "value");
        let json = to_json_stable(&map).expect("serialization should work");
        assert!(json.contains("  \"key\""));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_btreemap_keys_are_sorted() {
        let map: BTreeMap<_, _> = [("zebra", 1), ("apple", 2), ("mango", 3)].into();
        let json = to_json_stable(&map).unwrap();
        let apple = json.find("apple").unwrap();
        let mango = json.find("mango").unwrap();
        let zebra = json.find("zebra").unwrap();
        assert!(apple < mango && mango < zebra);
    }

    #[test]
    fn test_compact_output_is_one_line() {
        let map: BTreeMap<_, _> = [("a", 1), ("b", 2)].into();
        assert_eq!(to_json(&map, false).unwrap(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_from_json_reports_deserialize_errors() {
        let result: Result<BTreeMap<String, String>, _> = from_json(r#"{"invalid": }"#);
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
