//! ID generation utilities.

use uuid::Uuid;

/// Generates a new time-ordered UUID (v7) as a string.
///
/// Used by store adapters to issue persisted identifiers.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_generate_id_uniqueness() {
        assert_ne!(generate_id(), generate_id());
    }
}
