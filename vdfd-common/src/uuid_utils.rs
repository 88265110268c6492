//! Record identifier utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new record identifier string
///
/// Identifiers are created on the device at tagging time, before any
/// remote store has seen the record.
pub fn new_record_id() -> String {
    generate().to_string()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_ids_are_unique_and_parse() {
        let a = new_record_id();
        let b = new_record_id();
        assert_ne!(a, b);
        assert!(parse(&a).is_ok());
    }
}
