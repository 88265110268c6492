//! Timestamp utilities
//!
//! Records carry Unix timestamps in milliseconds so that JSON round-trips
//! are exact.

use chrono::{DateTime, TimeZone, Utc};

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix milliseconds to a UTC timestamp
///
/// Returns `None` for values chrono cannot represent.
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Format Unix milliseconds as a calendar date (`YYYY-MM-DD`)
pub fn format_date(millis: i64) -> String {
    from_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_recent() {
        let millis = now_millis();
        // After 2000-01-01 and before 2100-01-01
        assert!(millis > 946_684_800_000);
        assert!(millis < 4_102_444_800_000);
    }

    #[test]
    fn test_from_millis_roundtrip() {
        let dt = from_millis(1_700_000_000_123).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_format_date() {
        // 2023-11-14T22:13:20Z
        assert_eq!(format_date(1_700_000_000_000), "2023-11-14");
    }
}
