//! Timestamp helpers shared by signing and parsing code.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, ParseError, Result};

/// Current Unix time in milliseconds.
///
/// Every private request carries one of these as its anti-replay nonce;
/// successive calls are non-decreasing on any sane clock.
pub fn milliseconds() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current Unix time in whole seconds.
pub fn seconds() -> i64 {
    Utc::now().timestamp()
}

/// Formats a millisecond timestamp as an ISO 8601 string with
/// millisecond resolution (`2024-01-01T12:00:00.000Z`).
///
/// Out-of-range timestamps yield `None` rather than a panic.
pub fn iso8601(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Parses an ISO 8601 / RFC 3339 datetime into a millisecond timestamp.
pub fn parse_iso8601(datetime: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(datetime)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| Error::from(ParseError::timestamp(format!("{datetime}: {e}"))))
}

/// Formats a millisecond timestamp as `YYMMDD`, the expiry-date segment
/// of unified derivative symbols.
pub fn yymmdd(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.format("%y%m%d").to_string())
}

/// Parses a `YYMMDD` expiry-date segment back into a millisecond
/// timestamp at midnight UTC.
pub fn parse_yymmdd(s: &str) -> Option<i64> {
    NaiveDate::parse_from_str(s, "%y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_round_trip() {
        let ts = 1721685896846;
        let formatted = iso8601(ts).unwrap();
        assert_eq!(formatted, "2024-07-22T22:04:56.846Z");
        assert_eq!(parse_iso8601(&formatted).unwrap(), ts);
    }

    #[test]
    fn test_parse_iso8601_rejects_garbage() {
        assert!(parse_iso8601("not-a-date").is_err());
    }

    #[test]
    fn test_yymmdd_round_trip() {
        let ts = parse_yymmdd("241227").unwrap();
        assert_eq!(yymmdd(ts).unwrap(), "241227");
    }

    #[test]
    fn test_milliseconds_monotone_enough() {
        let a = milliseconds();
        let b = milliseconds();
        assert!(b >= a);
    }
}
