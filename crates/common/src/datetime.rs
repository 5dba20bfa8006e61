//! DateTime utilities.
//!
//! This module provides helper functions for parsing and displaying
//! submission timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive formats accepted after RFC 3339 and RFC 2822, interpreted as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a datetime string into a UTC DateTime.
///
/// Supports multiple common formats:
/// - ISO 8601 (RFC 3339): "2023-12-01T12:30:45Z"
/// - RFC 2822: "Fri, 01 Dec 2023 12:30:45 +0000"
/// - Naive datetime, assumed UTC: "2023-12-01 12:30:45"
/// - Plain date, midnight UTC: "2023-12-01"
///
/// # Examples
///
/// ```
/// use ramp_leaderboard_common::datetime::parse_datetime;
///
/// let dt = parse_datetime("2023-12-01T12:30:45Z").expect("Failed to parse");
/// assert_eq!(dt.to_rfc3339(), "2023-12-01T12:30:45+00:00");
/// ```
pub fn parse_datetime(datetime_str: &str) -> Result<DateTime<Utc>, String> {
    let input = datetime_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        .ok_or_else(|| format!("Failed to parse datetime '{}'", datetime_str))
}

/// Format a DateTime as an ISO 8601 / RFC 3339 string.
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339()
}

/// Format a DateTime for display (human-readable).
///
/// # Examples
///
/// ```
/// use ramp_leaderboard_common::datetime::{parse_datetime, format_datetime_display};
///
/// let dt = parse_datetime("2023-12-01 12:30:45").unwrap();
/// assert_eq!(format_datetime_display(&dt), "2023-12-01 12:30");
/// ```
pub fn format_datetime_display(datetime: &DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_datetime_rfc3339() {
        let dt = parse_datetime("2023-12-01T12:30:45Z").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_datetime_with_offset() {
        let dt = parse_datetime("2023-12-01T12:30:45-05:00").unwrap();
        assert_eq!(dt.hour(), 17);
    }

    #[test]
    fn test_parse_datetime_rfc2822() {
        let dt = parse_datetime("Fri, 01 Dec 2023 12:30:45 +0000").unwrap();
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_parse_datetime_naive() {
        let dt = parse_datetime("2023-12-01 12:30:45").unwrap();
        assert_eq!(dt.minute(), 30);

        let fractional = parse_datetime("2017-08-10 13:12:34.556").unwrap();
        assert_eq!(fractional.second(), 34);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_datetime("2023-12-01").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.month(), 12);
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("last tuesday").is_err());
    }

    #[test]
    fn test_format_datetime() {
        let dt = parse_datetime("2023-12-01T12:30:45Z").unwrap();
        assert!(format_datetime(&dt).starts_with("2023-12-01T12:30:45"));
    }
}
