//! Timestamp normalization.
//!
//! Chat records carry creation times in whatever shape the upstream API felt
//! like that day: epoch seconds, epoch milliseconds, ISO-8601 with or without
//! a zone, `YYYY-MM-DD HH:MM:SS`, or a bare date. [`normalize_timestamp`]
//! turns all of them into one canonical UTC string.
//!
//! The function is total: every failure path degrades to the current UTC time
//! (ingestion-time fallback), so callers never handle an error.
//!
//! # Example
//!
//! ```
//! use chatsift::parsing::timestamp::normalize_timestamp;
//! use serde_json::json;
//!
//! assert_eq!(
//!     normalize_timestamp(&json!(1700000000000_i64)),
//!     "2023-11-14T22:13:20+00:00"
//! );
//! assert_eq!(
//!     normalize_timestamp(&json!("2023-11-14 22:13:20Z")),
//!     "2023-11-14T22:13:20+00:00"
//! );
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Epoch values whose magnitude exceeds this are treated as milliseconds.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// A timestamp as it arrived, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTimestamp<'a> {
    /// Null, absent, or a JSON type that cannot hold a time.
    Missing,
    /// An already-structured date-time.
    DateTime(DateTime<FixedOffset>),
    /// An integral epoch value (seconds or milliseconds).
    Integer(i64),
    /// A fractional epoch value (seconds or milliseconds).
    Float(f64),
    /// Free-form text.
    Text(&'a str),
}

impl<'a> From<&'a Value> for RawTimestamp<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawTimestamp::Integer(i),
                None => n
                    .as_f64()
                    .map(RawTimestamp::Float)
                    .unwrap_or(RawTimestamp::Missing),
            },
            Value::String(s) => RawTimestamp::Text(s),
            _ => RawTimestamp::Missing,
        }
    }
}

impl<'a> From<Option<&'a Value>> for RawTimestamp<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        value.map(RawTimestamp::from).unwrap_or(RawTimestamp::Missing)
    }
}

impl<'a> From<&'a str> for RawTimestamp<'a> {
    fn from(value: &'a str) -> Self {
        RawTimestamp::Text(value)
    }
}

impl From<DateTime<Utc>> for RawTimestamp<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        RawTimestamp::DateTime(value.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for RawTimestamp<'_> {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RawTimestamp::DateTime(value)
    }
}

impl From<i64> for RawTimestamp<'_> {
    fn from(value: i64) -> Self {
        RawTimestamp::Integer(value)
    }
}

impl From<f64> for RawTimestamp<'_> {
    fn from(value: f64) -> Self {
        RawTimestamp::Float(value)
    }
}

/// Normalizes any supported timestamp representation to a UTC RFC 3339 string.
///
/// Falls back to the current time when the input is empty or unparsable.
pub fn normalize_timestamp<'a>(raw: impl Into<RawTimestamp<'a>>) -> String {
    normalize_timestamp_at(raw, Utc::now())
}

/// Same as [`normalize_timestamp`], with an explicit fallback instant.
pub fn normalize_timestamp_at<'a>(raw: impl Into<RawTimestamp<'a>>, now: DateTime<Utc>) -> String {
    format_utc(parse_timestamp(raw).unwrap_or(now))
}

/// Formats an instant in the canonical form (`+00:00`, fraction only when non-zero).
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parses a raw timestamp, returning `None` instead of falling back.
///
/// Resolution order, first success wins:
/// 1. structured date-time
/// 2. numeric epoch (milliseconds above [`EPOCH_MILLIS_THRESHOLD`])
/// 3. text ending in `Z`, with the marker rewritten to `+00:00`
/// 4. text as ISO-8601 (offset, naive, or bare date)
/// 5. text as a numeric epoch
/// 6. text with a space date/time separator rewritten to `T`
pub fn parse_timestamp<'a>(raw: impl Into<RawTimestamp<'a>>) -> Option<DateTime<Utc>> {
    match raw.into() {
        RawTimestamp::Missing => None,
        RawTimestamp::DateTime(dt) => Some(dt.with_timezone(&Utc)),
        RawTimestamp::Integer(i) => from_epoch_int(i),
        RawTimestamp::Float(f) => from_epoch_float(f),
        RawTimestamp::Text(s) => parse_text(s),
    }
}

fn parse_text(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(stripped) = s.strip_suffix('Z') {
        if let Some(dt) = parse_iso(&format!("{stripped}+00:00")) {
            return Some(dt);
        }
    }

    if let Some(dt) = parse_iso(s) {
        return Some(dt);
    }

    if let Ok(i) = s.parse::<i64>() {
        return from_epoch_int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if let Some(dt) = from_epoch_float(f) {
            return Some(dt);
        }
    }

    if s.contains(' ') {
        let mut t = s.replace(' ', "T");
        if t.ends_with('Z') {
            t.pop();
            t.push_str("+00:00");
        }
        return parse_iso(&t);
    }

    None
}

/// Parses ISO-8601 text. Naive date-times and bare dates are taken as UTC.
fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn from_epoch_int(value: i64) -> Option<DateTime<Utc>> {
    if value.unsigned_abs() as f64 > EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn from_epoch_float(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let secs = if value.abs() > EPOCH_MILLIS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };
    // Microsecond precision; anything finer is float noise.
    let total_micros = (secs * 1e6).round();
    if total_micros.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(total_micros as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn norm(value: &Value) -> String {
        normalize_timestamp_at(value, fixed_now())
    }

    #[test]
    fn test_epoch_millis_integer() {
        assert_eq!(norm(&json!(1700000000000_i64)), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_epoch_seconds_and_millis_agree() {
        assert_eq!(norm(&json!(1700000000)), norm(&json!(1700000000000_i64)));
    }

    #[test]
    fn test_epoch_float_keeps_fraction() {
        assert_eq!(norm(&json!(1700000000.5)), "2023-11-14T22:13:20.500+00:00");
    }

    #[test]
    fn test_iso_with_z() {
        assert_eq!(norm(&json!("2024-01-15T10:30:00Z")), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_iso_with_offset_converted_to_utc() {
        assert_eq!(
            norm(&json!("2024-01-15T12:30:00+02:00")),
            "2024-01-15T10:30:00+00:00"
        );
    }

    #[test]
    fn test_iso_with_fraction() {
        assert_eq!(
            norm(&json!("2024-01-15T10:30:00.250Z")),
            "2024-01-15T10:30:00.250+00:00"
        );
    }

    #[test]
    fn test_naive_iso_is_utc() {
        assert_eq!(norm(&json!("2024-01-15T10:30:00")), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_space_separated() {
        assert_eq!(norm(&json!("2024-01-15 10:30:00")), "2024-01-15T10:30:00+00:00");
        assert_eq!(norm(&json!("2024-01-15 10:30:00Z")), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_bare_date() {
        assert_eq!(norm(&json!("2024-01-15")), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_numeric_string_epoch() {
        assert_eq!(norm(&json!("1700000000")), "2023-11-14T22:13:20+00:00");
        assert_eq!(norm(&json!("1700000000000")), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_fallbacks_to_now() {
        let now = format_utc(fixed_now());
        assert_eq!(norm(&json!(null)), now);
        assert_eq!(norm(&json!("")), now);
        assert_eq!(norm(&json!("   ")), now);
        assert_eq!(norm(&json!("yesterday at noon")), now);
        assert_eq!(norm(&json!({"nested": 1})), now);
        assert_eq!(norm(&json!("NaN")), now);
    }

    #[test]
    fn test_structured_datetime() {
        let dt = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, 13, 0, 0)
            .unwrap();
        assert_eq!(
            normalize_timestamp_at(dt, fixed_now()),
            "2024-06-15T12:00:00+00:00"
        );
    }

    #[test]
    fn test_normalized_output_reparses_to_same_instant() {
        for raw in [
            json!("2024-01-15T12:30:00+02:00"),
            json!(1700000000123_i64),
            json!("2024-01-15 10:30:00"),
        ] {
            let once = norm(&raw);
            let twice = norm(&json!(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_missing_option() {
        assert!(parse_timestamp(None::<&Value>).is_none());
    }
}
