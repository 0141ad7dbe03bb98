//! Record normalization helpers.
//!
//! Timestamps arrive in whatever encoding the document store or the writing
//! client chose, and delivery addresses are free text. These functions turn
//! both into canonical values. None of them fail: an unreadable timestamp is
//! `None` and an unreadable address maps to [`UNKNOWN`].

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;

/// Placeholder for an area or pincode that could not be extracted.
pub const UNKNOWN: &str = "Unknown";

static PINCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{6}\b").expect("pincode pattern is valid"));

/// Parse a raw timestamp field into UTC.
///
/// Accepted encodings:
/// - store-native timestamp objects: `{"seconds": .., "nanoseconds": ..}`
/// - serialized admin timestamps: `{"_seconds": .., "_nanoseconds": ..}`
/// - date wrappers: `{"$date": <string or number>}`
/// - RFC 3339 / ISO-8601 strings (offset-less strings are read as UTC)
/// - bare numbers, read as epoch milliseconds
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        Value::Object(map) => {
            if let Some(inner) = map.get("$date") {
                return parse_timestamp(inner);
            }
            let seconds = map
                .get("_seconds")
                .or_else(|| map.get("seconds"))
                .and_then(as_whole_number)?;
            let nanos = map
                .get("_nanoseconds")
                .or_else(|| map.get("nanoseconds"))
                .and_then(as_whole_number)
                .filter(|n| (0..1_000_000_000).contains(n))
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos as u32)
        }
        _ => None,
    }
}

fn as_whole_number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Best-effort locality from a free-text address.
///
/// Addresses are usually written `street, locality, pincode`, so the
/// second-to-last comma segment is taken. Empty segments keep their position;
/// when the chosen one is blank the first segment is used instead. This is a
/// heuristic, not a geocode.
pub fn extract_area(address: &str) -> String {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();

    let candidate = match parts.len() {
        n if n >= 2 => parts[n - 2],
        _ => "",
    };
    [candidate, parts.first().copied().unwrap_or_default()]
        .into_iter()
        .find(|part| !part.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// First standalone six-digit run in the address.
pub fn extract_pincode(address: &str) -> String {
    PINCODE
        .find(address)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// 12-hour clock label for an hour of the day (0..=23).
pub fn hour_label(hour: usize) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display} {suffix}")
}
