//! Scalar matchers.
//!
//! Each matcher compares one resolved record value against a leaf filter's
//! value. Record values are loosely typed JSON, so comparisons coerce:
//!
//! - equality compares the string forms of both sides
//! - ordering compares strings lexicographically when both sides are
//!   strings and numerically otherwise
//! - `ILIKE`/`LIKE` match whole whitespace-separated tokens against a
//!   `*` wildcard pattern

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::Error;
use metafilter_proto::{format_number, Comparator, FilterValue};

/// A compiled `ILIKE`/`LIKE` pattern.
///
/// `*` matches any run of characters; everything else is literal. A record
/// value matches when any of its whitespace-separated tokens matches the
/// whole pattern.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    regex: Regex,
    case_insensitive: bool,
}

impl WildcardPattern {
    /// Compile a wildcard pattern.
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Self, Error> {
        let pattern = if case_insensitive {
            pattern.to_lowercase()
        } else {
            pattern.to_string()
        };
        let body = regex::escape(&pattern).replace(r"\*", ".*");
        let regex = Regex::new(&format!("^(?s:{})$", body))
            .map_err(|e| Error::InvalidFilter(format!("bad pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            regex,
            case_insensitive,
        })
    }

    /// Check whether any token of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        if self.case_insensitive {
            let lowered = text.to_lowercase();
            lowered.split_whitespace().any(|token| self.regex.is_match(token))
        } else {
            text.split_whitespace().any(|token| self.regex.is_match(token))
        }
    }
}

/// String form of a record value.
pub fn value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        JsonValue::Object(_) => value.to_string(),
    }
}

/// Numeric form of a record value; `NaN` when it has none.
pub fn value_number(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Null => 0.0,
        JsonValue::Bool(b) => f64::from(u8::from(*b)),
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => text_number(s),
        JsonValue::Array(_) | JsonValue::Object(_) => f64::NAN,
    }
}

/// Numeric form of a filter value; `NaN` when it has none.
pub fn filter_number(value: &FilterValue) -> f64 {
    match value {
        FilterValue::Bool(b) => f64::from(u8::from(*b)),
        FilterValue::Integer(i) => *i as f64,
        FilterValue::Float(f) => *f,
        FilterValue::String(s) => text_number(s),
        FilterValue::Geometry(_) => f64::NAN,
    }
}

/// Blank strings are zero. Only decimal notation counts as a number, so
/// words like `inf` or `nan` are not numeric.
fn text_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// `=` and `!=`: string equality of both sides.
pub fn equals(value: &JsonValue, filter: &FilterValue) -> bool {
    value_text(value) == filter.to_text()
}

/// Ordering of a record value relative to a filter value.
///
/// `None` when the comparison is undefined (a `NaN` operand).
pub fn compare(value: &JsonValue, filter: &FilterValue) -> Option<Ordering> {
    match (value, filter) {
        (JsonValue::String(a), FilterValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => value_number(value).partial_cmp(&filter_number(filter)),
    }
}

/// Apply a scalar comparator (`=`, `!=`, `<`, `<=`, `>`, `>=`).
///
/// Returns `false` for comparators that are not scalar comparisons.
pub fn compare_scalar(comparator: Comparator, value: &JsonValue, filter: &FilterValue) -> bool {
    match comparator {
        Comparator::Eq => equals(value, filter),
        Comparator::Ne => !equals(value, filter),
        Comparator::Lt => compare(value, filter).is_some_and(Ordering::is_lt),
        Comparator::Le => compare(value, filter).is_some_and(Ordering::is_le),
        Comparator::Gt => compare(value, filter).is_some_and(Ordering::is_gt),
        Comparator::Ge => compare(value, filter).is_some_and(Ordering::is_ge),
        _ => false,
    }
}

/// Parse a date-time from text.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.f]]` with an optional `Z`,
/// `+HH`, `+HHMM` or `+HH:MM` offset (naive times are UTC) and `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_date_time(text: &str) -> Result<DateTime<Utc>, Error> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(offset_text) = normalize_offset(text) {
        for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"] {
            if let Ok(dt) = DateTime::parse_from_str(&offset_text, format) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
    }

    let naive = text.strip_suffix('Z').unwrap_or(text);
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    Err(Error::InvalidDate(format!("'{}'", text)))
}

/// Rewrite a trailing `+HH`, `+HHMM` or `+HH:MM` offset as `+HHMM`.
fn normalize_offset(text: &str) -> Option<String> {
    let (date, time) = text.split_once('T')?;
    let at = time.rfind(['+', '-'])?;
    let (clock, offset) = time.split_at(at);
    let (sign, digits) = offset.split_at(1);
    let digits = digits.replace(':', "");
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.len() {
        2 => Some(format!("{}T{}{}{}00", date, clock, sign, digits)),
        4 => Some(format!("{}T{}{}{}", date, clock, sign, digits)),
        _ => None,
    }
}

fn millis_to_date_time(ms: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| Error::InvalidDate(format!("epoch milliseconds {} out of range", ms)))
}

/// Instant held by a record value: a date-time string or epoch milliseconds.
pub fn value_instant(value: &JsonValue) -> Result<DateTime<Utc>, Error> {
    match value {
        JsonValue::String(s) => parse_date_time(s),
        JsonValue::Number(n) => match n.as_i64() {
            Some(ms) => millis_to_date_time(ms),
            None => millis_to_date_time(n.as_f64().unwrap_or(f64::NAN) as i64),
        },
        other => Err(Error::InvalidDate(format!("'{}'", value_text(other)))),
    }
}

/// Instant held by a filter value.
pub fn filter_instant(value: &FilterValue) -> Result<DateTime<Utc>, Error> {
    match value {
        FilterValue::String(s) => parse_date_time(s),
        FilterValue::Integer(ms) => millis_to_date_time(*ms),
        FilterValue::Float(ms) => millis_to_date_time(*ms as i64),
        other => Err(Error::InvalidDate(format!(
            "{} value '{}'",
            other.type_name(),
            other.to_text()
        ))),
    }
}

/// `BEFORE` / `AFTER`, both inclusive of the boundary instant.
pub fn compare_temporal(
    comparator: Comparator,
    value: &JsonValue,
    filter: &FilterValue,
) -> Result<bool, Error> {
    let record_instant = value_instant(value)?;
    let filter_instant = filter_instant(filter)?;
    Ok(match comparator {
        Comparator::Before => record_instant <= filter_instant,
        Comparator::After => record_instant >= filter_instant,
        _ => false,
    })
}
