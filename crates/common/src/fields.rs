//! Tolerant field extraction for loosely-shaped Data API payloads.
//!
//! Upstream responses rename fields between endpoints and revisions (`pnl` vs `profit`,
//! `initialValue` vs `initial_value`) and encode numbers either as JSON numbers or as strings. A
//! [`FieldExtractor`] lists candidate keys in priority order and returns the first value
//! that parses, or `None`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Epoch values at or above this are treated as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

pub struct FieldExtractor<T> {
    candidates: &'static [&'static str],
    parse: fn(&Value) -> Option<T>,
}

impl<T> FieldExtractor<T> {
    pub const fn new(candidates: &'static [&'static str], parse: fn(&Value) -> Option<T>) -> Self {
        Self { candidates, parse }
    }

    pub fn extract(&self, obj: &Value) -> Option<T> {
        self.candidates
            .iter()
            .filter_map(|key| obj.get(*key))
            .find_map(self.parse)
    }
}

/// Finite number from a JSON number or numeric string.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Non-negative whole count; fractional values are truncated.
pub fn count(value: &Value) -> Option<u32> {
    let n = number(value)?;
    if n < 0.0 {
        return None;
    }
    Some(n.min(f64::from(u32::MAX)) as u32)
}

/// Non-empty trimmed string.
pub fn text(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Point in time from epoch seconds, epoch milliseconds, or a date string.
pub fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(_) => number(value).and_then(from_epoch),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<f64>() {
                return from_epoch(n);
            }
            parse_date_string(s)
        }
        _ => None,
    }
}

fn from_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    let millis = if n >= EPOCH_MILLIS_THRESHOLD {
        n
    } else {
        n * 1000.0
    };
    Utc.timestamp_millis_opt(millis as i64).single()
}

fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
