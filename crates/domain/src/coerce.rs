//! Field coercion helpers.
//!
//! The single owner of the "whatever shape the database happens to have"
//! problem: timestamps, coordinates and numbers each have one coercion
//! routine, and unresolvable values become `None` rather than errors.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Normalized geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Soft signal for a substituted default. Not an error; a malformed
/// document degrades to defaults instead of blanking the view.
pub fn defaulted(doc_id: &str, field: &str) {
    debug!(doc = %doc_id, field, "missing or malformed field, default substituted");
}

/// Convert a timestamp field to the internal instant representation.
///
/// Accepts the provider's timestamp wrapper (`{seconds, nanoseconds}` or
/// the underscore-prefixed export variant), RFC 3339 strings, bare
/// `YYYY-MM-DD` dates, and integer epoch seconds or milliseconds.
pub fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))?
                .as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos.clamp(0, 999_999_999) as u32)
                .single()
        }
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Epoch milliseconds are thirteen digits well past any sane
            // epoch-seconds value for this data.
            if raw.abs() >= 100_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

/// Convert a location field to a coordinate pair.
///
/// Accepts `{lat, lng}` / `{latitude, longitude}` objects and `"lat,lng"`
/// delimited strings. Unparsable values mean "no location".
pub fn coerce_location(value: &Value) -> Option<GeoPoint> {
    match value {
        Value::Object(map) => {
            let lat = map
                .get("lat")
                .or_else(|| map.get("latitude"))
                .and_then(as_f64)?;
            let lng = map
                .get("lng")
                .or_else(|| map.get("longitude"))
                .and_then(as_f64)?;
            valid_point(lat, lng)
        }
        Value::String(s) => {
            let (lat, lng) = s.split_once(',')?;
            valid_point(lat.trim().parse().ok()?, lng.trim().parse().ok()?)
        }
        _ => None,
    }
}

fn valid_point(lat: f64, lng: f64) -> Option<GeoPoint> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Some(GeoPoint { lat, lng })
    } else {
        None
    }
}

/// Numbers arrive both as JSON numbers and as decimal strings.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_u32(value: &Value) -> Option<u32> {
    as_f64(value).and_then(|f| {
        if f.is_finite() && f >= 0.0 {
            Some(f as u32)
        } else {
            None
        }
    })
}

/// Either a single string or a list of strings.
pub fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
