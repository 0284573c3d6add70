//! The record normalizer: untrusted payload bytes in, validated
//! [`PurchaseEvent`] out, or a typed [`DropReason`] saying why not.
//!
//! Normalization is all-or-nothing. Every step has to succeed or the whole
//! payload is discarded; a partial record is never emitted and an input never
//! produces more than one output.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event::PurchaseEvent;

/// Why a payload was discarded instead of becoming a [`PurchaseEvent`].
///
/// Dropping is the normalizer's only failure mode: the caller logs the reason
/// and moves on. There is no retry and no dead-letter output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("payload is not a JSON object: {0}")]
    MalformedJson(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not coercible to {expected}: {value}")]
    NonCoercible {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("unparseable timestamp `{0}`")]
    BadTimestamp(String),
}

/// Converts an untrusted byte payload into a validated, typed purchase event.
///
/// Stateless and side-effect free, so a single instance may be shared across
/// any number of concurrent workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Decodes, parses and coerces one payload.
    ///
    /// Integer fields accept JSON integers, floats (truncated toward zero)
    /// and base-10 integer strings; float fields accept JSON numbers and
    /// float strings. `created_at` strings that already end in `Z` pass
    /// through untouched, anything else is parsed, converted to UTC and
    /// re-rendered in ISO-8601 form with a trailing `Z`.
    pub fn normalize(&self, payload: &[u8]) -> Result<PurchaseEvent, DropReason> {
        let text = std::str::from_utf8(payload).map_err(|_| DropReason::InvalidUtf8)?;
        let value: Value =
            serde_json::from_str(text).map_err(|e| DropReason::MalformedJson(e.to_string()))?;
        let row = value
            .as_object()
            .ok_or_else(|| DropReason::MalformedJson("top-level value is not an object".into()))?;

        Ok(PurchaseEvent {
            event_id: require_string(row, "event_id")?.to_string(),
            customer_id: coerce_int(row, "customer_id")?,
            product_id: coerce_int(row, "product_id")?,
            quantity: coerce_int(row, "quantity")?,
            unit_price: coerce_float(row, "unit_price")?,
            total_price: coerce_float(row, "total_price")?,
            created_at: normalize_timestamp(require_string(row, "created_at")?)?,
        })
    }
}

fn require_string<'a>(
    row: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, DropReason> {
    match row.get(field) {
        None | Some(Value::Null) => Err(DropReason::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(non_coercible(field, "a string", other)),
    }
}

fn coerce_int(row: &Map<String, Value>, field: &'static str) -> Result<i64, DropReason> {
    match row.get(field) {
        None | Some(Value::Null) => Err(DropReason::MissingField(field)),
        Some(value @ Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| non_coercible(field, "an integer", value)),
        Some(value @ Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| non_coercible(field, "an integer", value)),
        Some(other) => Err(non_coercible(field, "an integer", other)),
    }
}

fn coerce_float(row: &Map<String, Value>, field: &'static str) -> Result<f64, DropReason> {
    match row.get(field) {
        None | Some(Value::Null) => Err(DropReason::MissingField(field)),
        Some(value @ Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| non_coercible(field, "a float", value)),
        Some(value @ Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| non_coercible(field, "a float", value)),
        Some(other) => Err(non_coercible(field, "a float", other)),
    }
}

fn non_coercible(field: &'static str, expected: &'static str, value: &Value) -> DropReason {
    DropReason::NonCoercible {
        field,
        expected,
        value: value.to_string(),
    }
}

/// Canonicalizes `created_at`. Strings already ending in `Z` are passed
/// through byte-identically, which makes the rule idempotent.
///
/// Offset-bearing timestamps are converted to the actual UTC instant before
/// re-rendering, so `10:00:00+02:00` becomes `08:00:00Z`.
fn normalize_timestamp(raw: &str) -> Result<String, DropReason> {
    if raw.ends_with('Z') {
        return Ok(raw.to_string());
    }

    let utc = parse_datetime(raw).ok_or_else(|| DropReason::BadTimestamp(raw.to_string()))?;
    Ok(utc.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // space-separated variants with an explicit offset
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // naive date-times are taken as already being UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    // a bare date is midnight UTC
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> Vec<u8> {
        json.as_bytes().to_vec()
    }

    fn well_formed() -> Vec<u8> {
        payload(
            r#"{"customer_id":"7","product_id":"3","quantity":"2","unit_price":"10.5","total_price":"21.0","created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
        )
    }

    #[test]
    fn coerces_string_typed_fields() {
        let event = Normalizer::new().normalize(&well_formed()).unwrap();

        assert_eq!(event.event_id, "abc");
        assert_eq!(event.customer_id, 7);
        assert_eq!(event.product_id, 3);
        assert_eq!(event.quantity, 2);
        assert_eq!(event.unit_price, 10.5);
        assert_eq!(event.total_price, 21.0);
        assert_eq!(event.created_at, "2024-01-01T10:00:00Z");
    }

    #[test]
    fn accepts_native_json_numbers() {
        let event = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":7,"product_id":3,"quantity":2,"unit_price":10.5,"total_price":21.0,"created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
            ))
            .unwrap();

        assert_eq!(event.quantity, 2);
        assert_eq!(event.unit_price, 10.5);
    }

    #[test]
    fn truncates_fractional_integers_toward_zero() {
        let event = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":7,"product_id":3,"quantity":2.9,"unit_price":10,"total_price":21,"created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
            ))
            .unwrap();

        assert_eq!(event.quantity, 2);
    }

    #[test]
    fn converts_offset_timestamp_to_utc() {
        let event = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":1,"product_id":1,"quantity":1,"unit_price":1.0,"total_price":1.0,"created_at":"2024-01-01T10:00:00+02:00","event_id":"abc"}"#,
            ))
            .unwrap();

        assert_eq!(event.created_at, "2024-01-01T08:00:00Z");
    }

    #[test]
    fn assumes_utc_for_naive_timestamps() {
        let event = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":1,"product_id":1,"quantity":1,"unit_price":1.0,"total_price":1.0,"created_at":"2024-01-01 10:00:00","event_id":"abc"}"#,
            ))
            .unwrap();

        assert_eq!(event.created_at, "2024-01-01T10:00:00Z");
    }

    #[test]
    fn renormalizing_is_a_no_op() {
        let normalizer = Normalizer::new();
        let first = normalizer.normalize(&well_formed()).unwrap();

        let reserialized = serde_json::to_vec(&first).unwrap();
        let second = normalizer.normalize(&reserialized).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.created_at, second.created_at);
    }

    #[test]
    fn missing_field_drops_the_record() {
        let reason = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":"7","product_id":"3","unit_price":"10.5","total_price":"21.0","created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
            ))
            .unwrap_err();

        assert_eq!(reason, DropReason::MissingField("quantity"));
    }

    #[test]
    fn null_field_counts_as_missing() {
        let reason = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":null,"product_id":3,"quantity":2,"unit_price":10.5,"total_price":21.0,"created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
            ))
            .unwrap_err();

        assert_eq!(reason, DropReason::MissingField("customer_id"));
    }

    #[test]
    fn non_numeric_value_drops_the_record() {
        let reason = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":"not-a-number","product_id":3,"quantity":2,"unit_price":10.5,"total_price":21.0,"created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
            ))
            .unwrap_err();

        assert!(matches!(
            reason,
            DropReason::NonCoercible {
                field: "customer_id",
                ..
            }
        ));
    }

    #[test]
    fn float_string_is_not_an_integer() {
        let reason = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":7,"product_id":3,"quantity":"2.5","unit_price":10.5,"total_price":21.0,"created_at":"2024-01-01T10:00:00Z","event_id":"abc"}"#,
            ))
            .unwrap_err();

        assert!(matches!(
            reason,
            DropReason::NonCoercible {
                field: "quantity",
                ..
            }
        ));
    }

    #[test]
    fn unparseable_timestamp_drops_the_record() {
        let reason = Normalizer::new()
            .normalize(&payload(
                r#"{"customer_id":7,"product_id":3,"quantity":2,"unit_price":10.5,"total_price":21.0,"created_at":"next tuesday","event_id":"abc"}"#,
            ))
            .unwrap_err();

        assert_eq!(reason, DropReason::BadTimestamp("next tuesday".into()));
    }

    #[test]
    fn invalid_utf8_drops_the_record() {
        let reason = Normalizer::new().normalize(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert_eq!(reason, DropReason::InvalidUtf8);
    }

    #[test]
    fn non_object_json_drops_the_record() {
        let reason = Normalizer::new().normalize(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(reason, DropReason::MalformedJson(_)));
    }

    #[test]
    fn garbage_bytes_drop_the_record() {
        let reason = Normalizer::new().normalize(b"{not json").unwrap_err();
        assert!(matches!(reason, DropReason::MalformedJson(_)));
    }
}
