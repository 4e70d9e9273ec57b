//! Type-shaped checkers.
//!
//! Form-style input often carries numbers as strings, so the numeric checks
//! here accept both JSON numbers and numeric strings. Optional `min`/`max`
//! positional args bound the value, mirroring the range-paired argument shape
//! the compiler produces for these checkers.

use serde_json::Value;

use super::compare::{as_f64, as_i64, in_bounds, len_in_bounds};

/// Whole number (JSON integer or integer-looking string), optional bounds.
pub(crate) fn integer(value: &Value, args: &[Value]) -> bool {
    match as_i64(value) {
        Some(n) => in_bounds(n as f64, args),
        None => false,
    }
}

/// Non-negative whole number, optional bounds.
pub(crate) fn number(value: &Value, args: &[Value]) -> bool {
    match as_i64(value) {
        Some(n) => n >= 0 && in_bounds(n as f64, args),
        None => false,
    }
}

/// Any numeric value (integer or float), optional bounds.
pub(crate) fn float(value: &Value, args: &[Value]) -> bool {
    match as_f64(value) {
        Some(n) => in_bounds(n, args),
        None => false,
    }
}

/// A string, optionally bounded by character length.
pub(crate) fn string(value: &Value, args: &[Value]) -> bool {
    match value {
        Value::String(s) => len_in_bounds(s.chars().count(), args),
        _ => false,
    }
}

/// A boolean, or one of the usual form encodings of one.
pub(crate) fn boolean(value: &Value, _args: &[Value]) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => matches!(s.as_str(), "true" | "false" | "1" | "0" | "yes" | "no"),
        Value::Number(n) => n.as_i64().is_some_and(|i| i == 0 || i == 1),
        _ => false,
    }
}

pub(crate) fn array(value: &Value, _args: &[Value]) -> bool {
    value.is_array()
}

/// A list: an ordered collection. Same as `array` for JSON records, kept as a
/// distinct wire name for rule-table readability.
pub(crate) fn list(value: &Value, _args: &[Value]) -> bool {
    value.is_array()
}

pub(crate) fn map(value: &Value, _args: &[Value]) -> bool {
    value.is_object()
}

/// A string containing well-formed JSON.
pub(crate) fn json(value: &Value, _args: &[Value]) -> bool {
    match value {
        Value::String(s) => serde_json::from_str::<Value>(s).is_ok(),
        _ => false,
    }
}
