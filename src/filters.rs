//! Built-in filter catalogue.
//!
//! Filters normalize a value before checking: `(value, args) -> value`. They
//! are total — input a filter cannot convert passes through unchanged, and
//! the subsequent checker decides whether that is a failure. Names go through
//! the same alias treatment as checkers (`int` → `integer`, `lower` →
//! `lowercase`, ...).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{Value, json};

use crate::FilterFn;

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("lower", "lowercase"),
        ("upper", "uppercase"),
        ("int", "integer"),
        ("bool", "boolean"),
        ("str2list", "str2array"),
    ])
});

static BUILTINS: Lazy<HashMap<&'static str, FilterFn>> = Lazy::new(|| {
    HashMap::from([
        ("trim", trim as FilterFn),
        ("ltrim", ltrim),
        ("rtrim", rtrim),
        ("lowercase", lowercase),
        ("uppercase", uppercase),
        ("integer", integer),
        ("float", float),
        ("boolean", boolean),
        ("abs", abs),
        ("str2array", str2array),
    ])
});

pub(crate) fn builtin(name: &str) -> Option<FilterFn> {
    let canonical = ALIASES.get(name).copied().unwrap_or(name);
    BUILTINS.get(canonical).copied()
}

fn map_str(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

fn trim(value: &Value, _args: &[Value]) -> Value {
    map_str(value, |s| s.trim().to_string())
}

fn ltrim(value: &Value, _args: &[Value]) -> Value {
    map_str(value, |s| s.trim_start().to_string())
}

fn rtrim(value: &Value, _args: &[Value]) -> Value {
    map_str(value, |s| s.trim_end().to_string())
}

fn lowercase(value: &Value, _args: &[Value]) -> Value {
    map_str(value, str::to_lowercase)
}

fn uppercase(value: &Value, _args: &[Value]) -> Value {
    map_str(value, str::to_uppercase)
}

fn integer(value: &Value, _args: &[Value]) -> Value {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => value.clone(),
        Value::Number(n) => n.as_f64().map(|f| json!(f.trunc() as i64)).unwrap_or_else(|| value.clone()),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(n) => json!(n),
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}

fn float(value: &Value, _args: &[Value]) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => json!(n),
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}

fn boolean(value: &Value, _args: &[Value]) -> Value {
    match value {
        Value::Bool(_) => value.clone(),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => json!(true),
            "false" | "0" | "no" | "off" | "" => json!(false),
            _ => value.clone(),
        },
        Value::Number(n) => json!(n.as_f64() != Some(0.0)),
        _ => value.clone(),
    }
}

fn abs(value: &Value, _args: &[Value]) -> Value {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => json!(i.abs()),
            (None, Some(f)) => json!(f.abs()),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Split a comma-separated string into a list of trimmed items.
fn str2array(value: &Value, _args: &[Value]) -> Value {
    match value {
        Value::String(s) if s.is_empty() => json!([]),
        Value::String(s) => json!(s.split(',').map(str::trim).collect::<Vec<_>>()),
        _ => value.clone(),
    }
}
