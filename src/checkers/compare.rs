//! Comparison, membership and size checkers, plus the shared numeric helpers
//! used across the catalogue.

use serde_json::Value;

// --- Shared helpers ----------------------------------------------------------

/// Numeric view of a value: JSON numbers and numeric strings.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Integer view of a value: JSON integers and integer-looking strings.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Length of a sized value: characters, elements or entries.
pub(crate) fn len_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

/// Bound `n` by the range-paired args shape: `[]`, `[min]` or `[min, max]`.
pub(crate) fn in_bounds(n: f64, args: &[Value]) -> bool {
    match args {
        [] => true,
        [min] => as_f64(min).is_some_and(|m| n >= m),
        [min, max, ..] => {
            as_f64(min).is_some_and(|m| n >= m) && as_f64(max).is_some_and(|m| n <= m)
        }
    }
}

pub(crate) fn len_in_bounds(len: usize, args: &[Value]) -> bool {
    in_bounds(len as f64, args)
}

/// Membership haystack: a single array arg, or the positional args themselves.
fn haystack(args: &[Value]) -> Vec<Value> {
    match args {
        [Value::Array(items)] => items.clone(),
        _ => args.to_vec(),
    }
}

/// Loose equality for membership/eq checks: numeric values compare
/// numerically so `3` and `3.0` (and `"3"` from form input) agree.
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

// --- Checkers ----------------------------------------------------------------

pub(crate) fn one_of(value: &Value, args: &[Value]) -> bool {
    haystack(args).iter().any(|candidate| loose_eq(value, candidate))
}

pub(crate) fn not_in(value: &Value, args: &[Value]) -> bool {
    !one_of(value, args)
}

pub(crate) fn eq(value: &Value, args: &[Value]) -> bool {
    args.first().is_some_and(|expected| loose_eq(value, expected))
}

pub(crate) fn not_eq(value: &Value, args: &[Value]) -> bool {
    args.first().is_some_and(|expected| !loose_eq(value, expected))
}

pub(crate) fn gt(value: &Value, args: &[Value]) -> bool {
    ordered(value, args, |a, b| a > b)
}

pub(crate) fn gte(value: &Value, args: &[Value]) -> bool {
    ordered(value, args, |a, b| a >= b)
}

pub(crate) fn lt(value: &Value, args: &[Value]) -> bool {
    ordered(value, args, |a, b| a < b)
}

pub(crate) fn lte(value: &Value, args: &[Value]) -> bool {
    ordered(value, args, |a, b| a <= b)
}

fn ordered(value: &Value, args: &[Value], cmp: fn(f64, f64) -> bool) -> bool {
    match (as_f64(value), args.first().and_then(as_f64)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Lower bound on a numeric value.
pub(crate) fn min(value: &Value, args: &[Value]) -> bool {
    gte(value, args)
}

/// Upper bound on a numeric value.
pub(crate) fn max(value: &Value, args: &[Value]) -> bool {
    lte(value, args)
}

/// Size of a value within `[min]` / `[min, max]`: numeric magnitude for
/// numbers, length for strings and collections.
pub(crate) fn size(value: &Value, args: &[Value]) -> bool {
    let measured = match value {
        Value::Number(_) => as_f64(value),
        _ => len_of(value).map(|l| l as f64),
    };
    measured.is_some_and(|n| !args.is_empty() && in_bounds(n, args))
}

/// Length of a sized value within `[min]` / `[min, max]`; numbers fail.
pub(crate) fn length(value: &Value, args: &[Value]) -> bool {
    len_of(value).is_some_and(|l| !args.is_empty() && len_in_bounds(l, args))
}

/// All elements of a list are distinct.
pub(crate) fn distinct(value: &Value, _args: &[Value]) -> bool {
    match value {
        Value::Array(items) => {
            for (i, a) in items.iter().enumerate() {
                if items.iter().skip(i + 1).any(|b| a == b) {
                    return false;
                }
            }
            true
        }
        _ => false,
    }
}

/// Substring for strings, membership for lists.
pub(crate) fn contains(value: &Value, args: &[Value]) -> bool {
    let Some(needle) = args.first() else { return false };
    match value {
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        _ => false,
    }
}

pub(crate) fn start_with(value: &Value, args: &[Value]) -> bool {
    affix(value, args, |s, part| s.starts_with(part))
}

pub(crate) fn end_with(value: &Value, args: &[Value]) -> bool {
    affix(value, args, |s, part| s.ends_with(part))
}

fn affix(value: &Value, args: &[Value], test: fn(&str, &str) -> bool) -> bool {
    match (value.as_str(), args.first().and_then(Value::as_str)) {
        (Some(s), Some(part)) => !part.is_empty() && test(s, part),
        _ => false,
    }
}

/// Checkbox-style acceptance: yes/on/1/true in any common encoding.
pub(crate) fn accepted(value: &Value, _args: &[Value]) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "yes" | "on" | "1" | "true"),
        _ => false,
    }
}
