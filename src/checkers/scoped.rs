//! Presence-style checkers.
//!
//! These run against the record and the field *name*: a resolved value cannot
//! distinguish a key that is absent from a key holding null or an empty
//! string, and that distinction is exactly what `required` is about. They are
//! dispatched through the scoped tier of the lookup chain and bypass the
//! skip-on-empty step in the pipeline.

use serde_json::Value;

use crate::empty_value;
use crate::engine::path::{self, Resolved};

/// Field must be present and non-empty. For wildcard paths, at least one
/// element must match.
pub(crate) fn required(record: &Value, field: &str, _args: &[Value]) -> bool {
    match path::resolve(record, field) {
        Resolved::Missing => false,
        Resolved::One(value) => !empty_value(&value),
        many => !many.is_vacant(),
    }
}

/// Required when another field equals any of the given values:
/// `["requiredIf", otherField, v1, v2, ...]`.
pub(crate) fn required_if(record: &Value, field: &str, args: &[Value]) -> bool {
    let Some(other) = args.first().and_then(Value::as_str) else { return false };
    if other_matches(record, other, &args[1..]) { required(record, field, &[]) } else { true }
}

/// Required unless another field equals any of the given values.
pub(crate) fn required_unless(record: &Value, field: &str, args: &[Value]) -> bool {
    let Some(other) = args.first().and_then(Value::as_str) else { return false };
    if other_matches(record, other, &args[1..]) { true } else { required(record, field, &[]) }
}

/// Required when any of the listed fields is present and non-empty.
pub(crate) fn required_with(record: &Value, field: &str, args: &[Value]) -> bool {
    if field_names(args).iter().any(|f| required(record, f, &[])) {
        required(record, field, &[])
    } else {
        true
    }
}

/// Required when any of the listed fields is absent or empty.
pub(crate) fn required_without(record: &Value, field: &str, args: &[Value]) -> bool {
    if field_names(args).iter().any(|f| !required(record, f, &[])) {
        required(record, field, &[])
    } else {
        true
    }
}

/// Uploaded-file metadata: an opaque `{name, tmp_path, error}` map. The
/// engine never inspects file contents; this only checks the triple's shape.
pub(crate) fn upload(record: &Value, field: &str, _args: &[Value]) -> bool {
    let Resolved::One(Value::Object(meta)) = path::resolve(record, field) else {
        return false;
    };
    let has = |key: &str| meta.get(key).is_some_and(|v| !empty_value(v));
    let error_ok = match meta.get("error") {
        None => true,
        Some(code) => code.as_i64() == Some(0),
    };
    has("name") && has("tmp_path") && error_ok
}

fn other_matches(record: &Value, other: &str, expected: &[Value]) -> bool {
    let Resolved::One(actual) = path::resolve(record, other) else { return false };
    let candidates: Vec<Value> = match expected {
        [Value::Array(items)] => items.clone(),
        _ => expected.to_vec(),
    };
    candidates.iter().any(|candidate| candidate == &actual)
}

fn field_names(args: &[Value]) -> Vec<String> {
    let list: Vec<&Value> = match args {
        [Value::Array(items)] => items.iter().collect(),
        _ => args.iter().collect(),
    };
    list.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
}
