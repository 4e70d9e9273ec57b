//! Field-path resolution.
//!
//! A field path addresses a location in a nested map/list record using `.` as
//! a separator and `*` as a wildcard segment meaning "every element of the
//! collection at this position". Paths are map-rooted: the record itself must
//! be a map, and a numeric segment indexes into an array at any deeper
//! position (`items.0.sku`).
//!
//! ## Wildcard algebra
//!
//! Resolution splits a wildcarded path at the *first* `*`:
//!
//! ```text
//! "a.b.*.c.*.d"
//!  └┬─┘ └──┬──┘
//! prefix  suffix (recursed per element, one fewer wildcard)
//! ```
//!
//! - The prefix is a plain path and must land on an array or map; anything
//!   else resolves to [`Resolved::Missing`].
//! - An empty suffix (trailing `*`) yields the collection elements themselves.
//! - A suffix with further wildcards recurses per element and concatenates the
//!   element results, flattening exactly one level per wildcard, so a doubly
//!   nested path still comes out as a single flat list.
//! - A plain suffix yields a list aligned with the outer collection, with
//!   [`Resolved::Missing`] marking absent keys per element. The marker is not
//!   `null`: a legitimate null leaf and a hole must stay distinguishable
//!   until the emptiness judgment has run.
//!
//! Caching of resolved paths is owned by the run (`pipeline.rs`), not by this
//! module; the functions here are pure over the record.

use serde_json::Value;

/// Outcome of resolving a field path against a record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolved {
    /// The addressed key does not exist. Distinct from a null leaf.
    Missing,
    /// A single addressed value.
    One(Value),
    /// Wildcard results; inner `Missing` marks holes in aligned results.
    Many(Vec<Resolved>),
}

impl Resolved {
    pub(crate) fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }

    /// Whether the resolution found nothing checkable: missing outright, or a
    /// wildcard that matched no element (or only holes).
    pub(crate) fn is_vacant(&self) -> bool {
        match self {
            Resolved::Missing => true,
            Resolved::One(_) => false,
            Resolved::Many(items) => items.iter().all(Resolved::is_missing),
        }
    }

    /// Convert to the checker-facing value. `Missing` at the top level maps to
    /// `None`; holes inside aligned wildcard results become `null` here, after
    /// the emptiness judgment no longer needs to tell them apart.
    pub(crate) fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Missing => None,
            Resolved::One(value) => Some(value),
            Resolved::Many(items) => Some(Value::Array(
                items.into_iter().map(|item| item.into_value().unwrap_or(Value::Null)).collect(),
            )),
        }
    }
}

/// Resolve `path` against `record`.
pub(crate) fn resolve(record: &Value, path: &str) -> Resolved {
    if path.contains('*') {
        resolve_wildcard(record, path)
    } else if path.contains('.') {
        resolve_plain(record, path)
    } else {
        match step(record, path) {
            Some(value) => Resolved::One(value.clone()),
            None => Resolved::Missing,
        }
    }
}

/// Write `value` back at a wildcard-free `path`. Returns false if any
/// intermediate segment is absent; intermediate structures are never created.
pub(crate) fn write(target: &mut Value, path: &str, value: Value) -> bool {
    match path.split_once('.') {
        None => match target {
            Value::Object(map) => {
                map.insert(path.to_string(), value);
                true
            }
            Value::Array(items) => match path.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        },
        Some((head, rest)) => match step_mut(target, head) {
            Some(next) => write(next, rest, value),
            None => false,
        },
    }
}

fn resolve_plain(record: &Value, path: &str) -> Resolved {
    let mut current = record;
    for segment in path.split('.') {
        match step(current, segment) {
            Some(next) => current = next,
            None => return Resolved::Missing,
        }
    }
    Resolved::One(current.clone())
}

fn resolve_wildcard(record: &Value, path: &str) -> Resolved {
    let Some(star) = path.find('*') else {
        return resolve_plain(record, path);
    };
    let prefix = path[..star].trim_end_matches('.');
    let suffix = path[star + 1..].trim_start_matches('.');

    let base = if prefix.is_empty() {
        record.clone()
    } else {
        match resolve_plain(record, prefix) {
            Resolved::One(value) => value,
            _ => return Resolved::Missing,
        }
    };

    let elements: Vec<Value> = match base {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => return Resolved::Missing,
    };

    if suffix.is_empty() {
        return Resolved::Many(elements.into_iter().map(Resolved::One).collect());
    }

    if suffix.contains('*') {
        // Concatenate element results: exactly one level of flattening per
        // wildcard, so nested wildcards still produce a single flat list.
        let mut flat = Vec::new();
        for element in &elements {
            match resolve_wildcard(element, suffix) {
                Resolved::Many(items) => flat.extend(items),
                Resolved::One(value) => flat.push(Resolved::One(value)),
                Resolved::Missing => {}
            }
        }
        Resolved::Many(flat)
    } else {
        // Aligned with the outer collection; holes stay marked.
        Resolved::Many(elements.iter().map(|element| resolve_plain(element, suffix)).collect())
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}
