extern crate self as validus;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

#[macro_use]
mod macros;
mod api;
mod checkers;
mod engine;
mod error;
mod filters;
mod messages;

pub use engine::{ErrorEntry, RuleSpec, RunMetrics, RunState, Validation};
pub use engine::{register_checker, register_filter};
pub use error::RuleError;

// --- Callable types ---------------------------------------------------------

/// Signature of a built-in value checker: `(value, args) -> pass?`.
pub(crate) type CheckerFn = fn(&Value, &[Value]) -> bool;

/// Signature of a built-in scoped checker: `(record, field, args) -> pass?`.
///
/// Scoped checkers see the whole record and the field *name* rather than a
/// resolved value, because they must tell "absent" apart from "empty"
/// (`required` and friends, upload metadata).
pub(crate) type ScopedFn = fn(&Value, &str, &[Value]) -> bool;

/// Signature of a built-in filter: `(value, args) -> transformed value`.
///
/// Built-in filters are total: unconvertible input passes through unchanged
/// and the subsequent checker decides.
pub(crate) type FilterFn = fn(&Value, &[Value]) -> Value;

/// A user-supplied checker: `(value, args, record) -> pass?`.
///
/// The full record is passed last so cross-field checks (for example
/// "end date after start date") do not need a side channel.
pub type UserChecker = Arc<dyn Fn(&Value, &[Value], &Value) -> bool + Send + Sync>;

/// A user-supplied filter: `(value, args) -> transformed value`.
pub type UserFilter = Arc<dyn Fn(&Value, &[Value]) -> Value + Send + Sync>;

/// A `before`/`after` hook: `(value, field) -> continue?`.
///
/// Returning `false` fails the rule for that field without recording an
/// error entry; the hook owns its own reporting.
pub type Hook = Arc<dyn Fn(&Value, &str) -> bool + Send + Sync>;

/// Gate deciding whether a rule applies at all, given the whole record.
pub type WhenFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Custom emptiness judgment, overriding the default for one rule.
pub type EmptyFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A validator object: an instance exposing a single check operation.
///
/// This is the third checker shape next to names and inline closures. It is
/// useful when a checker carries configuration of its own (compiled patterns,
/// lookup tables) that should be built once and shared across rules.
pub trait RuleChecker: Send + Sync {
    fn check(&self, value: &Value, args: &[Value], record: &Value) -> bool;

    /// Name used for message lookup; defaults to the generic callback slot.
    fn name(&self) -> &str {
        "callback"
    }
}

/// Extension point consulted by the lookup chain between the per-run and the
/// process-wide registries. Install with [`Validation::set_extension`].
pub trait Extension: Send + Sync {
    fn checker(&self, name: &str) -> Option<UserChecker> {
        let _ = name;
        None
    }

    fn filter(&self, name: &str) -> Option<UserFilter> {
        let _ = name;
        None
    }
}

// --- Tagged checker/filter references ---------------------------------------

/// How a rule refers to its checker.
///
/// The three shapes differ in resolution and calling convention: `Named` goes
/// through the lookup chain at dispatch time, `Inline` and `Object` bypass it
/// and are invoked directly with `(value, args, record)`.
#[derive(Clone)]
pub enum CheckerRef {
    Named(String),
    Inline(UserChecker),
    Object(Arc<dyn RuleChecker>),
}

impl CheckerRef {
    /// Label used when resolving error messages.
    pub(crate) fn label(&self) -> &str {
        match self {
            CheckerRef::Named(name) => name,
            CheckerRef::Inline(_) => "callback",
            CheckerRef::Object(obj) => obj.name(),
        }
    }
}

impl fmt::Debug for CheckerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckerRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            CheckerRef::Inline(_) => f.write_str("Inline(<function>)"),
            CheckerRef::Object(obj) => f.debug_tuple("Object").field(&obj.name()).finish(),
        }
    }
}

/// How a rule refers to one filter in its filter pipeline.
#[derive(Clone)]
pub enum FilterRef {
    Named(String),
    Inline(UserFilter),
}

impl fmt::Debug for FilterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            FilterRef::Inline(_) => f.write_str("Inline(<function>)"),
        }
    }
}

// --- Compiled rule ----------------------------------------------------------

/// The compiled unit of work: one checker applied to one or more fields.
///
/// Options are an explicit closed set rather than a key-value bag, so adding
/// an option means touching this struct and the compiler together.
pub struct Rule {
    pub(crate) fields: Vec<String>,
    pub(crate) checker: CheckerRef,
    pub(crate) args: Vec<Value>,
    pub(crate) message: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) skip_on_empty: Option<bool>,
    pub(crate) filters: Vec<FilterRef>,
    pub(crate) when: Option<WhenFn>,
    pub(crate) before: Option<Hook>,
    pub(crate) after: Option<Hook>,
    pub(crate) is_empty: Option<EmptyFn>,
    pub(crate) traits: engine::CheckerTraits,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("fields", &self.fields)
            .field("checker", &self.checker)
            .field("args", &self.args)
            .field("filters", &self.filters)
            .field("traits", &self.traits)
            .finish()
    }
}

// --- Emptiness --------------------------------------------------------------

/// Default emptiness judgment used by the skip-on-empty step and the
/// `required` checker: null, whitespace-only string, empty list or map.
pub(crate) fn empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_value_judgment() {
        assert!(empty_value(&Value::Null));
        assert!(empty_value(&json!("")));
        assert!(empty_value(&json!("   ")));
        assert!(empty_value(&json!([])));
        assert!(empty_value(&json!({})));

        assert!(!empty_value(&json!(0)));
        assert!(!empty_value(&json!(false)));
        assert!(!empty_value(&json!("0")));
        assert!(!empty_value(&json!([null])));
    }

    #[test]
    fn checker_ref_debug_does_not_leak_closures() {
        let inline = CheckerRef::Inline(Arc::new(|_: &Value, _: &[Value], _: &Value| true));
        assert_eq!(format!("{inline:?}"), "Inline(<function>)");
        assert_eq!(format!("{:?}", CheckerRef::Named("integer".into())), "Named(\"integer\")");
    }
}
