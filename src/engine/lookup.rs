//! Name-to-callable resolution.
//!
//! A rule that names its checker (`"integer"`, `"myCheck"`) is resolved to a
//! concrete callable at dispatch time by trying a fixed sequence of tiers,
//! first match wins:
//!
//! ```text
//! 1. RunRegistry      per-run callables (Validation::add_checker/add_filter)
//! 2. Scoped           built-ins needing record + field name (required*, upload)
//! 3. Extension        optional Extension trait installed on the run
//! 4. GlobalRegistry   process-wide registrations (register_checker/..)
//! 5. Builtin          the static catalogue, after alias resolution
//! ```
//!
//! The tiers are a closed enum rather than an if-chain so that adding one is
//! an explicit, reviewable change. Filters use the same chain minus the
//! scoped tier, which has no filter counterpart.
//!
//! The global registries are process-wide and guarded by `RwLock`: they are
//! written only by explicit registration calls and read during runs, so
//! concurrent runs in a threaded host never see torn state. Inline closures
//! and validator objects on a rule bypass this chain entirely.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::{CheckerFn, Extension, FilterFn, ScopedFn, UserChecker, UserFilter};
use crate::{checkers, filters};

/// Resolution tiers, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    RunRegistry,
    Scoped,
    Extension,
    GlobalRegistry,
    Builtin,
}

const TIERS: [Tier; 5] =
    [Tier::RunRegistry, Tier::Scoped, Tier::Extension, Tier::GlobalRegistry, Tier::Builtin];

/// A resolved checker, tagged by calling convention.
pub(crate) enum CheckerImpl {
    /// `(value, args)` — the catalogue shape.
    Simple(CheckerFn),
    /// `(record, field, args)` — presence-style built-ins.
    Scoped(ScopedFn),
    /// `(value, args, record)` — user-registered callables.
    User(UserChecker),
}

/// A resolved filter.
pub(crate) enum FilterImpl {
    Builtin(FilterFn),
    User(UserFilter),
}

static GLOBAL_CHECKERS: Lazy<RwLock<HashMap<String, UserChecker>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static GLOBAL_FILTERS: Lazy<RwLock<HashMap<String, UserFilter>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a checker under `name` for every future run in this process.
///
/// Runs treat the registry as read-only; registrations racing a concurrent
/// run resolve to either the old or the new state, never a torn one.
pub fn register_checker(
    name: impl Into<String>,
    checker: impl Fn(&Value, &[Value], &Value) -> bool + Send + Sync + 'static,
) {
    GLOBAL_CHECKERS.write().unwrap().insert(name.into(), Arc::new(checker));
}

/// Register a filter under `name` for every future run in this process.
pub fn register_filter(
    name: impl Into<String>,
    filter: impl Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
) {
    GLOBAL_FILTERS.write().unwrap().insert(name.into(), Arc::new(filter));
}

/// Resolve a checker name through the tier chain.
pub(crate) fn resolve_checker(
    run_registry: &HashMap<String, UserChecker>,
    extension: Option<&dyn Extension>,
    name: &str,
) -> Option<CheckerImpl> {
    for tier in TIERS {
        let hit = match tier {
            Tier::RunRegistry => run_registry.get(name).cloned().map(CheckerImpl::User),
            Tier::Scoped => checkers::scoped(name).map(CheckerImpl::Scoped),
            Tier::Extension => extension.and_then(|ext| ext.checker(name)).map(CheckerImpl::User),
            Tier::GlobalRegistry => {
                GLOBAL_CHECKERS.read().unwrap().get(name).cloned().map(CheckerImpl::User)
            }
            Tier::Builtin => checkers::builtin(name).map(CheckerImpl::Simple),
        };
        if hit.is_some() {
            return hit;
        }
    }
    None
}

/// Resolve a filter name through the tier chain (no scoped tier).
pub(crate) fn resolve_filter(
    run_registry: &HashMap<String, UserFilter>,
    extension: Option<&dyn Extension>,
    name: &str,
) -> Option<FilterImpl> {
    for tier in TIERS {
        let hit = match tier {
            Tier::RunRegistry => run_registry.get(name).cloned().map(FilterImpl::User),
            Tier::Scoped => None,
            Tier::Extension => extension.and_then(|ext| ext.filter(name)).map(FilterImpl::User),
            Tier::GlobalRegistry => {
                GLOBAL_FILTERS.read().unwrap().get(name).cloned().map(FilterImpl::User)
            }
            Tier::Builtin => filters::builtin(name).map(FilterImpl::Builtin),
        };
        if hit.is_some() {
            return hit;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SuffixExtension;

    impl Extension for SuffixExtension {
        fn checker(&self, name: &str) -> Option<UserChecker> {
            (name == "shouty").then(|| {
                Arc::new(|value: &Value, _: &[Value], _: &Value| {
                    value.as_str().is_some_and(|s| s.chars().all(char::is_uppercase))
                }) as UserChecker
            })
        }
    }

    #[test]
    fn run_registry_wins_over_builtin() {
        let mut run: HashMap<String, UserChecker> = HashMap::new();
        run.insert(
            "integer".into(),
            Arc::new(|_: &Value, _: &[Value], _: &Value| false),
        );

        // The builtin "integer" would pass 5; the run-local override refuses it.
        match resolve_checker(&run, None, "integer") {
            Some(CheckerImpl::User(f)) => assert!(!f(&json!(5), &[], &json!({}))),
            _ => panic!("expected the run-local checker"),
        }
    }

    #[test]
    fn scoped_tier_shadows_builtin_shape() {
        let run = HashMap::new();
        assert!(matches!(resolve_checker(&run, None, "required"), Some(CheckerImpl::Scoped(_))));
        assert!(matches!(resolve_checker(&run, None, "requiredIf"), Some(CheckerImpl::Scoped(_))));
        assert!(matches!(resolve_checker(&run, None, "integer"), Some(CheckerImpl::Simple(_))));
    }

    #[test]
    fn extension_tier_is_consulted_by_name() {
        let run = HashMap::new();
        let ext = SuffixExtension;
        assert!(matches!(resolve_checker(&run, Some(&ext), "shouty"), Some(CheckerImpl::User(_))));
        assert!(resolve_checker(&run, Some(&ext), "whispery").is_none());
    }

    #[test]
    fn global_registry_and_alias_fallthrough() {
        register_checker("lookupTestParity", |value: &Value, _: &[Value], _: &Value| {
            value.as_i64().is_some_and(|n| n % 2 == 0)
        });

        let run = HashMap::new();
        match resolve_checker(&run, None, "lookupTestParity") {
            Some(CheckerImpl::User(f)) => {
                assert!(f(&json!(4), &[], &json!({})));
                assert!(!f(&json!(5), &[], &json!({})));
            }
            _ => panic!("expected the globally registered checker"),
        }

        // Alias resolution happens inside the builtin tier.
        assert!(matches!(resolve_checker(&run, None, "int"), Some(CheckerImpl::Simple(_))));
        assert!(resolve_checker(&run, None, "definitelyUnknown").is_none());
    }

    #[test]
    fn filter_chain_skips_scoped_tier() {
        let run = HashMap::new();
        assert!(matches!(resolve_filter(&run, None, "trim"), Some(FilterImpl::Builtin(_))));
        assert!(resolve_filter(&run, None, "required").is_none());
    }
}
