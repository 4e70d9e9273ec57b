//! The execution pipeline.
//!
//! This module is the operational core of the engine: it owns the per-run
//! state machine and the sequential rule-field loop.
//!
//! ```text
//! Ready ──validate()──▶ Running ──▶ Passed    (no errors, safe data kept)
//!                          │
//!                          ├──────▶ Failed    (errors recorded, safe purged)
//!                          └──────▶ Aborted   (hook refusal or fatal error)
//! ```
//!
//! Per rule, per field, the steps run in a fixed order:
//!
//! 1. only-checked gate (explicit allow-list, or the active scene's fields)
//! 2. `when` gate
//! 3. resolve the value through the path cache, falling back to the rule's
//!    declared default
//! 4. filter pipeline, with the result written back into the record — later
//!    rules see filtered values, which is why execution must stay sequential
//! 5. `before` hook (false return aborts without an error entry)
//! 6. skip-on-empty, unless the checker is presence-style
//! 7. checker dispatch (direct for closures/objects, via the lookup chain
//!    for names)
//! 8. bookkeeping: safe-data write on pass, message + error entry on fail
//! 9. `after` hook
//!
//! After the loop, a run with any recorded error (or a hook refusal)
//! discards all safe data: a run either fully succeeds with a safe subset of
//! its input, or fails with none. Terminal states are sticky until
//! `reset_validation()`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::compile::{CheckerTraits, RuleSpec, compile, parse_inline_args};
use super::lookup::{CheckerImpl, FilterImpl, resolve_checker, resolve_filter};
use super::metrics::RunMetrics;
use super::path::{self, Resolved};
use super::result::ResultStore;
use crate::error::RuleError;
use crate::{CheckerRef, Extension, FilterRef, Rule, UserChecker, UserFilter};
use crate::{empty_value, messages};

/// Lifecycle of one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Passed,
    Failed,
    Aborted,
}

/// A validation run: one record, one rule table, one result store.
///
/// Construct with [`Validation::new`], configure, then call
/// [`Validation::validate`]. The public surface lives in `src/api.rs`; this
/// module implements the run loop.
pub struct Validation {
    pub(crate) data: Value,
    pub(crate) specs: Vec<RuleSpec>,
    pub(crate) scene: String,
    pub(crate) scenes: HashMap<String, Vec<String>>,
    pub(crate) translates: HashMap<String, String>,
    pub(crate) messages: HashMap<String, String>,
    pub(crate) run_checkers: HashMap<String, UserChecker>,
    pub(crate) run_filters: HashMap<String, UserFilter>,
    pub(crate) extension: Option<Arc<dyn Extension>>,
    pub(crate) skip_on_empty: bool,
    pub(crate) stop_on_error: bool,
    pub(crate) only_checked: Option<Vec<String>>,
    pub(crate) state: RunState,
    pub(crate) store: ResultStore,
    pub(crate) cache: HashMap<String, Resolved>,
    pub(crate) metrics: RunMetrics,
    pub(crate) hook_aborted: bool,
}

impl std::fmt::Debug for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validation")
            .field("scene", &self.scene)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Outcome of one rule-field step.
enum Step {
    Continue,
    Halt(RunState),
}

impl Validation {
    pub(crate) fn execute(&mut self) -> Result<(), RuleError> {
        let started = Instant::now();

        if !self.data.is_object() {
            return Err(RuleError::NonMapData);
        }
        let rules = compile(&self.specs, &self.scene)?;
        let only = self
            .only_checked
            .clone()
            .or_else(|| self.scenes.get(&self.scene).cloned());

        debug!(rules = rules.len(), scene = %self.scene, "validation run started");
        self.state = RunState::Running;
        self.metrics = RunMetrics::default();
        self.metrics.rules = rules.len();

        if let Err(err) = self.run_rules(&rules, only.as_deref()) {
            self.state = RunState::Aborted;
            self.store.clear_safe();
            self.metrics.total = started.elapsed();
            return Err(err);
        }

        if self.state == RunState::Running {
            self.state = if self.store.is_fail() || self.hook_aborted {
                RunState::Failed
            } else {
                RunState::Passed
            };
        }
        if self.store.is_fail() || self.hook_aborted {
            self.store.clear_safe();
        }

        self.metrics.total = started.elapsed();
        debug!(state = ?self.state, errors = self.store.errors().len(), "validation run finished");
        Ok(())
    }

    fn run_rules(&mut self, rules: &[Rule], only: Option<&[String]>) -> Result<(), RuleError> {
        'rules: for rule in rules {
            for field in &rule.fields {
                match self.run_field(rule, field, only)? {
                    Step::Continue => {}
                    Step::Halt(state) => {
                        self.state = state;
                        break 'rules;
                    }
                }
            }
        }
        Ok(())
    }

    fn run_field(
        &mut self,
        rule: &Rule,
        field: &str,
        only: Option<&[String]>,
    ) -> Result<Step, RuleError> {
        if let Some(allowed) = only {
            if !allowed.iter().any(|f| f == field) {
                trace!(field, "outside only-checked set");
                return Ok(Step::Continue);
            }
        }
        if let Some(when) = &rule.when {
            if !when(&self.data) {
                trace!(field, "when gate declined");
                self.metrics.skipped += 1;
                return Ok(Step::Continue);
            }
        }

        let mut resolved = self.resolve_cached(field);
        if resolved.is_missing() {
            if let Some(default) = &rule.default {
                resolved = Resolved::One(default.clone());
            }
        }

        // Filters mutate the record in place; wildcard paths have no single
        // write-back location, so they are exempt.
        if !rule.filters.is_empty() && !field.contains('*') {
            if let Resolved::One(current) = &resolved {
                if !current.is_null() {
                    match self.apply_filters(&rule.filters, current.clone()) {
                        Ok(filtered) => {
                            path::write(&mut self.data, field, filtered.clone());
                            self.invalidate_cached(field);
                            resolved = Resolved::One(filtered);
                            self.metrics.filtered += 1;
                        }
                        Err(name) => {
                            warn!(filter = %name, field, "no filter resolved");
                            if self.stop_on_error {
                                return Err(RuleError::UnknownFilter(name));
                            }
                            self.store.add_error(field, format!("unknown filter \"{name}\""));
                            self.metrics.failed += 1;
                            return Ok(Step::Continue);
                        }
                    }
                }
            }
        }

        let value = resolved.clone().into_value().unwrap_or(Value::Null);

        if let Some(before) = &rule.before {
            if !before(&value, field) {
                debug!(field, "before hook refused");
                self.hook_aborted = true;
                return Ok(if self.stop_on_error {
                    Step::Halt(RunState::Aborted)
                } else {
                    Step::Continue
                });
            }
        }

        // Presence-style checkers get the field name and must see "absent"
        // themselves, so the empty-skip step does not apply to them.
        if !rule.traits.contains(CheckerTraits::PRESENCE) {
            let skip = rule.skip_on_empty.unwrap_or(self.skip_on_empty);
            let empty = match &rule.is_empty {
                Some(judge) => judge(&value),
                None => resolved.is_vacant() || empty_value(&value),
            };
            if skip && empty {
                trace!(field, "empty value skipped");
                self.metrics.skipped += 1;
                return Ok(Step::Continue);
            }
        }

        let ok = match &rule.checker {
            CheckerRef::Named(name) => {
                match resolve_checker(&self.run_checkers, self.extension.as_deref(), name) {
                    Some(CheckerImpl::Simple(f)) => f(&value, &rule.args),
                    Some(CheckerImpl::Scoped(f)) => f(&self.data, field, &rule.args),
                    Some(CheckerImpl::User(f)) => f(&value, &rule.args, &self.data),
                    None => {
                        warn!(checker = %name, field, "no checker resolved");
                        if self.stop_on_error {
                            return Err(RuleError::UnknownChecker(name.clone()));
                        }
                        self.store.add_error(field, format!("unknown checker \"{name}\""));
                        self.metrics.failed += 1;
                        return Ok(Step::Continue);
                    }
                }
            }
            CheckerRef::Inline(f) => f(&value, &rule.args, &self.data),
            CheckerRef::Object(obj) => obj.check(&value, &rule.args, &self.data),
        };
        self.metrics.checked += 1;

        let mut step = Step::Continue;
        if ok {
            trace!(field, checker = rule.checker.label(), "passed");
            self.record_safe(field, value.clone());
        } else {
            let message = messages::resolve_message(
                &self.messages,
                &self.translates,
                rule.message.as_deref(),
                rule.checker.label(),
                field,
                &rule.args,
            );
            debug!(field, checker = rule.checker.label(), %message, "failed");
            self.store.add_error(field, message);
            self.metrics.failed += 1;
            if self.stop_on_error {
                step = Step::Halt(RunState::Failed);
            }
        }

        if let Some(after) = &rule.after {
            if !after(&value, field) {
                debug!(field, "after hook refused");
                self.hook_aborted = true;
                if self.stop_on_error {
                    return Ok(Step::Halt(RunState::Aborted));
                }
            }
        }
        Ok(step)
    }

    /// Apply a filter pipeline left to right. Returns the unresolvable name
    /// on a lookup miss.
    fn apply_filters(&self, filters: &[FilterRef], mut value: Value) -> Result<Value, String> {
        for filter in filters {
            value = match filter {
                FilterRef::Inline(f) => f(&value, &[]),
                FilterRef::Named(raw) => {
                    let (name, args) = match raw.split_once(':') {
                        Some((name, rest)) => (name.trim(), parse_inline_args(rest)),
                        None => (raw.as_str(), Vec::new()),
                    };
                    match resolve_filter(&self.run_filters, self.extension.as_deref(), name) {
                        Some(FilterImpl::Builtin(f)) => f(&value, &args),
                        Some(FilterImpl::User(f)) => f(&value, &args),
                        None => return Err(name.to_string()),
                    }
                }
            };
        }
        Ok(value)
    }

    /// Resolve through the per-run memo cache. Only dotted paths are cached;
    /// a bare key lookup is already as cheap as the cache probe.
    fn resolve_cached(&mut self, field: &str) -> Resolved {
        if !field.contains('.') {
            return path::resolve(&self.data, field);
        }
        if let Some(hit) = self.cache.get(field) {
            return hit.clone();
        }
        let resolved = path::resolve(&self.data, field);
        self.cache.insert(field.to_string(), resolved.clone());
        resolved
    }

    /// Drop cached resolutions rooted at the written field's top segment so
    /// later rules observe the filtered record.
    fn invalidate_cached(&mut self, field: &str) {
        let top = field.split('.').next().unwrap_or(field).to_string();
        self.cache.retain(|cached, _| cached.split(['.', '*']).next() != Some(top.as_str()));
    }

    /// A dotted sub-field write collapses to its top-level field, storing the
    /// raw top-level value so partial writes don't fragment a parent
    /// structure.
    fn record_safe(&mut self, field: &str, value: Value) {
        let top = field.split(['.', '*']).next().unwrap_or(field);
        if top == field {
            self.store.set_safe(field, value);
        } else if let Some(raw) = self.data.get(top) {
            self.store.set_safe(top, raw.clone());
        } else {
            self.store.set_safe(top, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;
    use serde_json::json;

    #[test]
    fn stop_on_error_records_exactly_one_error() {
        let data = json!({"a": "not-a-number", "b": "also-not"});
        let specs = rules![["a", "integer"], ["b", "integer"]];

        let mut one = Validation::new(data.clone(), specs.clone());
        one.validate().unwrap();
        assert_eq!(one.errors().len(), 1);
        assert_eq!(one.state(), RunState::Failed);

        let mut both = Validation::new(data, specs);
        both.set_stop_on_error(false);
        both.validate().unwrap();
        assert_eq!(both.errors().len(), 2);
    }

    #[test]
    fn safe_data_is_all_or_nothing() {
        let data = json!({"tagId": "234535", "userId": "abc"});
        let mut v = Validation::new(data, rules![["tagId,userId", "required"], ["userId", "number"]]);
        v.set_stop_on_error(false);
        v.validate().unwrap();

        assert!(v.is_fail());
        assert!(!v.errors_for("userId").is_empty());
        assert!(v.errors_for("tagId").is_empty());
        // tagId passed its rules, but the failed run exposes no safe subset.
        assert!(v.safe_data().is_empty());
    }

    #[test]
    fn passing_run_exposes_safe_data() {
        let data = json!({"age": 23, "extra": "ignored"});
        let mut v = Validation::new(data, rules![["age", "integer"], ["age", "min", 18]]);
        v.validate().unwrap();

        assert!(v.is_ok());
        assert_eq!(v.state(), RunState::Passed);
        assert_eq!(v.safe_data().get("age"), Some(&json!(23)));
        // Unvalidated fields never leak into safe data.
        assert!(v.safe_data().get("extra").is_none());
    }

    #[test]
    fn validate_is_idempotent_until_reset() {
        let data = json!({"n": "nope"});
        let mut v = Validation::new(data, rules![["n", "integer"]]);
        v.validate().unwrap();
        let errors = v.errors().to_vec();

        v.validate().unwrap();
        assert_eq!(v.errors(), errors.as_slice());
        assert_eq!(v.metrics().checked, 1);

        v.reset_validation();
        assert_eq!(v.state(), RunState::Ready);
        assert!(v.errors().is_empty());
        v.validate().unwrap();
        assert_eq!(v.errors(), errors.as_slice());
    }

    #[test]
    fn filters_write_back_and_later_rules_see_the_result() {
        let data = json!({"age": " 23 "});
        let specs = vec![
            RuleSpec::new("age", "string").filter("trim|int"),
            // Without the write-back this would see the raw string again.
            RuleSpec::check_with("age", |value, _, _| value.is_i64()),
        ];
        let mut v = Validation::new(data, specs);
        v.set_stop_on_error(false);
        v.validate().unwrap();

        // "string" ran against the filtered value and failed (it became an
        // integer), proving the pipeline ran before dispatch.
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()[0].field, "age");
        assert_eq!(v.raw_data().get("age"), Some(&json!(23)));
    }

    #[test]
    fn filtered_record_is_visible_through_the_path_cache() {
        let data = json!({"user": {"name": " dave "}});
        let specs = vec![
            RuleSpec::new("user.name", "string").filter("trim"),
            RuleSpec::check_with("user.name", |value, _, _| value == &json!("dave")),
        ];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();
        assert!(v.is_ok(), "errors: {:?}", v.errors());
    }

    #[test]
    fn empty_values_are_skipped_unless_required() {
        let data = json!({"nickname": ""});
        let mut v = Validation::new(data.clone(), rules![["nickname", "string", {"min": 3}]]);
        v.validate().unwrap();
        assert!(v.is_ok(), "optional empty field must not fail");

        let mut required = Validation::new(data, rules![["nickname", "required"]]);
        required.validate().unwrap();
        assert!(required.is_fail(), "required bypasses the empty skip");
    }

    #[test]
    fn skip_on_empty_false_checks_empty_values() {
        let data = json!({"nickname": ""});
        let mut v =
            Validation::new(data, vec![RuleSpec::new("nickname", "string").min(3).skip_on_empty(false)]);
        v.validate().unwrap();
        assert!(v.is_fail());
    }

    #[test]
    fn declared_default_feeds_the_checker_and_safe_data() {
        let data = json!({});
        let specs = vec![RuleSpec::new("page", "integer").default_value(1).skip_on_empty(false)];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();
        assert!(v.is_ok(), "errors: {:?}", v.errors());
        assert_eq!(v.safe_data().get("page"), Some(&json!(1)));
    }

    #[test]
    fn hook_refusal_fails_the_run_without_an_error_entry() {
        let data = json!({"n": 5});
        let specs = vec![RuleSpec::new("n", "integer").before(|_, _| false)];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();

        assert_eq!(v.state(), RunState::Aborted);
        assert!(v.is_fail());
        assert!(v.errors().is_empty(), "hooks own their error reporting");
        assert!(v.safe_data().is_empty());
    }

    #[test]
    fn after_hook_refusal_also_aborts() {
        let data = json!({"n": 5, "m": 6});
        let specs = vec![
            RuleSpec::new("n", "integer").after(|_, _| false),
            RuleSpec::new("m", "integer"),
        ];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();
        assert_eq!(v.state(), RunState::Aborted);
        // The second rule never ran.
        assert_eq!(v.metrics().checked, 1);
    }

    #[test]
    fn when_gate_skips_rules() {
        let data = json!({"mode": "draft", "title": ""});
        let specs = vec![
            RuleSpec::new("title", "required")
                .when(|record| record.get("mode") == Some(&json!("published"))),
        ];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();
        assert!(v.is_ok());
    }

    #[test]
    fn unknown_checker_aborts_or_records_depending_on_stop_mode() {
        let data = json!({"n": 5});
        let specs = rules![["n", "definitelyNotAChecker"]];

        let mut strict = Validation::new(data.clone(), specs.clone());
        let err = strict.validate().unwrap_err();
        assert_eq!(err, RuleError::UnknownChecker("definitelyNotAChecker".into()));
        assert_eq!(strict.state(), RunState::Aborted);

        let mut lenient = Validation::new(data, specs);
        lenient.set_stop_on_error(false);
        lenient.validate().unwrap();
        assert_eq!(lenient.errors().len(), 1);
        assert!(lenient.errors()[0].message.contains("definitelyNotAChecker"));
    }

    #[test]
    fn compilation_errors_surface_before_any_field_runs() {
        let data = json!({"n": 5});
        let mut v = Validation::new(data, rules![["n"]]);
        let err = v.validate().unwrap_err();
        assert_eq!(err, RuleError::MissingChecker("n".into()));
        assert_eq!(v.metrics().checked, 0);
    }

    #[test]
    fn non_map_data_is_rejected() {
        let mut v = Validation::new(json!([1, 2, 3]), rules![["0", "integer"]]);
        assert_eq!(v.validate().unwrap_err(), RuleError::NonMapData);
    }

    #[test]
    fn dotted_fields_collapse_to_raw_top_level_safe_entries() {
        let data = json!({"user": {"name": "dave", "age": 30}});
        let mut v = Validation::new(data, rules![["user.name", "string"]]);
        v.validate().unwrap();
        // The whole parent value, not just the checked leaf.
        assert_eq!(v.safe_data().get("user"), Some(&json!({"name": "dave", "age": 30})));
    }

    #[test]
    fn wildcard_fields_validate_collected_elements() {
        let data = json!({"xs": [{"id": 1}, {"id": 2}]});
        let specs = vec![RuleSpec::check_with("xs.*.id", |value, _, _| {
            value.as_array().is_some_and(|items| items.iter().all(Value::is_i64))
        })];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();
        assert!(v.is_ok());
        assert!(v.safe_data().contains_key("xs"));
    }

    #[test]
    fn metrics_count_the_run() {
        let data = json!({"a": 1, "b": "", "c": 3});
        let specs = rules![["a", "integer"], ["b", "integer"], ["c", "integer"]];
        let mut v = Validation::new(data, specs);
        v.validate().unwrap();

        let metrics = v.metrics();
        assert_eq!(metrics.rules, 3);
        assert_eq!(metrics.checked, 2);
        assert_eq!(metrics.skipped, 1);
        assert_eq!(metrics.failed, 0);
    }
}
