//! The public validation surface.
//!
//! `Validation` is built, configured with chained setters, run once with
//! [`Validation::validate`], then queried. The run loop itself lives in
//! `engine/pipeline.rs`; this module only owns construction, configuration
//! and result access.
//!
//! ```
//! use serde_json::json;
//! use validus::{Validation, rules};
//!
//! let data = json!({"userId": "42", "name": "dave"});
//! let mut v = Validation::new(data, rules![
//!     ["userId, name", "required"],
//!     ["userId", "integer"],
//!     ["name", "string", {"min": 2, "max": 32}],
//! ]);
//!
//! v.validate().unwrap();
//! assert!(v.is_ok());
//! assert_eq!(v.safe_value("name"), Some(&json!("dave")));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::engine::path::{self, Resolved};
use crate::engine::{ErrorEntry, ResultStore, RuleSpec, RunMetrics, RunState, Validation};
use crate::error::RuleError;
use crate::Extension;

impl Validation {
    /// A fresh run over `data` (a map-rooted record) with the given rule
    /// table. Everything else starts at its defaults: no scene, skip-on-empty
    /// and stop-on-error both on.
    pub fn new(data: Value, specs: Vec<RuleSpec>) -> Self {
        Validation {
            data,
            specs,
            scene: String::new(),
            scenes: HashMap::new(),
            translates: HashMap::new(),
            messages: HashMap::new(),
            run_checkers: HashMap::new(),
            run_filters: HashMap::new(),
            extension: None,
            skip_on_empty: true,
            stop_on_error: true,
            only_checked: None,
            state: RunState::Ready,
            store: ResultStore::default(),
            cache: HashMap::new(),
            metrics: RunMetrics::default(),
            hook_aborted: false,
        }
    }

    // --- Configuration -------------------------------------------------------

    /// Replace the rule table. Clears any previous result state.
    pub fn set_rules(&mut self, specs: Vec<RuleSpec>) -> &mut Self {
        self.specs = specs;
        self.reset_validation()
    }

    /// Select the active scene for rule `on` filtering and, if a matching
    /// entry exists in the scenes map, the only-checked field set.
    pub fn at_scene(&mut self, scene: impl Into<String>) -> &mut Self {
        self.scene = scene.into();
        self
    }

    /// Declare named scenes and the fields each one checks.
    pub fn set_scenes(&mut self, scenes: HashMap<String, Vec<String>>) -> &mut Self {
        self.scenes = scenes;
        self
    }

    /// Register a checker for this run only. Run-local names win over every
    /// other resolution tier, built-ins included.
    pub fn add_checker(
        &mut self,
        name: impl Into<String>,
        checker: impl Fn(&Value, &[Value], &Value) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.run_checkers.insert(name.into(), Arc::new(checker));
        self
    }

    /// Register a filter for this run only.
    pub fn add_filter(
        &mut self,
        name: impl Into<String>,
        filter: impl Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.run_filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Install an [`Extension`] consulted between the run-local and the
    /// process-wide registries.
    pub fn set_extension(&mut self, extension: Arc<dyn Extension>) -> &mut Self {
        self.extension = Some(extension);
        self
    }

    /// Map raw field names to display names used for `{attr}` in messages.
    pub fn set_translates(
        &mut self,
        translates: impl IntoIterator<Item = (String, String)>,
    ) -> &mut Self {
        self.translates.extend(translates);
        self
    }

    /// Override message templates, keyed `"field.checker"` or by checker name.
    pub fn set_messages(
        &mut self,
        messages: impl IntoIterator<Item = (String, String)>,
    ) -> &mut Self {
        self.messages.extend(messages);
        self
    }

    /// Run-level default for skipping empty optional values. Individual rules
    /// override this with their own `skipOnEmpty`.
    pub fn set_skip_on_empty(&mut self, skip: bool) -> &mut Self {
        self.skip_on_empty = skip;
        self
    }

    /// Whether the run halts at the first error (the default) or collects
    /// every failure.
    pub fn set_stop_on_error(&mut self, stop: bool) -> &mut Self {
        self.stop_on_error = stop;
        self
    }

    /// Restrict checking to the named fields, overriding any scene-derived
    /// field set.
    pub fn only_checked(&mut self, fields: impl IntoIterator<Item = String>) -> &mut Self {
        self.only_checked = Some(fields.into_iter().collect());
        self
    }

    // --- Running -------------------------------------------------------------

    /// Run the validation once.
    ///
    /// Calling again after a run is a no-op until [`reset_validation`]; the
    /// recorded outcome stays as it is. Fatal problems (malformed rule table,
    /// non-map data, unresolvable names under stop-on-error) surface as
    /// [`RuleError`]s; ordinary check failures do not, they are reported
    /// through [`errors`](Validation::errors) and friends.
    ///
    /// [`reset_validation`]: Validation::reset_validation
    /// [`errors`]: Validation::errors
    pub fn validate(&mut self) -> Result<&mut Self, RuleError> {
        if matches!(self.state, RunState::Passed | RunState::Failed | RunState::Aborted) {
            return Ok(self);
        }
        self.execute()?;
        Ok(self)
    }

    /// Forget the previous run's outcome, keeping data, rules and
    /// configuration. The next [`validate`](Validation::validate) call runs
    /// again.
    pub fn reset_validation(&mut self) -> &mut Self {
        self.state = RunState::Ready;
        self.store.reset();
        self.cache.clear();
        self.metrics = RunMetrics::default();
        self.hook_aborted = false;
        self
    }

    // --- Results -------------------------------------------------------------

    pub fn state(&self) -> RunState {
        self.state
    }

    /// True once a run finished without failures.
    pub fn is_ok(&self) -> bool {
        self.state == RunState::Passed
    }

    /// True once a run failed or aborted.
    pub fn is_fail(&self) -> bool {
        matches!(self.state, RunState::Failed | RunState::Aborted)
    }

    /// All recorded errors, in the order the failing checks ran.
    pub fn errors(&self) -> &[ErrorEntry] {
        self.store.errors()
    }

    /// Errors recorded for one field.
    pub fn errors_for<'a>(&'a self, field: &str) -> Vec<&'a ErrorEntry> {
        self.store.errors_for(field)
    }

    pub fn first_error(&self) -> Option<&ErrorEntry> {
        self.store.first_error()
    }

    pub fn last_error(&self) -> Option<&ErrorEntry> {
        self.store.last_error()
    }

    /// The validated subset of the input, keyed by top-level field. Empty
    /// unless the run passed.
    pub fn safe_data(&self) -> &Map<String, Value> {
        self.store.safe_data()
    }

    /// One entry of [`safe_data`](Validation::safe_data).
    pub fn safe_value(&self, field: &str) -> Option<&Value> {
        self.store.safe_data().get(field)
    }

    /// The record under validation, including any filter write-backs.
    pub fn raw_data(&self) -> &Value {
        &self.data
    }

    /// Resolve a dotted/wildcarded path against the current record. Absent
    /// paths come back as `None`, present-but-null as `Some(Null)`.
    pub fn get_value(&self, path: &str) -> Option<Value> {
        match path::resolve(&self.data, path) {
            Resolved::Missing => None,
            resolved => resolved.into_value(),
        }
    }

    /// Counters and timing for the last run.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }
}
