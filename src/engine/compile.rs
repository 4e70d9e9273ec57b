//! Rule compilation.
//!
//! This is the static side of the engine: it turns the declarative rule table
//! (`RuleSpec` entries, written by hand or parsed from the wire grammar
//! `[fields, checker, ...args, {options}]`) into the normalized `Rule` list
//! the pipeline executes. Compilation happens once per run and does all the
//! shorthand expansion up front so the hot loop stays simple:
//!
//! - a comma-separated field spec becomes an ordered, deduplicated field list;
//! - a pipe-delimited checker spec (`"required|string:5,10"`) becomes one
//!   `Rule` per checker, sharing the entry's fields and options, with
//!   `:`-inline arguments parsed as JSON scalars;
//! - rules tagged with an `on` scene list are dropped entirely unless the
//!   active scene matches;
//! - recognized options are pulled into the `Rule`'s closed option set, and
//!   `min`/`max` options for range-paired checkers are folded into the
//!   positional argument shape those checkers expect, synthesizing a floor
//!   when only `max` was given.
//!
//! Malformed entries (no fields, no checker) are fatal for the whole run and
//! surface from `validate()` before any field is evaluated.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::RuleError;
use crate::{CheckerRef, EmptyFn, FilterRef, Hook, Rule, RuleChecker, WhenFn, checkers};

bitflags::bitflags! {
    /// Coarse per-checker classification driving compiler and pipeline
    /// special cases.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct CheckerTraits: u8 {
        /// Gets the field name, not the value; bypasses skip-on-empty.
        const PRESENCE    = 1 << 0;
        /// Positional args are interpreted as `[min]` / `[min, max]`.
        const RANGE_PAIR  = 1 << 1;
        /// A synthesized lower bound is zero rather than `i64::MIN`.
        const LENGTH_LIKE = 1 << 2;
    }
}

/// Classify a checker by its canonical name.
pub(crate) fn classify(name: &str) -> CheckerTraits {
    let canonical = checkers::canonical(name);
    let mut traits = CheckerTraits::empty();

    if canonical.starts_with("required") || canonical == "upload" {
        traits |= CheckerTraits::PRESENCE;
    }
    if matches!(canonical, "size" | "string" | "length" | "integer" | "number" | "float") {
        traits |= CheckerTraits::RANGE_PAIR;
    }
    if matches!(canonical, "string" | "length") {
        traits |= CheckerTraits::LENGTH_LIKE;
    }
    traits
}

// --- Declarative entries -----------------------------------------------------

/// How a declarative entry names its checker(s).
#[derive(Clone)]
pub(crate) enum CheckerSpec {
    Missing,
    /// A single name, possibly pipe-delimited with `:`-inline args.
    Name(String),
    Many(Vec<CheckerSpec>),
    Inline(crate::UserChecker),
    Object(Arc<dyn RuleChecker>),
}

/// One declarative rule-table entry, before compilation.
///
/// Build one with [`RuleSpec::new`] and the option setters, from the JSON
/// wire shape via [`RuleSpec::from_json`], or with the `rules!` macro.
/// Structural problems (missing fields or checker) are deliberately *not*
/// rejected here; they surface as fatal [`RuleError`]s when the table is
/// compiled at the start of a run.
#[derive(Clone)]
pub struct RuleSpec {
    pub(crate) fields: Vec<String>,
    pub(crate) checker: CheckerSpec,
    pub(crate) args: Vec<Value>,
    pub(crate) message: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) skip_on_empty: Option<bool>,
    pub(crate) filters: Vec<FilterRef>,
    pub(crate) when: Option<WhenFn>,
    pub(crate) before: Option<Hook>,
    pub(crate) after: Option<Hook>,
    pub(crate) is_empty: Option<EmptyFn>,
    pub(crate) on: Vec<String>,
    pub(crate) min: Option<Value>,
    pub(crate) max: Option<Value>,
    pub(crate) malformed: Option<String>,
}

impl RuleSpec {
    fn empty() -> Self {
        RuleSpec {
            fields: Vec::new(),
            checker: CheckerSpec::Missing,
            args: Vec::new(),
            message: None,
            default: None,
            skip_on_empty: None,
            filters: Vec::new(),
            when: None,
            before: None,
            after: None,
            is_empty: None,
            on: Vec::new(),
            min: None,
            max: None,
            malformed: None,
        }
    }

    /// A rule applying a named checker (possibly pipe-delimited) to one or
    /// more comma-separated fields.
    pub fn new(fields: impl Into<String>, checker: impl Into<String>) -> Self {
        RuleSpec {
            fields: vec![fields.into()],
            checker: CheckerSpec::Name(checker.into()),
            ..RuleSpec::empty()
        }
    }

    /// A rule applying an inline closure checker.
    pub fn check_with(
        fields: impl Into<String>,
        checker: impl Fn(&Value, &[Value], &Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        RuleSpec {
            fields: vec![fields.into()],
            checker: CheckerSpec::Inline(Arc::new(checker)),
            ..RuleSpec::empty()
        }
    }

    /// A rule applying a validator object.
    pub fn check_object(fields: impl Into<String>, checker: Arc<dyn RuleChecker>) -> Self {
        RuleSpec {
            fields: vec![fields.into()],
            checker: CheckerSpec::Object(checker),
            ..RuleSpec::empty()
        }
    }

    /// Parse an entry from the wire grammar `[fields, checker, ...args,
    /// {options}]`. Objects in the tail are option maps; everything else is a
    /// positional checker argument, in order.
    pub fn from_json(entry: &Value) -> Self {
        let Value::Array(parts) = entry else {
            let mut spec = RuleSpec::empty();
            spec.malformed = Some(format!("expected an array entry, got {entry}"));
            return spec;
        };

        let mut spec = RuleSpec::empty();
        spec.fields = match parts.first() {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => {
                items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
            }
            _ => Vec::new(),
        };
        spec.checker = match parts.get(1) {
            Some(Value::String(s)) => CheckerSpec::Name(s.clone()),
            Some(Value::Array(items)) => CheckerSpec::Many(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| CheckerSpec::Name(s.to_string()))
                    .collect(),
            ),
            _ => CheckerSpec::Missing,
        };

        for part in parts.iter().skip(2) {
            match part {
                Value::Object(options) => {
                    for (key, value) in options {
                        spec.apply_option(key, value);
                    }
                }
                other => spec.args.push(other.clone()),
            }
        }
        spec
    }

    fn apply_option(&mut self, key: &str, value: &Value) {
        match key {
            "msg" => self.message = value.as_str().map(str::to_string),
            "default" => self.default = Some(value.clone()),
            "skipOnEmpty" => self.skip_on_empty = value.as_bool(),
            "filter" => self.filters = parse_filter_names(value),
            "on" => self.on = parse_name_list(value),
            "min" => self.min = Some(value.clone()),
            "max" => self.max = Some(value.clone()),
            // Closure-shaped options (when/before/after/isEmpty) only exist
            // on the builder; unknown keys in wire entries are ignored.
            _ => {}
        }
    }

    // --- option setters ------------------------------------------------------

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values);
        self
    }

    pub fn msg(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn skip_on_empty(mut self, skip: bool) -> Self {
        self.skip_on_empty = Some(skip);
        self
    }

    /// Add named filters, pipe-delimited: `"trim|int"`.
    pub fn filter(mut self, names: impl AsRef<str>) -> Self {
        self.filters.extend(
            names
                .as_ref()
                .split('|')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(|n| FilterRef::Named(n.to_string())),
        );
        self
    }

    pub fn filter_with(
        mut self,
        filter: impl Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.filters.push(FilterRef::Inline(Arc::new(filter)));
        self
    }

    pub fn when(mut self, gate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.when = Some(Arc::new(gate));
        self
    }

    pub fn before(mut self, hook: impl Fn(&Value, &str) -> bool + Send + Sync + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    pub fn after(mut self, hook: impl Fn(&Value, &str) -> bool + Send + Sync + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn is_empty_with(mut self, judge: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.is_empty = Some(Arc::new(judge));
        self
    }

    /// Restrict this rule to the named scenes (comma-separated).
    pub fn on(mut self, scenes: impl AsRef<str>) -> Self {
        self.on = scenes
            .as_ref()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn min(mut self, value: impl Into<Value>) -> Self {
        self.min = Some(value.into());
        self
    }

    pub fn max(mut self, value: impl Into<Value>) -> Self {
        self.max = Some(value.into());
        self
    }
}

// --- Compilation -------------------------------------------------------------

/// Compile a rule table for the active scene.
pub(crate) fn compile(specs: &[RuleSpec], scene: &str) -> Result<Vec<Rule>, RuleError> {
    let mut rules = Vec::new();

    for spec in specs {
        if let Some(detail) = &spec.malformed {
            return Err(RuleError::MalformedEntry(detail.clone()));
        }

        let fields = expand_fields(&spec.fields);
        if fields.is_empty() {
            return Err(RuleError::MissingFields);
        }

        if !scene_allows(&spec.on, scene) {
            debug!(fields = %fields.join(","), on = %spec.on.join(","), scene, "rule excluded by scene");
            continue;
        }

        for (checker, inline_args) in expand_units(&spec.checker, &fields)? {
            let traits = classify(checker.label());
            let base_args = inline_args.unwrap_or_else(|| spec.args.clone());
            let args = finalize_args(traits, base_args, &spec.min, &spec.max);

            rules.push(Rule {
                fields: fields.clone(),
                checker,
                args,
                message: spec.message.clone(),
                default: spec.default.clone(),
                skip_on_empty: spec.skip_on_empty,
                filters: spec.filters.clone(),
                when: spec.when.clone(),
                before: spec.before.clone(),
                after: spec.after.clone(),
                is_empty: spec.is_empty.clone(),
                traits,
            });
        }
    }

    Ok(rules)
}

/// Expand comma-separated field chunks, preserving order, dropping dupes.
fn expand_fields(chunks: &[String]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for chunk in chunks {
        for field in chunk.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
    }
    fields
}

/// Scene membership: an empty `on` list is always available; a non-empty one
/// requires an exact match, so an empty active scene excludes the rule.
fn scene_allows(on: &[String], scene: &str) -> bool {
    on.is_empty() || (!scene.is_empty() && on.iter().any(|s| s == scene))
}

/// Expand a checker spec into `(checker, inline args)` units, one per rule.
fn expand_units(
    spec: &CheckerSpec,
    fields: &[String],
) -> Result<Vec<(CheckerRef, Option<Vec<Value>>)>, RuleError> {
    match spec {
        CheckerSpec::Missing => Err(RuleError::MissingChecker(fields.join(","))),
        CheckerSpec::Name(raw) => {
            let mut units = Vec::new();
            for chunk in raw.split('|').map(str::trim).filter(|c| !c.is_empty()) {
                let (name, inline) = match chunk.split_once(':') {
                    Some((name, rest)) => (name.trim(), Some(parse_inline_args(rest))),
                    None => (chunk, None),
                };
                units.push((CheckerRef::Named(name.to_string()), inline));
            }
            if units.is_empty() {
                return Err(RuleError::MissingChecker(fields.join(",")));
            }
            Ok(units)
        }
        CheckerSpec::Many(list) => {
            let mut units = Vec::new();
            for inner in list {
                units.extend(expand_units(inner, fields)?);
            }
            if units.is_empty() {
                return Err(RuleError::MissingChecker(fields.join(",")));
            }
            Ok(units)
        }
        CheckerSpec::Inline(checker) => Ok(vec![(CheckerRef::Inline(checker.clone()), None)]),
        CheckerSpec::Object(checker) => Ok(vec![(CheckerRef::Object(checker.clone()), None)]),
    }
}

/// Parse `:`-inline arguments as JSON scalars: integer, then float, then a
/// bare string.
pub(crate) fn parse_inline_args(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if let Ok(n) = s.parse::<i64>() {
                json!(n)
            } else if let Ok(f) = s.parse::<f64>() {
                json!(f)
            } else {
                json!(s)
            }
        })
        .collect()
}

/// Fold `min`/`max` options into the positional shape range-paired checkers
/// expect. A `max` without a `min` gets a synthesized floor, so a checker
/// requiring both bounds does not spuriously reject everything.
fn finalize_args(
    traits: CheckerTraits,
    base: Vec<Value>,
    min: &Option<Value>,
    max: &Option<Value>,
) -> Vec<Value> {
    if !traits.contains(CheckerTraits::RANGE_PAIR) {
        return base;
    }
    match (min, max) {
        (None, None) => base,
        (Some(lo), None) => vec![lo.clone()],
        (Some(lo), Some(hi)) => vec![lo.clone(), hi.clone()],
        (None, Some(hi)) => {
            let floor =
                if traits.contains(CheckerTraits::LENGTH_LIKE) { json!(0) } else { json!(i64::MIN) };
            vec![floor, hi.clone()]
        }
    }
}

fn parse_filter_names(value: &Value) -> Vec<FilterRef> {
    parse_name_list(value).into_iter().map(FilterRef::Named).collect()
}

/// A comma-separated string or a JSON array of strings.
fn parse_name_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split([',', '|'])
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => {
            items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[Rule]) -> Vec<String> {
        rules.iter().map(|r| r.checker.label().to_string()).collect()
    }

    #[test]
    fn expands_comma_fields_and_dedups() {
        let specs = vec![RuleSpec::new("tagId, userId,tagId", "required")];
        let rules = compile(&specs, "").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].fields, vec!["tagId", "userId"]);
    }

    #[test]
    fn pipe_checkers_expand_into_rule_groups() {
        let specs = vec![RuleSpec::new("name", "required|string:5,10")];
        let rules = compile(&specs, "").unwrap();
        assert_eq!(names(&rules), vec!["required", "string"]);
        assert_eq!(rules[1].args, vec![json!(5), json!(10)]);
    }

    #[test]
    fn inline_args_parse_as_scalars() {
        let specs = vec![RuleSpec::new("x", "enum:a,1,2.5")];
        let rules = compile(&specs, "").unwrap();
        assert_eq!(rules[0].args, vec![json!("a"), json!(1), json!(2.5)]);
    }

    #[test]
    fn scene_filtering() {
        let specs = vec![
            RuleSpec::new("title", "required").on("create"),
            RuleSpec::new("title", "string"),
        ];

        let create = compile(&specs, "create").unwrap();
        assert_eq!(names(&create), vec!["required", "string"]);

        let update = compile(&specs, "update").unwrap();
        assert_eq!(names(&update), vec!["string"]);

        // An empty active scene never matches a non-empty `on`.
        let bare = compile(&specs, "").unwrap();
        assert_eq!(names(&bare), vec!["string"]);
    }

    #[test]
    fn min_max_options_fold_into_range_pairs() {
        let only_max = compile(&[RuleSpec::new("n", "integer").max(10)], "").unwrap();
        assert_eq!(only_max[0].args, vec![json!(i64::MIN), json!(10)]);

        let length_like = compile(&[RuleSpec::new("s", "string").max(10)], "").unwrap();
        assert_eq!(length_like[0].args, vec![json!(0), json!(10)]);

        let both = compile(&[RuleSpec::new("n", "size").min(1).max(9)], "").unwrap();
        assert_eq!(both[0].args, vec![json!(1), json!(9)]);

        // Non-range checkers keep their positional args untouched.
        let plain = compile(&[RuleSpec::new("s", "email").max(10)], "").unwrap();
        assert!(plain[0].args.is_empty());
    }

    #[test]
    fn wire_entries_extract_options_without_corrupting_args() {
        let spec = RuleSpec::from_json(&json!([
            "role", "enum", ["admin", "editor"],
            {"msg": "bad role", "on": "create,update", "skipOnEmpty": false}
        ]));
        assert_eq!(spec.args, vec![json!(["admin", "editor"])]);
        assert_eq!(spec.message.as_deref(), Some("bad role"));
        assert_eq!(spec.on, vec!["create", "update"]);
        assert_eq!(spec.skip_on_empty, Some(false));

        let rules = compile(&[spec], "create").unwrap();
        assert_eq!(rules[0].args, vec![json!(["admin", "editor"])]);
    }

    #[test]
    fn wire_filter_option() {
        let spec = RuleSpec::from_json(&json!(["name", "string", {"filter": "trim|lower"}]));
        let rules = compile(&[spec], "").unwrap();
        assert_eq!(rules[0].filters.len(), 2);
    }

    #[test]
    fn compilation_failures_are_fatal() {
        let err = compile(&[RuleSpec::new("", "required")], "").unwrap_err();
        assert_eq!(err, RuleError::MissingFields);

        let no_checker = RuleSpec::from_json(&json!(["name"]));
        let err = compile(&[no_checker], "").unwrap_err();
        assert_eq!(err, RuleError::MissingChecker("name".into()));

        let malformed = RuleSpec::from_json(&json!("not an entry"));
        assert!(matches!(compile(&[malformed], ""), Err(RuleError::MalformedEntry(_))));
    }

    #[test]
    fn presence_and_trait_classification() {
        assert!(classify("required").contains(CheckerTraits::PRESENCE));
        assert!(classify("requiredIf").contains(CheckerTraits::PRESENCE));
        assert!(classify("upload").contains(CheckerTraits::PRESENCE));
        assert!(classify("range").contains(CheckerTraits::RANGE_PAIR));
        assert!(classify("len").contains(CheckerTraits::LENGTH_LIKE));
        assert!(classify("email").is_empty());
    }
}
