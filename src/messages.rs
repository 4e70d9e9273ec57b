//! Error message templates.
//!
//! The engine renders one message per failing rule-field pair. Template
//! lookup walks a precedence chain, most specific first:
//!
//! 1. the rule's own `msg` option;
//! 2. a per-run override keyed `"field.checker"`;
//! 3. a per-run override keyed by the checker name as written;
//! 4. a per-run override keyed by the canonical checker name;
//! 5. the default template table (canonical names only);
//! 6. the global fallback.
//!
//! Default entries may be arity-indexed: one template per argument count,
//! with the last entry covering any surplus. Placeholders are `{attr}` (the
//! translated field name), `{value0}`, `{value1}`, ... (stringified
//! positional args) and `{min}`/`{max}` as aliases for the first two.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::checkers;

const FALLBACK: &str = "{attr} did not pass validate";

static DEFAULTS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("required", &["{attr} is required and must not be empty"] as &[&str]),
        ("requiredIf", &["{attr} is required and must not be empty"]),
        ("requiredUnless", &["{attr} is required and must not be empty"]),
        ("requiredWith", &["{attr} is required and must not be empty"]),
        ("requiredWithout", &["{attr} is required and must not be empty"]),
        ("upload", &["{attr} must be a successfully uploaded file"]),
        (
            "integer",
            &[
                "{attr} must be an integer",
                "{attr} must be an integer of at least {min}",
                "{attr} must be an integer between {min} and {max}",
            ],
        ),
        (
            "number",
            &[
                "{attr} must be a non-negative number",
                "{attr} must be a number of at least {min}",
                "{attr} must be a number between {min} and {max}",
            ],
        ),
        (
            "float",
            &[
                "{attr} must be a number",
                "{attr} must be a number of at least {min}",
                "{attr} must be a number between {min} and {max}",
            ],
        ),
        (
            "string",
            &[
                "{attr} must be a string",
                "{attr} must be a string of at least {min} characters",
                "{attr} must be a string between {min} and {max} characters long",
            ],
        ),
        (
            "size",
            &[
                "{attr} size validation failed",
                "{attr} size must be at least {min}",
                "{attr} size must be between {min} and {max}",
            ],
        ),
        (
            "length",
            &[
                "{attr} length validation failed",
                "{attr} length must be at least {min}",
                "{attr} length must be between {min} and {max}",
            ],
        ),
        ("boolean", &["{attr} must be a boolean"]),
        ("array", &["{attr} must be a list"]),
        ("list", &["{attr} must be a list"]),
        ("map", &["{attr} must be a map"]),
        ("json", &["{attr} must be a valid JSON string"]),
        ("enum", &["{attr} must be one of: {value0}"]),
        ("notIn", &["{attr} must not be one of: {value0}"]),
        ("eq", &["{attr} must be equal to {value0}"]),
        ("notEq", &["{attr} must not be equal to {value0}"]),
        ("gt", &["{attr} must be greater than {value0}"]),
        ("gte", &["{attr} must be at least {value0}"]),
        ("lt", &["{attr} must be less than {value0}"]),
        ("lte", &["{attr} must be no more than {value0}"]),
        ("min", &["{attr} must be at least {value0}"]),
        ("max", &["{attr} must be no more than {value0}"]),
        ("distinct", &["{attr} must not contain duplicates"]),
        ("contains", &["{attr} must contain {value0}"]),
        ("startWith", &["{attr} must start with {value0}"]),
        ("endWith", &["{attr} must end with {value0}"]),
        ("accepted", &["{attr} must be accepted"]),
        ("email", &["{attr} must be a valid email address"]),
        ("url", &["{attr} must be a valid URL"]),
        ("ip", &["{attr} must be a valid IP address"]),
        ("ipv4", &["{attr} must be a valid IPv4 address"]),
        ("ipv6", &["{attr} must be a valid IPv6 address"]),
        ("alpha", &["{attr} may only contain letters"]),
        ("alphaNum", &["{attr} may only contain letters and digits"]),
        ("alphaDash", &["{attr} may only contain letters, digits, dashes and underscores"]),
        ("regexp", &["{attr} does not match the required pattern"]),
        ("date", &["{attr} must be a valid date"]),
        ("dateFormat", &["{attr} must be a date in the format {value0}"]),
        ("afterDate", &["{attr} must be a date after {value0}"]),
        ("beforeDate", &["{attr} must be a date before {value0}"]),
    ])
});

/// Render the message for one failing rule-field pair.
pub(crate) fn resolve_message(
    overrides: &HashMap<String, String>,
    translates: &HashMap<String, String>,
    rule_message: Option<&str>,
    checker: &str,
    field: &str,
    args: &[Value],
) -> String {
    let canonical = checkers::canonical(checker);

    let template: &str = if let Some(msg) = rule_message {
        msg
    } else if let Some(msg) = overrides.get(&format!("{field}.{checker}")) {
        msg
    } else if let Some(msg) = overrides.get(checker) {
        msg
    } else if let Some(msg) = overrides.get(canonical) {
        msg
    } else if let Some(templates) = DEFAULTS.get(canonical) {
        templates[args.len().min(templates.len() - 1)]
    } else {
        FALLBACK
    };

    let attr = translates.get(field).map(String::as_str).unwrap_or(field);
    fill(template, attr, args)
}

fn fill(template: &str, attr: &str, args: &[Value]) -> String {
    let mut out = template.replace("{attr}", attr);
    if let Some(first) = args.first() {
        out = out.replace("{min}", &stringify(first));
    }
    if let Some(second) = args.get(1) {
        out = out.replace("{max}", &stringify(second));
    }
    for (idx, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{value{idx}}}"), &stringify(arg));
    }
    out
}

/// Human-facing rendering of a template argument: strings unquoted, lists
/// comma-joined.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            items.iter().map(stringify).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}
