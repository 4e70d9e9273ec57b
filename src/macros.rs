#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a declarative rule table from bracketed entries.
///
/// Each entry follows the wire grammar `[fields, checker, ...args, {options}]`
/// and is lowered through `serde_json::json!`, so inline option objects work
/// as-is:
///
/// ```
/// use validus::rules;
///
/// let table = rules![
///     ["tagId,userId", "required"],
///     ["userId", "number"],
///     ["name", "string", {"min": 1, "max": 32}],
///     ["role", "enum", ["admin", "editor"], {"on": "create"}],
/// ];
/// assert_eq!(table.len(), 4);
/// ```
///
/// Malformed entries are accepted here and rejected when the table is
/// compiled, so rule-table errors surface from `validate()` rather than at
/// construction.
#[macro_export]
macro_rules! rules {
    ( $( $entry:tt ),* $(,)? ) => {
        vec![ $( $crate::RuleSpec::from_json(&::serde_json::json!($entry)) ),* ]
    };
}
