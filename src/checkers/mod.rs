//! Built-in checker catalogue.
//!
//! These are the canonical static library functions sitting at the last tier
//! of the lookup chain. Every checker is a pure `fn(&Value, &[Value]) -> bool`
//! keyed by its canonical wire name; short and legacy names go through the
//! alias table first (`int` → `integer`, `range` → `size`, ...).
//!
//! Presence-style checkers live in `scoped.rs` with a different signature:
//! they receive the record and the field name because they must distinguish
//! "absent" from "empty", which a resolved value can no longer express.
//!
//! The engine only knows these functions by name and arity; nothing in here
//! influences rule ordering or control flow.

pub(crate) mod compare;
pub(crate) mod format;
pub(crate) mod scoped;
pub(crate) mod types;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{CheckerFn, ScopedFn};

/// Short/legacy name -> canonical name.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("int", "integer"),
        ("num", "number"),
        ("bool", "boolean"),
        ("str", "string"),
        ("arr", "array"),
        ("range", "size"),
        ("between", "size"),
        ("in", "enum"),
        ("len", "length"),
        ("equal", "eq"),
        ("mustBe", "eq"),
        ("notEqual", "notEq"),
        ("notBe", "notEq"),
        ("ne", "notEq"),
        ("greaterThan", "gt"),
        ("lessThan", "lt"),
        ("regex", "regexp"),
        ("ips", "ip"),
        ("uploadedFile", "upload"),
    ])
});

static BUILTINS: Lazy<HashMap<&'static str, CheckerFn>> = Lazy::new(|| {
    HashMap::from([
        // type checks
        ("integer", types::integer as CheckerFn),
        ("number", types::number),
        ("float", types::float),
        ("string", types::string),
        ("boolean", types::boolean),
        ("array", types::array),
        ("list", types::list),
        ("map", types::map),
        ("json", types::json),
        // comparisons and sizes
        ("enum", compare::one_of),
        ("notIn", compare::not_in),
        ("eq", compare::eq),
        ("notEq", compare::not_eq),
        ("gt", compare::gt),
        ("gte", compare::gte),
        ("lt", compare::lt),
        ("lte", compare::lte),
        ("min", compare::min),
        ("max", compare::max),
        ("size", compare::size),
        ("length", compare::length),
        ("distinct", compare::distinct),
        ("contains", compare::contains),
        ("startWith", compare::start_with),
        ("endWith", compare::end_with),
        ("accepted", compare::accepted),
        // formats
        ("email", format::email),
        ("url", format::url),
        ("ip", format::ip),
        ("ipv4", format::ipv4),
        ("ipv6", format::ipv6),
        ("alpha", format::alpha),
        ("alphaNum", format::alpha_num),
        ("alphaDash", format::alpha_dash),
        ("regexp", format::regexp),
        ("date", format::date),
        ("dateFormat", format::date_format),
        ("afterDate", format::after_date),
        ("beforeDate", format::before_date),
    ])
});

static SCOPED: Lazy<HashMap<&'static str, ScopedFn>> = Lazy::new(|| {
    HashMap::from([
        ("required", scoped::required as ScopedFn),
        ("requiredIf", scoped::required_if),
        ("requiredUnless", scoped::required_unless),
        ("requiredWith", scoped::required_with),
        ("requiredWithout", scoped::required_without),
        ("upload", scoped::upload),
    ])
});

/// Resolve a short/legacy name to its canonical form.
pub(crate) fn canonical<'a>(name: &'a str) -> &'a str {
    ALIASES.get(name).copied().unwrap_or(name)
}

pub(crate) fn builtin(name: &str) -> Option<CheckerFn> {
    BUILTINS.get(canonical(name)).copied()
}

pub(crate) fn scoped(name: &str) -> Option<ScopedFn> {
    SCOPED.get(canonical(name)).copied()
}
