use thiserror::Error;

/// Programmer errors raised by [`crate::Validation::validate`].
///
/// Normal validation failures never surface here; they are recorded as
/// [`crate::ErrorEntry`] values and queried through `is_fail()`/`errors()`.
/// This taxonomy covers malformed rule tables and unresolvable names only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A rule entry had an empty or missing field list.
    #[error("rule entry is missing a field list")]
    MissingFields,

    /// A rule entry for the named fields had no checker.
    #[error("rule for \"{0}\" is missing a checker")]
    MissingChecker(String),

    /// A rule entry was not the expected `[fields, checker, ...]` shape.
    #[error("malformed rule entry: {0}")]
    MalformedEntry(String),

    /// A named checker resolved to nothing through any lookup tier.
    #[error("unknown checker \"{0}\"")]
    UnknownChecker(String),

    /// A named filter resolved to nothing through any lookup tier.
    #[error("unknown filter \"{0}\"")]
    UnknownFilter(String),

    /// The record being validated was not a map at the top level.
    #[error("validation data must be a map at the top level")]
    NonMapData,
}
