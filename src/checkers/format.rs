//! Format checkers: string shapes, network addresses and dates.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub(crate) fn email(value: &Value, _args: &[Value]) -> bool {
    value
        .as_str()
        .is_some_and(|s| regex!(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").is_match(s))
}

pub(crate) fn url(value: &Value, _args: &[Value]) -> bool {
    value
        .as_str()
        .is_some_and(|s| regex!(r"^https?://[^\s/$.?#].[^\s]*$").is_match(s))
}

pub(crate) fn ip(value: &Value, _args: &[Value]) -> bool {
    value.as_str().is_some_and(|s| s.parse::<IpAddr>().is_ok())
}

pub(crate) fn ipv4(value: &Value, _args: &[Value]) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok())
}

pub(crate) fn ipv6(value: &Value, _args: &[Value]) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv6Addr>().is_ok())
}

pub(crate) fn alpha(value: &Value, _args: &[Value]) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()))
}

pub(crate) fn alpha_num(value: &Value, _args: &[Value]) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub(crate) fn alpha_dash(value: &Value, _args: &[Value]) -> bool {
    value.as_str().is_some_and(|s| {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// Match against a caller-supplied pattern. The pattern comes from the rule
/// table, not user input, so a bad pattern is a rule-table bug and simply
/// fails the check.
pub(crate) fn regexp(value: &Value, args: &[Value]) -> bool {
    let (Some(s), Some(pattern)) = (value.as_str(), args.first().and_then(Value::as_str)) else {
        return false;
    };
    regex::Regex::new(pattern).is_ok_and(|re| re.is_match(s))
}

/// Any of the date shapes this engine accepts: RFC 3339, `Y-m-d H:M:S`,
/// or a bare `Y-m-d`.
pub(crate) fn date(value: &Value, _args: &[Value]) -> bool {
    value.as_str().is_some_and(|s| parse_date(s).is_some())
}

/// Strict match against one chrono format string.
pub(crate) fn date_format(value: &Value, args: &[Value]) -> bool {
    let (Some(s), Some(fmt)) = (value.as_str(), args.first().and_then(Value::as_str)) else {
        return false;
    };
    NaiveDateTime::parse_from_str(s, fmt).is_ok() || NaiveDate::parse_from_str(s, fmt).is_ok()
}

pub(crate) fn after_date(value: &Value, args: &[Value]) -> bool {
    date_pair(value, args).is_some_and(|(v, other)| v > other)
}

pub(crate) fn before_date(value: &Value, args: &[Value]) -> bool {
    date_pair(value, args).is_some_and(|(v, other)| v < other)
}

fn date_pair(value: &Value, args: &[Value]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let v = value.as_str().and_then(parse_date)?;
    let other = args.first().and_then(Value::as_str).and_then(parse_date)?;
    Some((v, other))
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}
