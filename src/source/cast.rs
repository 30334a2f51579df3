//! Conversions from raw YAML values to the typed results served by the cache.
//!
//! These are lenient by contract: an absent or unconvertible value becomes
//! the target type's zero value instead of an error.

use std::time::Duration;

use serde_yaml::{Number, Value};

use super::path_ops::untag;

const NANOS_PER_SECOND: f64 = 1e9;

/// Converts a raw value to a string
pub fn to_string(raw: Option<&Value>) -> String {
    match raw.map(untag) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_to_string(n),
        _ => String::new(),
    }
}

/// Converts a raw value to a bool
pub fn to_bool(raw: Option<&Value>) -> bool {
    match raw.map(untag) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => parse_bool(s.trim()).unwrap_or(false),
        _ => false,
    }
}

/// Converts a raw value to a signed 64-bit integer
pub fn to_i64(raw: Option<&Value>) -> i64 {
    match raw.map(untag) {
        Some(Value::Number(n)) => number_to_i64(n),
        Some(Value::Bool(b)) => i64::from(*b),
        Some(Value::String(s)) => parse_int(s).unwrap_or(0),
        _ => 0,
    }
}

/// Converts a raw value to a platform-width integer
pub fn to_isize(raw: Option<&Value>) -> isize {
    to_i64(raw) as isize
}

/// Converts a raw value to a 32-bit integer, wrapping out-of-range values
pub fn to_i32(raw: Option<&Value>) -> i32 {
    to_i64(raw) as i32
}

/// Converts a raw value to a float
pub fn to_f64(raw: Option<&Value>) -> f64 {
    match raw.map(untag) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Converts a raw value to a duration
///
/// Numbers are nanoseconds. Strings containing a unit are parsed as
/// durations such as `1h30m` or `250ms`; bare numeric strings are
/// nanoseconds. Negative and malformed values become zero.
pub fn to_duration(raw: Option<&Value>) -> Duration {
    match raw.map(untag) {
        Some(Value::Number(n)) => {
            if let Some(nanos) = n.as_u64() {
                Duration::from_nanos(nanos)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f > 0.0)
                    .and_then(|f| Duration::try_from_secs_f64(f / NANOS_PER_SECOND).ok())
                    .unwrap_or_default()
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            let parsed = if s.contains(['n', 's', 'u', 'µ', 'μ', 'm', 'h']) {
                parse_duration(s)
            } else {
                parse_duration(&format!("{s}ns"))
            };
            parsed.unwrap_or_default()
        }
        _ => Duration::ZERO,
    }
}

/// Converts a raw value to a list of strings
///
/// Sequences convert element-wise; a plain string is split on whitespace.
pub fn to_string_slice(raw: Option<&Value>) -> Vec<String> {
    match raw.map(untag) {
        Some(Value::Sequence(items)) => items.iter().map(|item| to_string(Some(item))).collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Returns the raw value itself, with `Null` standing in for an absent key
pub fn to_raw(raw: Option<&Value>) -> Value {
    raw.cloned().unwrap_or(Value::Null)
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

fn number_to_i64(n: &Number) -> i64 {
    if let Some(i) = n.as_i64() {
        i
    } else if let Some(u) = n.as_u64() {
        u as i64
    } else {
        n.as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
            .unwrap_or(0)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses an integer literal, honouring `0x`/`0o`/`0b` prefixes and a
/// leading-zero octal form. A decimal tail of only zeros is accepted.
fn parse_int(s: &str) -> Option<i64> {
    let s = trim_zero_decimal(s.trim());
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

fn trim_zero_decimal(s: &str) -> &str {
    match s.split_once('.') {
        Some((whole, fraction)) if !whole.is_empty() && fraction.bytes().all(|b| b == b'0') => {
            whole
        }
        _ => s,
    }
}

/// Parses a duration string such as `300ms`, `1.5h` or `2h45m30s`
///
/// Returns `None` for malformed input, for negative durations and for
/// durations past `u64::MAX` nanoseconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let (negative, mut rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        if number.is_empty() || number == "." {
            return None;
        }
        let amount: f64 = number.parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_nanos(&rest[..unit_end])?;
        rest = &rest[unit_end..];

        total_nanos += amount * scale;
    }

    if negative {
        return if total_nanos == 0.0 {
            Some(Duration::ZERO)
        } else {
            None
        };
    }

    let total_nanos = total_nanos.round();
    if !total_nanos.is_finite() || total_nanos >= u64::MAX as f64 {
        return None;
    }

    Some(Duration::from_nanos(total_nanos as u64))
}

fn unit_nanos(unit: &str) -> Option<f64> {
    let scale = match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60.0 * 1e9,
        "h" => 3600.0 * 1e9,
        _ => return None,
    };
    Some(scale)
}
