//! Duration values.
//!
//! Durations are written as `"15s"`, `"1m30s"`, `"250ms"` or `"1.5h"`.
//! Bare numbers, and strings without a unit, are nanoseconds.

use serde_json::Value;

const NANOSECOND: i128 = 1;
const MICROSECOND: i128 = 1_000 * NANOSECOND;
const MILLISECOND: i128 = 1_000 * MICROSECOND;
const SECOND: i128 = 1_000 * MILLISECOND;
const MINUTE: i128 = 60 * SECOND;
const HOUR: i128 = 60 * MINUTE;

/// Longest fraction kept when parsing, in digits.
const MAX_FRACTION_DIGITS: usize = 18;

/// Characters marking a string as carrying a unit.
const UNIT_CHARS: &[char] = &['n', 's', 'u', 'µ', 'm', 'h'];

fn unit_nanos(unit: &str) -> Option<i128> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Parses a duration string into signed nanoseconds.
///
/// # Errors
///
/// Returns a description of the problem if the string is malformed, uses an
/// unknown unit or overflows 64-bit nanoseconds.
pub fn parse_duration(s: &str) -> Result<i128, String> {
    let invalid = || format!("invalid duration \"{s}\"");

    let (negative, mut rest) = if let Some(r) = s.strip_prefix('-') {
        (true, r)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    };

    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, next) = after.split_at(unit_end);
        if unit.is_empty() {
            return Err(format!("missing unit in duration \"{s}\""));
        }
        let scale =
            unit_nanos(unit).ok_or_else(|| format!("unknown unit \"{unit}\" in duration \"{s}\""))?;

        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        if whole > i128::from(i64::MAX) / scale {
            return Err(invalid());
        }
        let mut value = whole * scale;

        if !fraction.is_empty() {
            let digits = fraction.get(..MAX_FRACTION_DIGITS).unwrap_or(fraction);
            let numerator: i128 = digits.parse().map_err(|_| invalid())?;
            let exponent = u32::try_from(digits.len()).map_err(|_| invalid())?;
            let part = numerator
                .checked_mul(scale)
                .and_then(|n| n.checked_div(10i128.pow(exponent)))
                .ok_or_else(invalid)?;
            value = value.checked_add(part).ok_or_else(invalid)?;
        }

        total = total.checked_add(value).ok_or_else(invalid)?;
        if total > i128::from(i64::MAX) {
            return Err(invalid());
        }
        rest = next;
    }

    Ok(if negative { -total } else { total })
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Converts a configuration value into signed nanoseconds.
///
/// # Errors
///
/// Returns a description of the problem if the value is not a duration.
pub fn to_nanos(value: &Value) -> Result<i128, String> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(i128::from(v))
            } else if let Some(v) = n.as_u64() {
                Ok(i128::from(v))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    // truncation matches integer nanoseconds
                    .map(|f| f.trunc() as i128)
                    .ok_or_else(|| format!("unable to cast {n} to duration"))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.contains(UNIT_CHARS) {
                parse_duration(s)
            } else {
                parse_duration(&format!("{s}ns"))
            }
        }
        other => Err(format!("unable to cast {other} to duration")),
    }
}
