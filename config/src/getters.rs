//! Typed configuration getters.
//!
//! Every getter reports errors as `invalid <desc> '<key>' (<type>): <reason>`.
//! Absent values produce [`ConfigError::Missing`] so that callers can tell
//! optional settings apart from malformed ones.

use std::collections::BTreeMap;
use std::net::Ipv6Addr;
use std::time::Duration;

use serde_json::Value;

use crate::duration::to_nanos;
use crate::error::ConfigError;
use crate::keys::PublicKey;
use crate::tree::Config;

const KIND_UINT: &str = "unsigned integer";
const KIND_DURATION: &str = "duration";
const KIND_BOOL: &str = "boolean";
const KIND_STRING: &str = "string";
const KIND_STRINGS: &str = "string array";
const KIND_KEYS: &str = "public keys";
const KIND_TCP: &str = "TCP addresses";
const KIND_MAP: &str = "dictionary";

impl Config {
    fn require(&self, key: &str, desc: &str, kind: &'static str) -> Result<Value, ConfigError> {
        self.value(key)
            .ok_or_else(|| ConfigError::missing(desc, &self.full_key(key), kind))
    }

    fn invalid(&self, key: &str, desc: &str, kind: &'static str, reason: String) -> ConfigError {
        ConfigError::invalid(desc, &self.full_key(key), kind, reason)
    }

    /// Reads an unsigned integer in `[min:max]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent, not an unsigned integer or
    /// out of range. Floats are rejected rather than truncated.
    pub fn uint64_range(&self, key: &str, desc: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
        let value = self.require(key, desc, KIND_UINT)?;
        let v = to_u64(&value).map_err(|reason| self.invalid(key, desc, KIND_UINT, reason))?;
        if v < min || v > max {
            return Err(self.invalid(
                key,
                desc,
                KIND_UINT,
                format!("out of allowable range [{min}:{max}]"),
            ));
        }
        Ok(v)
    }

    /// Reads an unsigned integer not above `max`.
    ///
    /// # Errors
    ///
    /// See [`Config::uint64_range`].
    pub fn uint64_max(&self, key: &str, desc: &str, max: u64) -> Result<u64, ConfigError> {
        self.uint64_range(key, desc, 0, max)
    }

    /// Reads a strictly positive duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent, malformed or not positive.
    pub fn duration_positive(&self, key: &str, desc: &str) -> Result<Duration, ConfigError> {
        let value = self.require(key, desc, KIND_DURATION)?;
        let nanos = to_nanos(&value).map_err(|reason| self.invalid(key, desc, KIND_DURATION, reason))?;
        if nanos <= 0 {
            return Err(self.invalid(key, desc, KIND_DURATION, "must be positive".to_string()));
        }
        let nanos = u64::try_from(nanos)
            .map_err(|_| self.invalid(key, desc, KIND_DURATION, "duration overflow".to_string()))?;
        Ok(Duration::from_nanos(nanos))
    }

    /// Reads a boolean written exactly as `true` or `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent or anything else.
    pub fn bool(&self, key: &str, desc: &str) -> Result<bool, ConfigError> {
        let value = self.require(key, desc, KIND_BOOL)?;
        match value_to_string(&value).unwrap_or_default().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.invalid(key, desc, KIND_BOOL, "neither true nor false".to_string())),
        }
    }

    /// Reads a non-empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent, empty or not a scalar.
    pub fn string(&self, key: &str, desc: &str) -> Result<String, ConfigError> {
        let value = self.require(key, desc, KIND_STRING)?;
        let s = value_to_string(&value).map_err(|reason| self.invalid(key, desc, KIND_STRING, reason))?;
        if s.is_empty() {
            return Err(ConfigError::missing(desc, &self.full_key(key), KIND_STRING));
        }
        Ok(s)
    }

    /// Reads a list of strings.
    ///
    /// A single string is split on whitespace, the form used by environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent or not a list of scalars.
    pub fn strings(&self, key: &str, desc: &str) -> Result<Vec<String>, ConfigError> {
        let value = self.require(key, desc, KIND_STRINGS)?;
        match &value {
            Value::Array(items) => items
                .iter()
                .map(value_to_string)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| self.invalid(key, desc, KIND_STRINGS, reason)),
            Value::String(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
            other => Err(self.invalid(
                key,
                desc,
                KIND_STRINGS,
                format!("unable to cast {other} to string array"),
            )),
        }
    }

    /// Reads a list of hex-encoded compressed public keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is absent or any key is malformed.
    pub fn public_keys(&self, key: &str, desc: &str) -> Result<Vec<PublicKey>, ConfigError> {
        self.strings(key, desc)?
            .iter()
            .map(|s| s.parse::<PublicKey>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| self.invalid(key, desc, KIND_KEYS, reason))
    }

    /// Reads a list of `host:port` network addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is absent or any address is malformed.
    pub fn addresses_tcp(&self, key: &str, desc: &str) -> Result<Vec<String>, ConfigError> {
        let addresses = self.strings(key, desc)?;
        for address in &addresses {
            validate_tcp_address(address).map_err(|reason| self.invalid(key, desc, KIND_TCP, reason))?;
        }
        Ok(addresses)
    }

    /// Visits every element of a dictionary in key order.
    ///
    /// Stops at the first element `f` rejects.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent, not a dictionary, or `f`
    /// rejects an element.
    pub fn map<F>(&self, key: &str, desc: &str, mut f: F) -> Result<(), ConfigError>
    where
        F: FnMut(&str, &Value) -> Result<(), String>,
    {
        let value = self.require(key, desc, KIND_MAP)?;
        let Value::Object(entries) = &value else {
            return Err(self.invalid(
                key,
                desc,
                KIND_MAP,
                format!("unable to cast {value} to dictionary"),
            ));
        };

        let mut names: Vec<&String> = entries.keys().collect();
        names.sort();
        for name in names {
            if let Some(element) = entries.get(name) {
                f(name, element).map_err(|reason| {
                    self.invalid(key, desc, KIND_MAP, format!("invalid element '{name}': {reason}"))
                })?;
            }
        }
        Ok(())
    }

    /// Reads a dictionary of non-negative integers not above `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is absent, a name is empty, or an
    /// element is not an integer within the limit.
    pub fn map_uint32(&self, key: &str, desc: &str, limit: u64) -> Result<BTreeMap<String, u32>, ConfigError> {
        let mut res = BTreeMap::new();
        self.map(key, desc, |name, value| {
            if name.is_empty() {
                return Err("empty key".to_string());
            }
            let v = to_u64(value)?;
            if v > limit {
                return Err(format!("value {v} overflows limit {limit}"));
            }
            let v = u32::try_from(v).map_err(|_| format!("value {v} overflows limit {}", u32::MAX))?;
            res.insert(name.to_string(), v);
            Ok(())
        })?;
        Ok(res)
    }
}

/// Converts a scalar value into an unsigned integer.
///
/// # Errors
///
/// Returns a description of the problem for negatives, floats and
/// non-numeric values.
pub fn to_u64(value: &Value) -> Result<u64, String> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.is_i64() {
                Err(format!("unable to cast {n} to unsigned integer: negative value"))
            } else {
                Err(format!("unable to cast {n} of type float to unsigned integer"))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().map_err(|_| {
                let negative = s
                    .strip_prefix('-')
                    .is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()));
                if negative {
                    format!("unable to cast \"{s}\" to unsigned integer: negative value")
                } else {
                    format!("unable to cast \"{s}\" to unsigned integer")
                }
            })
        }
        Value::Bool(b) => Ok(u64::from(*b)),
        other => Err(format!("unable to cast {other} to unsigned integer")),
    }
}

fn value_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unable to cast {other} to string")),
    }
}

fn validate_tcp_address(address: &str) -> Result<(), String> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("address {address}: missing port in address"))?;

    if let Some(bracketed) = host.strip_prefix('[') {
        let inner = bracketed
            .strip_suffix(']')
            .ok_or_else(|| format!("address {address}: missing ']' in address"))?;
        inner
            .parse::<Ipv6Addr>()
            .map_err(|_| format!("address {address}: invalid IPv6 host"))?;
    } else if host.contains(':') {
        return Err(format!("address {address}: too many colons in address"));
    }

    port.parse::<u16>()
        .map_err(|_| format!("address {address}: invalid port"))?;
    Ok(())
}
