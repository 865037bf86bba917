//! Configuration tree.
//!
//! A document of named sections and values addressed by dotted keys.
//! Environment variables named `NEOFS_<KEY>` (dots replaced by underscores,
//! upper-cased) take precedence over document values.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ConfigError;

/// Prefix of overriding environment variables.
pub const ENV_PREFIX: &str = "NEOFS";

/// Separator of key sections.
pub const SEPARATOR: &str = ".";

/// Separator replacing [`SEPARATOR`] in environment variable names.
pub const ENV_SEPARATOR: &str = "_";

/// Group of named values structured as a tree.
///
/// Sub-trees are named sections, leaves are values. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Config {
    root: Arc<Value>,
    path: Vec<String>,
    env: Arc<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_env(Value::Null, Vec::new())
    }
}

impl Config {
    /// Creates a tree over `document`, overridden by the process environment.
    ///
    /// The environment is captured once, at construction.
    #[must_use]
    pub fn new(document: Value) -> Self {
        let prefix = format!("{ENV_PREFIX}{ENV_SEPARATOR}");
        Self::with_env(
            document,
            std::env::vars().filter(|(name, _)| name.starts_with(&prefix)),
        )
    }

    /// Creates a tree over `document` with an explicit environment.
    #[must_use]
    pub fn with_env<I>(document: Value, env: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            root: Arc::new(document),
            path: Vec::new(),
            env: Arc::new(env.into_iter().collect()),
        }
    }

    /// Reads a JSON document from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&data)
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let document = serde_json::from_str(data).map_err(|e| ConfigError::Read(e.to_string()))?;
        Ok(Self::new(document))
    }

    /// Returns the sub-tree named `name`.
    #[must_use]
    pub fn sub(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.extend(name.split(SEPARATOR).map(str::to_string));
        Self {
            root: Arc::clone(&self.root),
            path,
            env: Arc::clone(&self.env),
        }
    }

    /// Returns the dotted path of this sub-tree, empty for the root.
    #[must_use]
    pub fn path(&self) -> String {
        self.path.join(SEPARATOR)
    }

    /// Returns the full dotted key of `key` relative to this sub-tree.
    #[must_use]
    pub fn full_key(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}{SEPARATOR}{key}", self.path())
        }
    }

    /// Returns the environment variable name overriding `key`.
    #[must_use]
    pub fn env_name(&self, key: &str) -> String {
        format!(
            "{ENV_PREFIX}{ENV_SEPARATOR}{}",
            self.full_key(key)
                .replace(SEPARATOR, ENV_SEPARATOR)
                .to_uppercase()
        )
    }

    /// Returns the value under `key`, environment first.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.env.get(&self.env_name(key)) {
            return Some(Value::String(v.clone()));
        }

        let full = self.full_key(key);
        let mut node: &Value = &self.root;
        for segment in full.split(SEPARATOR) {
            node = lookup(node, segment)?;
        }
        (!node.is_null()).then(|| node.clone())
    }

    /// Returns true if `key` holds a value or a section.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.value(key).is_some()
    }
}

// keys are matched case-insensitively
fn lookup<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    let map = node.as_object()?;
    map.get(segment).or_else(|| {
        map.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(segment))
            .map(|(_, v)| v)
    })
}
