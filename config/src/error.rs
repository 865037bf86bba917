//! Configuration errors.

use thiserror::Error;

/// Reason reported for absent values.
pub const MISSING_REASON: &str = "config value is missing";

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required value is absent.
    #[error("invalid {desc} '{key}' ({kind}): config value is missing")]
    Missing {
        /// Human-readable description of the value.
        desc: String,
        /// Full dotted key.
        key: String,
        /// Expected value type.
        kind: &'static str,
    },

    /// A value is present but malformed or out of range.
    #[error("invalid {desc} '{key}' ({kind}): {reason}")]
    Invalid {
        /// Human-readable description of the value.
        desc: String,
        /// Full dotted key.
        key: String,
        /// Expected value type.
        kind: &'static str,
        /// What is wrong with the value.
        reason: String,
    },

    /// A required section is absent.
    #[error("missing root section '{0}'")]
    MissingSection(String),

    /// The storage section is absent.
    #[error("missing storage section '{0}'")]
    MissingStorageSection(String),

    /// The storage type is absent.
    #[error("missing storage type '{0}'")]
    MissingStorageType(String),

    /// The storage type is not supported.
    #[error("unsupported storage type '{key}': '{value}'")]
    UnsupportedStorage {
        /// Storage type key.
        key: String,
        /// Configured type.
        value: String,
    },

    /// A file-backed storage has no path.
    #[error("missing path to the {engine} '{key}'")]
    MissingStoragePath {
        /// Storage engine name.
        engine: &'static str,
        /// Storage path key.
        key: String,
    },

    /// The committee list is empty.
    #[error("empty committee members '{0}'")]
    EmptyCommittee(String),

    /// TLS is enabled without a required file.
    #[error("RPC TLS setup is enabled but no {what} ('{key}') is provided")]
    MissingTlsFile {
        /// Missing item, `certificate` or `key`.
        what: &'static str,
        /// Config key of the file.
        key: String,
    },

    /// The configuration document could not be loaded.
    #[error("failed to read config: {0}")]
    Read(String),
}

impl ConfigError {
    /// Creates a missing-value error.
    #[must_use]
    pub fn missing(desc: &str, key: &str, kind: &'static str) -> Self {
        Self::Missing {
            desc: desc.to_string(),
            key: key.to_string(),
            kind,
        }
    }

    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(desc: &str, key: &str, kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            desc: desc.to_string(),
            key: key.to_string(),
            kind,
            reason: reason.into(),
        }
    }

    /// Returns true if the error reports an absent value.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Converts a missing-value error into `None`, keeping other errors.
///
/// # Errors
///
/// Returns the original error unless it reports an absent value.
pub fn optional<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ConfigError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_missing() => Ok(None),
        Err(e) => Err(e),
    }
}
