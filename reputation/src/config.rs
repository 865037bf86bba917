//! Reputation processor configuration.
//!
//! Reads the worker pool size and the notary switch from the node
//! configuration tree.

use innerring_config::{optional, Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Pool size key.
pub const POOL_SIZE_KEY: &str = "workers.reputation";

/// Notary switch key.
pub const WITHOUT_NOTARY_KEY: &str = "without_notary";

const POOL_SIZE_DESC: &str = "reputation worker pool size";

/// Configuration for the reputation processor.
///
/// There is no default pool size: it must always be configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Number of concurrent workers.
    pub pool_size: usize,

    /// Whether the network runs without notary, enabling direct
    /// notifications.
    pub notary_disabled: bool,
}

impl ReputationConfig {
    /// Largest accepted pool size.
    pub const MAX_POOL_SIZE: u64 = i32::MAX as u64;

    /// Creates a configuration with the given pool size and notary enabled.
    #[must_use]
    pub const fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            notary_disabled: false,
        }
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Sets the notary switch.
    #[must_use]
    pub const fn with_notary_disabled(mut self, disabled: bool) -> Self {
        self.notary_disabled = disabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool size is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = u64::try_from(self.pool_size).unwrap_or(u64::MAX);
        if size == 0 || size > Self::MAX_POOL_SIZE {
            return Err(ConfigError::invalid(
                POOL_SIZE_DESC,
                POOL_SIZE_KEY,
                "unsigned integer",
                format!("out of allowable range [1:{}]", Self::MAX_POOL_SIZE),
            ));
        }
        Ok(())
    }

    /// Reads the configuration from the node configuration tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool size is absent or out of range, or the
    /// notary switch is not a boolean.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let size = cfg.uint64_range(POOL_SIZE_KEY, POOL_SIZE_DESC, 1, Self::MAX_POOL_SIZE)?;
        let pool_size = usize::try_from(size).map_err(|_| {
            ConfigError::invalid(
                POOL_SIZE_DESC,
                &cfg.full_key(POOL_SIZE_KEY),
                "unsigned integer",
                "does not fit the platform",
            )
        })?;

        let notary_disabled =
            optional(cfg.bool(WITHOUT_NOTARY_KEY, "flag to work without notary"))?.unwrap_or(false);

        Ok(Self {
            pool_size,
            notary_disabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg(document: serde_json::Value) -> Config {
        Config::with_env(document, Vec::new())
    }

    #[test]
    fn test_from_config() {
        let c = ReputationConfig::from_config(&cfg(json!({
            "workers": {"reputation": 10},
            "without_notary": true,
        })))
        .expect("config");

        assert_eq!(c, ReputationConfig::new(10).with_notary_disabled(true));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_config_notary_default() {
        let c = ReputationConfig::from_config(&cfg(json!({"workers": {"reputation": 2}})))
            .expect("config");
        assert!(!c.notary_disabled);
    }

    #[test]
    fn test_from_config_env_override() {
        let c = ReputationConfig::from_config(&Config::with_env(
            json!({"workers": {"reputation": 2}}),
            vec![
                ("NEOFS_WORKERS_REPUTATION".to_string(), "8".to_string()),
                ("NEOFS_WITHOUT_NOTARY".to_string(), "true".to_string()),
            ],
        ))
        .expect("config");

        assert_eq!(c.pool_size, 8);
        assert!(c.notary_disabled);
    }

    #[test]
    fn test_pool_size_required() {
        let err = ReputationConfig::from_config(&cfg(json!({}))).unwrap_err();

        assert!(err.is_missing());
        assert_eq!(
            err.to_string(),
            "invalid reputation worker pool size 'workers.reputation' (unsigned integer): config value is missing"
        );
    }

    #[test]
    fn test_pool_size_range() {
        assert!(ReputationConfig::from_config(&cfg(json!({"workers": {"reputation": 0}}))).is_err());
        assert!(ReputationConfig::from_config(&cfg(json!({"workers": {"reputation": -4}}))).is_err());
        assert!(ReputationConfig::new(0).validate().is_err());
        assert!(ReputationConfig::new(1).validate().is_ok());
    }

    #[test]
    fn test_malformed_notary_flag() {
        let err = ReputationConfig::from_config(&cfg(json!({
            "workers": {"reputation": 1},
            "without_notary": "sometimes",
        })))
        .unwrap_err();

        assert!(err.to_string().ends_with("neither true nor false"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = ReputationConfig::new(3).with_pool_size(4);
        let json = serde_json::to_string(&c).expect("serialize");
        let back: ReputationConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, c);
    }
}
