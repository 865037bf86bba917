//! Network settings applied on FS chain auto-deployment.

use serde::{Deserialize, Serialize};

/// Initial storage network settings written by the auto-deployment.
///
/// Fees are in the Balance contract's units unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Maximum object payload size in bytes.
    pub max_object_size: u64,
    /// Epoch duration in FS chain blocks.
    pub epoch_duration: u64,
    /// Storage price per GB.
    pub storage_price: u64,
    /// Fee per audit.
    pub audit_fee: u64,
    /// Fee per container.
    pub container_fee: u64,
    /// Fee per container alias.
    pub container_alias_fee: u64,
    /// Fee per Inner Ring candidate, Fixed8.
    pub ir_candidate_fee: u64,
    /// Fee per withdrawal, Fixed8.
    pub withdrawal_fee: u64,
    /// Number of EigenTrust iterations.
    pub eigen_trust_iterations: u64,
    /// EigenTrust alpha parameter.
    pub eigen_trust_alpha: f64,
    /// Whether homomorphic hashing is disabled.
    pub homomorphic_hashing_disabled: bool,
    /// Whether nodes may enter maintenance mode.
    pub maintenance_mode_allowed: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            max_object_size: 64 << 20,
            // ~1h at 15s blocks
            epoch_duration: 240,
            storage_price: 0,
            audit_fee: 0,
            container_fee: 1000,
            container_alias_fee: 500,
            ir_candidate_fee: 0,
            withdrawal_fee: 0,
            eigen_trust_iterations: 4,
            eigen_trust_alpha: 0.1,
            homomorphic_hashing_disabled: false,
            maintenance_mode_allowed: false,
        }
    }
}
