//! Inner Ring Config - Hierarchical node configuration.
//!
//! This crate provides the configuration tree read by Inner Ring nodes:
//! dotted keys over a JSON document, `NEOFS_*` environment overrides,
//! validated typed getters and the FS chain consensus section.
//!
//! # Components
//!
//! - [`tree`]: Configuration tree and environment overrides
//! - [`getters`]: Typed validated getters
//! - [`duration`]: Duration values
//! - [`keys`]: Public keys
//! - [`consensus`]: FS chain consensus and deployment modes
//! - [`network`]: Auto-deployment network settings
//! - [`error`]: Error types

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

pub mod consensus;
pub mod duration;
pub mod error;
pub mod getters;
pub mod keys;
pub mod network;
pub mod tree;

pub use consensus::{
    is_auto_deployment_mode, is_local_consensus_mode, parse_consensus_config, parse_nns_config,
    ConsensusConfig, NnsConfig, P2pConfig, PingConfig, RpcConfig, StorageConfig, TlsConfig,
};
pub use error::{optional, ConfigError};
pub use keys::PublicKey;
pub use network::NetworkSettings;
pub use tree::Config;
