//! Inner Ring Reputation - Processor for reputation contract events.
//!
//! This crate wires the generic event engine to the reputation contract:
//! decoded `reputationPut` events are gated by epoch, forwarded with their
//! resolved managers to the trust computation, and approved on chain by
//! alphabet members.
//!
//! # Components
//!
//! - [`processor`]: Processor construction and event registrations
//! - [`ingestor`]: Put event handling
//! - [`collaborators`]: Manager resolution, trust sink and contract client
//! - [`config`]: Processor configuration
//! - [`metrics`]: Ingestion metrics
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

pub mod collaborators;
pub mod config;
pub mod error;
pub mod ingestor;
pub mod metrics;
pub mod processor;

#[cfg(test)]
mod testing;

pub use collaborators::{ManagerBuilder, PutArgs, ReputationContract, TrustSink};
pub use config::ReputationConfig;
pub use error::ProcessorError;
pub use ingestor::{PutOutcome, ReputationIngestor};
pub use metrics::{ReputationMetrics, ReputationMetricsSnapshot};
pub use processor::{Params, Processor};
