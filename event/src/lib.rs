//! Inner Ring Event - Contract event ingestion and dispatch engine.
//!
//! This crate provides the generic machinery shared by Inner Ring contract
//! processors: typed registrations keyed by event kind and contract, routers
//! that decode raw ledger items and hand them to a bounded worker pool, and
//! the read-only epoch and alphabet capabilities handlers consult.
//!
//! # Components
//!
//! - [`types`]: Ledger primitives and decoded events
//! - [`reputation`]: Reputation contract event decoders
//! - [`registry`]: Parser and handler registrations
//! - [`router`]: Notification and notary routers
//! - [`pool`]: Bounded non-blocking worker pool
//! - [`gate`]: Epoch and alphabet capabilities
//! - [`handler`]: Event handler capability
//! - [`metrics`]: Dispatch metrics
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

pub mod error;
pub mod gate;
pub mod handler;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod reputation;
pub mod router;
pub mod types;

pub use error::{ParseError, PoolError, RegistryError};
pub use gate::{AlphabetFlag, AlphabetState, AuthorizationGate, EpochCounter, EpochState};
pub use handler::EventHandler;
pub use metrics::{DispatchMetrics, DispatchMetricsSnapshot};
pub use pool::{PoolStats, WorkerPool};
pub use registry::{
    EventRegistry, HandlerInfo, ListenerSource, NotaryHandlerInfo, NotaryKey, NotaryParserInfo,
    NotificationKey, ParserInfo, RegistryBuilder,
};
pub use reputation::{parse_put, parse_put_notary, ReputationPutEvent};
pub use router::{
    DispatchOutcome, DropReason, NotaryRouter, NotificationRouter, RawNotaryRequest,
    RawNotification,
};
pub use types::{
    ContractAddress, Event, EventType, MempoolEventType, NotaryRequest, PeerId, StackItem,
    CONTRACT_ADDRESS_LEN, PEER_ID_LEN,
};
