//! Error types for the reputation processor.

use innerring_event::{PoolError, RegistryError};
use thiserror::Error;

/// Processor construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// No logger was supplied.
    #[error("ir/reputation: logger is not set")]
    MissingLogger,

    /// No epoch state was supplied.
    #[error("ir/reputation: epoch state is not set")]
    MissingEpochState,

    /// No alphabet state was supplied.
    #[error("ir/reputation: alphabet state is not set")]
    MissingAlphabetState,

    /// No reputation contract wrapper was supplied.
    #[error("ir/reputation: reputation contract wrapper is not set")]
    MissingContract,

    /// No manager builder was supplied.
    #[error("ir/reputation: manager builder is not set")]
    MissingManagerBuilder,

    /// No trust sink was supplied.
    #[error("ir/reputation: trust sink is not set")]
    MissingTrustSink,

    /// The worker pool could not be created.
    #[error("ir/reputation: can't create worker pool: {0}")]
    WorkerPool(#[from] PoolError),

    /// The registrations contain a duplicate key.
    #[error("ir/reputation: can't build event registry: {0}")]
    Registry(#[from] RegistryError),
}
