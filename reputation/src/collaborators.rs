//! External collaborators of the reputation processor.
//!
//! The processor does not compute trust or talk to the chain itself. It
//! resolves the managers of a target through [`ManagerBuilder`], hands the
//! value to the trust computation through [`TrustSink`] and approves it on
//! chain through [`ReputationContract`].

use async_trait::async_trait;
use innerring_event::{ContractAddress, NotaryRequest, PeerId, ReputationPutEvent};
use serde::{Deserialize, Serialize};

/// Resolves the peers responsible for a target's reputation.
pub trait ManagerBuilder: Send + Sync {
    /// Returns the managers of `target` in `epoch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the network map of the epoch is unavailable.
    fn build_managers(&self, epoch: u64, target: &PeerId) -> anyhow::Result<Vec<PeerId>>;
}

/// Receives reputation values for trust computation.
///
/// Implementations must be idempotent: the same event may be delivered more
/// than once, for example after a chain reorganization replay.
#[async_trait]
pub trait TrustSink: Send + Sync {
    /// Forwards one value together with its managers.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be accepted.
    async fn submit(&self, event: &ReputationPutEvent, managers: &[PeerId]) -> anyhow::Result<()>;
}

/// Arguments of the reputation contract's `put` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutArgs {
    /// Epoch of the value.
    pub epoch: u64,
    /// Peer the value is about.
    pub peer_id: PeerId,
    /// Serialized trust value.
    pub value: Vec<u8>,
}

impl From<&ReputationPutEvent> for PutArgs {
    fn from(event: &ReputationPutEvent) -> Self {
        Self {
            epoch: event.epoch,
            peer_id: event.target,
            value: event.value.clone(),
        }
    }
}

/// Client of the reputation contract.
#[async_trait]
pub trait ReputationContract: Send + Sync {
    /// Returns the contract script hash.
    fn contract_address(&self) -> ContractAddress;

    /// Invokes `put` directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the invocation fails.
    async fn put(&self, args: PutArgs) -> anyhow::Result<()>;

    /// Adds this node's signature to a notary request and sends it.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or sending fails.
    async fn notary_sign_and_invoke(&self, request: &NotaryRequest) -> anyhow::Result<()>;
}
