//! Reputation put handling.
//!
//! Runs inside the worker pool for every decoded `reputationPut` event. The
//! epoch and alphabet status are read when the event is processed, never at
//! submission time.

use std::sync::Arc;

use async_trait::async_trait;
use innerring_event::{AuthorizationGate, Event, EventHandler, ReputationPutEvent};
use tracing::{debug, info, warn};

use crate::collaborators::{ManagerBuilder, PutArgs, ReputationContract, TrustSink};
use crate::metrics::ReputationMetrics;

/// How processing of one put event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The value is for an epoch that has not started locally.
    IgnoredEpoch {
        /// Epoch stated by the event.
        trust_epoch: u64,
        /// Local epoch at processing time.
        local_epoch: u64,
    },
    /// Managers of the target could not be resolved.
    ManagersUnavailable,
    /// The trust sink refused the value.
    SinkFailed,
    /// Forwarded; the node is not an alphabet member so nothing was approved.
    Observed,
    /// Forwarded; the reporter is not a manager of the target.
    WrongManager,
    /// Forwarded and approved on chain.
    Approved,
    /// Forwarded, but the approval transaction failed.
    ApprovalFailed,
}

impl PutOutcome {
    /// Returns true if the value reached the trust sink.
    #[must_use]
    pub const fn is_forwarded(&self) -> bool {
        matches!(
            self,
            Self::Observed | Self::WrongManager | Self::Approved | Self::ApprovalFailed
        )
    }
}

/// Business handler for reputation put events.
pub struct ReputationIngestor {
    gate: AuthorizationGate,
    contract: Arc<dyn ReputationContract>,
    managers: Arc<dyn ManagerBuilder>,
    sink: Arc<dyn TrustSink>,
    metrics: Arc<ReputationMetrics>,
}

impl ReputationIngestor {
    /// Creates an ingestor over its collaborators.
    #[must_use]
    pub fn new(
        gate: AuthorizationGate,
        contract: Arc<dyn ReputationContract>,
        managers: Arc<dyn ManagerBuilder>,
        sink: Arc<dyn TrustSink>,
        metrics: Arc<ReputationMetrics>,
    ) -> Self {
        Self {
            gate,
            contract,
            managers,
            sink,
            metrics,
        }
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<ReputationMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Processes one put event.
    ///
    /// The event epoch is passed to collaborators as stated; it never moves
    /// the local epoch. No state is kept between calls, so processing the
    /// same event twice repeats every external call.
    pub async fn process_put(&self, put: &ReputationPutEvent) -> PutOutcome {
        self.metrics.record_put();
        info!(
            epoch = put.epoch,
            peer_id = %put.target,
            notary = put.is_notary(),
            "received reputation put"
        );

        let local_epoch = self.gate.current_epoch();
        if put.epoch > local_epoch {
            self.metrics.record_ignored_epoch();
            info!(
                trust_epoch = put.epoch,
                local_epoch, "ignoring reputation value"
            );
            return PutOutcome::IgnoredEpoch {
                trust_epoch: put.epoch,
                local_epoch,
            };
        }

        let managers = match self.managers.build_managers(put.epoch, &put.target) {
            Ok(managers) => managers,
            Err(e) => {
                self.metrics.record_manager_failure();
                warn!(
                    epoch = put.epoch,
                    peer_id = %put.target,
                    error = %e,
                    "could not resolve reputation managers"
                );
                return PutOutcome::ManagersUnavailable;
            }
        };

        if let Err(e) = self.sink.submit(put, &managers).await {
            self.metrics.record_sink_failure();
            warn!(
                epoch = put.epoch,
                peer_id = %put.target,
                managers = managers.len(),
                error = %e,
                "could not forward reputation value"
            );
            return PutOutcome::SinkFailed;
        }
        self.metrics.record_forwarded();
        debug!(
            epoch = put.epoch,
            peer_id = %put.target,
            managers = managers.len(),
            "reputation value forwarded"
        );

        if !self.gate.is_voting_member() {
            self.metrics.record_non_alphabet();
            info!("non alphabet mode, ignore reputation put approval");
            return PutOutcome::Observed;
        }

        if !managers.contains(&put.reporter) {
            self.metrics.record_wrong_manager();
            info!(
                epoch = put.epoch,
                reporter = %put.reporter,
                peer_id = %put.target,
                "ignore reputation value: wrong manager"
            );
            return PutOutcome::WrongManager;
        }

        self.approve(put).await
    }

    async fn approve(&self, put: &ReputationPutEvent) -> PutOutcome {
        let result = match &put.notary_request {
            Some(request) => self.contract.notary_sign_and_invoke(request).await,
            None => self.contract.put(PutArgs::from(put)).await,
        };

        match result {
            Ok(()) => {
                self.metrics.record_approval();
                debug!(
                    epoch = put.epoch,
                    peer_id = %put.target,
                    notary = put.is_notary(),
                    "reputation value approved"
                );
                PutOutcome::Approved
            }
            Err(e) => {
                self.metrics.record_approval_failure();
                warn!(
                    epoch = put.epoch,
                    peer_id = %put.target,
                    error = %e,
                    "can't send approval tx for reputation value"
                );
                PutOutcome::ApprovalFailed
            }
        }
    }
}

#[async_trait]
impl EventHandler for ReputationIngestor {
    async fn handle(&self, event: Event) {
        match event {
            Event::ReputationPut(put) => {
                self.process_put(&put).await;
            }
        }
    }
}

impl std::fmt::Debug for ReputationIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationIngestor")
            .field("gate", &self.gate)
            .field("contract", &self.contract.contract_address())
            .finish_non_exhaustive()
    }
}
