//! Notification and notary routers.
//!
//! Routers sit between the ledger watcher and the worker pool. They look up
//! the registration for a raw item, decode it and submit the handler
//! invocation to the pool, returning immediately. Routers hold no business
//! state and perform no authorization.

use std::sync::Arc;

use tracing::{debug, info, warn, Dispatch};

use crate::error::{ParseError, PoolError};
use crate::handler::EventHandler;
use crate::metrics::DispatchMetrics;
use crate::pool::WorkerPool;
use crate::registry::{EventRegistry, NotaryKey, NotificationKey};
use crate::types::{ContractAddress, Event, EventType, MempoolEventType, NotaryRequest, StackItem};

/// Contract notification as delivered by the ledger watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    /// Emitting contract.
    pub contract: ContractAddress,
    /// Event kind.
    pub event_type: EventType,
    /// Undecoded notification payload.
    pub items: Vec<StackItem>,
}

impl RawNotification {
    /// Creates a raw notification.
    #[must_use]
    pub fn new(contract: ContractAddress, event_type: EventType, items: Vec<StackItem>) -> Self {
        Self {
            contract,
            event_type,
            items,
        }
    }

    /// Creates a raw notification from the ledger's notification name.
    ///
    /// Returns `None` for names no processor knows about.
    #[must_use]
    pub fn from_name(contract: ContractAddress, name: &str, items: Vec<StackItem>) -> Option<Self> {
        EventType::from_notification_name(name).map(|event_type| Self::new(contract, event_type, items))
    }

    /// Returns the registry key.
    #[must_use]
    pub const fn key(&self) -> NotificationKey {
        NotificationKey::new(self.event_type, self.contract)
    }
}

/// Notary request as observed in the mempool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotaryRequest {
    /// Mempool condition that surfaced the request.
    pub mempool_type: MempoolEventType,
    /// Event kind.
    pub event_type: EventType,
    /// Undecoded request.
    pub request: NotaryRequest,
}

impl RawNotaryRequest {
    /// Creates a raw notary request.
    #[must_use]
    pub fn new(mempool_type: MempoolEventType, event_type: EventType, request: NotaryRequest) -> Self {
        Self {
            mempool_type,
            event_type,
            request,
        }
    }

    /// Returns the registry key.
    #[must_use]
    pub const fn key(&self) -> NotaryKey {
        NotaryKey::new(self.mempool_type, self.event_type, self.request.contract)
    }
}

/// Why a matched item did not reach its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Payload failed to decode.
    Decode(ParseError),
    /// A parser is registered but no handler.
    MissingHandler,
    /// The worker pool refused the task.
    Rejected(PoolError),
}

/// Result of routing one raw item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler invocation was submitted to the pool.
    Dispatched,
    /// The item is not for this processor.
    Ignored,
    /// The item was for this processor but is lost.
    Dropped(DropReason),
}

impl DispatchOutcome {
    /// Returns true if the event reached the pool.
    #[must_use]
    pub const fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched)
    }

    /// Returns true if the item was ignored.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Returns true if the event was dropped.
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

/// State shared by both routers of a processor.
#[derive(Clone)]
struct RouterCore {
    registry: Arc<EventRegistry>,
    pool: Arc<WorkerPool>,
    metrics: Arc<DispatchMetrics>,
    log: Dispatch,
}

impl RouterCore {
    fn submit(&self, handler: Arc<dyn EventHandler>, event: Event) -> DispatchOutcome {
        let event_type = event.event_type();
        match self.pool.submit(async move { handler.handle(event).await }) {
            Ok(()) => {
                self.metrics.record_dispatched();
                DispatchOutcome::Dispatched
            }
            Err(e) => {
                self.metrics.record_rejected();
                warn!(
                    event = %event_type,
                    capacity = self.pool.capacity(),
                    error = %e,
                    "worker pool saturated, event dropped"
                );
                DispatchOutcome::Dropped(DropReason::Rejected(e))
            }
        }
    }
}

/// Routes contract notifications to their handlers.
#[derive(Clone)]
pub struct NotificationRouter {
    core: RouterCore,
}

impl NotificationRouter {
    /// Creates a router over a processor's registry and pool.
    #[must_use]
    pub fn new(
        registry: Arc<EventRegistry>,
        pool: Arc<WorkerPool>,
        metrics: Arc<DispatchMetrics>,
        log: Dispatch,
    ) -> Self {
        Self {
            core: RouterCore {
                registry,
                pool,
                metrics,
                log,
            },
        }
    }

    /// Routes one notification without waiting for its handler.
    pub fn route(&self, notification: RawNotification) -> DispatchOutcome {
        tracing::dispatcher::with_default(&self.core.log, || self.route_notification(notification))
    }

    fn route_notification(&self, notification: RawNotification) -> DispatchOutcome {
        let core = &self.core;
        core.metrics.record_notification();

        let key = notification.key();
        let Some(parser) = core.registry.notification_parser(&key) else {
            core.metrics.record_ignored();
            debug!(
                event = %key.event_type,
                contract = %key.contract,
                "notification ignored: no parser registered"
            );
            return DispatchOutcome::Ignored;
        };

        let event = match parser.parse(&notification.items) {
            Ok(event) => event,
            Err(e) => {
                core.metrics.record_decode_failure();
                warn!(
                    event = %key.event_type,
                    contract = %key.contract,
                    error = %e,
                    "could not parse notification event"
                );
                return DispatchOutcome::Dropped(DropReason::Decode(e));
            }
        };

        let Some(handler) = core.registry.notification_handler(&key) else {
            core.metrics.record_missing_handler();
            info!(
                event = %key.event_type,
                contract = %key.contract,
                "handler not found for notification event"
            );
            return DispatchOutcome::Dropped(DropReason::MissingHandler);
        };

        core.submit(handler.handler(), event)
    }
}

/// Routes mempool notary requests to their handlers.
#[derive(Clone)]
pub struct NotaryRouter {
    core: RouterCore,
}

impl NotaryRouter {
    /// Creates a router over a processor's registry and pool.
    #[must_use]
    pub fn new(
        registry: Arc<EventRegistry>,
        pool: Arc<WorkerPool>,
        metrics: Arc<DispatchMetrics>,
        log: Dispatch,
    ) -> Self {
        Self {
            core: RouterCore {
                registry,
                pool,
                metrics,
                log,
            },
        }
    }

    /// Routes one notary request without waiting for its handler.
    pub fn route(&self, request: RawNotaryRequest) -> DispatchOutcome {
        tracing::dispatcher::with_default(&self.core.log, || self.route_request(request))
    }

    fn route_request(&self, raw: RawNotaryRequest) -> DispatchOutcome {
        let core = &self.core;
        core.metrics.record_notary();

        let key = raw.key();
        let Some(parser) = core.registry.notary_parser(&key) else {
            core.metrics.record_ignored();
            debug!(
                method = %raw.request.method,
                contract = %key.contract,
                mempool = %key.mempool_type,
                "notary request ignored: no parser registered"
            );
            return DispatchOutcome::Ignored;
        };

        let event = match parser.parse(&raw.request) {
            Ok(event) => event,
            Err(e) => {
                core.metrics.record_decode_failure();
                warn!(
                    method = %raw.request.method,
                    contract = %key.contract,
                    tx = %raw.request.main_tx_hash_hex(),
                    error = %e,
                    "could not parse notary event"
                );
                return DispatchOutcome::Dropped(DropReason::Decode(e));
            }
        };

        let Some(handler) = core.registry.notary_handler(&key) else {
            core.metrics.record_missing_handler();
            info!(
                method = %raw.request.method,
                contract = %key.contract,
                "handler not found for notary event"
            );
            return DispatchOutcome::Dropped(DropReason::MissingHandler);
        };

        core.submit(handler.handler(), event)
    }
}
