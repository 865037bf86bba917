//! Reputation contract processor.
//!
//! Validates the processor parameters, creates the worker pool and builds
//! the immutable event registrations handed to the ledger watcher.
//! Notification registrations exist only when the network runs without
//! notary; notary registrations always exist.

use std::fmt;
use std::sync::Arc;

use innerring_event::{
    parse_put, parse_put_notary, AlphabetState, AuthorizationGate, ContractAddress,
    DispatchMetrics, EpochState, EventHandler, EventRegistry, EventType, HandlerInfo,
    ListenerSource, MempoolEventType, NotaryHandlerInfo, NotaryParserInfo, NotaryRouter,
    NotificationRouter, ParserInfo, PoolError, WorkerPool,
};
use tokio::runtime::Handle;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, Dispatch};

use crate::collaborators::{ManagerBuilder, ReputationContract, TrustSink};
use crate::config::ReputationConfig;
use crate::error::ProcessorError;
use crate::ingestor::ReputationIngestor;
use crate::metrics::ReputationMetrics;

/// Parameters of [`Processor::new`].
///
/// Every capability is required; the pool size has no default.
#[derive(Default)]
pub struct Params {
    /// Logger receiving every record of the processor.
    pub log: Option<Dispatch>,
    /// Number of concurrent workers.
    pub pool_size: usize,
    /// Current epoch source.
    pub epoch_state: Option<Arc<dyn EpochState>>,
    /// Alphabet membership source.
    pub alphabet_state: Option<Arc<dyn AlphabetState>>,
    /// Reputation contract client.
    pub reputation_contract: Option<Arc<dyn ReputationContract>>,
    /// Manager resolver.
    pub manager_builder: Option<Arc<dyn ManagerBuilder>>,
    /// Trust computation input.
    pub trust_sink: Option<Arc<dyn TrustSink>>,
    /// Whether the network runs without notary.
    pub notary_disabled: bool,
    /// Runtime running the workers, the current one if unset.
    pub runtime: Option<Handle>,
}

impl Params {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logger.
    #[must_use]
    pub fn with_log(mut self, log: Dispatch) -> Self {
        self.log = Some(log);
        self
    }

    /// Sets the pool size.
    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Applies the pool size and notary switch from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &ReputationConfig) -> Self {
        self.pool_size = config.pool_size;
        self.notary_disabled = config.notary_disabled;
        self
    }

    /// Sets the epoch source.
    #[must_use]
    pub fn with_epoch_state(mut self, state: Arc<dyn EpochState>) -> Self {
        self.epoch_state = Some(state);
        self
    }

    /// Sets the alphabet membership source.
    #[must_use]
    pub fn with_alphabet_state(mut self, state: Arc<dyn AlphabetState>) -> Self {
        self.alphabet_state = Some(state);
        self
    }

    /// Sets the reputation contract client.
    #[must_use]
    pub fn with_reputation_contract(mut self, contract: Arc<dyn ReputationContract>) -> Self {
        self.reputation_contract = Some(contract);
        self
    }

    /// Sets the manager resolver.
    #[must_use]
    pub fn with_manager_builder(mut self, builder: Arc<dyn ManagerBuilder>) -> Self {
        self.manager_builder = Some(builder);
        self
    }

    /// Sets the trust computation input.
    #[must_use]
    pub fn with_trust_sink(mut self, sink: Arc<dyn TrustSink>) -> Self {
        self.trust_sink = Some(sink);
        self
    }

    /// Sets the notary switch.
    #[must_use]
    pub fn with_notary_disabled(mut self, disabled: bool) -> Self {
        self.notary_disabled = disabled;
        self
    }

    /// Sets the runtime running the workers.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("log", &self.log.is_some())
            .field("pool_size", &self.pool_size)
            .field("epoch_state", &self.epoch_state.is_some())
            .field("alphabet_state", &self.alphabet_state.is_some())
            .field("reputation_contract", &self.reputation_contract.is_some())
            .field("manager_builder", &self.manager_builder.is_some())
            .field("trust_sink", &self.trust_sink.is_some())
            .field("notary_disabled", &self.notary_disabled)
            .finish_non_exhaustive()
    }
}

struct Registrations {
    contract: ContractAddress,
    notary_disabled: bool,
    handler: Arc<dyn EventHandler>,
}

impl ListenerSource for Registrations {
    fn listener_notification_parsers(&self) -> Vec<ParserInfo> {
        if !self.notary_disabled {
            return Vec::new();
        }
        vec![ParserInfo::new(EventType::ReputationPut, self.contract, parse_put)]
    }

    fn listener_notification_handlers(&self) -> Vec<HandlerInfo> {
        if !self.notary_disabled {
            return Vec::new();
        }
        vec![HandlerInfo::new(
            EventType::ReputationPut,
            self.contract,
            Arc::clone(&self.handler),
        )]
    }

    fn listener_notary_parsers(&self) -> Vec<NotaryParserInfo> {
        vec![NotaryParserInfo::new(
            MempoolEventType::TransactionAdded,
            EventType::ReputationPut,
            self.contract,
            parse_put_notary,
        )]
    }

    fn listener_notary_handlers(&self) -> Vec<NotaryHandlerInfo> {
        vec![NotaryHandlerInfo::new(
            MempoolEventType::TransactionAdded,
            EventType::ReputationPut,
            self.contract,
            Arc::clone(&self.handler),
        )]
    }
}

/// Processor of events produced by the reputation contract.
pub struct Processor {
    log: Dispatch,
    pool: Arc<WorkerPool>,
    registrations: Registrations,
    registry: Arc<EventRegistry>,
    ingestor: Arc<ReputationIngestor>,
    metrics: Arc<ReputationMetrics>,
    dispatch_metrics: Arc<DispatchMetrics>,
    notification_router: NotificationRouter,
    notary_router: NotaryRouter,
}

impl Processor {
    /// Creates a reputation contract processor.
    ///
    /// Every capability is checked before the worker pool is created.
    ///
    /// # Errors
    ///
    /// Returns a `Missing*` error naming the first absent capability, or a
    /// wrapped pool or registry error.
    pub fn new(params: Params) -> Result<Self, ProcessorError> {
        let Params {
            log,
            pool_size,
            epoch_state,
            alphabet_state,
            reputation_contract,
            manager_builder,
            trust_sink,
            notary_disabled,
            runtime,
        } = params;

        let log = log.ok_or(ProcessorError::MissingLogger)?;
        let epoch_state = epoch_state.ok_or(ProcessorError::MissingEpochState)?;
        let alphabet_state = alphabet_state.ok_or(ProcessorError::MissingAlphabetState)?;
        let contract = reputation_contract.ok_or(ProcessorError::MissingContract)?;
        let manager_builder = manager_builder.ok_or(ProcessorError::MissingManagerBuilder)?;
        let trust_sink = trust_sink.ok_or(ProcessorError::MissingTrustSink)?;

        tracing::dispatcher::with_default(&log, || {
            debug!(size = pool_size, "reputation worker pool");
        });

        let runtime = match runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| PoolError::NoRuntime)?,
        };
        let pool = Arc::new(WorkerPool::with_handle(pool_size, runtime)?);

        let metrics = Arc::new(ReputationMetrics::new());
        let ingestor = Arc::new(ReputationIngestor::new(
            AuthorizationGate::new(epoch_state, alphabet_state),
            Arc::clone(&contract),
            manager_builder,
            trust_sink,
            Arc::clone(&metrics),
        ));

        let registrations = Registrations {
            contract: contract.contract_address(),
            notary_disabled,
            handler: Arc::clone(&ingestor) as Arc<dyn EventHandler>,
        };
        let registry = Arc::new(EventRegistry::from_source(&registrations)?);

        let dispatch_metrics = Arc::new(DispatchMetrics::new());
        let notification_router = NotificationRouter::new(
            Arc::clone(&registry),
            Arc::clone(&pool),
            Arc::clone(&dispatch_metrics),
            log.clone(),
        );
        let notary_router = NotaryRouter::new(
            Arc::clone(&registry),
            Arc::clone(&pool),
            Arc::clone(&dispatch_metrics),
            log.clone(),
        );

        tracing::dispatcher::with_default(&log, || {
            info!(
                contract = %registrations.contract,
                notary_disabled,
                pool_size,
                "reputation processor created"
            );
        });

        Ok(Self {
            log,
            pool,
            registrations,
            registry,
            ingestor,
            metrics,
            dispatch_metrics,
            notification_router,
            notary_router,
        })
    }

    /// Returns the registrations of this processor.
    #[must_use]
    pub fn registry(&self) -> Arc<EventRegistry> {
        Arc::clone(&self.registry)
    }

    /// Returns the router for contract notifications.
    #[must_use]
    pub const fn notification_router(&self) -> &NotificationRouter {
        &self.notification_router
    }

    /// Returns the router for notary requests.
    #[must_use]
    pub const fn notary_router(&self) -> &NotaryRouter {
        &self.notary_router
    }

    /// Returns the worker pool.
    #[must_use]
    pub fn pool(&self) -> Arc<WorkerPool> {
        Arc::clone(&self.pool)
    }

    /// Returns the ingestor handling put events.
    #[must_use]
    pub fn ingestor(&self) -> Arc<ReputationIngestor> {
        Arc::clone(&self.ingestor)
    }

    /// Returns the ingestion metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<ReputationMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns the routing metrics.
    #[must_use]
    pub fn dispatch_metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.dispatch_metrics)
    }

    /// Returns the reputation contract address.
    #[must_use]
    pub const fn contract_address(&self) -> ContractAddress {
        self.registrations.contract
    }

    /// Returns true if direct notifications are registered.
    #[must_use]
    pub const fn is_notary_disabled(&self) -> bool {
        self.registrations.notary_disabled
    }

    /// Stops accepting events and waits for running handlers.
    pub async fn shutdown(&self) {
        self.pool.drain().with_subscriber(self.log.clone()).await;

        let stats = self.pool.stats();
        tracing::dispatcher::with_default(&self.log, || {
            info!(
                completed = stats.completed(),
                panicked = stats.panicked(),
                rejected = self.dispatch_metrics.rejected(),
                "reputation processor stopped"
            );
        });
    }
}

impl ListenerSource for Processor {
    fn listener_notification_parsers(&self) -> Vec<ParserInfo> {
        self.registrations.listener_notification_parsers()
    }

    fn listener_notification_handlers(&self) -> Vec<HandlerInfo> {
        self.registrations.listener_notification_handlers()
    }

    fn listener_notary_parsers(&self) -> Vec<NotaryParserInfo> {
        self.registrations.listener_notary_parsers()
    }

    fn listener_notary_handlers(&self) -> Vec<NotaryHandlerInfo> {
        self.registrations.listener_notary_handlers()
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("contract", &self.registrations.contract)
            .field("notary_disabled", &self.registrations.notary_disabled)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
