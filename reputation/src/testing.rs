//! Recording collaborators shared by the unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use innerring_event::{
    AlphabetFlag, AlphabetState, AuthorizationGate, ContractAddress, EpochCounter, EpochState,
    NotaryRequest, PeerId, ReputationPutEvent, PEER_ID_LEN,
};
use tracing::Dispatch;

use crate::collaborators::{ManagerBuilder, PutArgs, ReputationContract, TrustSink};
use crate::ingestor::ReputationIngestor;
use crate::metrics::ReputationMetrics;
use crate::processor::Params;

pub(crate) const CONTRACT: ContractAddress = ContractAddress::new([0x11; 20]);

pub(crate) fn peer(byte: u8) -> PeerId {
    let mut key = [byte; PEER_ID_LEN];
    key[0] = 0x02;
    PeerId::new(key)
}

pub(crate) fn trust_value() -> Vec<u8> {
    0.7f64.to_be_bytes().to_vec()
}

pub(crate) fn put_event(epoch: u64, reporter: PeerId, target: PeerId) -> ReputationPutEvent {
    ReputationPutEvent {
        epoch,
        reporter,
        target,
        value: trust_value(),
        notary_request: None,
    }
}

pub(crate) fn notary_request(put: &ReputationPutEvent) -> NotaryRequest {
    let mut args = put.to_stack_items();
    args.reverse();
    NotaryRequest {
        main_tx_hash: [7u8; 32],
        contract: CONTRACT,
        method: "put".to_string(),
        args,
    }
}

pub(crate) fn notary_put_event(epoch: u64, reporter: PeerId, target: PeerId) -> ReputationPutEvent {
    let mut put = put_event(epoch, reporter, target);
    put.notary_request = Some(notary_request(&put));
    put
}

pub(crate) struct RecordingManagers {
    calls: Mutex<Vec<(u64, PeerId)>>,
    managers: Vec<PeerId>,
    failing: AtomicBool,
}

impl RecordingManagers {
    fn new(managers: Vec<PeerId>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            managers,
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(u64, PeerId)> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn result(&self) -> Vec<PeerId> {
        self.managers.clone()
    }

    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl ManagerBuilder for RecordingManagers {
    fn build_managers(&self, epoch: u64, target: &PeerId) -> anyhow::Result<Vec<PeerId>> {
        self.calls.lock().expect("lock").push((epoch, *target));
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("network map of epoch {epoch} is unavailable");
        }
        Ok(self.managers.clone())
    }
}

pub(crate) type SinkCall = (ReputationPutEvent, Vec<PeerId>);

#[derive(Default)]
pub(crate) struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub(crate) fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrustSink for RecordingSink {
    async fn submit(&self, event: &ReputationPutEvent, managers: &[PeerId]) -> anyhow::Result<()> {
        self.calls
            .lock()
            .expect("lock")
            .push((event.clone(), managers.to_vec()));
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("trust storage unavailable");
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingContract {
    puts: Mutex<Vec<PutArgs>>,
    notary: Mutex<Vec<NotaryRequest>>,
    failing: AtomicBool,
}

impl RecordingContract {
    pub(crate) fn puts(&self) -> Vec<PutArgs> {
        self.puts.lock().expect("lock").clone()
    }

    pub(crate) fn notary_calls(&self) -> Vec<NotaryRequest> {
        self.notary.lock().expect("lock").clone()
    }

    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn result(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("invocation failed: insufficient GAS");
        }
        Ok(())
    }
}

#[async_trait]
impl ReputationContract for RecordingContract {
    fn contract_address(&self) -> ContractAddress {
        CONTRACT
    }

    async fn put(&self, args: PutArgs) -> anyhow::Result<()> {
        self.puts.lock().expect("lock").push(args);
        self.result()
    }

    async fn notary_sign_and_invoke(&self, request: &NotaryRequest) -> anyhow::Result<()> {
        self.notary.lock().expect("lock").push(request.clone());
        self.result()
    }
}

/// Collaborators wired around one epoch and alphabet state.
pub(crate) struct Harness {
    pub(crate) epoch: Arc<EpochCounter>,
    pub(crate) alphabet: Arc<AlphabetFlag>,
    pub(crate) managers: Arc<RecordingManagers>,
    pub(crate) sink: Arc<RecordingSink>,
    pub(crate) contract: Arc<RecordingContract>,
    pub(crate) metrics: Arc<ReputationMetrics>,
}

impl Harness {
    /// Peers 0xA and 0xD manage every target.
    pub(crate) fn new(epoch: u64, alphabet: bool) -> Self {
        Self {
            epoch: Arc::new(EpochCounter::new(epoch)),
            alphabet: Arc::new(AlphabetFlag::new(alphabet)),
            managers: Arc::new(RecordingManagers::new(vec![peer(0xA), peer(0xD)])),
            sink: Arc::new(RecordingSink::default()),
            contract: Arc::new(RecordingContract::default()),
            metrics: Arc::new(ReputationMetrics::new()),
        }
    }

    fn gate(&self) -> AuthorizationGate {
        AuthorizationGate::new(self.epoch_state(), self.alphabet_state())
    }

    fn epoch_state(&self) -> Arc<dyn EpochState> {
        Arc::clone(&self.epoch) as Arc<dyn EpochState>
    }

    fn alphabet_state(&self) -> Arc<dyn AlphabetState> {
        Arc::clone(&self.alphabet) as Arc<dyn AlphabetState>
    }

    pub(crate) fn ingestor(&self) -> ReputationIngestor {
        ReputationIngestor::new(
            self.gate(),
            Arc::clone(&self.contract) as Arc<dyn ReputationContract>,
            Arc::clone(&self.managers) as Arc<dyn ManagerBuilder>,
            Arc::clone(&self.sink) as Arc<dyn TrustSink>,
            Arc::clone(&self.metrics),
        )
    }

    /// Parameters with every capability set.
    pub(crate) fn params(&self, pool_size: usize, notary_disabled: bool, log: Dispatch) -> Params {
        Params::new()
            .with_log(log)
            .with_pool_size(pool_size)
            .with_epoch_state(self.epoch_state())
            .with_alphabet_state(self.alphabet_state())
            .with_reputation_contract(Arc::clone(&self.contract) as Arc<dyn ReputationContract>)
            .with_manager_builder(Arc::clone(&self.managers) as Arc<dyn ManagerBuilder>)
            .with_trust_sink(Arc::clone(&self.sink) as Arc<dyn TrustSink>)
            .with_notary_disabled(notary_disabled)
    }
}

/// In-memory log sink for a capturing dispatch.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock")).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Returns a debug-level dispatch writing into the returned buffer.
pub(crate) fn capture_logs() -> (Dispatch, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (Dispatch::new(subscriber), buffer)
}
