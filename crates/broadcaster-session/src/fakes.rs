//! Scripted engine and signaling collaborators for orchestrator tests.
//!
//! The fake engine delivers listener callbacks from spawned worker
//! threads, the way the real SDK does, and records how every pending
//! negotiation was resolved.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde_json::{json, Value};

use broadcaster_rtc::{
    ConnectionState, Consumer, ConsumerListener, DataConsumer, DataConsumerListener, DataProducer,
    DataProducerListener, Device, MediaKind, Producer, ProducerListener, RecvTransport, RtcError,
    RtcResult, RtpEncoding, SendTransport, SendTransportListener, Transport, TransportListener,
    TransportOptions, DEFAULT_NEGOTIATION_TIMEOUT,
};
use broadcaster_signaling::{
    DataConsumerOptions, RouterCapabilities, SignalingClient, SignalingError, SignalingResult,
    TransportDirection,
};

/// Counters shared between the fake engine handles.
#[derive(Default)]
pub struct EngineStats {
    connect_invocations: AtomicUsize,
    connect_successes: AtomicUsize,
    connect_failures: AtomicUsize,
    produce_invocations: AtomicUsize,
    produce_failures: AtomicUsize,
    produce_data_invocations: AtomicUsize,
    data_sent: AtomicUsize,
    closed_transports: AtomicUsize,
}

impl EngineStats {
    pub fn connect_invocations(&self) -> usize {
        self.connect_invocations.load(Ordering::SeqCst)
    }

    pub fn connect_successes(&self) -> usize {
        self.connect_successes.load(Ordering::SeqCst)
    }

    pub fn connect_failures(&self) -> usize {
        self.connect_failures.load(Ordering::SeqCst)
    }

    pub fn produce_invocations(&self) -> usize {
        self.produce_invocations.load(Ordering::SeqCst)
    }

    pub fn produce_failures(&self) -> usize {
        self.produce_failures.load(Ordering::SeqCst)
    }

    pub fn produce_data_invocations(&self) -> usize {
        self.produce_data_invocations.load(Ordering::SeqCst)
    }

    pub fn data_sent(&self) -> usize {
        self.data_sent.load(Ordering::SeqCst)
    }

    pub fn closed_transports(&self) -> usize {
        self.closed_transports.load(Ordering::SeqCst)
    }
}

/// Fake capability-negotiating device.
pub struct FakeDevice {
    stats: Arc<EngineStats>,
    reject_load: bool,
    is_loaded: AtomicBool,
    send_listener: Mutex<Option<Arc<dyn SendTransportListener>>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(EngineStats::default()),
            reject_load: false,
            is_loaded: AtomicBool::new(false),
            send_listener: Mutex::new(None),
        }
    }

    /// A device whose load always fails, as with incompatible routers.
    pub fn rejecting_load() -> Self {
        Self {
            reject_load: true,
            ..Self::new()
        }
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        Arc::clone(&self.stats)
    }

    /// The listener registered with the send transport.
    pub fn send_listener(&self) -> Arc<dyn SendTransportListener> {
        self.send_listener
            .lock()
            .clone()
            .expect("no send transport was created")
    }
}

impl Device for FakeDevice {
    fn load(&self, router_rtp_capabilities: &Value) -> RtcResult<()> {
        if self.reject_load {
            return Err(RtcError::CapabilityMismatch("no shared codecs".into()));
        }
        if router_rtp_capabilities.get("codecs").is_none() {
            return Err(RtcError::CapabilityMismatch("router offers no codecs".into()));
        }
        if self.is_loaded.swap(true, Ordering::SeqCst) {
            return Err(RtcError::DeviceAlreadyLoaded);
        }
        Ok(())
    }

    fn loaded(&self) -> bool {
        self.is_loaded.load(Ordering::SeqCst)
    }

    fn rtp_capabilities(&self) -> RtcResult<Value> {
        if !self.loaded() {
            return Err(RtcError::DeviceNotLoaded);
        }
        Ok(json!({ "codecs": [], "headerExtensions": [] }))
    }

    fn sctp_capabilities(&self) -> RtcResult<Value> {
        if !self.loaded() {
            return Err(RtcError::DeviceNotLoaded);
        }
        Ok(json!({ "numStreams": { "OS": 1024, "MIS": 1024 } }))
    }

    fn create_send_transport(
        &self,
        listener: Arc<dyn SendTransportListener>,
        options: &TransportOptions,
    ) -> RtcResult<Box<dyn SendTransport>> {
        if !self.loaded() {
            return Err(RtcError::DeviceNotLoaded);
        }
        *self.send_listener.lock() = Some(Arc::clone(&listener));
        drive_connect(Arc::clone(&self.stats), Arc::clone(&listener), options.id.clone());

        Ok(Box::new(FakeSendTransport {
            id: options.id.clone(),
            stats: Arc::clone(&self.stats),
            listener,
            closed: AtomicBool::new(false),
        }))
    }

    fn create_recv_transport(
        &self,
        listener: Arc<dyn TransportListener>,
        options: &TransportOptions,
    ) -> RtcResult<Box<dyn RecvTransport>> {
        if !self.loaded() {
            return Err(RtcError::DeviceNotLoaded);
        }
        drive_connect(
            Arc::clone(&self.stats),
            Arc::clone(&listener),
            options.id.clone(),
        );

        Ok(Box::new(FakeRecvTransport {
            id: options.id.clone(),
            stats: Arc::clone(&self.stats),
            listener,
            closed: AtomicBool::new(false),
        }))
    }
}

/// Delivers `on_connect` from a worker thread and records how the
/// deferred resolved.
fn drive_connect<L>(stats: Arc<EngineStats>, listener: Arc<L>, id: String)
where
    L: TransportListener + ?Sized + 'static,
{
    let worker = thread::spawn(move || {
        stats.connect_invocations.fetch_add(1, Ordering::SeqCst);
        let pending = listener.on_connect(&id, &json!({ "role": "client", "fingerprints": [] }));
        match pending.wait(DEFAULT_NEGOTIATION_TIMEOUT) {
            Ok(()) => {
                stats.connect_successes.fetch_add(1, Ordering::SeqCst);
                listener.on_connection_state_change(&id, ConnectionState::Connected);
            }
            Err(_) => {
                stats.connect_failures.fetch_add(1, Ordering::SeqCst);
                listener.on_connection_state_change(&id, ConnectionState::Failed);
            }
        }
    });
    worker.join().expect("engine connect worker panicked");
}

struct FakeSendTransport {
    id: String,
    stats: Arc<EngineStats>,
    listener: Arc<dyn SendTransportListener>,
    closed: AtomicBool,
}

impl Transport for FakeSendTransport {
    fn id(&self) -> &str {
        &self.id
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.stats.closed_transports.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl SendTransport for FakeSendTransport {
    fn produce(
        &self,
        _listener: Arc<dyn ProducerListener>,
        kind: MediaKind,
        encodings: &[RtpEncoding],
        app_data: Value,
    ) -> RtcResult<Box<dyn Producer>> {
        let stats = Arc::clone(&self.stats);
        let listener = Arc::clone(&self.listener);
        let id = self.id.clone();
        let rtp_parameters = json!({ "codecs": [], "encodings": encodings });

        let worker = thread::spawn(move || {
            stats.produce_invocations.fetch_add(1, Ordering::SeqCst);
            listener
                .on_produce(&id, kind, rtp_parameters, app_data)
                .wait(DEFAULT_NEGOTIATION_TIMEOUT)
        });
        match worker.join().expect("engine produce worker panicked") {
            Ok(producer_id) => Ok(Box::new(FakeProducer {
                id: producer_id,
                kind,
            })),
            Err(e) => {
                self.stats.produce_failures.fetch_add(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn produce_data(
        &self,
        _listener: Arc<dyn DataProducerListener>,
        label: &str,
        protocol: &str,
    ) -> RtcResult<Arc<dyn DataProducer>> {
        let stats = Arc::clone(&self.stats);
        let listener = Arc::clone(&self.listener);
        let id = self.id.clone();
        let label = label.to_string();
        let protocol = protocol.to_string();

        let worker = thread::spawn(move || {
            stats.produce_data_invocations.fetch_add(1, Ordering::SeqCst);
            listener
                .on_produce_data(
                    &id,
                    json!({ "streamId": 0, "ordered": true }),
                    &label,
                    &protocol,
                    json!({}),
                )
                .wait(DEFAULT_NEGOTIATION_TIMEOUT)
        });
        let data_producer_id = worker.join().expect("engine produce_data worker panicked")?;

        Ok(Arc::new(FakeDataProducer {
            id: data_producer_id,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct FakeRecvTransport {
    id: String,
    stats: Arc<EngineStats>,
    listener: Arc<dyn TransportListener>,
    closed: AtomicBool,
}

impl Transport for FakeRecvTransport {
    fn id(&self) -> &str {
        &self.id
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.stats.closed_transports.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RecvTransport for FakeRecvTransport {
    fn consume(
        &self,
        _listener: Arc<dyn ConsumerListener>,
        id: &str,
        _producer_id: &str,
        kind: MediaKind,
        _rtp_parameters: Value,
    ) -> RtcResult<Box<dyn Consumer>> {
        Ok(Box::new(FakeConsumer {
            id: id.to_string(),
            kind,
        }))
    }

    fn consume_data(
        &self,
        listener: Arc<dyn DataConsumerListener>,
        id: &str,
        _data_producer_id: &str,
        _stream_id: u16,
        label: &str,
        _protocol: &str,
    ) -> RtcResult<Box<dyn DataConsumer>> {
        listener.on_open(id);
        Ok(Box::new(FakeDataConsumer {
            id: id.to_string(),
            label: label.to_string(),
        }))
    }
}

struct FakeProducer {
    id: String,
    kind: MediaKind,
}

impl Producer for FakeProducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn close(&self) {}
}

struct FakeConsumer {
    id: String,
    kind: MediaKind,
}

impl Consumer for FakeConsumer {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn close(&self) {}
}

struct FakeDataProducer {
    id: String,
    stats: Arc<EngineStats>,
}

impl DataProducer for FakeDataProducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn send(&self, _payload: &[u8]) -> RtcResult<()> {
        self.stats.data_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn buffered_amount(&self) -> u64 {
        0
    }

    fn close(&self) {}
}

struct FakeDataConsumer {
    id: String,
    label: String,
}

impl DataConsumer for FakeDataConsumer {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn close(&self) {}
}

/// Scripted signaling client with failure injection.
pub struct FakeSignaling {
    calls: Mutex<Vec<&'static str>>,
    fail_produce: AtomicBool,
    fail_connect: AtomicBool,
    transport_seq: AtomicUsize,
    producer_seq: AtomicUsize,
}

impl FakeSignaling {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_produce: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            transport_seq: AtomicUsize::new(0),
            producer_seq: AtomicUsize::new(0),
        }
    }

    /// Makes every `produce` round-trip time out.
    pub fn fail_produce_with_timeout(&self) {
        self.fail_produce.store(true, Ordering::SeqCst);
    }

    /// Makes every `connect_transport` round-trip time out.
    pub fn fail_connect_with_timeout(&self) {
        self.fail_connect.store(true, Ordering::SeqCst);
    }

    /// Operation names in invocation order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.calls.lock().iter().any(|c| *c == name)
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().push(name);
    }
}

impl SignalingClient for FakeSignaling {
    fn load_capabilities(&self) -> SignalingResult<RouterCapabilities> {
        self.record("load_capabilities");
        Ok(json!({ "codecs": [{ "kind": "video", "mimeType": "video/VP8" }] }))
    }

    fn announce(&self, _broadcaster_id: &str, _rtp_capabilities: &Value) -> SignalingResult<()> {
        self.record("announce");
        Ok(())
    }

    fn create_transport(
        &self,
        _broadcaster_id: &str,
        _direction: TransportDirection,
        enable_sctp: bool,
        _sctp_capabilities: &Value,
    ) -> SignalingResult<TransportOptions> {
        self.record("create_transport");
        let n = self.transport_seq.fetch_add(1, Ordering::SeqCst);
        Ok(TransportOptions {
            id: format!("transport-{n}"),
            ice_parameters: json!({ "usernameFragment": "u", "password": "p" }),
            ice_candidates: json!([]),
            dtls_parameters: json!({ "role": "auto", "fingerprints": [] }),
            sctp_parameters: enable_sctp.then(|| json!({ "port": 5000 })),
        })
    }

    fn connect_transport(
        &self,
        _broadcaster_id: &str,
        _transport_id: &str,
        _dtls_parameters: &Value,
    ) -> SignalingResult<()> {
        self.record("connect_transport");
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(SignalingError::Timeout);
        }
        Ok(())
    }

    fn produce(
        &self,
        _broadcaster_id: &str,
        _transport_id: &str,
        _kind: MediaKind,
        _rtp_parameters: &Value,
        _app_data: &Value,
    ) -> SignalingResult<String> {
        self.record("produce");
        if self.fail_produce.load(Ordering::SeqCst) {
            return Err(SignalingError::Timeout);
        }
        let n = self.producer_seq.fetch_add(1, Ordering::SeqCst);
        Ok(format!("producer-{n}"))
    }

    fn produce_data(
        &self,
        _broadcaster_id: &str,
        _transport_id: &str,
        _sctp_stream_parameters: &Value,
        _label: &str,
        _protocol: &str,
        _app_data: &Value,
    ) -> SignalingResult<String> {
        self.record("produce_data");
        Ok("data-producer-0".to_string())
    }

    fn create_data_consumer(
        &self,
        _broadcaster_id: &str,
        _transport_id: &str,
        data_producer_id: &str,
    ) -> SignalingResult<DataConsumerOptions> {
        self.record("create_data_consumer");
        Ok(DataConsumerOptions {
            id: "data-consumer-0".to_string(),
            data_producer_id: data_producer_id.to_string(),
            stream_id: 0,
            label: "chat".to_string(),
            protocol: String::new(),
        })
    }

    fn remove_broadcaster(&self, _broadcaster_id: &str) -> SignalingResult<()> {
        self.record("remove_broadcaster");
        Ok(())
    }
}
