//! The session orchestrator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use broadcaster_rtc::{
    deferred, simulcast_encodings, ConnectionState, ConsumerListener, DataConsumer,
    DataConsumerListener, DataProducer, DataProducerListener, Deferred, Device, MediaKind,
    Producer, ProducerListener, RecvTransport, RtcError, SendTransport, SendTransportListener,
    TransportListener,
};
use broadcaster_signaling::{SignalingClient, SignalingError, TransportDirection};

use crate::{CompletionGate, SessionError, SessionResult, SessionState};

/// Interval between data-channel messages from the background loop.
pub const DATA_SEND_INTERVAL: Duration = Duration::from_secs(2);

/// Label of the loopback data channel.
const DATA_CHANNEL_LABEL: &str = "chat";

/// Parameters for [`Broadcaster::start`].
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Create an audio producer alongside the video one.
    pub enable_audio: bool,

    /// Produce video with the three-layer simulcast ladder.
    pub use_simulcast: bool,

    /// Router RTP capabilities; fetched from the server when `None`.
    pub router_rtp_capabilities: Option<Value>,

    /// Interval of the background data-send loop.
    pub send_interval: Duration,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            enable_audio: false,
            use_simulcast: false,
            router_rtp_capabilities: None,
            send_interval: DATA_SEND_INTERVAL,
        }
    }
}

/// One broadcast session against the SFU.
///
/// Owns the device/transport lifecycle and the background data-send
/// loop; implements every listener contract the engine calls back into.
pub struct Broadcaster {
    inner: Arc<Inner>,
}

struct Inner {
    id: String,
    device: Arc<dyn Device>,
    signaling: Arc<dyn SignalingClient>,
    state: RwLock<SessionState>,
    resources: Mutex<SessionResources>,
    gate: CompletionGate,
    send_thread: Mutex<Option<JoinHandle<()>>>,
    // Set by the failure handler; a report delivered while still
    // Negotiating is honored when start() reaches Active.
    transport_failed: AtomicBool,
    // Lets fire-and-forget callbacks hand teardown to a fresh thread.
    self_ref: Weak<Inner>,
}

#[derive(Default)]
struct SessionResources {
    send_transport: Option<Box<dyn SendTransport>>,
    recv_transport: Option<Box<dyn RecvTransport>>,
    audio_producer: Option<Box<dyn Producer>>,
    video_producer: Option<Box<dyn Producer>>,
    data_producer: Option<Arc<dyn DataProducer>>,
    data_consumer: Option<Box<dyn DataConsumer>>,
}

impl Broadcaster {
    /// Creates an idle session bound to a device and a signaling client.
    pub fn new(device: Arc<dyn Device>, signaling: Arc<dyn SignalingClient>) -> Self {
        let inner = Arc::new_cyclic(|self_ref| Inner {
            id: Uuid::new_v4().to_string(),
            device,
            signaling,
            state: RwLock::new(SessionState::Idle),
            resources: Mutex::new(SessionResources::default()),
            gate: CompletionGate::new(),
            send_thread: Mutex::new(None),
            transport_failed: AtomicBool::new(false),
            self_ref: self_ref.clone(),
        });
        Self { inner }
    }

    /// The session (broadcaster) id announced to the server.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Negotiates the session and spawns the data-send loop.
    ///
    /// Fails with [`SessionError::InvalidState`] unless the session is
    /// idle; a failed negotiation tears down whatever was created and
    /// leaves the session `Stopped`.
    pub fn start(&self, options: StartOptions) -> SessionResult<()> {
        {
            let mut state = self.inner.state.write();
            if !state.is_idle() {
                return Err(SessionError::InvalidState(state.name()));
            }
            *state = SessionState::Negotiating;
        }
        info!(id = %self.inner.id, "starting session");

        match self.inner.negotiate(&options) {
            Ok(()) => {
                *self.inner.state.write() = SessionState::Active;
                // A Failed/Disconnected report raced the negotiation:
                // its dispatched shutdown was a no-op while we were
                // still Negotiating, so honor it here.
                if self.inner.transport_failed.load(Ordering::SeqCst) {
                    warn!(id = %self.inner.id, "transport failed during negotiation");
                    self.inner.shutdown();
                    return Err(SessionError::TransportFailure(
                        "transport failed during negotiation".into(),
                    ));
                }
                self.inner.spawn_send_loop(options.send_interval);
                info!(id = %self.inner.id, "session active");
                Ok(())
            }
            Err(e) => {
                error!(id = %self.inner.id, error = %e, "negotiation failed");
                self.inner.teardown_resources();
                *self.inner.state.write() = SessionState::Stopped;
                Err(e)
            }
        }
    }

    /// Stops the session. Idempotent; returns once the send loop has
    /// been joined and the transports closed.
    pub fn stop(&self) {
        self.inner.shutdown();
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl Inner {
    fn negotiate(self: &Arc<Self>, options: &StartOptions) -> SessionResult<()> {
        let router_capabilities = match &options.router_rtp_capabilities {
            Some(capabilities) => capabilities.clone(),
            None => self.signaling.load_capabilities()?,
        };

        self.device.load(&router_capabilities)?;
        debug!("device loaded");

        self.signaling
            .announce(&self.id, &self.device.rtp_capabilities()?)?;

        let listener = Arc::clone(self);
        let sctp_capabilities = self.device.sctp_capabilities()?;

        // Send side: transport, media producers, data producer.
        let send_options = self.signaling.create_transport(
            &self.id,
            TransportDirection::Send,
            true,
            &sctp_capabilities,
        )?;
        let send_transport = self
            .device
            .create_send_transport(listener.clone(), &send_options)?;
        debug!(transport_id = %send_transport.id(), "send transport created");

        let audio_producer = if options.enable_audio {
            Some(send_transport.produce(listener.clone(), MediaKind::Audio, &[], json!({}))?)
        } else {
            None
        };

        let encodings = if options.use_simulcast {
            simulcast_encodings()
        } else {
            Vec::new()
        };
        let video_producer =
            send_transport.produce(listener.clone(), MediaKind::Video, &encodings, json!({}))?;

        let data_producer =
            send_transport.produce_data(listener.clone(), DATA_CHANNEL_LABEL, "")?;

        // Recv side: transport plus a loopback consumer of our own data
        // producer.
        let recv_options = self.signaling.create_transport(
            &self.id,
            TransportDirection::Recv,
            true,
            &sctp_capabilities,
        )?;
        let recv_transport = self
            .device
            .create_recv_transport(listener.clone(), &recv_options)?;
        debug!(transport_id = %recv_transport.id(), "recv transport created");

        let consumer_options =
            self.signaling
                .create_data_consumer(&self.id, recv_transport.id(), data_producer.id())?;
        let data_consumer = recv_transport.consume_data(
            listener,
            &consumer_options.id,
            &consumer_options.data_producer_id,
            consumer_options.stream_id,
            &consumer_options.label,
            &consumer_options.protocol,
        )?;

        let mut resources = self.resources.lock();
        resources.send_transport = Some(send_transport);
        resources.recv_transport = Some(recv_transport);
        resources.audio_producer = audio_producer;
        resources.video_producer = Some(video_producer);
        resources.data_producer = Some(data_producer);
        resources.data_consumer = Some(data_consumer);
        Ok(())
    }

    fn spawn_send_loop(self: &Arc<Self>, interval: Duration) {
        let inner = Arc::clone(self);
        let handle = thread::spawn(move || run_send_loop(inner, interval));
        *self.send_thread.lock() = Some(handle);
    }

    fn shutdown(&self) {
        {
            let mut state = self.state.write();
            if !state.is_active() {
                return;
            }
            *state = SessionState::Stopping;
        }
        info!(id = %self.id, "stopping session");

        self.gate.kill();
        if let Some(handle) = self.send_thread.lock().take() {
            let _ = handle.join();
        }

        self.teardown_resources();
        *self.state.write() = SessionState::Stopped;
        info!(id = %self.id, "session stopped");
    }

    /// Closes engine handles and removes the broadcaster server-side.
    /// Handles are taken out of the lock first: closing a transport may
    /// re-enter the listener callbacks, which take the same lock.
    fn teardown_resources(&self) {
        let taken = {
            let mut resources = self.resources.lock();
            std::mem::take(&mut *resources)
        };

        if let Some(data_consumer) = taken.data_consumer {
            data_consumer.close();
        }
        if let Some(data_producer) = taken.data_producer {
            data_producer.close();
        }
        if let Some(producer) = taken.audio_producer {
            producer.close();
        }
        if let Some(producer) = taken.video_producer {
            producer.close();
        }
        if let Some(transport) = taken.recv_transport {
            transport.close();
        }
        if let Some(transport) = taken.send_transport {
            transport.close();
        }

        if let Err(e) = self.signaling.remove_broadcaster(&self.id) {
            warn!(id = %self.id, error = %e, "broadcaster removal failed");
        }
    }
}

fn run_send_loop(inner: Arc<Inner>, interval: Duration) {
    debug!(id = %inner.id, "data send loop starting");
    let mut sequence: u64 = 0;

    loop {
        if !inner.gate.wait_for(interval) {
            break;
        }

        let Some(producer) = inner.resources.lock().data_producer.clone() else {
            break;
        };

        let payload = format!("broadcaster {} message {}", inner.id, sequence);
        match producer.send(payload.as_bytes()) {
            Ok(()) => trace!(sequence, "data message sent"),
            Err(e) => warn!(sequence, error = %e, "data send failed"),
        }
        sequence += 1;
    }

    debug!(id = %inner.id, "data send loop stopped");
}

fn signaling_failure(e: SignalingError) -> RtcError {
    match e {
        SignalingError::Timeout => RtcError::NegotiationTimeout,
        other => RtcError::NegotiationFailed(other.to_string()),
    }
}

impl TransportListener for Inner {
    fn on_connect(&self, transport_id: &str, dtls_parameters: &Value) -> Deferred<()> {
        debug!(transport_id, "transport requests connect");
        let (completer, pending) = deferred();

        // Blocks the engine worker thread on the signaling round-trip;
        // the client's request timeout bounds it.
        match self
            .signaling
            .connect_transport(&self.id, transport_id, dtls_parameters)
        {
            Ok(()) => {
                debug!(transport_id, "dtls parameters accepted");
                completer.resolve(());
            }
            Err(e) => {
                warn!(transport_id, error = %e, "transport connect rejected");
                completer.fail(signaling_failure(e));
            }
        }
        pending
    }

    fn on_connection_state_change(&self, transport_id: &str, state: ConnectionState) {
        info!(transport_id, state = state.name(), "connection state changed");
        if state.is_failure() {
            self.transport_failed.store(true, Ordering::SeqCst);
            // Teardown joins threads and talks to the server; never run
            // it inline on the engine thread.
            if let Some(inner) = self.self_ref.upgrade() {
                thread::spawn(move || inner.shutdown());
            }
        }
    }
}

impl SendTransportListener for Inner {
    fn on_produce(
        &self,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: Value,
        app_data: Value,
    ) -> Deferred<String> {
        debug!(transport_id, %kind, "transport requests producer id");
        let (completer, pending) = deferred();

        match self
            .signaling
            .produce(&self.id, transport_id, kind, &rtp_parameters, &app_data)
        {
            Ok(producer_id) => {
                debug!(transport_id, %producer_id, "producer registered");
                completer.resolve(producer_id);
            }
            Err(e) => {
                warn!(transport_id, %kind, error = %e, "produce rejected");
                completer.fail(signaling_failure(e));
            }
        }
        pending
    }

    fn on_produce_data(
        &self,
        transport_id: &str,
        sctp_stream_parameters: Value,
        label: &str,
        protocol: &str,
        app_data: Value,
    ) -> Deferred<String> {
        debug!(transport_id, label, "transport requests data producer id");
        let (completer, pending) = deferred();

        match self.signaling.produce_data(
            &self.id,
            transport_id,
            &sctp_stream_parameters,
            label,
            protocol,
            &app_data,
        ) {
            Ok(data_producer_id) => {
                debug!(transport_id, %data_producer_id, "data producer registered");
                completer.resolve(data_producer_id);
            }
            Err(e) => {
                warn!(transport_id, label, error = %e, "produce_data rejected");
                completer.fail(signaling_failure(e));
            }
        }
        pending
    }
}

impl ProducerListener for Inner {
    fn on_transport_close(&self, producer_id: &str) {
        info!(producer_id, "producer closed with its transport");
        let resources = &mut *self.resources.lock();
        for slot in [&mut resources.audio_producer, &mut resources.video_producer] {
            if slot.as_ref().is_some_and(|p| p.id() == producer_id) {
                *slot = None;
            }
        }
    }
}

impl ConsumerListener for Inner {
    fn on_transport_close(&self, consumer_id: &str) {
        info!(consumer_id, "consumer closed with its transport");
    }
}

impl DataProducerListener for Inner {
    fn on_open(&self, data_producer_id: &str) {
        debug!(data_producer_id, "data channel open");
    }

    fn on_close(&self, data_producer_id: &str) {
        debug!(data_producer_id, "data channel closed");
    }

    fn on_buffered_amount_change(&self, data_producer_id: &str, size: u64) {
        trace!(data_producer_id, size, "buffered amount changed");
    }

    fn on_transport_close(&self, data_producer_id: &str) {
        info!(data_producer_id, "data producer closed with its transport");
        self.resources.lock().data_producer = None;
    }
}

impl DataConsumerListener for Inner {
    fn on_message(&self, data_consumer_id: &str, payload: &[u8]) {
        match std::str::from_utf8(payload) {
            Ok(text) => info!(data_consumer_id, text, "data message received"),
            Err(_) => info!(data_consumer_id, len = payload.len(), "binary data received"),
        }
    }

    fn on_connecting(&self, _data_consumer_id: &str) {}

    fn on_open(&self, _data_consumer_id: &str) {}

    fn on_closing(&self, _data_consumer_id: &str) {}

    fn on_close(&self, _data_consumer_id: &str) {}

    fn on_transport_close(&self, data_consumer_id: &str) {
        info!(data_consumer_id, "data consumer closed with its transport");
        self.resources.lock().data_consumer = None;
    }
}
