//! Handle traits implemented by the transport engine SDK.
//!
//! Every handle is opaque; the orchestrator only sequences them. Ordering
//! contract: [`Device::load`] strictly precedes transport creation, and
//! transport creation strictly precedes producer/consumer creation.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    ConsumerListener, DataConsumerListener, DataProducerListener, MediaKind, ProducerListener,
    RtcResult, RtpEncoding, SendTransportListener, TransportListener, TransportOptions,
};

/// Capability-negotiating entry point of the engine.
pub trait Device: Send + Sync {
    /// Loads the device with the router's RTP capabilities. Once-only;
    /// fails with [`RtcError::CapabilityMismatch`](crate::RtcError) when
    /// the router offers nothing the device can handle.
    fn load(&self, router_rtp_capabilities: &Value) -> RtcResult<()>;

    /// True after a successful [`Self::load`].
    fn loaded(&self) -> bool;

    /// The device's negotiated RTP capabilities.
    fn rtp_capabilities(&self) -> RtcResult<Value>;

    /// The device's SCTP capabilities.
    fn sctp_capabilities(&self) -> RtcResult<Value>;

    /// Creates a send transport from server-allocated parameters. The
    /// listener outlives the transport; `on_connect` fires asynchronously
    /// once the transport is first used.
    fn create_send_transport(
        &self,
        listener: Arc<dyn SendTransportListener>,
        options: &TransportOptions,
    ) -> RtcResult<Box<dyn SendTransport>>;

    /// Recv-side counterpart of [`Self::create_send_transport`].
    fn create_recv_transport(
        &self,
        listener: Arc<dyn TransportListener>,
        options: &TransportOptions,
    ) -> RtcResult<Box<dyn RecvTransport>>;
}

/// Common transport surface.
pub trait Transport: Send + Sync {
    /// Server-side transport id.
    fn id(&self) -> &str;

    /// Closes the transport and everything bound to it.
    fn close(&self);

    /// True once closed.
    fn closed(&self) -> bool;
}

/// Outbound transport.
pub trait SendTransport: Transport {
    /// Creates a producer. The engine generates the RTP parameters and
    /// calls `on_produce` on the transport's listener before returning.
    fn produce(
        &self,
        listener: Arc<dyn ProducerListener>,
        kind: MediaKind,
        encodings: &[RtpEncoding],
        app_data: Value,
    ) -> RtcResult<Box<dyn Producer>>;

    /// Creates a data producer; `on_produce_data` fires on the listener.
    fn produce_data(
        &self,
        listener: Arc<dyn DataProducerListener>,
        label: &str,
        protocol: &str,
    ) -> RtcResult<Arc<dyn DataProducer>>;
}

/// Inbound transport.
pub trait RecvTransport: Transport {
    /// Creates a consumer for a remote producer.
    fn consume(
        &self,
        listener: Arc<dyn ConsumerListener>,
        id: &str,
        producer_id: &str,
        kind: MediaKind,
        rtp_parameters: Value,
    ) -> RtcResult<Box<dyn Consumer>>;

    /// Creates a data consumer for a remote data producer.
    fn consume_data(
        &self,
        listener: Arc<dyn DataConsumerListener>,
        id: &str,
        data_producer_id: &str,
        stream_id: u16,
        label: &str,
        protocol: &str,
    ) -> RtcResult<Box<dyn DataConsumer>>;
}

/// Outbound media stream handle.
pub trait Producer: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> MediaKind;

    fn close(&self);
}

/// Inbound media stream handle.
pub trait Consumer: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> MediaKind;

    fn close(&self);
}

/// Outbound data-channel handle. Shared between the orchestrator and its
/// background send loop, hence `Send + Sync` and `Arc` ownership.
pub trait DataProducer: Send + Sync {
    fn id(&self) -> &str;

    /// Sends one message on the data channel.
    fn send(&self, payload: &[u8]) -> RtcResult<()>;

    /// Bytes queued on the underlying channel.
    fn buffered_amount(&self) -> u64;

    fn close(&self);
}

/// Inbound data-channel handle.
pub trait DataConsumer: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    fn close(&self);
}
