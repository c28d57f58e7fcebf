//! Listener traits the engine calls back into.
//!
//! The engine invokes these from its own worker threads, concurrently
//! with the orchestrator's threads. Handlers returning a [`Deferred`] owe
//! the engine exactly one resolution; the remaining handlers are
//! fire-and-forget notifications and must not block the engine thread
//! beyond trivial bookkeeping.

use serde_json::Value;

use crate::{ConnectionState, Deferred, MediaKind};

/// Callbacks shared by send and recv transports.
pub trait TransportListener: Send + Sync {
    /// Fired at most once per transport, when it needs its DTLS parameters
    /// delivered to the remote side. The returned deferred must resolve
    /// exactly once; an unresolved deferred wedges the transport forever.
    fn on_connect(&self, transport_id: &str, dtls_parameters: &Value) -> Deferred<()>;

    /// Connection-state notification.
    fn on_connection_state_change(&self, transport_id: &str, state: ConnectionState);
}

/// Callbacks specific to send transports.
pub trait SendTransportListener: TransportListener {
    /// The transport needs a server-assigned producer id for locally
    /// generated RTP parameters.
    fn on_produce(
        &self,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: Value,
        app_data: Value,
    ) -> Deferred<String>;

    /// Data-channel counterpart of [`Self::on_produce`].
    fn on_produce_data(
        &self,
        transport_id: &str,
        sctp_stream_parameters: Value,
        label: &str,
        protocol: &str,
        app_data: Value,
    ) -> Deferred<String>;
}

/// Producer lifecycle callbacks.
pub trait ProducerListener: Send + Sync {
    /// The owning transport closed; the producer is gone with it.
    fn on_transport_close(&self, producer_id: &str);
}

/// Consumer lifecycle callbacks.
pub trait ConsumerListener: Send + Sync {
    /// The owning transport closed; the consumer is gone with it.
    fn on_transport_close(&self, consumer_id: &str);
}

/// Data-producer lifecycle callbacks.
pub trait DataProducerListener: Send + Sync {
    /// Underlying data channel opened.
    fn on_open(&self, data_producer_id: &str);

    /// Underlying data channel closed.
    fn on_close(&self, data_producer_id: &str);

    /// Buffered-amount watermark change on the data channel.
    fn on_buffered_amount_change(&self, data_producer_id: &str, size: u64);

    /// The owning transport closed.
    fn on_transport_close(&self, data_producer_id: &str);
}

/// Data-consumer callbacks.
pub trait DataConsumerListener: Send + Sync {
    /// A message arrived on the data channel.
    fn on_message(&self, data_consumer_id: &str, payload: &[u8]);

    fn on_connecting(&self, _data_consumer_id: &str) {}

    fn on_open(&self, _data_consumer_id: &str) {}

    fn on_closing(&self, _data_consumer_id: &str) {}

    fn on_close(&self, _data_consumer_id: &str) {}

    /// The owning transport closed.
    fn on_transport_close(&self, data_consumer_id: &str);
}
