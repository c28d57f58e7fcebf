//! The signaling contract the orchestrator consumes.

use serde_json::Value;

use broadcaster_rtc::{MediaKind, TransportOptions};

use crate::{DataConsumerOptions, RouterCapabilities, SignalingResult, TransportDirection};

/// Request/response channel to the session server.
///
/// Every call blocks its caller for at most the client's request budget;
/// failures are never retried here.
pub trait SignalingClient: Send + Sync {
    /// Fetches the router's RTP capabilities.
    fn load_capabilities(&self) -> SignalingResult<RouterCapabilities>;

    /// Registers this broadcaster with the room.
    fn announce(&self, broadcaster_id: &str, rtp_capabilities: &Value) -> SignalingResult<()>;

    /// Allocates a server-side WebRTC transport and returns the
    /// ICE/DTLS/SCTP parameters the device needs to mirror it locally.
    fn create_transport(
        &self,
        broadcaster_id: &str,
        direction: TransportDirection,
        enable_sctp: bool,
        sctp_capabilities: &Value,
    ) -> SignalingResult<TransportOptions>;

    /// Delivers the local DTLS parameters for a transport.
    fn connect_transport(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        dtls_parameters: &Value,
    ) -> SignalingResult<()>;

    /// Registers a producer; returns the server-assigned producer id.
    fn produce(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: &Value,
        app_data: &Value,
    ) -> SignalingResult<String>;

    /// Registers a data producer; returns the server-assigned id.
    fn produce_data(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        sctp_stream_parameters: &Value,
        label: &str,
        protocol: &str,
        app_data: &Value,
    ) -> SignalingResult<String>;

    /// Asks the server to create a data consumer for a data producer.
    fn create_data_consumer(
        &self,
        broadcaster_id: &str,
        transport_id: &str,
        data_producer_id: &str,
    ) -> SignalingResult<DataConsumerOptions>;

    /// Removes this broadcaster from the room. Best effort on teardown.
    fn remove_broadcaster(&self, broadcaster_id: &str) -> SignalingResult<()>;
}
