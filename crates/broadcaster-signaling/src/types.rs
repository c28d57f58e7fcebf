//! Wire types exchanged with the session server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The router's RTP capabilities, kept opaque; only the device interprets
/// them.
pub type RouterCapabilities = Value;

/// Which direction a server-side transport will carry media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportDirection {
    /// Local producers, outbound media.
    Send,

    /// Remote producers, inbound media.
    Recv,
}

impl TransportDirection {
    /// Name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Recv => "recv",
        }
    }
}

/// Parameters for a server-created data consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConsumerOptions {
    /// Server-side data consumer id.
    pub id: String,

    /// The data producer being consumed.
    pub data_producer_id: String,

    /// SCTP stream id.
    #[serde(default)]
    pub stream_id: u16,

    /// Data-channel label.
    #[serde(default)]
    pub label: String,

    /// Data-channel protocol.
    #[serde(default)]
    pub protocol: String,
}
