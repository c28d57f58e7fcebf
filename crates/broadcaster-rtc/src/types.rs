//! Shared types of the engine contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media kind of a producer or consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio stream.
    Audio,

    /// Video stream.
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
        }
    }
}

/// Connection state reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Freshly created, ICE not started.
    New,

    /// ICE/DTLS negotiation in progress.
    Connecting,

    /// Media can flow.
    Connected,

    /// Negotiation failed permanently.
    Failed,

    /// Connectivity lost.
    Disconnected,

    /// Transport closed.
    Closed,
}

impl ConnectionState {
    /// Parses the engine's string form; unknown strings map to `Failed`.
    pub fn parse(s: &str) -> Self {
        match s {
            "new" => Self::New,
            "connecting" | "checking" => Self::Connecting,
            "connected" | "completed" => Self::Connected,
            "disconnected" => Self::Disconnected,
            "closed" => Self::Closed,
            _ => Self::Failed,
        }
    }

    /// True once the transport can no longer carry media.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Disconnected | Self::Closed)
    }

    /// True for the failure states that should tear the session down.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Disconnected)
    }

    /// Name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
            Self::Disconnected => "disconnected",
            Self::Closed => "closed",
        }
    }
}

/// Server-allocated transport parameters consumed by
/// [`Device::create_send_transport`](crate::Device::create_send_transport)
/// and its recv counterpart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    /// Server-side transport id.
    pub id: String,

    /// ICE ufrag/password blob.
    pub ice_parameters: Value,

    /// ICE candidate list.
    pub ice_candidates: Value,

    /// DTLS role and fingerprints.
    pub dtls_parameters: Value,

    /// SCTP parameters, present when data channels are enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sctp_parameters: Option<Value>,
}

/// One simulcast encoding layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpEncoding {
    /// Bitrate cap in bps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bitrate: Option<u32>,

    /// Downscale factor relative to the source resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_resolution_down_by: Option<f64>,
}

/// Standard three-layer simulcast ladder for video producers.
pub fn simulcast_encodings() -> Vec<RtpEncoding> {
    vec![
        RtpEncoding {
            max_bitrate: Some(100_000),
            scale_resolution_down_by: Some(4.0),
        },
        RtpEncoding {
            max_bitrate: Some(500_000),
            scale_resolution_down_by: Some(2.0),
        },
        RtpEncoding {
            max_bitrate: Some(1_500_000),
            scale_resolution_down_by: Some(1.0),
        },
    ]
}
