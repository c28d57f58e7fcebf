//! Error types for the session orchestrator.

use thiserror::Error;

use broadcaster_rtc::RtcError;
use broadcaster_signaling::SignalingError;

/// Errors that can end a session. None are retried inside the core.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The device rejected the router's capabilities. Fatal to start.
    #[error("Capability mismatch: {0}")]
    CapabilityMismatch(String),

    /// A signaling round-trip exceeded its budget.
    #[error("Signaling timed out")]
    SignalingTimeout,

    /// The engine reported a failed transport.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// API misuse, e.g. start on a session that is not idle.
    #[error("Invalid state: session is {0}")]
    InvalidState(&'static str),

    /// Other signaling failure.
    #[error("Signaling error: {0}")]
    Signaling(SignalingError),

    /// Other engine failure.
    #[error("Engine error: {0}")]
    Rtc(RtcError),
}

impl From<SignalingError> for SessionError {
    fn from(e: SignalingError) -> Self {
        match e {
            SignalingError::Timeout => Self::SignalingTimeout,
            other => Self::Signaling(other),
        }
    }
}

impl From<RtcError> for SessionError {
    fn from(e: RtcError) -> Self {
        match e {
            RtcError::CapabilityMismatch(reason) => Self::CapabilityMismatch(reason),
            RtcError::NegotiationTimeout => Self::SignalingTimeout,
            RtcError::TransportClosed(reason) => Self::TransportFailure(reason),
            other => Self::Rtc(other),
        }
    }
}
