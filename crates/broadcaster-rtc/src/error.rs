//! Error types for the engine contract.

use thiserror::Error;

/// Errors surfaced by engine handles and pending negotiations.
#[derive(Debug, Error)]
pub enum RtcError {
    /// Router capabilities are incompatible with the device.
    #[error("Capability mismatch: {0}")]
    CapabilityMismatch(String),

    /// Device operation attempted before a successful load.
    #[error("Device not loaded")]
    DeviceNotLoaded,

    /// Device loaded twice.
    #[error("Device already loaded")]
    DeviceAlreadyLoaded,

    /// Negotiation answer did not arrive within the budget.
    #[error("Negotiation timed out")]
    NegotiationTimeout,

    /// The completer was dropped without resolving.
    #[error("Negotiation abandoned")]
    NegotiationAbandoned,

    /// Negotiation resolved in an error state.
    #[error("Negotiation failed: {0}")]
    NegotiationFailed(String),

    /// Transport is closed or unusable.
    #[error("Transport closed: {0}")]
    TransportClosed(String),

    /// Send on a data producer failed.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Engine-internal failure.
    #[error("Engine error: {0}")]
    Engine(String),
}
