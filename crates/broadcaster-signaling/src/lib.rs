//! Request/response signaling client for the SFU session server.
//!
//! The server speaks the mediasoup broadcaster REST dialect. Every call
//! is blocking with a bounded timeout; callers (the orchestrator's
//! listener handlers) rely on that bound to avoid wedging engine worker
//! threads on a dead network.

mod client;
mod error;
mod http;
mod types;

pub use client::SignalingClient;
pub use error::SignalingError;
pub use http::HttpSignalingClient;
pub use types::{DataConsumerOptions, RouterCapabilities, TransportDirection};

use std::time::Duration;

/// Result type for signaling operations.
pub type SignalingResult<T> = Result<T, SignalingError>;

/// Per-request budget for signaling round-trips.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
