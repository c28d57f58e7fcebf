//! Session orchestrator for the SFU broadcaster.
//!
//! One [`Broadcaster`] owns one session: it loads the device against the
//! router's capabilities, creates send/recv transports, registers
//! producers and the loopback data consumer, and runs a background
//! data-send loop until stopped. It implements every listener contract
//! the transport engine calls back into, bridging those asynchronous
//! callbacks to blocking signaling round-trips.

mod broadcaster;
mod error;
mod gate;
mod state;

#[cfg(test)]
mod fakes;

pub use broadcaster::{Broadcaster, StartOptions, DATA_SEND_INTERVAL};
pub use error::SessionError;
pub use gate::CompletionGate;
pub use state::SessionState;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
