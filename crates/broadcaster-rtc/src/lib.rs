//! Contract between the session orchestrator and the WebRTC transport
//! engine.
//!
//! The engine itself (ICE/DTLS/SRTP, codecs) is an opaque SDK. This crate
//! defines the handle traits the orchestrator drives, the listener traits
//! the engine calls back into, and the single-resolution [`Deferred`]
//! result that bridges the two.

mod deferred;
mod engine;
mod error;
mod listener;
mod types;

pub use deferred::{deferred, Completer, Deferred};
pub use engine::{
    Consumer, DataConsumer, DataProducer, Device, Producer, RecvTransport, SendTransport,
    Transport,
};
pub use error::RtcError;
pub use listener::{
    ConsumerListener, DataConsumerListener, DataProducerListener, ProducerListener,
    SendTransportListener, TransportListener,
};
pub use types::{simulcast_encodings, ConnectionState, MediaKind, RtpEncoding, TransportOptions};

use std::time::Duration;

/// Result type for engine operations.
pub type RtcResult<T> = Result<T, RtcError>;

/// Budget for one pending negotiation (signaling round-trip included).
///
/// Every [`Deferred::wait`] must be bounded; an engine waiting on an
/// unresolved negotiation past this budget treats it as failed rather
/// than stalling its worker thread forever.
pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(15);
