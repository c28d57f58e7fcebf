//! Single-resolution completion handles.
//!
//! A listener callback that owes the engine an asynchronous answer returns
//! a [`Deferred`]; whoever produces the answer holds the matching
//! [`Completer`]. Both halves are consumed on use, so a pending
//! negotiation is resolved at most once by construction, and a completer
//! dropped without resolving surfaces as an error on the waiting side
//! rather than a hang.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::RtcError;

/// Creates a connected completer/deferred pair.
pub fn deferred<T>() -> (Completer<T>, Deferred<T>) {
    let (tx, rx) = bounded(1);
    (Completer { tx }, Deferred { rx })
}

/// The producing half of a pending negotiation.
pub struct Completer<T> {
    tx: Sender<Result<T, RtcError>>,
}

impl<T> Completer<T> {
    /// Resolves the negotiation successfully.
    pub fn resolve(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Resolves the negotiation in an error state.
    pub fn fail(self, error: RtcError) {
        let _ = self.tx.send(Err(error));
    }
}

/// The consuming half of a pending negotiation.
pub struct Deferred<T> {
    rx: Receiver<Result<T, RtcError>>,
}

impl<T> Deferred<T> {
    /// Blocks until the negotiation resolves, up to `timeout`.
    ///
    /// Returns [`RtcError::NegotiationTimeout`] if the budget elapses and
    /// [`RtcError::NegotiationAbandoned`] if the completer was dropped
    /// unresolved.
    pub fn wait(self, timeout: Duration) -> Result<T, RtcError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(RtcError::NegotiationTimeout),
            Err(RecvTimeoutError::Disconnected) => Err(RtcError::NegotiationAbandoned),
        }
    }
}
