//! Cancellable wait primitive for background loops.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A one-shot cancellation gate.
///
/// Background loops sleep on [`wait_for`](Self::wait_for) instead of a
/// plain timed sleep, so shutdown interrupts them immediately rather
/// than at the next scheduled interval. Cancellation is monotonic: once
/// [`kill`](Self::kill) runs, every current and future wait returns
/// false at once.
#[derive(Default)]
pub struct CompletionGate {
    terminated: Mutex<bool>,
    cv: Condvar,
}

impl CompletionGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `duration`. Returns true if the full duration elapsed
    /// without cancellation, false if the gate was killed first.
    pub fn wait_for(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut terminated = self.terminated.lock();
        while !*terminated {
            if self.cv.wait_until(&mut terminated, deadline).timed_out() {
                // Re-check: a kill may have raced the timeout.
                return !*terminated;
            }
        }
        false
    }

    /// Cancels the gate and wakes all waiters. Safe to call repeatedly.
    pub fn kill(&self) {
        let mut terminated = self.terminated.lock();
        if !*terminated {
            *terminated = true;
            self.cv.notify_all();
        }
    }

    /// True once the gate has been killed.
    pub fn killed(&self) -> bool {
        *self.terminated.lock()
    }
}
