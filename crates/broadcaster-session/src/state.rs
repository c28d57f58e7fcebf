//! Session state machine types.

/// Lifecycle of one broadcast session.
///
/// `Idle → Negotiating → Active → Stopping → Stopped`; `Stopped` is
/// terminal, and a failed negotiation lands there directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, not started.
    #[default]
    Idle,

    /// Device load and transport negotiation in progress.
    Negotiating,

    /// Transports up, send loop running.
    Active,

    /// Teardown in progress.
    Stopping,

    /// Terminal.
    Stopped,
}

impl SessionState {
    /// Returns true if the session has not been started.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true while negotiation is in flight.
    pub fn is_negotiating(&self) -> bool {
        matches!(self, Self::Negotiating)
    }

    /// Returns true while the session is live.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns true while teardown runs.
    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::Stopping)
    }

    /// Returns true once the session is over.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Negotiating => "Negotiating",
            Self::Active => "Active",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
        }
    }
}
