//! Attempt budget state machine for one generation.

use tracing::debug;

/// Model calls allowed per request.
pub const MAX_ATTEMPTS: u32 = 3;

/// Where a generation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// About to make call number `n` (1-based).
    Attempting(u32),
    /// Output was accepted.
    Accepted,
    /// Budget spent without an accepted output.
    Exhausted,
}

impl AttemptState {
    /// Returns `true` once no further calls may be made.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Exhausted)
    }
}

/// Outcome of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptEvent {
    /// The call itself failed; the prompt stays as it was.
    TransportFailed,
    /// The model answered with unusable output; the prompt gets corrected.
    OutputMalformed,
    /// The output validated.
    OutputAccepted,
}

impl AttemptEvent {
    /// Returns `true` when the next attempt must use a self-corrected prompt.
    #[must_use]
    pub const fn requires_correction(self) -> bool {
        matches!(self, Self::OutputMalformed)
    }
}

/// Tracks the [`MAX_ATTEMPTS`] budget. Terminal states absorb further events.
#[derive(Debug, Clone, Copy)]
pub struct AttemptTracker {
    state: AttemptState,
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptTracker {
    /// Starts at the first attempt.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AttemptState::Attempting(1),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> AttemptState {
        self.state
    }

    /// Applies the outcome of the current attempt and returns the new state.
    pub fn transition(&mut self, event: AttemptEvent) -> AttemptState {
        let next = match (self.state, event) {
            (AttemptState::Attempting(_), AttemptEvent::OutputAccepted) => AttemptState::Accepted,
            (AttemptState::Attempting(n), _) if n < MAX_ATTEMPTS => AttemptState::Attempting(n + 1),
            (AttemptState::Attempting(_), _) => AttemptState::Exhausted,
            (terminal, _) => terminal,
        };

        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?event, "attempt transition");
            self.state = next;
        }
        self.state
    }
}
