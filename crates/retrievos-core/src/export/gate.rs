// ── Export gate ──
//
// Every export attempt passes through one gate, checked in order:
//   1. disabled        -> reject
//   2. untrusted       -> reject
//   3. burst window    -> count; more than BURST_LIMIT per window disables
//   4. throttle        -> reject within THROTTLE of the last accepted export
//   5. in flight       -> reject until IN_FLIGHT after the last accepted export
// Disabling is permanent for the life of the gate.

use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Minimum spacing between accepted exports.
pub const THROTTLE: Duration = Duration::from_millis(2000);
/// Length of the burst-counting window.
pub const BURST_WINDOW: Duration = Duration::from_millis(10_000);
/// Attempts allowed per window; the next one disables exports.
pub const BURST_LIMIT: u32 = 5;
/// How long an accepted export counts as in flight.
pub const IN_FLIGHT: Duration = Duration::from_millis(1200);

pub const DISABLED_NOTICE: &str =
    "Export triggered too many times automatically and was suspended. Restart to re-enable.";

/// Where an export request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Direct physical input (a key press read from the terminal).
    Trusted,
    /// Scripted, replayed or otherwise synthesized.
    Synthetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Disabled,
    Untrusted,
    /// This attempt tripped the burst breaker; the gate is now disabled.
    BurstTripped,
    Throttled,
    InFlight,
}

impl RejectReason {
    /// Only tripping the breaker warrants telling the user.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::BurstTripped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    Rejected(RejectReason),
}

impl GateDecision {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn rejection(self) -> Option<RejectReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    /// Within `THROTTLE` of the last accepted export.
    Cooling,
    Disabled,
}

#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    last_export: Option<Instant>,
    window_start: Option<Instant>,
    window_count: u32,
    in_flight_until: Option<Instant>,
    disabled: bool,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one export attempt at `now`.
    pub fn attempt(&mut self, gesture: Gesture, now: Instant) -> GateDecision {
        let decision = self.evaluate(gesture, now);
        match decision {
            GateDecision::Accepted => info!("export accepted"),
            GateDecision::Rejected(RejectReason::BurstTripped) => {
                warn!(
                    attempts = self.window_count,
                    "export burst limit exceeded; exports disabled"
                );
            }
            GateDecision::Rejected(reason) => warn!(?reason, "export rejected"),
        }
        decision
    }

    fn evaluate(&mut self, gesture: Gesture, now: Instant) -> GateDecision {
        if self.disabled {
            return GateDecision::Rejected(RejectReason::Disabled);
        }
        if gesture != Gesture::Trusted {
            return GateDecision::Rejected(RejectReason::Untrusted);
        }

        let window_expired = self
            .window_start
            .is_none_or(|start| now.saturating_duration_since(start) > BURST_WINDOW);
        if window_expired {
            self.window_start = Some(now);
            self.window_count = 0;
        }
        self.window_count += 1;
        if self.window_count > BURST_LIMIT {
            self.disabled = true;
            return GateDecision::Rejected(RejectReason::BurstTripped);
        }

        if self.cooling(now) {
            return GateDecision::Rejected(RejectReason::Throttled);
        }
        // THROTTLE outlasts IN_FLIGHT, so the throttle check above always wins
        if self.in_flight(now) {
            return GateDecision::Rejected(RejectReason::InFlight);
        }

        self.last_export = Some(now);
        self.in_flight_until = Some(now + IN_FLIGHT);
        GateDecision::Accepted
    }

    fn cooling(&self, now: Instant) -> bool {
        self.last_export
            .is_some_and(|last| now.saturating_duration_since(last) < THROTTLE)
    }

    /// True while the last accepted export is still being delivered.
    pub fn in_flight(&self, now: Instant) -> bool {
        self.in_flight_until.is_some_and(|until| now < until)
    }

    pub fn state(&self, now: Instant) -> GateState {
        if self.disabled {
            GateState::Disabled
        } else if self.cooling(now) {
            GateState::Cooling
        } else {
            GateState::Idle
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}
