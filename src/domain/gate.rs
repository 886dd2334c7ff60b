//! Immediate-versus-deferred decision.
//!
//! The gate only knows when the target last ran and how long the pause is.
//! It does not run anything itself; callers ask it for a decision and stamp
//! it when the target actually executes.

use crate::domain::pause::Pause;
use std::time::{Duration, Instant};

/// Decision made by the gate for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Run the target now (leading edge)
    RunNow,
    /// Defer the call; the earliest allowed run is `delay` from now
    Defer {
        /// Time left until the throttling window closes
        delay: Duration,
    },
}

impl GateDecision {
    /// Check if this decision is RunNow.
    pub fn is_run_now(&self) -> bool {
        matches!(self, GateDecision::RunNow)
    }

    /// Check if this decision is Defer.
    pub fn is_defer(&self) -> bool {
        matches!(self, GateDecision::Defer { .. })
    }
}

/// Tracks the last execution and decides whether a call may run now.
///
/// # Example
/// ```
/// use call_throttle::{Gate, GateDecision, Pause};
/// use std::time::{Duration, Instant};
///
/// let mut gate = Gate::new(Pause::from_millis(100));
/// let start = Instant::now();
///
/// // Never run before: always immediate
/// assert_eq!(gate.decide(start), GateDecision::RunNow);
/// gate.stamp(start);
///
/// // Inside the window: deferred until the window closes
/// let decision = gate.decide(start + Duration::from_millis(20));
/// assert_eq!(decision, GateDecision::Defer { delay: Duration::from_millis(80) });
///
/// // Past the window: immediate again
/// assert!(gate.decide(start + Duration::from_millis(101)).is_run_now());
/// ```
#[derive(Debug, Clone)]
pub struct Gate {
    pause: Pause,
    last_run: Option<Instant>,
}

impl Gate {
    /// Create a gate that has never run.
    pub fn new(pause: Pause) -> Self {
        Self {
            pause,
            last_run: None,
        }
    }

    /// Decide what to do with a call arriving at `now`.
    ///
    /// A call arriving exactly `pause` after the last run is deferred with a
    /// zero delay rather than run synchronously.
    pub fn decide(&self, now: Instant) -> GateDecision {
        let Some(last_run) = self.last_run else {
            return GateDecision::RunNow;
        };

        let pause = self.pause.as_duration();
        let elapsed = now.saturating_duration_since(last_run);
        if elapsed > pause {
            GateDecision::RunNow
        } else {
            GateDecision::Defer {
                delay: pause - elapsed,
            }
        }
    }

    /// Record that the target executed at `now`.
    pub fn stamp(&mut self, now: Instant) {
        self.last_run = Some(now);
    }

    /// When the target last executed, if ever.
    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    /// The pause this gate enforces.
    pub fn pause(&self) -> Pause {
        self.pause
    }
}
