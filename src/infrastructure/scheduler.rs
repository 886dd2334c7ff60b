//! Tokio timer adapter for the `Scheduler` port.

use crate::application::ports::{Scheduler, Task};
use std::time::Duration;
use tokio::runtime::Handle;

/// Error returned when no tokio runtime is available to drive timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoRuntimeError;

impl std::fmt::Display for NoRuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no tokio runtime is running on this thread")
    }
}

impl std::error::Error for NoRuntimeError {}

/// Scheduler that arms each flush as a tokio task sleeping for the delay.
///
/// The runtime handle is captured when the scheduler is created, so calls can
/// come from any thread, including ones outside the runtime. Deadlines are
/// taken from the caller's view of tokio time; see `TokioClock` for how that
/// differs outside the runtime when time is paused.
///
/// Once the runtime has shut down, spawned tasks are dropped without running.
/// The throttle runs such a dropped flush in place rather than losing it.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler spawning onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime the caller is running in.
    ///
    /// # Errors
    /// Returns `NoRuntimeError` when called outside a tokio runtime.
    pub fn current() -> Result<Self, NoRuntimeError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| NoRuntimeError)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        // Deadline is fixed now, not when the spawned task is first polled.
        // A zero delay still yields to the runtime before running the task.
        let deadline = tokio::time::Instant::now() + delay;
        self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task();
        });
    }
}
