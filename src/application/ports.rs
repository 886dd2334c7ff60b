//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, TokioClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// A deferred unit of work handed to a `Scheduler`.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Port for one-shot deferred execution.
///
/// The throttle uses this to arm the trailing-edge flush. Infrastructure
/// provides concrete implementations (TokioScheduler, ManualScheduler).
///
/// The clock passed to the throttle and the scheduler should agree on what
/// "now" means, otherwise flushes run at the wrong point of the window.
pub trait Scheduler: Send + Sync + Debug {
    /// Run `task` once, no sooner than `delay` from now.
    ///
    /// Implementations must not run the task synchronously inside this call.
    /// A scheduled task always runs eventually; there is no cancellation.
    fn schedule(&self, delay: Duration, task: Task);
}
