//! # call-throttle
//!
//! Leading and trailing edge throttling for arbitrary callables.
//!
//! Wrapping a function with [`throttle`] produces a [`Throttled`] handle that
//! runs the function at most once per pause, while guaranteeing that the most
//! recent call is eventually honored:
//!
//! - The first call, and any call arriving more than `pause` after the last
//!   execution, runs the target immediately (leading edge) and hands its
//!   return value back to the caller.
//! - A call inside the throttling window is deferred. The first deferred call
//!   arms a single timer for the end of the window; later calls only replace
//!   the pending call (coalescing).
//! - When the timer fires the target runs once more with the latest pending
//!   call (trailing edge), which opens a new window.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use call_throttle::throttle;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let report = throttle(|progress: u32| println!("{}% done", progress), Duration::from_millis(100))
//!     .expect("valid pause inside a tokio runtime");
//!
//! for progress in 0..=100 {
//!     report.call(progress);
//! }
//!
//! // Prints "0% done" right away and "100% done" about 100ms later
//! tokio::time::sleep(Duration::from_millis(150)).await;
//! # }
//! ```
//!
//! ## Invocation Context
//!
//! Targets that need a receiver get it as an explicit first argument. The
//! receiver is captured together with the arguments, so a trailing execution
//! replays exactly what the latest call supplied:
//!
//! ```rust,no_run
//! use call_throttle::throttle_with_context;
//! use std::sync::Arc;
//!
//! struct Editor { name: String }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let autosave = throttle_with_context(
//!     |editor: Arc<Editor>, text: String| println!("{}: {}", editor.name, text),
//!     1_000.0,
//! )
//! .unwrap();
//!
//! let editor = Arc::new(Editor { name: "notes.txt".into() });
//! autosave.call_with(Arc::clone(&editor), "hello".into());
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`ThrottleBuilder`] exposes the pieces the factory functions fill in:
//! the clock, the scheduler driving trailing flushes, and a handler for
//! trailing-edge return values.
//!
//! ```rust,no_run
//! use call_throttle::ThrottleBuilder;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fetch = ThrottleBuilder::new(|url: String| -> Result<usize, String> { Ok(url.len()) })
//!     .with_pause(Duration::from_millis(250))
//!     .with_trailing_handler(|result| {
//!         if let Err(e) = result {
//!             eprintln!("trailing fetch failed: {}", e);
//!         }
//!     })
//!     .build()
//!     .unwrap();
//! # let _ = fetch;
//! # }
//! ```
//!
//! ## Errors
//!
//! Invalid pauses (negative, NaN, infinite) are rejected when the throttle is
//! built. Failures of the target itself are never caught: a leading-edge
//! result or panic goes straight to the caller, a trailing-edge result goes to
//! the trailing handler and a trailing-edge panic surfaces through the
//! scheduler (for tokio, the spawned timer task).
//!
//! ## Observability
//!
//! Every throttle keeps [`Metrics`] about how calls were handled, and emits
//! `trace`-level `tracing` events for each decision.
//!
//! ```rust,no_run
//! # use call_throttle::throttle;
//! # #[tokio::main]
//! # async fn main() {
//! # let throttled = throttle(|_: ()| {}, 100).unwrap();
//! let snapshot = throttled.metrics().snapshot();
//! println!("executions: {}", snapshot.executions());
//! println!("dropped: {:.1}%", snapshot.drop_rate() * 100.0);
//! # }
//! ```

// Domain layer - pure throttling logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    gate::{Gate, GateDecision},
    pause::{Pause, PauseError},
    slot::{Call, PendingSlot, SlotOutcome},
};

pub use application::{
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Scheduler, Task},
    throttle::{Invocation, Target, Throttled, TrailingHandler},
};

pub use infrastructure::{
    builder::{BuildError, ThrottleBuilder},
    clock::SystemClock,
};

#[cfg(feature = "async")]
pub use infrastructure::{
    builder::{throttle, throttle_with_context},
    clock::TokioClock,
    scheduler::{NoRuntimeError, TokioScheduler},
};
