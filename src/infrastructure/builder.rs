//! Construction of throttled callables.
//!
//! `ThrottleBuilder` wires a target to a validated pause, a clock and a
//! scheduler. With the `async` feature the clock and scheduler default to
//! tokio's, and the `throttle` / `throttle_with_context` factory functions
//! cover the common case in one call.

use crate::application::ports::{Clock, Scheduler};
use crate::application::throttle::{Target, Throttled, TrailingHandler};
use crate::domain::pause::{Pause, PauseError};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "async")]
use crate::infrastructure::clock::TokioClock;
#[cfg(feature = "async")]
use crate::infrastructure::scheduler::TokioScheduler;

#[cfg(not(feature = "async"))]
use crate::infrastructure::clock::SystemClock;

/// Error returned when building a `Throttled` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No pause was configured
    MissingPause,
    /// The configured pause is not a valid interval
    InvalidPause(PauseError),
    /// No scheduler was configured and no default is available
    MissingScheduler,
    /// The default tokio scheduler was requested outside a tokio runtime
    NoRuntime,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingPause => write!(f, "a pause must be configured"),
            BuildError::InvalidPause(e) => write!(f, "invalid pause: {}", e),
            BuildError::MissingScheduler => {
                write!(f, "a scheduler must be configured when the `async` feature is disabled")
            }
            BuildError::NoRuntime => {
                write!(f, "no tokio runtime available to drive the throttle's timer")
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::InvalidPause(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PauseError> for BuildError {
    fn from(e: PauseError) -> Self {
        BuildError::InvalidPause(e)
    }
}

/// Builder for constructing a `Throttled`.
///
/// # Example
/// ```
/// use call_throttle::ThrottleBuilder;
/// use call_throttle::infrastructure::mocks::{ManualScheduler, MockClock};
/// use std::sync::Arc;
///
/// let clock = MockClock::default();
/// let scheduler = ManualScheduler::new(clock.clone());
///
/// let throttled = ThrottleBuilder::new(|query: String| query.len())
///     .with_pause(250.0)
///     .with_clock(Arc::new(clock))
///     .with_scheduler(Arc::new(scheduler))
///     .build()
///     .unwrap();
///
/// assert_eq!(throttled.call("rust".to_string()).into_immediate(), Some(4));
/// ```
pub struct ThrottleBuilder<C, A, R> {
    target: Target<C, A, R>,
    pause: Option<Result<Pause, PauseError>>,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    on_trailing: Option<TrailingHandler<R>>,
}

impl<A, R> ThrottleBuilder<(), A, R>
where
    A: Send + 'static,
    R: 'static,
{
    /// Start building a throttle around a context-free target.
    pub fn new<F>(target: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_target(Arc::new(move |(), args| target(args)))
    }
}

impl<C, A, R> ThrottleBuilder<C, A, R>
where
    C: Send + 'static,
    A: Send + 'static,
    R: 'static,
{
    /// Start building a throttle around a target that also receives an invocation context.
    ///
    /// The context of each call is captured together with its arguments, so a
    /// deferred execution replays both exactly as the latest call supplied them.
    pub fn new_with_context<F>(target: F) -> Self
    where
        F: Fn(C, A) -> R + Send + Sync + 'static,
    {
        Self::from_target(Arc::new(target))
    }

    /// Start building a throttle around an already shared target.
    pub fn from_target(target: Target<C, A, R>) -> Self {
        Self {
            target,
            pause: None,
            clock: None,
            scheduler: None,
            on_trailing: None,
        }
    }

    /// Set the minimum interval between executions.
    ///
    /// Accepts a `Duration`, a `Pause`, or a number of milliseconds (`f64`,
    /// `i64`, `i32`, `u64`). The value will be validated when `build()` is called.
    pub fn with_pause<P>(mut self, pause: P) -> Self
    where
        P: TryInto<Pause>,
        P::Error: Into<PauseError>,
    {
        self.pause = Some(pause.try_into().map_err(Into::into));
        self
    }

    /// Set a custom clock (mainly for testing).
    ///
    /// Default: `TokioClock` when the tokio scheduler is used, `SystemClock` otherwise.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set a custom scheduler for trailing-edge flushes.
    ///
    /// Default: `TokioScheduler` on the runtime active when `build()` is called.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Receive the target's return value from trailing-edge executions.
    ///
    /// Leading-edge results are returned to the caller directly. Without a
    /// handler, trailing results are dropped.
    pub fn with_trailing_handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(R) + Send + Sync + 'static,
    {
        self.on_trailing = Some(Arc::new(handler));
        self
    }

    /// Build the throttle.
    ///
    /// # Errors
    /// Returns `BuildError` if the pause is missing or invalid, or if no
    /// scheduler is configured and none can be created.
    pub fn build(self) -> Result<Throttled<C, A, R>, BuildError> {
        let pause = self.pause.ok_or(BuildError::MissingPause)??;

        let (clock, scheduler) = match (self.clock, self.scheduler) {
            (clock, Some(scheduler)) => (clock.unwrap_or_else(fallback_clock), scheduler),
            (clock, None) => {
                let (default_clock, scheduler) = default_timer()?;
                (clock.unwrap_or(default_clock), scheduler)
            }
        };

        tracing::debug!(pause = %pause, "throttle built");
        Ok(Throttled::from_parts(
            self.target,
            pause,
            clock,
            scheduler,
            self.on_trailing,
        ))
    }
}

impl<C, A, R> fmt::Debug for ThrottleBuilder<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottleBuilder")
            .field("target", &"<fn>")
            .field("pause", &self.pause)
            .field("clock", &self.clock)
            .field("scheduler", &self.scheduler)
            .field(
                "on_trailing",
                &self.on_trailing.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

#[cfg(feature = "async")]
fn fallback_clock() -> Arc<dyn Clock> {
    Arc::new(TokioClock::new())
}

#[cfg(not(feature = "async"))]
fn fallback_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock::new())
}

#[cfg(feature = "async")]
fn default_timer() -> Result<(Arc<dyn Clock>, Arc<dyn Scheduler>), BuildError> {
    let scheduler = TokioScheduler::current().map_err(|_| BuildError::NoRuntime)?;
    Ok((Arc::new(TokioClock::new()), Arc::new(scheduler)))
}

#[cfg(not(feature = "async"))]
fn default_timer() -> Result<(Arc<dyn Clock>, Arc<dyn Scheduler>), BuildError> {
    Err(BuildError::MissingScheduler)
}

/// Wrap `target` so that it runs at most once per `pause`.
///
/// The returned throttle runs on the current tokio runtime. Numeric pauses
/// are milliseconds; negative or non-finite values are rejected here rather
/// than at call time.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use call_throttle::throttle;
///
/// let save = throttle(|doc: &'static str| println!("saving {}", doc), 500).unwrap();
///
/// assert!(save.call("draft 1").is_immediate()); // runs now
/// assert!(save.call("draft 2").is_deferred()); // runs in ~500ms
/// assert!(save.call("draft 3").is_coalesced()); // replaces draft 2
///
/// assert!(throttle(|_: ()| {}, -1.0).is_err());
/// # }
/// ```
///
/// # Errors
/// Returns `BuildError::InvalidPause` for an invalid pause and
/// `BuildError::NoRuntime` outside a tokio runtime.
#[cfg(feature = "async")]
pub fn throttle<A, R, F, P>(target: F, pause: P) -> Result<Throttled<(), A, R>, BuildError>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    R: 'static,
    P: TryInto<Pause>,
    P::Error: Into<PauseError>,
{
    ThrottleBuilder::new(target).with_pause(pause).build()
}

/// Like `throttle`, for targets that receive an invocation context with each call.
///
/// # Errors
/// Same as `throttle`.
#[cfg(feature = "async")]
pub fn throttle_with_context<C, A, R, F, P>(
    target: F,
    pause: P,
) -> Result<Throttled<C, A, R>, BuildError>
where
    F: Fn(C, A) -> R + Send + Sync + 'static,
    C: Send + 'static,
    A: Send + 'static,
    R: 'static,
    P: TryInto<Pause>,
    P::Error: Into<PauseError>,
{
    ThrottleBuilder::new_with_context(target)
        .with_pause(pause)
        .build()
}
