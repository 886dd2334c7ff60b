//! Throttled wrapper around a target callable.
//!
//! Combines the gate (run now or defer) with the pending slot (keep only the
//! latest deferred call) and arms at most one trailing flush per window
//! through the `Scheduler` port.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Scheduler};
use crate::domain::{
    gate::{Gate, GateDecision},
    pause::Pause,
    slot::{Call, PendingSlot},
};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// The wrapped callable: receives the invocation context and the arguments.
pub type Target<C, A, R> = Arc<dyn Fn(C, A) -> R + Send + Sync + 'static>;

/// Receives the return value of every trailing-edge execution.
pub type TrailingHandler<R> = Arc<dyn Fn(R) + Send + Sync + 'static>;

/// What happened to a single call into a `Throttled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation<R> {
    /// The target ran synchronously (leading edge) and returned this value
    Immediate(R),
    /// The call was stored and a trailing flush was armed for it
    Deferred,
    /// The call replaced the pending call of an already armed flush
    Coalesced,
}

impl<R> Invocation<R> {
    /// Check if the target ran during this call.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Invocation::Immediate(_))
    }

    /// Check if this call armed the trailing flush.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Invocation::Deferred)
    }

    /// Check if this call replaced an already pending call.
    pub fn is_coalesced(&self) -> bool {
        matches!(self, Invocation::Coalesced)
    }

    /// The target's return value, if it ran during this call.
    pub fn into_immediate(self) -> Option<R> {
        match self {
            Invocation::Immediate(value) => Some(value),
            Invocation::Deferred | Invocation::Coalesced => None,
        }
    }
}

/// A callable that runs its target at most once per pause.
///
/// The first call, and any call arriving more than `pause` after the last
/// execution, runs the target immediately. Calls inside the window are
/// deferred: the first one arms a single flush timed for the end of the
/// window, later ones only replace the pending call. When the flush fires the
/// target runs with the most recent pending call.
///
/// Cloning is cheap; clones share the same throttling state.
///
/// # Example
/// ```
/// use call_throttle::{Invocation, ThrottleBuilder};
/// use call_throttle::infrastructure::mocks::{ManualScheduler, MockClock};
/// use std::sync::{Arc, Mutex};
/// use std::time::{Duration, Instant};
///
/// let clock = MockClock::new(Instant::now());
/// let scheduler = ManualScheduler::new(clock.clone());
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// let throttled = ThrottleBuilder::new(move |value: u32| sink.lock().unwrap().push(value))
///     .with_pause(Duration::from_millis(100))
///     .with_clock(Arc::new(clock.clone()))
///     .with_scheduler(Arc::new(scheduler.clone()))
///     .build()
///     .unwrap();
///
/// assert!(throttled.call(1).is_immediate());
/// assert!(throttled.call(2).is_deferred());
/// assert!(throttled.call(3).is_coalesced());
///
/// scheduler.advance(Duration::from_millis(100));
/// assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
/// ```
pub struct Throttled<C, A, R> {
    inner: Arc<Inner<C, A, R>>,
}

struct Inner<C, A, R> {
    target: Target<C, A, R>,
    on_trailing: Option<TrailingHandler<R>>,
    state: Mutex<State<C, A>>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    metrics: Metrics,
}

struct State<C, A> {
    gate: Gate,
    slot: PendingSlot<C, A>,
}

impl<C, A, R> Throttled<C, A, R>
where
    C: Send + 'static,
    A: Send + 'static,
    R: 'static,
{
    /// Assemble a throttle from already validated parts.
    ///
    /// Most callers should go through `ThrottleBuilder` or the `throttle`
    /// factory functions instead.
    pub fn from_parts(
        target: Target<C, A, R>,
        pause: Pause,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        on_trailing: Option<TrailingHandler<R>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                target,
                on_trailing,
                state: Mutex::new(State {
                    gate: Gate::new(pause),
                    slot: PendingSlot::new(),
                }),
                clock,
                scheduler,
                metrics: Metrics::new(),
            }),
        }
    }

    /// Invoke the throttled target with an explicit context and arguments.
    ///
    /// Returns `Invocation::Immediate` with the target's return value when the
    /// call runs on the leading edge. Deferred calls return nothing: the
    /// trailing execution may carry a later call's context and arguments.
    ///
    /// A panic in the target on the leading edge unwinds through this call.
    pub fn call_with(&self, context: C, args: A) -> Invocation<R> {
        let inner = &self.inner;
        let mut state = inner.lock_state();

        if !state.slot.is_armed() {
            let now = inner.clock.now();
            match state.gate.decide(now) {
                GateDecision::RunNow => {
                    state.gate.stamp(now);
                    drop(state);

                    inner.metrics.record_immediate();
                    tracing::trace!("throttle: running target on leading edge");
                    return Invocation::Immediate((inner.target)(context, args));
                }
                GateDecision::Defer { delay } => {
                    state.slot.offer(Call::new(context, args));
                    drop(state);

                    inner.metrics.record_deferred();
                    tracing::trace!(
                        delay_ms = delay.as_secs_f64() * 1000.0,
                        "throttle: call deferred, arming flush"
                    );
                    let task = FlushTask::new(Arc::clone(inner));
                    inner.scheduler.schedule(delay, Box::new(move || task.run()));
                    return Invocation::Deferred;
                }
            }
        }

        // An armed flush owns the window until it runs, even when its timer is late
        state.slot.offer(Call::new(context, args));
        drop(state);

        inner.metrics.record_coalesced();
        tracing::trace!("throttle: call coalesced into pending flush");
        Invocation::Coalesced
    }

    /// The pause enforced between executions.
    pub fn pause(&self) -> Pause {
        self.inner.lock_state().gate.pause()
    }

    /// Check if a trailing flush is currently armed.
    pub fn is_armed(&self) -> bool {
        self.inner.lock_state().slot.is_armed()
    }

    /// When the target last executed, if ever.
    pub fn last_run(&self) -> Option<Instant> {
        self.inner.lock_state().gate.last_run()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}

impl<A, R> Throttled<(), A, R>
where
    A: Send + 'static,
    R: 'static,
{
    /// Invoke the throttled target with `args`.
    ///
    /// See `call_with` for the meaning of the returned `Invocation`.
    pub fn call(&self, args: A) -> Invocation<R> {
        self.call_with((), args)
    }
}

impl<C, A, R> Inner<C, A, R> {
    fn lock_state(&self) -> MutexGuard<'_, State<C, A>> {
        // The target never runs under this lock, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Trailing edge: disarm, stamp and run whatever is pending.
    fn flush(&self) {
        let call = {
            let mut state = self.lock_state();
            let now = self.clock.now();
            let call = state.slot.fire();
            if call.is_some() {
                state.gate.stamp(now);
            }
            call
        };

        let Some(call) = call else {
            return;
        };

        self.metrics.record_trailing();
        tracing::trace!("throttle: running target on trailing edge");

        let (context, args) = call.into_parts();
        let result = (self.target)(context, args);
        if let Some(handler) = &self.on_trailing {
            handler(result);
        }
    }
}

/// Trailing flush handed to the scheduler.
///
/// If the scheduler drops it without running it (for example a tokio runtime
/// that has already shut down), the flush runs on drop so the slot never stays
/// armed and the pending call is not lost.
struct FlushTask<C, A, R> {
    inner: Option<Arc<Inner<C, A, R>>>,
}

impl<C, A, R> FlushTask<C, A, R> {
    fn new(inner: Arc<Inner<C, A, R>>) -> Self {
        Self { inner: Some(inner) }
    }

    fn run(mut self) {
        if let Some(inner) = self.inner.take() {
            inner.flush();
        }
    }
}

impl<C, A, R> Drop for FlushTask<C, A, R> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };

        if std::thread::panicking() {
            // Never run the target while unwinding; just release the slot
            inner.lock_state().slot.fire();
            return;
        }

        tracing::debug!("throttle: scheduler dropped the flush, running it in place");
        inner.flush();
    }
}

impl<C, A, R> Clone for Throttled<C, A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, A, R> fmt::Debug for Throttled<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock_state();
        f.debug_struct("Throttled")
            .field("pause", &state.gate.pause())
            .field("last_run", &state.gate.last_run())
            .field("armed", &state.slot.is_armed())
            .field("metrics", &self.inner.metrics)
            .finish_non_exhaustive()
    }
}
