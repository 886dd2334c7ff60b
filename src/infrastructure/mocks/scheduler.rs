//! Manually driven scheduler for testing.

use crate::application::ports::{Clock, Scheduler, Task};
use crate::infrastructure::mocks::clock::MockClock;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Scheduler whose timers only fire when the test says so.
///
/// Timers are due relative to the shared `MockClock`. `advance` walks the
/// clock forward, stopping at each due timer in order (ties fire in the order
/// they were scheduled), so the clock reads the timer's due instant while its
/// task runs.
///
/// # Example
/// ```
/// use call_throttle::application::ports::Scheduler;
/// use call_throttle::infrastructure::mocks::{ManualScheduler, MockClock};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let scheduler = ManualScheduler::new(MockClock::default());
/// let fired = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&fired);
/// scheduler.schedule(Duration::from_millis(50), Box::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
/// assert_eq!(scheduler.pending(), 1);
///
/// assert_eq!(scheduler.advance(Duration::from_millis(49)), 0);
/// assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct ManualScheduler {
    clock: MockClock,
    queue: Arc<Mutex<TimerQueue>>,
}

struct TimerQueue {
    next_seq: u64,
    timers: Vec<Timer>,
}

struct Timer {
    due: Instant,
    seq: u64,
    task: Task,
}

impl ManualScheduler {
    /// Create a scheduler driven by `clock`.
    pub fn new(clock: MockClock) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(TimerQueue {
                next_seq: 0,
                timers: Vec::new(),
            })),
        }
    }

    /// The clock timers are measured against.
    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.lock_queue().timers.len()
    }

    /// Due instant of the earliest pending timer.
    pub fn next_due(&self) -> Option<Instant> {
        self.lock_queue().timers.iter().map(|timer| timer.due).min()
    }

    /// Fire every timer already due at the current time.
    ///
    /// Timers scheduled by the fired tasks also run if they are due.
    /// Returns the number of tasks that ran.
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Move time forward by `duration`, firing timers as their due time is reached.
    ///
    /// Returns the number of tasks that ran.
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.clock.now() + duration;
        let mut fired = 0;

        while let Some(timer) = self.pop_due(target) {
            if timer.due > self.clock.now() {
                self.clock.set(timer.due);
            }
            (timer.task)();
            fired += 1;
        }

        if target > self.clock.now() {
            self.clock.set(target);
        }
        fired
    }

    fn pop_due(&self, limit: Instant) -> Option<Timer> {
        let mut queue = self.lock_queue();
        let index = queue
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= limit)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)?;
        Some(queue.timers.swap_remove(index))
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, TimerQueue> {
        self.queue.lock().expect(
            "ManualScheduler mutex poisoned - a test thread panicked while holding the lock",
        )
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let due = self.clock.now() + delay;
        let mut queue = self.lock_queue();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.timers.push(Timer { due, seq, task });
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("clock", &self.clock)
            .field("pending", &self.pending())
            .finish()
    }
}
