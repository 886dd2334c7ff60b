//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, enabling
/// deterministic testing of throttling windows. Usually paired with
/// `ManualScheduler`, which moves this clock forward as it fires timers.
///
/// # Examples
///
/// ```
/// use call_throttle::infrastructure::mocks::MockClock;
/// use call_throttle::application::ports::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
///
/// clock.advance(Duration::from_millis(20));
/// assert_eq!(clock.elapsed(), Duration::from_millis(20));
///
/// // Clones share the same time
/// let other = clock.clone();
/// other.set(start + Duration::from_secs(1));
/// assert_eq!(clock.now(), start + Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time += duration;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = instant;
    }

    /// Time elapsed since the instant the clock was created with.
    pub fn elapsed(&self) -> Duration {
        self.now().saturating_duration_since(self.start)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let start = Instant::now();
        let clock = MockClock::new(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.advance(Duration::from_millis(30));
        assert_eq!(clock.now(), start + Duration::from_millis(30));

        clock.set(start + Duration::from_millis(100));
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::default();
        let clone = clock.clone();

        clone.advance(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
    }
}
