//! Validated pause interval.
//!
//! The pause is the minimum spacing between two executions of a throttled
//! target. It is validated once, when the throttle is built, so the hot path
//! never has to deal with a malformed interval.

use std::convert::Infallible;
use std::fmt;
use std::time::Duration;

/// Error returned when a pause value cannot be used as a throttling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseError {
    /// The pause was negative
    Negative,
    /// The pause was NaN or infinite
    NotFinite,
    /// The pause does not fit in a `Duration`
    OutOfRange,
}

impl fmt::Display for PauseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauseError::Negative => write!(f, "pause must not be negative"),
            PauseError::NotFinite => write!(f, "pause must be a finite number"),
            PauseError::OutOfRange => write!(f, "pause is too large to be represented"),
        }
    }
}

impl std::error::Error for PauseError {}

impl From<Infallible> for PauseError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Minimum interval between two executions of a throttled target.
///
/// Numeric conversions interpret the value as milliseconds.
///
/// # Example
/// ```
/// use call_throttle::{Pause, PauseError};
/// use std::time::Duration;
///
/// let pause = Pause::from_millis_f64(12.5).unwrap();
/// assert_eq!(pause.as_duration(), Duration::from_micros(12_500));
///
/// assert_eq!(Pause::from_millis_f64(-1.0), Err(PauseError::Negative));
/// assert_eq!(Pause::try_from(f64::NAN), Err(PauseError::NotFinite));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pause(Duration);

impl Pause {
    /// A pause of zero: every call outside the same instant runs immediately.
    pub const ZERO: Pause = Pause(Duration::ZERO);

    /// Create a pause from a duration. Durations are never negative, so this cannot fail.
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Create a pause from a whole number of milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Create a pause from fractional milliseconds.
    ///
    /// # Errors
    /// Returns `PauseError` if `millis` is negative, NaN, infinite or too large.
    pub fn from_millis_f64(millis: f64) -> Result<Self, PauseError> {
        if !millis.is_finite() {
            return Err(PauseError::NotFinite);
        }
        if millis < 0.0 {
            return Err(PauseError::Negative);
        }
        Duration::try_from_secs_f64(millis / 1000.0)
            .map(Self)
            .map_err(|_| PauseError::OutOfRange)
    }

    /// The pause as a `Duration`.
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Check if this pause is zero.
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for Pause {
    fn from(duration: Duration) -> Self {
        Self::new(duration)
    }
}

impl From<Pause> for Duration {
    fn from(pause: Pause) -> Self {
        pause.0
    }
}

impl From<u64> for Pause {
    fn from(millis: u64) -> Self {
        Self::from_millis(millis)
    }
}

impl TryFrom<f64> for Pause {
    type Error = PauseError;

    fn try_from(millis: f64) -> Result<Self, Self::Error> {
        Self::from_millis_f64(millis)
    }
}

impl TryFrom<i64> for Pause {
    type Error = PauseError;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        u64::try_from(millis)
            .map(Self::from_millis)
            .map_err(|_| PauseError::Negative)
    }
}

impl TryFrom<i32> for Pause {
    type Error = PauseError;

    fn try_from(millis: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(millis))
    }
}

impl fmt::Display for Pause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_millis() {
        assert_eq!(
            Pause::from_millis(100).as_duration(),
            Duration::from_millis(100)
        );
        assert_eq!(Pause::from(250u64).as_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_fractional_millis() {
        let pause = Pause::from_millis_f64(0.5).unwrap();
        assert_eq!(pause.as_duration(), Duration::from_micros(500));
    }

    #[test]
    fn test_zero_is_valid() {
        assert_eq!(Pause::from_millis_f64(0.0), Ok(Pause::ZERO));
        assert_eq!(Pause::try_from(0i64), Ok(Pause::ZERO));
        assert!(Pause::ZERO.is_zero());
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Pause::from_millis_f64(-0.1), Err(PauseError::Negative));
        assert_eq!(Pause::try_from(-5i64), Err(PauseError::Negative));
        assert_eq!(Pause::try_from(-1i32), Err(PauseError::Negative));
    }

    #[test]
    fn test_integer_literals() {
        assert_eq!(Pause::try_from(100), Ok(Pause::from_millis(100)));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(Pause::try_from(f64::NAN), Err(PauseError::NotFinite));
        assert_eq!(Pause::try_from(f64::INFINITY), Err(PauseError::NotFinite));
        assert_eq!(
            Pause::try_from(f64::NEG_INFINITY),
            Err(PauseError::NotFinite)
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(Pause::from_millis_f64(f64::MAX), Err(PauseError::OutOfRange));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PauseError::Negative.to_string(),
            "pause must not be negative"
        );
        assert_eq!(
            PauseError::NotFinite.to_string(),
            "pause must be a finite number"
        );
    }
}
