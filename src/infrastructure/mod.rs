//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time, tokio time, mock)
//! - Timer scheduling on tokio
//! - Building throttles with sensible defaults

pub mod builder;
pub mod clock;

#[cfg(feature = "async")]
pub mod scheduler;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides a controllable clock and a manually
/// driven scheduler for deterministic throttling tests.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// call-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
