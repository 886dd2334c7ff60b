//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling deterministic testing of throttling windows without real timers.

pub mod clock;
pub mod scheduler;

pub use clock::MockClock;
pub use scheduler::ManualScheduler;
