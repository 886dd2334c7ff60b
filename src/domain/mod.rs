//! Domain layer - pure throttling logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the throttle:
//! - Validated pause interval
//! - Immediate-versus-deferred gate
//! - Single pending slot for coalesced calls
//!
//! All types in this layer are pure and easily testable.

pub mod gate;
pub mod pause;
pub mod slot;
