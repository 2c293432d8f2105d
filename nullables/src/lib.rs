//! Nullable infrastructure for deterministic testing.
//!
//! Every outside dependency of the core (the clock, signature recovery,
//! outgoing calls) sits behind a type or trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the wall clock, key material or real call targets
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod dispatcher;
pub mod verifier;

pub use clock::NullClock;
pub use dispatcher::{DispatchedCall, NullDispatcher};
pub use verifier::NullVerifier;
