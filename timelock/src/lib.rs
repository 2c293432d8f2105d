//! Time-locked execution queue.
//!
//! Actions are queued with an execution time (`eta`) at least the configured
//! delay in the future, may run only inside `[eta, eta + grace_period]`, and
//! are identified by the hash of their content. The queue's own delay and
//! admin can only be changed by a call the queue executes against itself.

pub mod call;
pub mod error;
pub mod timelock;

pub use call::{Call, CallDispatcher, QueuedTransaction};
pub use error::TimelockError;
pub use timelock::{
    Timelock, GRACE_PERIOD_SECS, MAXIMUM_DELAY_SECS, MINIMUM_DELAY_SECS, SET_DELAY,
    SET_PENDING_ADMIN,
};
