use tally_types::{Address, TallyError, Timestamp, TxHash};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TimelockError {
    #[error("{caller} is not the timelock admin")]
    NotAdmin { caller: Address },

    #[error("{caller} is not the pending timelock admin")]
    NotPendingAdmin { caller: Address },

    #[error("{caller} may not call this directly; it must come from the timelock itself")]
    OnlySelf { caller: Address },

    #[error("delay {delay}s outside [{min}s, {max}s]")]
    InvalidDelay { delay: u64, min: u64, max: u64 },

    #[error("eta {eta} precedes earliest allowed {earliest}")]
    DelayNotSatisfied { eta: Timestamp, earliest: Timestamp },

    #[error("transaction {0} is not queued")]
    NotQueued(TxHash),

    #[error("transaction not executable before {eta} (now {now})")]
    TooEarly { eta: Timestamp, now: Timestamp },

    #[error("transaction went stale at {expired_at} (now {now})")]
    StaleTransaction { expired_at: Timestamp, now: Timestamp },

    #[error("call to {target} reverted: {reason}")]
    CallReverted { target: Address, reason: String },

    #[error("timestamp overflow")]
    Overflow,

    #[error(transparent)]
    Calldata(#[from] TallyError),
}
