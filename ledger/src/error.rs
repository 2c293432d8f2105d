use tally_types::{Address, Timestamp, UnitId};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("cannot delegate to the null identity")]
    InvalidDelegatee,

    #[error("index {requested} is not yet determined (current index {current})")]
    NotYetDetermined { requested: u64, current: u64 },

    #[error("checkpoint index {requested} precedes last checkpoint at {last} for {account}")]
    NonMonotonicIndex {
        account: Address,
        last: u64,
        requested: u64,
    },

    #[error("vote count overflow for {0}")]
    Overflow(Address),

    #[error("vote count underflow for {0}")]
    Underflow(Address),

    #[error("total supply out of range")]
    SupplyOverflow,

    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),

    #[error("unit {0} already exists")]
    UnitExists(UnitId),

    #[error("unit {0} appears more than once")]
    DuplicateUnit(UnitId),

    #[error("{account} does not own unit {unit}")]
    NotOwner { unit: UnitId, account: Address },

    #[error("ownership notification for {unit} names {claimed} as previous owner, ledger has {actual:?}")]
    OwnershipMismatch {
        unit: UnitId,
        claimed: Address,
        actual: Option<Address>,
    },

    #[error("insufficient balance for {account}: have {available}, moving {needed}")]
    InsufficientBalance {
        account: Address,
        available: u128,
        needed: u128,
    },

    #[error("{0} is not supported by this power source")]
    UnsupportedSubject(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("signature expired at {expiry} (now {now})")]
    SignatureExpired { expiry: Timestamp, now: Timestamp },

    #[error("snapshot hash mismatch")]
    CorruptSnapshot,

    #[error("serialization error: {0}")]
    Serialization(String),
}
