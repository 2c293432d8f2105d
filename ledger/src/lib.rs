//! Checkpointed voting ledger.
//!
//! Voting power accrues only to accounts that are the explicit target of a
//! delegation. Every change to an account's delegated total is recorded as a
//! checkpoint keyed by sequence index, so the power an account held at any past
//! index can be looked up later (and cannot be changed retroactively).
//!
//! - [`CheckpointLedger`]: per-account append-only histories + binary-search lookup
//! - [`DelegationRegistry`]: who delegates to whom, fed by ownership-change notifications
//! - [`PowerSource`]: how holdings become weight ([`UnitIndexed`] or [`BalanceIndexed`])
//! - [`DelegationVerifier`]: detached, replay-protected signed delegations
//! - [`VotingPower`]: the read interface governance consumes

pub mod checkpoint;
pub mod error;
pub mod power;
pub mod registry;
pub mod signed;
pub mod snapshot;
pub mod source;

pub use checkpoint::{Checkpoint, CheckpointLedger, VoteMove};
pub use error::LedgerError;
pub use power::{PowerSum, VotingPower};
pub use registry::DelegationRegistry;
pub use signed::{DelegationMessage, DelegationVerifier, NonceTable, SignedDelegation};
pub use snapshot::{AccountHistory, LedgerSnapshot};
pub use source::{BalanceIndexed, DelegateTargets, Holding, PowerSource, Subject, UnitIndexed};
