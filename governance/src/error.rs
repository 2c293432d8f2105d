use tally_ledger::LedgerError;
use tally_timelock::TimelockError;
use tally_types::{Address, TallyError, TxHash, Votes};
use thiserror::Error;

use crate::proposal::ProposalState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("proposer votes {votes} below proposal threshold {threshold}")]
    BelowThreshold { votes: Votes, threshold: Votes },

    #[error("malformed proposal: {0}")]
    MalformedProposal(&'static str),

    #[error("{proposer} already has live proposal {live}")]
    OneLivePerProposer { proposer: Address, live: u64 },

    #[error("voting is closed for proposal {id} (state {state:?})")]
    VotingClosed { id: u64, state: ProposalState },

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { id: u64, voter: Address },

    #[error("invalid vote type {0}")]
    InvalidSupport(u8),

    #[error("invalid ballot signature")]
    InvalidSignature,

    #[error("proposal {id} can only be queued if it is succeeded (state {state:?})")]
    NotSucceeded { id: u64, state: ProposalState },

    #[error("identical action {0} already queued at eta")]
    AlreadyQueued(TxHash),

    #[error("proposal {id} can only be executed if it is queued (state {state:?})")]
    NotQueued { id: u64, state: ProposalState },

    #[error("action {index} of proposal {id} reverted: {reason}")]
    ActionReverted {
        id: u64,
        index: usize,
        target: Address,
        reason: String,
    },

    #[error("{caller} is not authorized to {action}")]
    NotAuthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("proposal {id} is already {state:?}")]
    AlreadyTerminal { id: u64, state: ProposalState },

    #[error("veto power has been burned")]
    VetoBurned,

    #[error("{name} = {value} outside [{min}, {max}]")]
    InvalidParameter {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("vote count overflow on proposal {0}")]
    Overflow(u64),

    #[error("unknown governor entry point {0}")]
    UnknownEntryPoint(String),

    #[error(transparent)]
    Calldata(#[from] TallyError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("timelock: {0}")]
    Timelock(#[from] TimelockError),
}
