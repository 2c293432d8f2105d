//! Proposals, their lifecycle states and vote receipts.

use serde::{Deserialize, Serialize};
use tally_timelock::{Call, QueuedTransaction};
use tally_types::{Address, ChainTime, Timestamp, Votes};

/// Where a proposal stands. Derived from the recorded fields and the
/// current time, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created; voting has not opened.
    Pending,
    /// Voting is open.
    Active,
    Canceled,
    /// Voting closed without a majority or without quorum.
    Defeated,
    /// Voting closed with a majority and quorum; not yet queued.
    Succeeded,
    /// Actions sit in the timelock.
    Queued,
    /// The grace window passed without execution.
    Expired,
    Executed,
    Vetoed,
}

impl ProposalState {
    /// States no operation can leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Canceled | Self::Defeated | Self::Expired | Self::Executed | Self::Vetoed
        )
    }
}

/// Vote direction. Wire value 0 = against, 1 = for, 2 = abstain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    Against,
    For,
    Abstain,
}

impl Support {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Against => 0,
            Self::For => 1,
            Self::Abstain => 2,
        }
    }
}

impl TryFrom<u8> for Support {
    type Error = crate::GovernanceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(crate::GovernanceError::InvalidSupport(other)),
        }
    }
}

/// A voter's recorded ballot on one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: Support,
    pub votes: Votes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub proposer: Address,
    /// Ordered actions executed on success.
    pub actions: Vec<Call>,
    pub description: String,
    pub created_at_index: u64,
    /// Voting opens after this index.
    pub start_index: u64,
    /// Voting closes after this index.
    pub end_index: u64,
    /// Set when queued.
    pub eta: Option<Timestamp>,
    pub for_votes: Votes,
    pub against_votes: Votes,
    pub abstain_votes: Votes,
    pub canceled: bool,
    pub vetoed: bool,
    pub executed: bool,
    /// Threshold in force when the proposal was created.
    pub proposal_threshold: Votes,
    /// Quorum fixed when the proposal was created.
    pub quorum_votes: Votes,
}

impl Proposal {
    /// Lifecycle state at `now`, given the timelock's grace period.
    pub fn state(&self, now: ChainTime, grace_period: u64) -> ProposalState {
        if self.vetoed {
            ProposalState::Vetoed
        } else if self.canceled {
            ProposalState::Canceled
        } else if now.index <= self.start_index {
            ProposalState::Pending
        } else if now.index <= self.end_index {
            ProposalState::Active
        } else if self.for_votes <= self.against_votes || self.for_votes < self.quorum_votes {
            ProposalState::Defeated
        } else if let Some(eta) = self.eta {
            if self.executed {
                ProposalState::Executed
            } else if eta
                .checked_add_secs(grace_period)
                .map_or(false, |expiry| now.timestamp > expiry)
            {
                ProposalState::Expired
            } else {
                ProposalState::Queued
            }
        } else {
            ProposalState::Succeeded
        }
    }

    /// The timelock entries this proposal occupies (or would) at `eta`.
    pub fn transactions(&self, eta: Timestamp) -> impl Iterator<Item = QueuedTransaction> + '_ {
        self.actions
            .iter()
            .map(move |call| QueuedTransaction::new(call.clone(), eta))
    }

    pub(crate) fn tally_mut(&mut self, support: Support) -> &mut Votes {
        match support {
            Support::Against => &mut self.against_votes,
            Support::For => &mut self.for_votes,
            Support::Abstain => &mut self.abstain_votes,
        }
    }
}
