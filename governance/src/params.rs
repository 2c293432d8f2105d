//! Governable governor parameters and their bounds.
//!
//! Each parameter may be changed by the admin, which in a fully wired
//! deployment is the timelock: a change then has to pass a proposal and
//! wait out the execution delay like any other action.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};

pub const MIN_VOTING_PERIOD: u64 = 5_760;
pub const MAX_VOTING_PERIOD: u64 = 80_640;
pub const MIN_VOTING_DELAY: u64 = 1;
pub const MAX_VOTING_DELAY: u64 = 40_320;
pub const MIN_PROPOSAL_THRESHOLD_BPS: u32 = 1;
pub const MAX_PROPOSAL_THRESHOLD_BPS: u32 = 1_000;
pub const MIN_QUORUM_VOTES_BPS: u32 = 200;
pub const MAX_QUORUM_VOTES_BPS: u32 = 2_000;
pub const MAX_PROPOSAL_OPERATIONS: usize = 10;

/// Parameters that can be changed after deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    VotingDelay,
    VotingPeriod,
    ProposalThresholdBps,
    QuorumVotesBps,
}

impl GovernableParam {
    pub const ALL: [GovernableParam; 4] = [
        Self::VotingDelay,
        Self::VotingPeriod,
        Self::ProposalThresholdBps,
        Self::QuorumVotesBps,
    ];

    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VotingDelay => "voting_delay",
            Self::VotingPeriod => "voting_period",
            Self::ProposalThresholdBps => "proposal_threshold_bps",
            Self::QuorumVotesBps => "quorum_votes_bps",
        }
    }

    /// Inclusive `(min, max)`.
    pub fn bounds(&self) -> (u64, u64) {
        match self {
            Self::VotingDelay => (MIN_VOTING_DELAY, MAX_VOTING_DELAY),
            Self::VotingPeriod => (MIN_VOTING_PERIOD, MAX_VOTING_PERIOD),
            Self::ProposalThresholdBps => (
                u64::from(MIN_PROPOSAL_THRESHOLD_BPS),
                u64::from(MAX_PROPOSAL_THRESHOLD_BPS),
            ),
            Self::QuorumVotesBps => (
                u64::from(MIN_QUORUM_VOTES_BPS),
                u64::from(MAX_QUORUM_VOTES_BPS),
            ),
        }
    }

    /// Entry point an executed proposal calls on the governor to change it.
    pub fn entry_point(&self) -> &'static str {
        match self {
            Self::VotingDelay => "_setVotingDelay(uint256)",
            Self::VotingPeriod => "_setVotingPeriod(uint256)",
            Self::ProposalThresholdBps => "_setProposalThresholdBPS(uint256)",
            Self::QuorumVotesBps => "_setQuorumVotesBPS(uint256)",
        }
    }

    pub fn from_entry_point(signature: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.entry_point() == signature)
    }

    pub fn check(&self, value: u64) -> Result<(), GovernanceError> {
        let (min, max) = self.bounds();
        if !(min..=max).contains(&value) {
            return Err(GovernanceError::InvalidParameter {
                name: self.name(),
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// How many live proposals one proposer may hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveProposalPolicy {
    /// No new proposal while the last one is pending or active.
    #[default]
    OnePendingOrActive,
    /// No new proposal until the last one is executed, defeated, canceled,
    /// vetoed or expired.
    OneNonTerminal,
    Unlimited,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorParams {
    /// Indices between proposal creation and the start of voting.
    pub voting_delay: u64,
    /// Indices voting stays open.
    pub voting_period: u64,
    pub proposal_threshold_bps: u32,
    pub quorum_votes_bps: u32,
    pub proposal_max_operations: usize,
    pub live_proposal_policy: LiveProposalPolicy,
}

impl GovernorParams {
    pub fn get(&self, param: GovernableParam) -> u64 {
        match param {
            GovernableParam::VotingDelay => self.voting_delay,
            GovernableParam::VotingPeriod => self.voting_period,
            GovernableParam::ProposalThresholdBps => u64::from(self.proposal_threshold_bps),
            GovernableParam::QuorumVotesBps => u64::from(self.quorum_votes_bps),
        }
    }

    /// Bounds-checked update.
    pub fn set(&mut self, param: GovernableParam, value: u64) -> Result<(), GovernanceError> {
        param.check(value)?;
        // Bounds above keep the bps values well inside u32.
        match param {
            GovernableParam::VotingDelay => self.voting_delay = value,
            GovernableParam::VotingPeriod => self.voting_period = value,
            GovernableParam::ProposalThresholdBps => self.proposal_threshold_bps = value as u32,
            GovernableParam::QuorumVotesBps => self.quorum_votes_bps = value as u32,
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        for param in GovernableParam::ALL {
            param.check(self.get(param))?;
        }
        if !(1..=MAX_PROPOSAL_OPERATIONS).contains(&self.proposal_max_operations) {
            return Err(GovernanceError::InvalidParameter {
                name: "proposal_max_operations",
                value: self.proposal_max_operations as u64,
                min: 1,
                max: MAX_PROPOSAL_OPERATIONS as u64,
            });
        }
        Ok(())
    }
}

impl Default for GovernorParams {
    fn default() -> Self {
        Self {
            voting_delay: 1,
            voting_period: 17_280,
            proposal_threshold_bps: 1,
            quorum_votes_bps: 1_000,
            proposal_max_operations: MAX_PROPOSAL_OPERATIONS,
            live_proposal_policy: LiveProposalPolicy::default(),
        }
    }
}
