//! Proposal table, receipts and per-proposer latest-proposal index.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tally_types::Address;

use crate::error::GovernanceError;
use crate::proposal::{Proposal, Receipt};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: BTreeMap<u64, Proposal>,
    receipts: HashMap<u64, HashMap<Address, Receipt>>,
    latest: HashMap<Address, u64>,
    proposal_count: u64,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next proposal will receive. Ids start at 1.
    pub fn next_id(&self) -> u64 {
        self.proposal_count + 1
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    /// Store a new proposal under `proposal.id`, which must be [`Self::next_id`].
    pub(crate) fn insert(&mut self, proposal: Proposal) {
        debug_assert_eq!(proposal.id, self.next_id());
        self.proposal_count = proposal.id;
        self.latest.insert(proposal.proposer, proposal.id);
        self.proposals.insert(proposal.id, proposal);
    }

    pub fn get(&self, id: u64) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn receipt(&self, id: u64, voter: &Address) -> Option<&Receipt> {
        self.receipts.get(&id).and_then(|r| r.get(voter))
    }

    pub(crate) fn record_receipt(&mut self, id: u64, voter: Address, receipt: Receipt) {
        self.receipts.entry(id).or_default().insert(voter, receipt);
    }

    pub fn latest_proposal_id(&self, proposer: &Address) -> Option<u64> {
        self.latest.get(proposer).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    /// Serialize the store to bytes (bincode).
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    /// Restore a store from [`Self::save_state`] bytes.
    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }
}
