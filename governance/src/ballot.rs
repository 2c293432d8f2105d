//! Signed ballots.

use tally_crypto::TypedMessage;

use crate::proposal::Support;

/// A vote signed off-line and submitted by anyone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub proposal_id: u64,
    pub support: Support,
}

impl TypedMessage for Ballot {
    const TYPE_TAG: &'static [u8] = b"Ballot(uint256 proposalId,uint8 support)";

    fn encode_fields(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(9);
        out.extend_from_slice(&self.proposal_id.to_be_bytes());
        out.push(self.support.as_u8());
        out
    }
}
