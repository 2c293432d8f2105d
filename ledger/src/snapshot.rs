//! Ledger snapshots: every checkpoint history frozen at one index.
//!
//! A snapshot lets a node restore the ledger without replaying every
//! delegation. The hash covers the sorted account histories and the index,
//! so two snapshots of the same ledger state compare equal byte for byte.

use crate::checkpoint::{Checkpoint, CheckpointLedger};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_crypto::blake2b_256_multi;
use tally_types::Address;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over the account histories and index.
    pub hash: [u8; 32],
    /// Sequence index at which the snapshot was taken.
    pub index: u64,
    /// Histories sorted by account.
    pub accounts: Vec<AccountHistory>,
    pub version: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHistory {
    pub account: Address,
    pub checkpoints: Vec<Checkpoint>,
}

impl LedgerSnapshot {
    pub fn create(ledger: &CheckpointLedger, index: u64) -> Self {
        let mut accounts: Vec<AccountHistory> = ledger
            .accounts()
            .map(|account| AccountHistory {
                account: *account,
                checkpoints: ledger.history(account).to_vec(),
            })
            .collect();
        accounts.sort_by(|a, b| a.account.cmp(&b.account));

        let mut snap = Self {
            hash: [0u8; 32],
            index,
            accounts,
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_be_bytes());
        buf.extend_from_slice(&self.index.to_be_bytes());
        for history in &self.accounts {
            buf.extend_from_slice(history.account.as_bytes());
            buf.extend_from_slice(&(history.checkpoints.len() as u64).to_be_bytes());
            for cp in &history.checkpoints {
                buf.extend_from_slice(&cp.from_index.to_be_bytes());
                buf.extend_from_slice(&cp.votes.raw().to_be_bytes());
            }
        }
        blake2b_256_multi(&[b"tally/snapshot", &buf])
    }

    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Decode and verify. A hash mismatch is `CorruptSnapshot`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let snap: Self =
            bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        if !snap.verify() {
            return Err(LedgerError::CorruptSnapshot);
        }
        Ok(snap)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Rebuild a ledger from a verified snapshot.
    pub fn into_ledger(self) -> Result<CheckpointLedger, LedgerError> {
        if !self.verify() {
            return Err(LedgerError::CorruptSnapshot);
        }
        let mut histories = HashMap::with_capacity(self.accounts.len());
        for history in self.accounts {
            let ordered = history
                .checkpoints
                .windows(2)
                .all(|w| w[0].from_index < w[1].from_index);
            if !ordered {
                return Err(LedgerError::CorruptSnapshot);
            }
            histories.insert(history.account, history.checkpoints);
        }
        Ok(CheckpointLedger::from_histories(histories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::VoteMove;
    use tally_types::Votes;

    fn sample_ledger() -> CheckpointLedger {
        let mut ledger = CheckpointLedger::new();
        let alice = Address::repeat(1);
        let bob = Address::repeat(2);
        ledger
            .apply_moves(
                &[VoteMove {
                    from: None,
                    to: Some(alice),
                    amount: Votes::from(3),
                }],
                5,
            )
            .unwrap();
        ledger
            .apply_moves(
                &[VoteMove {
                    from: Some(alice),
                    to: Some(bob),
                    amount: Votes::from(1),
                }],
                9,
            )
            .unwrap();
        ledger
    }

    #[test]
    fn test_create_and_verify() {
        let snap = LedgerSnapshot::create(&sample_ledger(), 10);
        assert!(snap.verify());
        assert_eq!(snap.index, 10);
        assert_eq!(snap.version, 1);
        assert_eq!(snap.account_count(), 2);
        assert!(snap.accounts[0].account < snap.accounts[1].account);
    }

    #[test]
    fn test_tampered_snapshot_fails_verify() {
        let mut snap = LedgerSnapshot::create(&sample_ledger(), 10);
        snap.accounts[0].checkpoints[0].votes = Votes::from(100);
        assert!(!snap.verify());
        assert_eq!(snap.into_ledger().unwrap_err(), LedgerError::CorruptSnapshot);
    }

    #[test]
    fn test_bytes_restore_ledger() {
        let ledger = sample_ledger();
        let snap = LedgerSnapshot::create(&ledger, 10);
        let restored = LedgerSnapshot::from_bytes(&snap.to_bytes().unwrap())
            .unwrap()
            .into_ledger()
            .unwrap();

        let alice = Address::repeat(1);
        assert_eq!(restored.history(&alice), ledger.history(&alice));
        assert_eq!(restored.prior_votes(&alice, 6, 10).unwrap(), Votes::from(3));
    }

    #[test]
    fn test_from_bytes_rejects_hash_mismatch() {
        let mut snap = LedgerSnapshot::create(&sample_ledger(), 10);
        snap.index = 11;
        let bytes = bincode::serialize(&snap).unwrap();
        assert_eq!(LedgerSnapshot::from_bytes(&bytes), Err(LedgerError::CorruptSnapshot));
    }

    #[test]
    fn test_deterministic_hash() {
        let a = LedgerSnapshot::create(&sample_ledger(), 10);
        let b = LedgerSnapshot::create(&sample_ledger(), 10);
        assert_eq!(a.hash, b.hash);
    }
}
