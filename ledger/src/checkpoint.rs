//! Per-account checkpoint histories.
//!
//! Each account owns an append-only `Vec<Checkpoint>` ordered by strictly
//! increasing `from_index`. The only in-place mutation allowed is overwriting
//! the votes of the last entry when a second change lands on the same index,
//! so an account never has two checkpoints for one index.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tally_types::{Address, Votes};
use tracing::debug;

/// An account's delegated total as of `from_index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub from_index: u64,
    pub votes: Votes,
}

/// A weight movement between two delegates. `None` on either side means
/// "no delegate" (weight enters from or leaves to nowhere).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteMove {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: Votes,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckpointLedger {
    histories: HashMap<Address, Vec<Checkpoint>>,
}

impl CheckpointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Votes of the last checkpoint, or zero.
    pub fn current_votes(&self, account: &Address) -> Votes {
        self.history(account)
            .last()
            .map(|c| c.votes)
            .unwrap_or(Votes::ZERO)
    }

    /// Votes held by `account` as of `at_index`.
    ///
    /// `at_index` must be strictly in the past: the outcome of the current
    /// index is not final until it closes.
    pub fn prior_votes(
        &self,
        account: &Address,
        at_index: u64,
        current_index: u64,
    ) -> Result<Votes, LedgerError> {
        if at_index >= current_index {
            return Err(LedgerError::NotYetDetermined {
                requested: at_index,
                current: current_index,
            });
        }
        let history = self.history(account);
        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Ok(Votes::ZERO);
        };
        if last.from_index <= at_index {
            return Ok(last.votes);
        }
        if first.from_index > at_index {
            return Ok(Votes::ZERO);
        }
        // First entry is <= at_index, so the partition point is at least 1.
        let pos = history.partition_point(|c| c.from_index <= at_index);
        Ok(history[pos - 1].votes)
    }

    pub fn num_checkpoints(&self, account: &Address) -> u32 {
        self.history(account).len() as u32
    }

    /// The checkpoint at `position` (0 = oldest).
    pub fn checkpoint(&self, account: &Address, position: u32) -> Option<Checkpoint> {
        self.history(account).get(position as usize).copied()
    }

    pub fn history(&self, account: &Address) -> &[Checkpoint] {
        self.histories.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Accounts with at least one checkpoint.
    pub fn accounts(&self) -> impl Iterator<Item = &Address> {
        self.histories.keys()
    }

    /// Record `votes` as `account`'s total from `at_index` on.
    ///
    /// Collapses into the last checkpoint when it already sits at `at_index`.
    pub(crate) fn write_checkpoint(
        &mut self,
        account: &Address,
        votes: Votes,
        at_index: u64,
    ) -> Result<(), LedgerError> {
        self.check_index(account, at_index)?;
        let history = self.histories.entry(*account).or_default();
        match history.last_mut() {
            Some(last) if last.from_index == at_index => last.votes = votes,
            _ => history.push(Checkpoint {
                from_index: at_index,
                votes,
            }),
        }
        debug!(%account, index = at_index, votes = votes.raw(), "checkpoint written");
        Ok(())
    }

    /// Apply a set of weight movements as one step.
    ///
    /// Every resulting total is computed and range-checked before the first
    /// checkpoint is written, so a failing move leaves the ledger untouched.
    /// Moves with `from == to` or a zero amount are no-ops.
    pub fn apply_moves(&mut self, moves: &[VoteMove], at_index: u64) -> Result<(), LedgerError> {
        let mut staged: BTreeMap<Address, Votes> = BTreeMap::new();

        for mv in moves {
            if mv.from == mv.to || mv.amount.is_zero() {
                continue;
            }
            if let Some(src) = mv.from {
                let current = *staged.entry(src).or_insert_with(|| self.current_votes(&src));
                let next = current
                    .checked_sub(mv.amount)
                    .ok_or(LedgerError::Underflow(src))?;
                staged.insert(src, next);
            }
            if let Some(dst) = mv.to {
                let current = *staged.entry(dst).or_insert_with(|| self.current_votes(&dst));
                let next = current
                    .checked_add(mv.amount)
                    .ok_or(LedgerError::Overflow(dst))?;
                staged.insert(dst, next);
            }
        }

        staged.retain(|account, votes| *votes != self.current_votes(account));
        for account in staged.keys() {
            self.check_index(account, at_index)?;
        }
        for (account, votes) in staged {
            self.write_checkpoint(&account, votes, at_index)?;
        }
        Ok(())
    }

    fn check_index(&self, account: &Address, at_index: u64) -> Result<(), LedgerError> {
        match self.history(account).last() {
            Some(last) if last.from_index > at_index => Err(LedgerError::NonMonotonicIndex {
                account: *account,
                last: last.from_index,
                requested: at_index,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn from_histories(histories: HashMap<Address, Vec<Checkpoint>>) -> Self {
        Self { histories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(seed: u8) -> Address {
        Address::repeat(seed)
    }

    fn v(n: u64) -> Votes {
        Votes::from(n)
    }

    fn mv(from: Option<u8>, to: Option<u8>, n: u64) -> VoteMove {
        VoteMove {
            from: from.map(acct),
            to: to.map(acct),
            amount: v(n),
        }
    }

    #[test]
    fn empty_account_has_zero_votes() {
        let ledger = CheckpointLedger::new();
        assert_eq!(ledger.current_votes(&acct(1)), Votes::ZERO);
        assert_eq!(ledger.num_checkpoints(&acct(1)), 0);
        assert_eq!(ledger.prior_votes(&acct(1), 0, 5), Ok(Votes::ZERO));
    }

    #[test]
    fn prior_votes_rejects_current_and_future_index() {
        let ledger = CheckpointLedger::new();
        assert_eq!(
            ledger.prior_votes(&acct(1), 5, 5),
            Err(LedgerError::NotYetDetermined {
                requested: 5,
                current: 5
            })
        );
        assert!(ledger.prior_votes(&acct(1), 50_000_000_000, 5).is_err());
    }

    #[test]
    fn same_index_writes_collapse() {
        let mut ledger = CheckpointLedger::new();
        ledger.write_checkpoint(&acct(1), v(1), 10).unwrap();
        ledger.write_checkpoint(&acct(1), v(2), 10).unwrap();
        ledger.write_checkpoint(&acct(1), v(3), 10).unwrap();
        assert_eq!(ledger.num_checkpoints(&acct(1)), 1);
        assert_eq!(
            ledger.checkpoint(&acct(1), 0),
            Some(Checkpoint {
                from_index: 10,
                votes: v(3)
            })
        );
    }

    #[test]
    fn earlier_index_is_rejected() {
        let mut ledger = CheckpointLedger::new();
        ledger.write_checkpoint(&acct(1), v(1), 10).unwrap();
        let err = ledger.write_checkpoint(&acct(1), v(2), 9).unwrap_err();
        assert!(matches!(err, LedgerError::NonMonotonicIndex { last: 10, requested: 9, .. }));
        assert_eq!(ledger.current_votes(&acct(1)), v(1));
    }

    #[test]
    fn prior_votes_walks_history() {
        let mut ledger = CheckpointLedger::new();
        for (index, votes) in [(10, 1), (12, 3), (15, 2), (20, 0), (21, 5)] {
            ledger.write_checkpoint(&acct(1), v(votes), index).unwrap();
        }
        let now = 100;
        let at = |i| ledger.prior_votes(&acct(1), i, now).unwrap();
        assert_eq!(at(9), v(0));
        assert_eq!(at(10), v(1));
        assert_eq!(at(11), v(1));
        assert_eq!(at(12), v(3));
        assert_eq!(at(14), v(3));
        assert_eq!(at(15), v(2));
        assert_eq!(at(19), v(2));
        assert_eq!(at(20), v(0));
        assert_eq!(at(21), v(5));
        assert_eq!(at(99), v(5));
    }

    #[test]
    fn apply_moves_transfers_between_delegates() {
        let mut ledger = CheckpointLedger::new();
        ledger.apply_moves(&[mv(None, Some(1), 3)], 1).unwrap();
        ledger.apply_moves(&[mv(Some(1), Some(2), 2)], 2).unwrap();
        assert_eq!(ledger.current_votes(&acct(1)), v(1));
        assert_eq!(ledger.current_votes(&acct(2)), v(2));
        assert_eq!(ledger.num_checkpoints(&acct(1)), 2);
        assert_eq!(ledger.num_checkpoints(&acct(2)), 1);
    }

    #[test]
    fn apply_moves_skips_self_and_zero_moves() {
        let mut ledger = CheckpointLedger::new();
        ledger
            .apply_moves(&[mv(Some(1), Some(1), 3), mv(None, Some(2), 0)], 1)
            .unwrap();
        assert_eq!(ledger.num_checkpoints(&acct(1)), 0);
        assert_eq!(ledger.num_checkpoints(&acct(2)), 0);
    }

    #[test]
    fn apply_moves_is_all_or_nothing() {
        let mut ledger = CheckpointLedger::new();
        ledger.apply_moves(&[mv(None, Some(1), 1)], 1).unwrap();
        // Second move underflows account 3; the first must not be applied.
        let err = ledger
            .apply_moves(&[mv(Some(1), Some(2), 1), mv(Some(3), Some(2), 1)], 2)
            .unwrap_err();
        assert_eq!(err, LedgerError::Underflow(acct(3)));
        assert_eq!(ledger.current_votes(&acct(1)), v(1));
        assert_eq!(ledger.num_checkpoints(&acct(2)), 0);
    }

    #[test]
    fn apply_moves_rejects_overflow() {
        let mut ledger = CheckpointLedger::new();
        ledger
            .apply_moves(
                &[VoteMove {
                    from: None,
                    to: Some(acct(1)),
                    amount: Votes::MAX,
                }],
                1,
            )
            .unwrap();
        let err = ledger.apply_moves(&[mv(None, Some(1), 1)], 2).unwrap_err();
        assert_eq!(err, LedgerError::Overflow(acct(1)));
        assert_eq!(ledger.current_votes(&acct(1)), Votes::MAX);
    }
}
