//! Delegation registry.
//!
//! Maps each account to the delegate it last chose and keeps the checkpoint
//! ledger in step with it: a delegation or an ownership change moves the
//! affected weight from the delegate that carried it to the new one, both
//! sides written at the current index in a single ledger step.
//!
//! There is no implicit self-delegation. An account's holdings count for no
//! one until some delegation (possibly to itself) names a delegate.

use crate::checkpoint::{CheckpointLedger, VoteMove};
use crate::error::LedgerError;
use crate::source::{DelegateTargets, Holding, PowerSource, Subject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_types::{Address, ChainTime, UnitId, Votes};
use tracing::{debug, info};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationRegistry<S> {
    ledger: CheckpointLedger,
    targets: DelegateTargets,
    source: S,
    total_supply: Votes,
}

impl<S: PowerSource> DelegationRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            ledger: CheckpointLedger::new(),
            targets: DelegateTargets::new(),
            source,
            total_supply: Votes::ZERO,
        }
    }

    /// Reassemble a registry from persisted parts, e.g. a ledger restored
    /// from a [`LedgerSnapshot`](crate::LedgerSnapshot) together with the
    /// saved delegate targets and ownership mirror.
    ///
    /// The parts must come from the same registry at the same index; they
    /// are not cross-checked.
    pub fn from_parts(
        ledger: CheckpointLedger,
        targets: DelegateTargets,
        source: S,
        total_supply: Votes,
    ) -> Self {
        Self {
            ledger,
            targets,
            source,
            total_supply,
        }
    }

    /// Delegate the weight of `subject` held by `from` to `to`.
    pub fn delegate(
        &mut self,
        subject: &Subject,
        from: &Address,
        to: &Address,
        now: ChainTime,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidDelegatee);
        }
        let holdings = self.source.holdings(from, subject)?;

        // One movement per previous carrier, however many units it held.
        let mut by_carrier: BTreeMap<Option<Address>, Votes> = BTreeMap::new();
        for holding in &holdings {
            let (carrier, weight) = self.source.delta_for_transfer(Some(from), holding, &self.targets)?;
            let total = by_carrier.entry(carrier).or_default();
            *total = total.checked_add(weight).ok_or(LedgerError::Overflow(*to))?;
        }
        let moves: Vec<VoteMove> = by_carrier
            .into_iter()
            .map(|(carrier, amount)| VoteMove {
                from: carrier,
                to: Some(*to),
                amount,
            })
            .collect();

        self.ledger.apply_moves(&moves, now.index)?;

        self.targets.insert(*from, *to);
        for holding in &holdings {
            self.source.bind(holding, Some(*to));
        }
        info!(
            delegator = %from,
            delegatee = %to,
            holdings = holdings.len(),
            index = now.index,
            "delegation changed"
        );
        Ok(())
    }

    /// Delegate many units in one step.
    pub fn delegate_batch(
        &mut self,
        units: &[UnitId],
        from: &Address,
        to: &Address,
        now: ChainTime,
    ) -> Result<(), LedgerError> {
        self.delegate(&Subject::Units(units.to_vec()), from, to, now)
    }

    /// React to the asset collaborator moving `holding` from `previous`
    /// (`None` = mint) to `new_owner` (`None` = burn).
    ///
    /// The weight follows the new owner's delegate target, or counts for no
    /// one if the new owner has never delegated.
    pub fn on_ownership_changed(
        &mut self,
        holding: &Holding,
        previous: Option<&Address>,
        new_owner: Option<&Address>,
        now: ChainTime,
    ) -> Result<(), LedgerError> {
        self.source.check_transfer(holding, previous, new_owner)?;
        let (old_carrier, weight) = self.source.delta_for_transfer(previous, holding, &self.targets)?;
        let new_carrier = new_owner.and_then(|o| self.targets.get(o)).copied();

        let total_supply = match (previous, new_owner) {
            (None, Some(_)) => self
                .total_supply
                .checked_add(weight)
                .ok_or(LedgerError::SupplyOverflow)?,
            (Some(_), None) => self
                .total_supply
                .checked_sub(weight)
                .ok_or(LedgerError::SupplyOverflow)?,
            _ => self.total_supply,
        };

        self.ledger.apply_moves(
            &[VoteMove {
                from: old_carrier,
                to: new_carrier,
                amount: weight,
            }],
            now.index,
        )?;

        self.total_supply = total_supply;
        self.source.apply_transfer(holding, previous, new_owner);
        self.source.bind(holding, new_carrier);
        debug!(
            ?holding,
            from = ?previous,
            to = ?new_owner,
            index = now.index,
            "ownership change applied"
        );
        Ok(())
    }

    /// Every account's chosen delegate.
    pub fn delegate_targets(&self) -> &DelegateTargets {
        &self.targets
    }

    /// The delegate `account` last chose, if any.
    pub fn current_delegate(&self, account: &Address) -> Option<&Address> {
        self.targets.get(account)
    }

    pub fn current_votes(&self, account: &Address) -> Votes {
        self.ledger.current_votes(account)
    }

    pub fn prior_votes(
        &self,
        account: &Address,
        at_index: u64,
        now: ChainTime,
    ) -> Result<Votes, LedgerError> {
        self.ledger.prior_votes(account, at_index, now.index)
    }

    pub fn num_checkpoints(&self, account: &Address) -> u32 {
        self.ledger.num_checkpoints(account)
    }

    /// Units (or balance) in existence, as tracked from mint/burn notifications.
    pub fn total_supply(&self) -> Votes {
        self.total_supply
    }

    pub fn ledger(&self) -> &CheckpointLedger {
        &self.ledger
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BalanceIndexed, UnitIndexed};
    use tally_types::Timestamp;

    fn acct(seed: u8) -> Address {
        Address::repeat(seed)
    }

    fn at(index: u64) -> ChainTime {
        ChainTime::new(index, Timestamp::new(index * 12))
    }

    fn mint_units(reg: &mut DelegationRegistry<UnitIndexed>, owner: u8, units: &[u64], index: u64) {
        for &u in units {
            reg.on_ownership_changed(&Holding::Unit(UnitId(u)), None, Some(&acct(owner)), at(index))
                .unwrap();
        }
    }

    #[test]
    fn holdings_carry_no_weight_until_delegated() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0, 1], 1);
        assert_eq!(reg.current_votes(&acct(1)), Votes::ZERO);
        assert_eq!(reg.total_supply(), Votes::from(2));

        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(1), at(2)).unwrap();
        assert_eq!(reg.current_votes(&acct(1)), Votes::from(1));
    }

    #[test]
    fn null_delegatee_rejected_without_mutation() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0], 1);
        assert_eq!(
            reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &Address::ZERO, at(2)),
            Err(LedgerError::InvalidDelegatee)
        );
        assert_eq!(reg.current_delegate(&acct(1)), None);
        assert_eq!(reg.ledger().accounts().count(), 0);
    }

    #[test]
    fn redelegation_moves_weight() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0], 1);
        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(2), at(2)).unwrap();
        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(3), at(3)).unwrap();

        assert_eq!(reg.current_votes(&acct(2)), Votes::ZERO);
        assert_eq!(reg.current_votes(&acct(3)), Votes::from(1));
        assert_eq!(reg.num_checkpoints(&acct(2)), 2);
        assert_eq!(reg.source().delegate_of(&UnitId(0)), Some(&acct(3)));
    }

    #[test]
    fn delegating_to_same_delegate_writes_nothing() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0], 1);
        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(2), at(2)).unwrap();
        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(2), at(3)).unwrap();
        assert_eq!(reg.num_checkpoints(&acct(2)), 1);
    }

    #[test]
    fn batch_writes_one_checkpoint_per_delegate() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0, 1, 2, 3], 1);
        reg.delegate_batch(&[UnitId(0), UnitId(1)], &acct(1), &acct(2), at(2)).unwrap();
        reg.delegate_batch(&[UnitId(2), UnitId(3)], &acct(1), &acct(3), at(3)).unwrap();

        reg.delegate_batch(
            &[UnitId(0), UnitId(1), UnitId(2), UnitId(3)],
            &acct(1),
            &acct(4),
            at(5),
        )
        .unwrap();
        assert_eq!(reg.num_checkpoints(&acct(4)), 1);
        assert_eq!(reg.current_votes(&acct(4)), Votes::from(4));
        assert_eq!(reg.num_checkpoints(&acct(2)), 2);
        assert_eq!(reg.num_checkpoints(&acct(3)), 2);
    }

    #[test]
    fn batch_with_foreign_unit_is_rejected_whole() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0], 1);
        mint_units(&mut reg, 2, &[1], 1);
        let err = reg
            .delegate_batch(&[UnitId(0), UnitId(1)], &acct(1), &acct(3), at(2))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotOwner { .. }));
        assert_eq!(reg.current_votes(&acct(3)), Votes::ZERO);
        assert_eq!(reg.current_delegate(&acct(1)), None);
    }

    #[test]
    fn transfer_follows_new_owner_target() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0], 1);
        mint_units(&mut reg, 3, &[1], 1);
        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(2), at(2)).unwrap();
        reg.delegate(&Subject::Unit(UnitId(1)), &acct(3), &acct(4), at(2)).unwrap();

        reg.on_ownership_changed(&Holding::Unit(UnitId(0)), Some(&acct(1)), Some(&acct(3)), at(4))
            .unwrap();
        assert_eq!(reg.current_votes(&acct(2)), Votes::ZERO);
        assert_eq!(reg.current_votes(&acct(4)), Votes::from(2));
    }

    #[test]
    fn transfer_to_undelegated_owner_drops_weight() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0], 1);
        reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(2), at(2)).unwrap();
        reg.on_ownership_changed(&Holding::Unit(UnitId(0)), Some(&acct(1)), Some(&acct(5)), at(3))
            .unwrap();
        assert_eq!(reg.current_votes(&acct(2)), Votes::ZERO);
        assert_eq!(reg.source().delegate_of(&UnitId(0)), None);
    }

    #[test]
    fn burn_reduces_supply_and_weight() {
        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0, 1], 1);
        reg.delegate_batch(&[UnitId(0), UnitId(1)], &acct(1), &acct(2), at(2)).unwrap();
        reg.on_ownership_changed(&Holding::Unit(UnitId(1)), Some(&acct(1)), None, at(3))
            .unwrap();
        assert_eq!(reg.total_supply(), Votes::from(1));
        assert_eq!(reg.current_votes(&acct(2)), Votes::from(1));
        assert_eq!(reg.source().owner_of(&UnitId(1)), None);
    }

    #[test]
    fn balance_delegation_moves_whole_balance() {
        let mut reg = DelegationRegistry::new(BalanceIndexed::new());
        reg.on_ownership_changed(&Holding::Amount(100), None, Some(&acct(1)), at(1))
            .unwrap();
        reg.delegate(&Subject::Balance, &acct(1), &acct(2), at(2)).unwrap();
        assert_eq!(reg.current_votes(&acct(2)), Votes::from(100));

        // Later transfers debit the sender's delegate and credit the receiver's.
        reg.delegate(&Subject::Balance, &acct(3), &acct(4), at(3)).unwrap();
        reg.on_ownership_changed(&Holding::Amount(40), Some(&acct(1)), Some(&acct(3)), at(4))
            .unwrap();
        assert_eq!(reg.current_votes(&acct(2)), Votes::from(60));
        assert_eq!(reg.current_votes(&acct(4)), Votes::from(40));
        assert_eq!(reg.total_supply(), Votes::from(100));
    }

    #[test]
    fn rebuilt_from_snapshot_keeps_history_and_delegations() {
        use crate::snapshot::LedgerSnapshot;

        let mut reg = DelegationRegistry::new(UnitIndexed::new());
        mint_units(&mut reg, 1, &[0, 1], 1);
        reg.delegate_batch(&[UnitId(0), UnitId(1)], &acct(1), &acct(2), at(2)).unwrap();

        let bytes = LedgerSnapshot::create(reg.ledger(), 3).to_bytes().unwrap();
        let ledger = LedgerSnapshot::from_bytes(&bytes).unwrap().into_ledger().unwrap();
        let mut restored = DelegationRegistry::from_parts(
            ledger,
            reg.delegate_targets().clone(),
            reg.source().clone(),
            reg.total_supply(),
        );

        assert_eq!(restored.prior_votes(&acct(2), 2, at(3)), Ok(Votes::from(2)));
        assert_eq!(restored.total_supply(), Votes::from(2));

        // New activity continues on top of the restored history.
        restored
            .delegate(&Subject::Unit(UnitId(1)), &acct(1), &acct(3), at(4))
            .unwrap();
        assert_eq!(restored.current_votes(&acct(2)), Votes::from(1));
        assert_eq!(restored.current_votes(&acct(3)), Votes::from(1));
        assert_eq!(restored.num_checkpoints(&acct(2)), 2);
    }

    #[test]
    fn balance_source_rejects_unit_subjects() {
        let mut reg = DelegationRegistry::new(BalanceIndexed::new());
        assert!(matches!(
            reg.delegate(&Subject::Unit(UnitId(0)), &acct(1), &acct(2), at(1)),
            Err(LedgerError::UnsupportedSubject(_))
        ));
    }
}
