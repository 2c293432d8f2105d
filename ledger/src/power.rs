//! Read-only voting-power interface consumed by governance.

use crate::error::LedgerError;
use crate::registry::DelegationRegistry;
use crate::source::PowerSource;
use tally_types::{Address, ChainTime, Votes};

pub trait VotingPower {
    fn current_votes(&self, account: &Address) -> Result<Votes, LedgerError>;

    /// Votes held at `at_index`; fails with `NotYetDetermined` unless
    /// `at_index` lies strictly before `now`.
    fn prior_votes(&self, account: &Address, at_index: u64, now: ChainTime) -> Result<Votes, LedgerError>;

    fn total_supply(&self) -> Result<Votes, LedgerError>;
}

impl<S: PowerSource> VotingPower for DelegationRegistry<S> {
    fn current_votes(&self, account: &Address) -> Result<Votes, LedgerError> {
        Ok(DelegationRegistry::current_votes(self, account))
    }

    fn prior_votes(&self, account: &Address, at_index: u64, now: ChainTime) -> Result<Votes, LedgerError> {
        DelegationRegistry::prior_votes(self, account, at_index, now)
    }

    fn total_supply(&self) -> Result<Votes, LedgerError> {
        Ok(DelegationRegistry::total_supply(self))
    }
}

impl<T: VotingPower + ?Sized> VotingPower for &T {
    fn current_votes(&self, account: &Address) -> Result<Votes, LedgerError> {
        (**self).current_votes(account)
    }

    fn prior_votes(&self, account: &Address, at_index: u64, now: ChainTime) -> Result<Votes, LedgerError> {
        (**self).prior_votes(account, at_index, now)
    }

    fn total_supply(&self) -> Result<Votes, LedgerError> {
        (**self).total_supply()
    }
}

/// Several collections counted as one electorate: every query is the sum of
/// the same query against each member.
pub struct PowerSum<'a> {
    sources: Vec<&'a dyn VotingPower>,
}

impl<'a> PowerSum<'a> {
    pub fn new(sources: Vec<&'a dyn VotingPower>) -> Self {
        Self { sources }
    }

    fn sum(
        &self,
        on_overflow: LedgerError,
        query: impl Fn(&dyn VotingPower) -> Result<Votes, LedgerError>,
    ) -> Result<Votes, LedgerError> {
        let mut total = Votes::ZERO;
        for source in &self.sources {
            total = total.checked_add(query(*source)?).ok_or_else(|| on_overflow.clone())?;
        }
        Ok(total)
    }
}

impl VotingPower for PowerSum<'_> {
    fn current_votes(&self, account: &Address) -> Result<Votes, LedgerError> {
        self.sum(LedgerError::Overflow(*account), |s| s.current_votes(account))
    }

    fn prior_votes(&self, account: &Address, at_index: u64, now: ChainTime) -> Result<Votes, LedgerError> {
        self.sum(LedgerError::Overflow(*account), |s| s.prior_votes(account, at_index, now))
    }

    fn total_supply(&self) -> Result<Votes, LedgerError> {
        self.sum(LedgerError::SupplyOverflow, |s| s.total_supply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{BalanceIndexed, Holding, Subject, UnitIndexed};
    use tally_types::{Timestamp, UnitId};

    fn at(index: u64) -> ChainTime {
        ChainTime::new(index, Timestamp::new(index))
    }

    #[test]
    fn sum_of_two_collections() {
        let alice = Address::repeat(1);
        let bob = Address::repeat(2);

        let mut units = DelegationRegistry::new(UnitIndexed::new());
        units
            .on_ownership_changed(&Holding::Unit(UnitId(7)), None, Some(&alice), at(1))
            .unwrap();
        units.delegate(&Subject::Unit(UnitId(7)), &alice, &bob, at(2)).unwrap();

        let mut balances = DelegationRegistry::new(BalanceIndexed::new());
        balances
            .on_ownership_changed(&Holding::Amount(5), None, Some(&alice), at(1))
            .unwrap();
        balances.delegate(&Subject::Balance, &alice, &bob, at(3)).unwrap();

        let sum = PowerSum::new(vec![&units as &dyn VotingPower, &balances as &dyn VotingPower]);
        assert_eq!(sum.current_votes(&bob).unwrap(), Votes::from(6));
        assert_eq!(sum.prior_votes(&bob, 2, at(4)).unwrap(), Votes::from(1));
        assert_eq!(sum.total_supply().unwrap(), Votes::from(6));
        assert!(matches!(
            sum.prior_votes(&bob, 4, at(4)),
            Err(LedgerError::NotYetDetermined { .. })
        ));
    }
}
