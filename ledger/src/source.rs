//! Power sources: how an asset collection's holdings turn into delegable weight.
//!
//! The registry is agnostic to the asset model. It asks the source two things:
//! which holdings a delegation request covers, and for a holding leaving an
//! owner, how much weight moves and which delegate currently carries it
//! ([`PowerSource::delta_for_transfer`]).
//!
//! - [`UnitIndexed`]: every unit weighs one vote and is delegated individually.
//! - [`BalanceIndexed`]: an account's whole fungible balance is delegated at once.
//!
//! Both mirror current ownership from the registry's change notifications;
//! the asset collaborator remains the source of truth.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tally_types::{Address, UnitId, Votes};

/// Account → the delegate it last chose.
pub type DelegateTargets = HashMap<Address, Address>;

/// Something that changes owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Holding {
    Unit(UnitId),
    Amount(u128),
}

/// What a delegation request covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Unit(UnitId),
    Units(Vec<UnitId>),
    /// The caller's entire balance.
    Balance,
}

pub trait PowerSource {
    /// Holdings of `owner` covered by `subject`.
    fn holdings(&self, owner: &Address, subject: &Subject) -> Result<Vec<Holding>, LedgerError>;

    /// Weight carried by `holding` while held by `owner` (`None` = freshly
    /// minted) and the delegate currently carrying it.
    fn delta_for_transfer(
        &self,
        owner: Option<&Address>,
        holding: &Holding,
        targets: &DelegateTargets,
    ) -> Result<(Option<Address>, Votes), LedgerError>;

    /// Validate an ownership-change notification against the mirror.
    fn check_transfer(
        &self,
        holding: &Holding,
        from: Option<&Address>,
        to: Option<&Address>,
    ) -> Result<(), LedgerError>;

    /// Apply a notification already accepted by [`PowerSource::check_transfer`].
    fn apply_transfer(&mut self, holding: &Holding, from: Option<&Address>, to: Option<&Address>);

    /// Record that `holding` now votes through `carrier`.
    fn bind(&mut self, holding: &Holding, carrier: Option<Address>);
}

/// Unit-indexed collection: one vote per unit, delegated per unit.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UnitIndexed {
    owners: HashMap<UnitId, Address>,
    carriers: HashMap<UnitId, Address>,
}

impl UnitIndexed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner_of(&self, unit: &UnitId) -> Option<&Address> {
        self.owners.get(unit)
    }

    /// Units currently in existence.
    pub fn unit_count(&self) -> usize {
        self.owners.len()
    }

    /// The delegate the unit's vote currently counts for.
    pub fn delegate_of(&self, unit: &UnitId) -> Option<&Address> {
        self.carriers.get(unit)
    }

    pub fn units_of<'a>(&'a self, owner: &'a Address) -> impl Iterator<Item = UnitId> + 'a {
        self.owners
            .iter()
            .filter(move |(_, o)| *o == owner)
            .map(|(u, _)| *u)
    }

    fn owned(&self, owner: &Address, unit: &UnitId) -> Result<Holding, LedgerError> {
        match self.owners.get(unit) {
            None => Err(LedgerError::UnknownUnit(*unit)),
            Some(o) if o != owner => Err(LedgerError::NotOwner {
                unit: *unit,
                account: *owner,
            }),
            Some(_) => Ok(Holding::Unit(*unit)),
        }
    }
}

impl PowerSource for UnitIndexed {
    fn holdings(&self, owner: &Address, subject: &Subject) -> Result<Vec<Holding>, LedgerError> {
        match subject {
            Subject::Unit(unit) => Ok(vec![self.owned(owner, unit)?]),
            Subject::Units(units) => {
                let mut seen = HashSet::with_capacity(units.len());
                units
                    .iter()
                    .map(|unit| {
                        if !seen.insert(*unit) {
                            return Err(LedgerError::DuplicateUnit(*unit));
                        }
                        self.owned(owner, unit)
                    })
                    .collect()
            }
            Subject::Balance => Err(LedgerError::UnsupportedSubject("balance delegation")),
        }
    }

    fn delta_for_transfer(
        &self,
        _owner: Option<&Address>,
        holding: &Holding,
        _targets: &DelegateTargets,
    ) -> Result<(Option<Address>, Votes), LedgerError> {
        match holding {
            Holding::Unit(unit) => Ok((self.carriers.get(unit).copied(), Votes::from(1))),
            Holding::Amount(_) => Err(LedgerError::UnsupportedSubject("amount transfer")),
        }
    }

    fn check_transfer(
        &self,
        holding: &Holding,
        from: Option<&Address>,
        _to: Option<&Address>,
    ) -> Result<(), LedgerError> {
        let Holding::Unit(unit) = holding else {
            return Err(LedgerError::UnsupportedSubject("amount transfer"));
        };
        let actual = self.owners.get(unit);
        match from {
            None if actual.is_some() => Err(LedgerError::UnitExists(*unit)),
            None => Ok(()),
            Some(claimed) if actual != Some(claimed) => Err(LedgerError::OwnershipMismatch {
                unit: *unit,
                claimed: *claimed,
                actual: actual.copied(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn apply_transfer(&mut self, holding: &Holding, _from: Option<&Address>, to: Option<&Address>) {
        if let Holding::Unit(unit) = holding {
            match to {
                Some(owner) => self.owners.insert(*unit, *owner),
                None => self.owners.remove(unit),
            };
        }
    }

    fn bind(&mut self, holding: &Holding, carrier: Option<Address>) {
        if let Holding::Unit(unit) = holding {
            match carrier {
                Some(c) => self.carriers.insert(*unit, c),
                None => self.carriers.remove(unit),
            };
        }
    }
}

/// Fungible collection: an account's balance is delegated as a whole.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceIndexed {
    balances: HashMap<Address, u128>,
}

impl BalanceIndexed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }
}

impl PowerSource for BalanceIndexed {
    fn holdings(&self, owner: &Address, subject: &Subject) -> Result<Vec<Holding>, LedgerError> {
        match subject {
            Subject::Balance => Ok(vec![Holding::Amount(self.balance_of(owner))]),
            Subject::Unit(_) | Subject::Units(_) => {
                Err(LedgerError::UnsupportedSubject("unit delegation"))
            }
        }
    }

    fn delta_for_transfer(
        &self,
        owner: Option<&Address>,
        holding: &Holding,
        targets: &DelegateTargets,
    ) -> Result<(Option<Address>, Votes), LedgerError> {
        let Holding::Amount(amount) = holding else {
            return Err(LedgerError::UnsupportedSubject("unit transfer"));
        };
        let weight = Votes::new(*amount).ok_or(LedgerError::SupplyOverflow)?;
        Ok((owner.and_then(|o| targets.get(o)).copied(), weight))
    }

    fn check_transfer(
        &self,
        holding: &Holding,
        from: Option<&Address>,
        to: Option<&Address>,
    ) -> Result<(), LedgerError> {
        let Holding::Amount(amount) = holding else {
            return Err(LedgerError::UnsupportedSubject("unit transfer"));
        };
        if let Some(account) = from {
            let available = self.balance_of(account);
            if available < *amount {
                return Err(LedgerError::InsufficientBalance {
                    account: *account,
                    available,
                    needed: *amount,
                });
            }
        }
        if let Some(account) = to {
            // A self-transfer debits first, so it cannot overflow.
            if from != Some(account) && self.balance_of(account).checked_add(*amount).is_none() {
                return Err(LedgerError::SupplyOverflow);
            }
        }
        Ok(())
    }

    fn apply_transfer(&mut self, holding: &Holding, from: Option<&Address>, to: Option<&Address>) {
        let Holding::Amount(amount) = holding else {
            return;
        };
        if let Some(account) = from {
            let balance = self.balances.entry(*account).or_default();
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(account);
            }
        }
        if let Some(account) = to {
            if *amount > 0 {
                *self.balances.entry(*account).or_default() += amount;
            }
        }
    }

    fn bind(&mut self, _holding: &Holding, _carrier: Option<Address>) {}
}
