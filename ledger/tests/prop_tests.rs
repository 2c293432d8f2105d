use proptest::prelude::*;
use std::collections::HashMap;

use tally_ledger::{DelegationRegistry, Holding, Subject, UnitIndexed};
use tally_types::{Address, ChainTime, Timestamp, UnitId, Votes};

fn acct(n: u8) -> Address {
    Address::repeat(n % 4 + 1)
}

fn at(index: u64) -> ChainTime {
    ChainTime::new(index, Timestamp::new(index * 12))
}

/// Replay a random script of mints, delegations, transfers and burns.
/// Operations the registry rejects are simply skipped.
fn replay(ops: &[(u8, u8, u8, u8)]) -> (DelegationRegistry<UnitIndexed>, u64) {
    let mut reg = DelegationRegistry::new(UnitIndexed::new());
    let mut index = 1u64;
    for &(op, a, b, step) in ops {
        index += u64::from(step % 3);
        let unit = UnitId(u64::from(b % 6));
        let now = at(index);
        let owner = reg.source().owner_of(&unit).copied();
        match op % 4 {
            0 => {
                let _ = reg.on_ownership_changed(&Holding::Unit(unit), None, Some(&acct(a)), now);
            }
            1 => {
                if let Some(owner) = owner {
                    let _ = reg.delegate(&Subject::Unit(unit), &owner, &acct(a.wrapping_add(1)), now);
                }
            }
            2 => {
                if let Some(owner) = owner {
                    let _ = reg.on_ownership_changed(&Holding::Unit(unit), Some(&owner), Some(&acct(a)), now);
                }
            }
            _ => {
                if let Some(owner) = owner {
                    let _ = reg.on_ownership_changed(&Holding::Unit(unit), Some(&owner), None, now);
                }
            }
        }
    }
    (reg, index)
}

fn ops() -> impl Strategy<Value = Vec<(u8, u8, u8, u8)>> {
    proptest::collection::vec(any::<(u8, u8, u8, u8)>(), 1..80)
}

proptest! {
    /// Checkpoint indices strictly increase: one checkpoint per index at most.
    #[test]
    fn checkpoint_indices_strictly_increase(script in ops()) {
        let (reg, _) = replay(&script);
        for account in reg.ledger().accounts() {
            let history = reg.ledger().history(account);
            for pair in history.windows(2) {
                prop_assert!(
                    pair[0].from_index < pair[1].from_index,
                    "{} has checkpoints at {} then {}",
                    account, pair[0].from_index, pair[1].from_index
                );
            }
        }
    }

    /// Every delegate's current votes equal the units bound to it.
    #[test]
    fn current_votes_match_bound_units(script in ops()) {
        let (reg, _) = replay(&script);
        let mut expected: HashMap<Address, u64> = HashMap::new();
        for unit in 0..6u64 {
            if let Some(delegate) = reg.source().delegate_of(&UnitId(unit)) {
                *expected.entry(*delegate).or_default() += 1;
            }
        }
        for seed in 0..4u8 {
            let account = acct(seed);
            let want = Votes::from(expected.get(&account).copied().unwrap_or(0));
            prop_assert_eq!(reg.current_votes(&account), want);
        }
        let owned = reg.source().unit_count();
        prop_assert_eq!(reg.total_supply(), Votes::from(owned as u64));
    }

    /// Binary-search lookup agrees with a linear scan of the history.
    #[test]
    fn prior_votes_matches_linear_scan(script in ops()) {
        let (reg, last_index) = replay(&script);
        let now = at(last_index + 1);
        for account in reg.ledger().accounts() {
            let history = reg.ledger().history(account);
            for lookup_index in 0..=last_index {
                let scanned = history
                    .iter()
                    .rev()
                    .find(|c| c.from_index <= lookup_index)
                    .map(|c| c.votes)
                    .unwrap_or(Votes::ZERO);
                prop_assert_eq!(reg.prior_votes(account, lookup_index, now).unwrap(), scanned);
            }
        }
    }
}
