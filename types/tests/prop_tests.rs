use proptest::prelude::*;

use tally_types::{calldata, Address, Timestamp, Votes};

fn votes() -> impl Strategy<Value = Votes> {
    (0u128..=Votes::MAX.raw()).prop_map(|raw| Votes::new(raw).unwrap())
}

proptest! {
    /// checked_add succeeds exactly when the sum stays inside 96 bits.
    #[test]
    fn votes_add_is_bounded(a in votes(), b in votes()) {
        let sum = a.raw() + b.raw();
        prop_assert_eq!(a.checked_add(b).is_some(), sum <= Votes::MAX.raw());
    }

    /// Subtraction undoes addition whenever the addition succeeded.
    #[test]
    fn votes_sub_inverts_add(a in votes(), b in votes()) {
        if let Some(sum) = a.checked_add(b) {
            prop_assert_eq!(sum.checked_sub(b), Some(a));
        }
    }

    /// A basis-point fraction never exceeds the whole for bps <= 10_000.
    #[test]
    fn bps_never_exceeds_whole(a in votes(), bps in 0u32..=10_000) {
        prop_assert!(a.bps(bps) <= a);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(Timestamp::new(a) <= Timestamp::new(b), a <= b);
    }

    /// Address calldata survives encode/decode.
    #[test]
    fn address_calldata(bytes in prop::array::uniform32(0u8..)) {
        let addr = Address::new(bytes);
        let data = calldata::encode_address(&addr);
        prop_assert_eq!(calldata::decode_address("f(address)", &data).unwrap(), addr);
    }
}
