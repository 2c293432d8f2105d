//! Vote amounts.
//!
//! Voting power is an unsigned integer bounded to 96 bits. The bound is part of
//! the protocol: every addition or subtraction is checked and an out-of-range
//! result is rejected, never wrapped or saturated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Basis-point denominator (10_000 = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// A vote count in `0..=2^96 - 1`.
///
/// Deserialization goes through [`TryFrom<u128>`], so decoded state cannot
/// smuggle in an out-of-range count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u128")]
pub struct Votes(u128);

impl Votes {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self((1u128 << 96) - 1);

    /// Construct from a raw count, or `None` if it does not fit in 96 bits.
    pub fn new(raw: u128) -> Option<Self> {
        (raw <= Self::MAX.0).then_some(Self(raw))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).and_then(Self::new)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `self * bps / 10_000`, rounded down and capped at [`Votes::MAX`].
    ///
    /// The product cannot overflow: a 96-bit count times a 32-bit multiplier
    /// fits in u128. Above 10_000 bps the quotient may exceed 96 bits.
    pub fn bps(self, bps: u32) -> Self {
        Self((self.0 * u128::from(bps) / BPS_DENOMINATOR).min(Self::MAX.0))
    }
}

impl From<u64> for Votes {
    fn from(raw: u64) -> Self {
        Self(u128::from(raw))
    }
}

impl TryFrom<u128> for Votes {
    type Error = crate::TallyError;

    fn try_from(raw: u128) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(crate::TallyError::VotesOutOfRange(raw))
    }
}

impl fmt::Display for Votes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} votes", self.0)
    }
}
