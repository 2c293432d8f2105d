//! Nullable clock: deterministic chain time for testing.

use std::cell::Cell;
use tally_types::{ChainTime, Timestamp};

/// Seconds per index when none is given.
pub const DEFAULT_SECS_PER_INDEX: u64 = 12;

/// A deterministic clock for testing.
///
/// Neither the sequence index nor the timestamp moves until you tell it to.
pub struct NullClock {
    index: Cell<u64>,
    timestamp: Cell<u64>,
    secs_per_index: u64,
}

impl NullClock {
    pub fn new(index: u64, timestamp_secs: u64, secs_per_index: u64) -> Self {
        Self {
            index: Cell::new(index),
            timestamp: Cell::new(timestamp_secs),
            secs_per_index,
        }
    }

    /// A clock at `index` whose timestamp is `index` default-length intervals
    /// past the epoch.
    pub fn starting_at(index: u64) -> Self {
        Self::new(
            index,
            index * DEFAULT_SECS_PER_INDEX,
            DEFAULT_SECS_PER_INDEX,
        )
    }

    /// Get the current time.
    pub fn now(&self) -> ChainTime {
        ChainTime::new(self.index.get(), Timestamp::new(self.timestamp.get()))
    }

    pub fn index(&self) -> u64 {
        self.index.get()
    }

    /// Advance by `blocks` indices; the timestamp follows.
    pub fn mine(&self, blocks: u64) -> ChainTime {
        self.index.set(self.index.get() + blocks);
        self.timestamp
            .set(self.timestamp.get() + blocks * self.secs_per_index);
        self.now()
    }

    /// Advance the timestamp alone.
    pub fn warp(&self, secs: u64) -> ChainTime {
        self.timestamp.set(self.timestamp.get() + secs);
        self.now()
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_moves_both_clocks() {
        let clock = NullClock::new(10, 1_000, 12);
        let now = clock.mine(5);
        assert_eq!(now.index, 15);
        assert_eq!(now.timestamp, Timestamp::new(1_060));
    }

    #[test]
    fn warp_leaves_index_alone() {
        let clock = NullClock::starting_at(3);
        clock.warp(86_400);
        assert_eq!(clock.index(), 3);
        assert_eq!(clock.now().timestamp.as_secs(), 36 + 86_400);
    }
}
