//! Nullable call dispatcher: records calls instead of performing them.

use std::collections::HashSet;
use tally_timelock::{Call, CallDispatcher};
use tally_types::{Address, ChainTime};

/// A recorded dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchedCall {
    pub call: Call,
    pub at: ChainTime,
}

/// Dispatcher that succeeds for every target except those marked failing.
///
/// `Clone` so it can be staged and discarded by all-or-nothing execution.
#[derive(Clone, Debug, Default)]
pub struct NullDispatcher {
    dispatched: Vec<DispatchedCall>,
    failing: HashSet<Address>,
}

impl NullDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls to `target` revert from now on.
    pub fn fail_target(&mut self, target: Address) {
        self.failing.insert(target);
    }

    pub fn restore_target(&mut self, target: &Address) {
        self.failing.remove(target);
    }

    pub fn dispatched(&self) -> &[DispatchedCall] {
        &self.dispatched
    }
}

impl CallDispatcher for NullDispatcher {
    fn dispatch(&mut self, call: &Call, now: ChainTime) -> Result<Vec<u8>, String> {
        if self.failing.contains(&call.target) {
            return Err(format!("{} reverted", call.signature));
        }
        self.dispatched.push(DispatchedCall {
            call: call.clone(),
            at: now,
        });
        Ok(Vec::new())
    }
}
