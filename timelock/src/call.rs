//! Queued calls and the dispatch capability that performs them.

use serde::{Deserialize, Serialize};
use tally_crypto::blake2b_256_multi;
use tally_types::{Address, ChainTime, Timestamp, TxHash};

/// An outgoing call: a target, a value to attach, an entry-point
/// signature and its argument bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    pub target: Address,
    pub value: u128,
    pub signature: String,
    pub data: Vec<u8>,
}

impl Call {
    pub fn new(target: Address, value: u128, signature: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            target,
            value,
            signature: signature.into(),
            data,
        }
    }
}

/// A call bound to the earliest time it may run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTransaction {
    pub call: Call,
    pub eta: Timestamp,
}

impl QueuedTransaction {
    pub fn new(call: Call, eta: Timestamp) -> Self {
        Self { call, eta }
    }

    /// Content hash over `(target, value, signature, data, eta)`.
    ///
    /// Variable-length fields are length-prefixed so no two distinct
    /// transactions share an encoding.
    pub fn hash(&self) -> TxHash {
        let sig = self.call.signature.as_bytes();
        TxHash::new(blake2b_256_multi(&[
            b"tally/timelock/tx",
            self.call.target.as_bytes(),
            &self.call.value.to_be_bytes(),
            &(sig.len() as u64).to_be_bytes(),
            sig,
            &(self.call.data.len() as u64).to_be_bytes(),
            &self.call.data,
            &self.eta.as_secs().to_be_bytes(),
        ]))
    }
}

/// Performs calls to targets outside the core.
///
/// An `Err` carries the revert reason; the timelock surfaces it as
/// `CallReverted` and leaves the transaction queued.
pub trait CallDispatcher {
    fn dispatch(&mut self, call: &Call, now: ChainTime) -> Result<Vec<u8>, String>;
}

impl<T: CallDispatcher + ?Sized> CallDispatcher for &mut T {
    fn dispatch(&mut self, call: &Call, now: ChainTime) -> Result<Vec<u8>, String> {
        (**self).dispatch(call, now)
    }
}
