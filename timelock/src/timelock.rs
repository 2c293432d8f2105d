//! The execution queue itself.

use crate::call::{Call, CallDispatcher, QueuedTransaction};
use crate::error::TimelockError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_types::calldata::{decode_address, decode_u64};
use tally_types::{Address, ChainTime, Timestamp, TxHash};
use tracing::{info, warn};

const DAY: u64 = 24 * 60 * 60;

pub const GRACE_PERIOD_SECS: u64 = 14 * DAY;
pub const MINIMUM_DELAY_SECS: u64 = 2 * DAY;
pub const MAXIMUM_DELAY_SECS: u64 = 30 * DAY;

/// Self-call entry point changing the delay. Argument: `u64` seconds.
pub const SET_DELAY: &str = "setDelay(uint256)";
/// Self-call entry point nominating a new admin. Argument: address.
pub const SET_PENDING_ADMIN: &str = "setPendingAdmin(address)";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timelock {
    address: Address,
    admin: Address,
    pending_admin: Option<Address>,
    delay: u64,
    grace_period: u64,
    queued: BTreeMap<TxHash, QueuedTransaction>,
}

impl Timelock {
    /// A timelock living at `address`, administered by `admin`.
    pub fn new(address: Address, admin: Address, delay: u64) -> Result<Self, TimelockError> {
        check_delay(delay)?;
        Ok(Self {
            address,
            admin,
            pending_admin: None,
            delay,
            grace_period: GRACE_PERIOD_SECS,
            queued: BTreeMap::new(),
        })
    }

    pub fn with_grace_period(mut self, secs: u64) -> Self {
        self.grace_period = secs;
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn pending_admin(&self) -> Option<&Address> {
        self.pending_admin.as_ref()
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn grace_period(&self) -> u64 {
        self.grace_period
    }

    pub fn is_queued(&self, hash: &TxHash) -> bool {
        self.queued.contains_key(hash)
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    /// Earliest eta the queue would accept at `now`.
    pub fn earliest_eta(&self, now: ChainTime) -> Result<Timestamp, TimelockError> {
        now.timestamp
            .checked_add_secs(self.delay)
            .ok_or(TimelockError::Overflow)
    }

    pub fn queue_transaction(
        &mut self,
        caller: &Address,
        tx: QueuedTransaction,
        now: ChainTime,
    ) -> Result<TxHash, TimelockError> {
        self.require_admin(caller)?;
        let earliest = self.earliest_eta(now)?;
        if tx.eta < earliest {
            return Err(TimelockError::DelayNotSatisfied {
                eta: tx.eta,
                earliest,
            });
        }
        let hash = tx.hash();
        info!(
            tx = %hash,
            target = %tx.call.target,
            signature = %tx.call.signature,
            eta = %tx.eta,
            "transaction queued"
        );
        self.queued.insert(hash, tx);
        Ok(hash)
    }

    /// Remove a queued entry. Removing an absent entry is not an error.
    pub fn cancel_transaction(
        &mut self,
        caller: &Address,
        tx: &QueuedTransaction,
    ) -> Result<(), TimelockError> {
        self.require_admin(caller)?;
        let hash = tx.hash();
        if self.queued.remove(&hash).is_some() {
            info!(tx = %hash, "transaction canceled");
        }
        Ok(())
    }

    /// Run a queued transaction inside its window.
    ///
    /// The entry is removed only when the call succeeds; a reverted call
    /// leaves it queued for a later attempt.
    pub fn execute_transaction<D: CallDispatcher>(
        &mut self,
        caller: &Address,
        tx: &QueuedTransaction,
        now: ChainTime,
        dispatcher: &mut D,
    ) -> Result<Vec<u8>, TimelockError> {
        self.require_admin(caller)?;
        let hash = tx.hash();
        if !self.queued.contains_key(&hash) {
            return Err(TimelockError::NotQueued(hash));
        }
        if now.timestamp < tx.eta {
            return Err(TimelockError::TooEarly {
                eta: tx.eta,
                now: now.timestamp,
            });
        }
        // A window reaching past the end of time never closes.
        if let Some(expired_at) = tx.eta.checked_add_secs(self.grace_period) {
            if now.timestamp > expired_at {
                return Err(TimelockError::StaleTransaction {
                    expired_at,
                    now: now.timestamp,
                });
            }
        }

        let output = if tx.call.target == self.address {
            self.call_self(&tx.call)?
        } else {
            dispatcher.dispatch(&tx.call, now).map_err(|reason| {
                warn!(tx = %hash, target = %tx.call.target, %reason, "call reverted");
                TimelockError::CallReverted {
                    target: tx.call.target,
                    reason,
                }
            })?
        };
        self.queued.remove(&hash);
        info!(tx = %hash, target = %tx.call.target, "transaction executed");
        Ok(output)
    }

    /// Change the delay. Only the timelock itself may call this.
    pub fn set_delay(&mut self, caller: &Address, delay: u64) -> Result<(), TimelockError> {
        self.require_self(caller)?;
        check_delay(delay)?;
        self.delay = delay;
        info!(delay, "timelock delay changed");
        Ok(())
    }

    /// Nominate a new admin. Only the timelock itself may call this.
    pub fn set_pending_admin(
        &mut self,
        caller: &Address,
        pending: Address,
    ) -> Result<(), TimelockError> {
        self.require_self(caller)?;
        self.pending_admin = Some(pending);
        info!(pending_admin = %pending, "timelock pending admin set");
        Ok(())
    }

    /// The nominated admin takes over.
    pub fn accept_admin(&mut self, caller: &Address) -> Result<(), TimelockError> {
        if self.pending_admin.as_ref() != Some(caller) {
            return Err(TimelockError::NotPendingAdmin { caller: *caller });
        }
        self.admin = *caller;
        self.pending_admin = None;
        info!(admin = %caller, "timelock admin accepted");
        Ok(())
    }

    fn call_self(&mut self, call: &Call) -> Result<Vec<u8>, TimelockError> {
        let me = self.address;
        let result = match call.signature.as_str() {
            SET_DELAY => decode_u64(&call.signature, &call.data)
                .map_err(TimelockError::from)
                .and_then(|delay| self.set_delay(&me, delay)),
            SET_PENDING_ADMIN => decode_address(&call.signature, &call.data)
                .map_err(TimelockError::from)
                .and_then(|pending| self.set_pending_admin(&me, pending)),
            other => Err(TimelockError::CallReverted {
                target: me,
                reason: format!("unknown entry point {other}"),
            }),
        };
        result.map(|()| Vec::new()).map_err(|e| match e {
            e @ TimelockError::CallReverted { .. } => e,
            e => TimelockError::CallReverted {
                target: me,
                reason: e.to_string(),
            },
        })
    }

    fn require_admin(&self, caller: &Address) -> Result<(), TimelockError> {
        if *caller != self.admin {
            return Err(TimelockError::NotAdmin { caller: *caller });
        }
        Ok(())
    }

    fn require_self(&self, caller: &Address) -> Result<(), TimelockError> {
        if *caller != self.address {
            return Err(TimelockError::OnlySelf { caller: *caller });
        }
        Ok(())
    }
}

fn check_delay(delay: u64) -> Result<(), TimelockError> {
    if !(MINIMUM_DELAY_SECS..=MAXIMUM_DELAY_SECS).contains(&delay) {
        return Err(TimelockError::InvalidDelay {
            delay,
            min: MINIMUM_DELAY_SECS,
            max: MAXIMUM_DELAY_SECS,
        });
    }
    Ok(())
}
