//! Governor roles and the calls an executed proposal may make on the
//! governor itself.

use serde::{Deserialize, Serialize};
use tally_timelock::{Call, CallDispatcher};
use tally_types::calldata::{decode_address, decode_u64};
use tally_types::{Address, ChainTime};
use tracing::info;

use crate::error::GovernanceError;
use crate::params::{GovernableParam, GovernorParams};

pub const SET_PENDING_ADMIN: &str = "_setPendingAdmin(address)";
pub const ACCEPT_ADMIN: &str = "_acceptAdmin()";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub admin: Address,
    pub pending_admin: Option<Address>,
    /// `None` once veto power is burned (or if none was configured).
    pub vetoer: Option<Address>,
}

impl Roles {
    pub(crate) fn require_admin(&self, caller: &Address, action: &'static str) -> Result<(), GovernanceError> {
        if *caller != self.admin {
            return Err(GovernanceError::NotAuthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    pub(crate) fn set_pending_admin(&mut self, caller: &Address, pending: Address) -> Result<(), GovernanceError> {
        self.require_admin(caller, "set pending admin")?;
        self.pending_admin = Some(pending);
        info!(account = %pending, "governor pending admin set");
        Ok(())
    }

    pub(crate) fn accept_admin(&mut self, caller: &Address) -> Result<(), GovernanceError> {
        if self.pending_admin.as_ref() != Some(caller) || caller.is_zero() {
            return Err(GovernanceError::NotAuthorized {
                caller: *caller,
                action: "accept admin",
            });
        }
        self.admin = *caller;
        self.pending_admin = None;
        info!(account = %caller, "governor admin accepted");
        Ok(())
    }

    fn require_vetoer(&self, caller: &Address, action: &'static str) -> Result<(), GovernanceError> {
        match self.vetoer {
            None => Err(GovernanceError::VetoBurned),
            Some(v) if v != *caller => Err(GovernanceError::NotAuthorized {
                caller: *caller,
                action,
            }),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn check_veto(&self, caller: &Address) -> Result<(), GovernanceError> {
        self.require_vetoer(caller, "veto")
    }

    pub(crate) fn set_vetoer(&mut self, caller: &Address, vetoer: Address) -> Result<(), GovernanceError> {
        self.require_vetoer(caller, "set vetoer")?;
        self.vetoer = Some(vetoer);
        info!(account = %vetoer, "vetoer changed");
        Ok(())
    }

    pub(crate) fn burn_veto_power(&mut self, caller: &Address) -> Result<(), GovernanceError> {
        self.require_vetoer(caller, "burn veto power")?;
        self.vetoer = None;
        info!(account = %caller, "veto power burned");
        Ok(())
    }
}

/// Admin-only, bounds-checked parameter change.
pub(crate) fn set_param(
    roles: &Roles,
    params: &mut GovernorParams,
    caller: &Address,
    param: GovernableParam,
    value: u64,
) -> Result<(), GovernanceError> {
    roles.require_admin(caller, param.name())?;
    let old = params.get(param);
    params.set(param, value)?;
    info!(param = param.name(), old, new = value, "governor parameter changed");
    Ok(())
}

/// Routes calls addressed to the governor into staged roles and params;
/// every other call goes to the outer dispatcher.
pub(crate) struct SelfCalls<'a, D> {
    pub governor: Address,
    /// Calls arrive from the timelock, so it is the caller.
    pub caller: Address,
    pub params: &'a mut GovernorParams,
    pub roles: &'a mut Roles,
    pub inner: &'a mut D,
}

impl<D> SelfCalls<'_, D> {
    fn apply(&mut self, call: &Call) -> Result<(), GovernanceError> {
        let sig = call.signature.as_str();
        if let Some(param) = GovernableParam::from_entry_point(sig) {
            let value = decode_u64(sig, &call.data)?;
            return set_param(self.roles, self.params, &self.caller, param, value);
        }
        match sig {
            SET_PENDING_ADMIN => {
                let pending = decode_address(sig, &call.data)?;
                self.roles.set_pending_admin(&self.caller, pending)
            }
            ACCEPT_ADMIN => self.roles.accept_admin(&self.caller),
            other => Err(GovernanceError::UnknownEntryPoint(other.to_string())),
        }
    }
}

impl<D: CallDispatcher> CallDispatcher for SelfCalls<'_, D> {
    fn dispatch(&mut self, call: &Call, now: ChainTime) -> Result<Vec<u8>, String> {
        if call.target != self.governor {
            return self.inner.dispatch(call, now);
        }
        self.apply(call).map(|()| Vec::new()).map_err(|e| e.to_string())
    }
}
