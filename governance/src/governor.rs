//! The governance state machine.
//!
//! A proposal moves Pending → Active → (Defeated | Succeeded → Queued →
//! (Executed | Expired)), and may be diverted to Canceled or Vetoed from any
//! live state. Voting power always comes from the checkpoint ledger at the
//! proposal's start index, so power acquired after voting opens never
//! counts.
//!
//! The governor owns its timelock: it is the timelock's admin, and the
//! timelock is (by default) the governor's admin, so parameter and admin
//! changes have to pass a proposal and the execution delay.

use serde::{Deserialize, Serialize};
use tally_crypto::{Domain, TypedMessage};
use tally_ledger::VotingPower;
use tally_timelock::{Call, CallDispatcher, Timelock, TimelockError, GRACE_PERIOD_SECS};
use tally_types::{
    Address, ChainTime, NetworkId, SignatureProof, SignatureVerifier, Timestamp, Votes,
};
use tally_utils::format_duration;
use tracing::{debug, info, warn};

use crate::admin::{set_param, Roles, SelfCalls};
use crate::ballot::Ballot;
use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::params::{GovernableParam, GovernorParams, LiveProposalPolicy};
use crate::proposal::{Proposal, ProposalState, Receipt, Support};
use crate::store::ProposalStore;

/// Name bound into the signed-ballot domain.
pub const GOVERNOR_NAME: &str = "Tally Governor";

/// Actions and description of a proposal being submitted.
///
/// The four action lists are parallel: entry `i` of each describes action `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProposalDraft {
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub signatures: Vec<String>,
    pub calldatas: Vec<Vec<u8>>,
    pub description: String,
}

impl ProposalDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Append one action.
    pub fn action(mut self, target: Address, value: u128, signature: &str, calldata: Vec<u8>) -> Self {
        self.targets.push(target);
        self.values.push(value);
        self.signatures.push(signature.to_string());
        self.calldatas.push(calldata);
        self
    }

    fn into_calls(self, max_operations: usize) -> Result<(Vec<Call>, String), GovernanceError> {
        let n = self.targets.len();
        if self.values.len() != n || self.signatures.len() != n || self.calldatas.len() != n {
            return Err(GovernanceError::MalformedProposal(
                "proposal function information arity mismatch",
            ));
        }
        if n == 0 {
            return Err(GovernanceError::MalformedProposal("must provide actions"));
        }
        if n > max_operations {
            return Err(GovernanceError::MalformedProposal("too many actions"));
        }
        let calls = self
            .targets
            .into_iter()
            .zip(self.values)
            .zip(self.signatures)
            .zip(self.calldatas)
            .map(|(((target, value), signature), data)| Call {
                target,
                value,
                signature,
                data,
            })
            .collect();
        Ok((calls, self.description))
    }
}

/// Everything a governor holds except its signature verifier.
///
/// Produced by [`Governor::export_state`] and accepted by
/// [`Governor::from_state`]; `save_state` / `load_state` wrap both in
/// `bincode`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernorState {
    pub address: Address,
    pub network: NetworkId,
    pub params: GovernorParams,
    pub roles: Roles,
    pub timelock: Timelock,
    pub store: ProposalStore,
}

pub struct Governor<V> {
    address: Address,
    network: NetworkId,
    domain: Domain,
    verifier: V,
    params: GovernorParams,
    roles: Roles,
    timelock: Timelock,
    store: ProposalStore,
}

impl<V: SignatureVerifier> Governor<V> {
    /// A governor at `address` with a fresh timelock at `timelock_address`.
    ///
    /// The governor administers the timelock. The governor's own admin is
    /// the configured one, or the timelock if none is configured.
    pub fn new(
        address: Address,
        timelock_address: Address,
        config: &GovernanceConfig,
        verifier: V,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;
        let timelock = Timelock::new(timelock_address, address, config.timelock_delay_secs)?
            .with_grace_period(config.grace_period_secs);
        let roles = Roles {
            admin: config.admin_address()?.unwrap_or(timelock_address),
            pending_admin: None,
            vetoer: config.vetoer_address()?,
        };
        info!(
            governor = %address,
            timelock = %timelock_address,
            admin = %roles.admin,
            network = %config.network,
            timelock_delay = %format_duration(config.timelock_delay_secs),
            "governor initialized"
        );
        Ok(Self {
            address,
            network: config.network,
            domain: Domain::new(GOVERNOR_NAME, "1", config.network, address),
            verifier,
            params: config.params(),
            roles,
            timelock,
            store: ProposalStore::new(),
        })
    }

    /// Rebuild a governor from exported state.
    ///
    /// Parameters are re-checked against their bounds, and the timelock
    /// must still be administered by this governor with the fixed grace
    /// period.
    pub fn from_state(state: GovernorState, verifier: V) -> Result<Self, GovernanceError> {
        state.params.validate()?;
        if *state.timelock.admin() != state.address {
            return Err(GovernanceError::Config(format!(
                "timelock admin {} is not the governor {}",
                state.timelock.admin(),
                state.address
            )));
        }
        if state.timelock.grace_period() != GRACE_PERIOD_SECS {
            return Err(GovernanceError::Config(format!(
                "timelock grace period {} but the grace period is fixed at {}",
                state.timelock.grace_period(),
                GRACE_PERIOD_SECS
            )));
        }
        info!(
            governor = %state.address,
            proposals = state.store.proposal_count(),
            queued = state.timelock.queued_count(),
            "governor restored"
        );
        Ok(Self {
            address: state.address,
            network: state.network,
            domain: Domain::new(GOVERNOR_NAME, "1", state.network, state.address),
            verifier,
            params: state.params,
            roles: state.roles,
            timelock: state.timelock,
            store: state.store,
        })
    }

    pub fn export_state(&self) -> GovernorState {
        GovernorState {
            address: self.address,
            network: self.network,
            params: self.params.clone(),
            roles: self.roles.clone(),
            timelock: self.timelock.clone(),
            store: self.store.clone(),
        }
    }

    /// Serialize everything but the verifier (bincode).
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(&self.export_state())
            .map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    /// Restore a governor from [`Self::save_state`] bytes.
    pub fn load_state(bytes: &[u8], verifier: V) -> Result<Self, GovernanceError> {
        let state: GovernorState =
            bincode::deserialize(bytes).map_err(|e| GovernanceError::Serialization(e.to_string()))?;
        Self::from_state(state, verifier)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn params(&self) -> &GovernorParams {
        &self.params
    }

    pub fn admin(&self) -> &Address {
        &self.roles.admin
    }

    pub fn pending_admin(&self) -> Option<&Address> {
        self.roles.pending_admin.as_ref()
    }

    pub fn vetoer(&self) -> Option<&Address> {
        self.roles.vetoer.as_ref()
    }

    pub fn timelock(&self) -> &Timelock {
        &self.timelock
    }

    pub fn store(&self) -> &ProposalStore {
        &self.store
    }

    pub fn proposal(&self, id: u64) -> Result<&Proposal, GovernanceError> {
        self.store.get(id)
    }

    pub fn proposal_count(&self) -> u64 {
        self.store.proposal_count()
    }

    pub fn actions(&self, id: u64) -> Result<&[Call], GovernanceError> {
        Ok(&self.store.get(id)?.actions)
    }

    pub fn receipt(&self, id: u64, voter: &Address) -> Option<&Receipt> {
        self.store.receipt(id, voter)
    }

    pub fn latest_proposal_id(&self, proposer: &Address) -> Option<u64> {
        self.store.latest_proposal_id(proposer)
    }

    pub fn state(&self, id: u64, now: ChainTime) -> Result<ProposalState, GovernanceError> {
        Ok(self.store.get(id)?.state(now, self.timelock.grace_period()))
    }

    /// Votes needed to propose, as a fraction of current supply.
    pub fn proposal_threshold(&self, power: &dyn VotingPower) -> Result<Votes, GovernanceError> {
        Ok(power.total_supply()?.bps(self.params.proposal_threshold_bps))
    }

    /// For-votes needed for a proposal created now to pass.
    pub fn quorum_votes(&self, power: &dyn VotingPower) -> Result<Votes, GovernanceError> {
        Ok(power.total_supply()?.bps(self.params.quorum_votes_bps))
    }

    /// Digest a holder signs to vote without submitting the vote themselves.
    pub fn ballot_digest(&self, proposal_id: u64, support: Support) -> [u8; 32] {
        Ballot {
            proposal_id,
            support,
        }
        .digest(&self.domain)
    }

    // ── Proposals ──────────────────────────────────────────────────────

    pub fn propose(
        &mut self,
        power: &dyn VotingPower,
        proposer: &Address,
        draft: ProposalDraft,
        now: ChainTime,
    ) -> Result<u64, GovernanceError> {
        let threshold = self.proposal_threshold(power)?;
        let votes = power.current_votes(proposer)?;
        if votes < threshold && *proposer != self.roles.admin {
            return Err(GovernanceError::BelowThreshold { votes, threshold });
        }
        let (actions, description) = draft.into_calls(self.params.proposal_max_operations)?;
        self.check_live_proposal(proposer, now)?;

        let id = self.store.next_id();
        let start_index = now
            .index
            .checked_add(self.params.voting_delay)
            .ok_or(GovernanceError::Overflow(id))?;
        let end_index = start_index
            .checked_add(self.params.voting_period)
            .ok_or(GovernanceError::Overflow(id))?;
        let quorum_votes = self.quorum_votes(power)?;

        self.store.insert(Proposal {
            id,
            proposer: *proposer,
            actions,
            description,
            created_at_index: now.index,
            start_index,
            end_index,
            eta: None,
            for_votes: Votes::ZERO,
            against_votes: Votes::ZERO,
            abstain_votes: Votes::ZERO,
            canceled: false,
            vetoed: false,
            executed: false,
            proposal_threshold: threshold,
            quorum_votes,
        });
        info!(
            proposal_id = id,
            account = %proposer,
            start_index,
            end_index,
            quorum = quorum_votes.raw(),
            "proposal created"
        );
        Ok(id)
    }

    fn check_live_proposal(&self, proposer: &Address, now: ChainTime) -> Result<(), GovernanceError> {
        let Some(live) = self.store.latest_proposal_id(proposer) else {
            return Ok(());
        };
        let state = self.state(live, now)?;
        let blocked = match self.params.live_proposal_policy {
            LiveProposalPolicy::OnePendingOrActive => {
                matches!(state, ProposalState::Pending | ProposalState::Active)
            }
            LiveProposalPolicy::OneNonTerminal => !state.is_terminal(),
            LiveProposalPolicy::Unlimited => false,
        };
        if blocked {
            return Err(GovernanceError::OneLivePerProposer {
                proposer: *proposer,
                live,
            });
        }
        Ok(())
    }

    // ── Voting ─────────────────────────────────────────────────────────

    /// Cast `voter`'s vote with the weight it held at the proposal's start.
    pub fn cast_vote(
        &mut self,
        power: &dyn VotingPower,
        id: u64,
        voter: &Address,
        support: Support,
        now: ChainTime,
    ) -> Result<Votes, GovernanceError> {
        self.record_vote(power, id, voter, support, now)
    }

    /// As [`Self::cast_vote`]; the reason is logged, not stored.
    pub fn cast_vote_with_reason(
        &mut self,
        power: &dyn VotingPower,
        id: u64,
        voter: &Address,
        support: Support,
        reason: &str,
        now: ChainTime,
    ) -> Result<Votes, GovernanceError> {
        let votes = self.record_vote(power, id, voter, support, now)?;
        info!(proposal_id = id, account = %voter, ?support, reason, "vote reason");
        Ok(votes)
    }

    /// Cast a vote authorised by the voter's signature over the ballot
    /// digest. Returns the signer.
    pub fn cast_vote_by_sig(
        &mut self,
        power: &dyn VotingPower,
        id: u64,
        support: Support,
        proof: &SignatureProof,
        now: ChainTime,
    ) -> Result<Address, GovernanceError> {
        let digest = self.ballot_digest(id, support);
        let voter = match self.verifier.recover(&digest, proof) {
            Some(signer) if !signer.is_zero() => signer,
            _ => return Err(GovernanceError::InvalidSignature),
        };
        self.record_vote(power, id, &voter, support, now)?;
        Ok(voter)
    }

    fn record_vote(
        &mut self,
        power: &dyn VotingPower,
        id: u64,
        voter: &Address,
        support: Support,
        now: ChainTime,
    ) -> Result<Votes, GovernanceError> {
        let state = self.state(id, now)?;
        if state != ProposalState::Active {
            return Err(GovernanceError::VotingClosed { id, state });
        }
        if self.store.receipt(id, voter).is_some_and(|r| r.has_voted) {
            return Err(GovernanceError::AlreadyVoted { id, voter: *voter });
        }

        let proposal = self.store.get_mut(id)?;
        let votes = power.prior_votes(voter, proposal.start_index, now)?;
        let tally = proposal.tally_mut(support);
        *tally = tally.checked_add(votes).ok_or(GovernanceError::Overflow(id))?;

        self.store.record_receipt(
            id,
            *voter,
            Receipt {
                has_voted: true,
                support,
                votes,
            },
        );
        debug!(proposal_id = id, account = %voter, ?support, votes = votes.raw(), "vote cast");
        Ok(votes)
    }

    // ── Queue / execute ────────────────────────────────────────────────

    /// Queue every action of a succeeded proposal in the timelock.
    /// Either all actions are queued or none is.
    pub fn queue(&mut self, id: u64, now: ChainTime) -> Result<Timestamp, GovernanceError> {
        let state = self.state(id, now)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::NotSucceeded { id, state });
        }
        let eta = self.timelock.earliest_eta(now)?;
        let mut staged = self.timelock.clone();
        for tx in self.store.get(id)?.transactions(eta) {
            let hash = tx.hash();
            if staged.is_queued(&hash) {
                return Err(GovernanceError::AlreadyQueued(hash));
            }
            staged.queue_transaction(&self.address, tx, now)?;
        }

        self.timelock = staged;
        self.store.get_mut(id)?.eta = Some(eta);
        info!(
            proposal_id = id,
            %eta,
            delay = %format_duration(now.timestamp.elapsed_since(eta)),
            "proposal queued"
        );
        Ok(eta)
    }

    /// Run every queued action of a proposal, all or nothing.
    ///
    /// Actions run against staged copies of the timelock, the governor's
    /// parameters and roles, and `dispatcher`; the copies replace the
    /// originals only if every action succeeded. On failure the proposal
    /// stays queued and may be retried within the grace window.
    pub fn execute<D: CallDispatcher + Clone>(
        &mut self,
        id: u64,
        dispatcher: &mut D,
        now: ChainTime,
    ) -> Result<(), GovernanceError> {
        let state = self.state(id, now)?;
        let proposal = self.store.get(id)?;
        let eta = match (state, proposal.eta) {
            (ProposalState::Queued, Some(eta)) => eta,
            (ProposalState::Expired, Some(eta)) => {
                let expired_at = eta
                    .checked_add_secs(self.timelock.grace_period())
                    .ok_or(TimelockError::Overflow)?;
                return Err(TimelockError::StaleTransaction {
                    expired_at,
                    now: now.timestamp,
                }
                .into());
            }
            _ => return Err(GovernanceError::NotQueued { id, state }),
        };

        let mut timelock = self.timelock.clone();
        let mut params = self.params.clone();
        let mut roles = self.roles.clone();
        let mut outer = dispatcher.clone();
        let timelock_address = *timelock.address();

        for (index, tx) in proposal.transactions(eta).enumerate() {
            let mut calls = SelfCalls {
                governor: self.address,
                caller: timelock_address,
                params: &mut params,
                roles: &mut roles,
                inner: &mut outer,
            };
            timelock
                .execute_transaction(&self.address, &tx, now, &mut calls)
                .map_err(|e| match e {
                    TimelockError::CallReverted { target, reason } => {
                        warn!(proposal_id = id, index, %target, %reason, "proposal action reverted");
                        GovernanceError::ActionReverted {
                            id,
                            index,
                            target,
                            reason,
                        }
                    }
                    other => GovernanceError::Timelock(other),
                })?;
        }

        self.timelock = timelock;
        self.params = params;
        self.roles = roles;
        *dispatcher = outer;
        self.store.get_mut(id)?.executed = true;
        info!(proposal_id = id, "proposal executed");
        Ok(())
    }

    // ── Cancel / veto ──────────────────────────────────────────────────

    /// Cancel a live proposal.
    ///
    /// Allowed for the proposer, the admin, or anyone once the proposer's
    /// current votes have fallen below the threshold recorded at creation.
    pub fn cancel(
        &mut self,
        power: &dyn VotingPower,
        id: u64,
        caller: &Address,
        now: ChainTime,
    ) -> Result<(), GovernanceError> {
        let state = self.state(id, now)?;
        if state.is_terminal() {
            return Err(GovernanceError::AlreadyTerminal { id, state });
        }
        let proposal = self.store.get(id)?;
        let authorized = *caller == proposal.proposer
            || *caller == self.roles.admin
            || power.current_votes(&proposal.proposer)? < proposal.proposal_threshold;
        if !authorized {
            return Err(GovernanceError::NotAuthorized {
                caller: *caller,
                action: "cancel",
            });
        }

        self.dequeue(id)?;
        self.store.get_mut(id)?.canceled = true;
        info!(proposal_id = id, account = %caller, "proposal canceled");
        Ok(())
    }

    /// Veto a live proposal. Vetoer only.
    pub fn veto(&mut self, id: u64, caller: &Address, now: ChainTime) -> Result<(), GovernanceError> {
        self.roles.check_veto(caller)?;
        let state = self.state(id, now)?;
        if state.is_terminal() {
            return Err(GovernanceError::AlreadyTerminal { id, state });
        }

        self.dequeue(id)?;
        self.store.get_mut(id)?.vetoed = true;
        info!(proposal_id = id, account = %caller, "proposal vetoed");
        Ok(())
    }

    /// Remove a proposal's queued actions from the timelock, all or none.
    fn dequeue(&mut self, id: u64) -> Result<(), GovernanceError> {
        let proposal = self.store.get(id)?;
        let Some(eta) = proposal.eta else {
            return Ok(());
        };
        let mut staged = self.timelock.clone();
        for tx in proposal.transactions(eta) {
            staged.cancel_transaction(&self.address, &tx)?;
        }
        self.timelock = staged;
        Ok(())
    }

    // ── Administration ─────────────────────────────────────────────────

    pub fn set_pending_admin(&mut self, caller: &Address, pending: Address) -> Result<(), GovernanceError> {
        self.roles.set_pending_admin(caller, pending)
    }

    pub fn accept_admin(&mut self, caller: &Address) -> Result<(), GovernanceError> {
        self.roles.accept_admin(caller)
    }

    pub fn set_vetoer(&mut self, caller: &Address, vetoer: Address) -> Result<(), GovernanceError> {
        self.roles.set_vetoer(caller, vetoer)
    }

    /// Permanently disable veto.
    pub fn burn_veto_power(&mut self, caller: &Address) -> Result<(), GovernanceError> {
        self.roles.burn_veto_power(caller)
    }

    pub fn set_voting_delay(&mut self, caller: &Address, value: u64) -> Result<(), GovernanceError> {
        set_param(&self.roles, &mut self.params, caller, GovernableParam::VotingDelay, value)
    }

    pub fn set_voting_period(&mut self, caller: &Address, value: u64) -> Result<(), GovernanceError> {
        set_param(&self.roles, &mut self.params, caller, GovernableParam::VotingPeriod, value)
    }

    pub fn set_proposal_threshold_bps(&mut self, caller: &Address, bps: u32) -> Result<(), GovernanceError> {
        set_param(
            &self.roles,
            &mut self.params,
            caller,
            GovernableParam::ProposalThresholdBps,
            u64::from(bps),
        )
    }

    pub fn set_quorum_votes_bps(&mut self, caller: &Address, bps: u32) -> Result<(), GovernanceError> {
        set_param(
            &self.roles,
            &mut self.params,
            caller,
            GovernableParam::QuorumVotesBps,
            u64::from(bps),
        )
    }
}
