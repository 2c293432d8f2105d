//! Token-weighted on-chain governance.
//!
//! Proposals carry a list of calls. Holders vote with the power the
//! checkpoint ledger recorded for them at the proposal's start index; a
//! proposal that wins a majority with quorum is queued in a timelock and
//! executed, all actions or none, inside the timelock's grace window.
//!
//! - [`Governor`]: proposal lifecycle, voting, queue/execute, cancel/veto
//! - [`GovernanceConfig`]: TOML-loadable parameters with bounds
//! - [`SharedGovernor`]: single-writer handle for concurrent callers

pub mod admin;
pub mod ballot;
pub mod config;
pub mod error;
pub mod governor;
pub mod params;
pub mod proposal;
pub mod shared;
pub mod store;

pub use admin::{Roles, ACCEPT_ADMIN, SET_PENDING_ADMIN};
pub use ballot::Ballot;
pub use config::GovernanceConfig;
pub use error::GovernanceError;
pub use governor::{Governor, GovernorState, ProposalDraft, GOVERNOR_NAME};
pub use params::{GovernableParam, GovernorParams, LiveProposalPolicy};
pub use proposal::{Proposal, ProposalState, Receipt, Support};
pub use shared::SharedGovernor;
pub use store::ProposalStore;
