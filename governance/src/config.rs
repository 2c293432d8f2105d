//! Governor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tally_crypto::parse_address;
use tally_timelock::{GRACE_PERIOD_SECS, MAXIMUM_DELAY_SECS, MINIMUM_DELAY_SECS};
use tally_types::{Address, NetworkId};
use tally_utils::LogFormat;

use crate::error::GovernanceError;
use crate::params::{GovernorParams, LiveProposalPolicy};

/// Configuration for a governor and its timelock.
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`]
/// or built programmatically (e.g. for tests). Loading validates every
/// bound; a programmatically built config should be checked with
/// [`GovernanceConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Network whose chain id is bound into signed ballots.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Indices between proposal creation and the start of voting.
    #[serde(default = "default_voting_delay")]
    pub voting_delay: u64,

    /// Indices voting stays open.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,

    #[serde(default = "default_proposal_threshold_bps")]
    pub proposal_threshold_bps: u32,

    #[serde(default = "default_quorum_votes_bps")]
    pub quorum_votes_bps: u32,

    #[serde(default = "default_proposal_max_operations")]
    pub proposal_max_operations: usize,

    #[serde(default)]
    pub live_proposal_policy: LiveProposalPolicy,

    /// Minimum seconds between queueing and execution.
    #[serde(default = "default_timelock_delay_secs")]
    pub timelock_delay_secs: u64,

    /// Seconds after eta during which a queued action may still run.
    /// Fixed at 14 days; any other value is rejected.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Governor admin in text form. Defaults to the timelock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,

    /// Identity allowed to veto. None means veto is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vetoer: Option<String>,

    /// Log output format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_voting_delay() -> u64 {
    GovernorParams::default().voting_delay
}

fn default_voting_period() -> u64 {
    GovernorParams::default().voting_period
}

fn default_proposal_threshold_bps() -> u32 {
    GovernorParams::default().proposal_threshold_bps
}

fn default_quorum_votes_bps() -> u32 {
    GovernorParams::default().quorum_votes_bps
}

fn default_proposal_max_operations() -> usize {
    GovernorParams::default().proposal_max_operations
}

fn default_timelock_delay_secs() -> u64 {
    MINIMUM_DELAY_SECS
}

fn default_grace_period_secs() -> u64 {
    GRACE_PERIOD_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Install the global tracing subscriber described by `log_format` and
    /// `log_level`.
    pub fn init_logging(&self) -> Result<(), GovernanceError> {
        tally_utils::init_logging(self.log_format, &self.log_level)
            .map_err(|e| GovernanceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    pub fn params(&self) -> GovernorParams {
        GovernorParams {
            voting_delay: self.voting_delay,
            voting_period: self.voting_period,
            proposal_threshold_bps: self.proposal_threshold_bps,
            quorum_votes_bps: self.quorum_votes_bps,
            proposal_max_operations: self.proposal_max_operations,
            live_proposal_policy: self.live_proposal_policy,
        }
    }

    pub fn admin_address(&self) -> Result<Option<Address>, GovernanceError> {
        parse_optional("admin", self.admin.as_deref())
    }

    pub fn vetoer_address(&self) -> Result<Option<Address>, GovernanceError> {
        parse_optional("vetoer", self.vetoer.as_deref())
    }

    /// Check every bound. Violations surface as `GovernanceError::Config`.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        self.params()
            .validate()
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        if !(MINIMUM_DELAY_SECS..=MAXIMUM_DELAY_SECS).contains(&self.timelock_delay_secs) {
            return Err(GovernanceError::Config(format!(
                "timelock_delay_secs = {} outside [{}, {}]",
                self.timelock_delay_secs, MINIMUM_DELAY_SECS, MAXIMUM_DELAY_SECS
            )));
        }
        if self.grace_period_secs != GRACE_PERIOD_SECS {
            return Err(GovernanceError::Config(format!(
                "grace_period_secs = {} but the grace period is fixed at {}",
                self.grace_period_secs, GRACE_PERIOD_SECS
            )));
        }
        self.admin_address()?;
        self.vetoer_address()?;
        Ok(())
    }
}

fn parse_optional(field: &str, text: Option<&str>) -> Result<Option<Address>, GovernanceError> {
    text.map(|t| {
        parse_address(t)
            .filter(|a| !a.is_zero())
            .ok_or_else(|| GovernanceError::Config(format!("{field}: invalid address {t:?}")))
    })
    .transpose()
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        let params = GovernorParams::default();
        Self {
            network: default_network(),
            voting_delay: params.voting_delay,
            voting_period: params.voting_period,
            proposal_threshold_bps: params.proposal_threshold_bps,
            quorum_votes_bps: params.quorum_votes_bps,
            proposal_max_operations: params.proposal_max_operations,
            live_proposal_policy: params.live_proposal_policy,
            timelock_delay_secs: default_timelock_delay_secs(),
            grace_period_secs: default_grace_period_secs(),
            admin: None,
            vetoer: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
