//! Network identifier, bound into every signed-message domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which deployment a signed ballot or delegation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Live,
    Test,
    Dev,
}

impl NetworkId {
    /// Chain identifier mixed into signed-message domains, so a signature
    /// produced for one network is never valid on another.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Live => 1,
            Self::Test => 5,
            Self::Dev => 31_337,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        };
        write!(f, "{name} (chain {})", self.chain_id())
    }
}
