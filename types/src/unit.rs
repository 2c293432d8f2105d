//! Identifiers for individually owned asset units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a single unit in a unit-indexed asset collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl UnitId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
