//! Content hashes for queued transactions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Blake2b-256 over a queued transaction's target, value, signature,
/// calldata and eta. Identical actions with the same eta share a hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn write_hex(&self, f: &mut fmt::Formatter<'_>, len: usize) -> fmt::Result {
        self.0[..len].iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TxHash(")?;
        self.write_hex(f, 4)?;
        f.write_str("..)")
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_hex(f, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_full_hex_and_debug_is_short() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let hash = TxHash::new(bytes);
        let shown = hash.to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.starts_with("ab00"));
        assert!(shown.ends_with("01"));
        assert_eq!(format!("{hash:?}"), "TxHash(ab000000..)");
    }
}
