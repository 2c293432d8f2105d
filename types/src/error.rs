//! Errors raised by the shared types themselves.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TallyError {
    #[error("vote count {0} exceeds the 96-bit range")]
    VotesOutOfRange(u128),

    #[error("calldata for {signature}: expected {expected} bytes, got {actual}")]
    CalldataLength {
        signature: String,
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_clone_into_wrapping_enums() {
        let err = TallyError::CalldataLength {
            signature: "setDelay(uint256)".to_string(),
            expected: 8,
            actual: 3,
        };
        let copy = err.clone();
        assert_eq!(copy, err);
        assert_eq!(
            copy.to_string(),
            "calldata for setDelay(uint256): expected 8 bytes, got 3"
        );
    }
}
