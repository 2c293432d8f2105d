//! Argument encoding for self-targeted administrative calls.
//!
//! Calls that target the timelock or governor themselves carry their single
//! argument in a fixed layout: a big-endian `u64` (8 bytes) or a raw 32-byte
//! address. Calls to external targets are opaque to the core.

use crate::{Address, TallyError};

pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn encode_u32(value: u32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn encode_address(address: &Address) -> Vec<u8> {
    address.as_bytes().to_vec()
}

pub fn decode_u64(signature: &str, data: &[u8]) -> Result<u64, TallyError> {
    let bytes: [u8; 8] = data.try_into().map_err(|_| length_error(signature, 8, data))?;
    Ok(u64::from_be_bytes(bytes))
}

pub fn decode_u32(signature: &str, data: &[u8]) -> Result<u32, TallyError> {
    let bytes: [u8; 4] = data.try_into().map_err(|_| length_error(signature, 4, data))?;
    Ok(u32::from_be_bytes(bytes))
}

pub fn decode_address(signature: &str, data: &[u8]) -> Result<Address, TallyError> {
    let bytes: [u8; 32] = data
        .try_into()
        .map_err(|_| length_error(signature, 32, data))?;
    Ok(Address::new(bytes))
}

fn length_error(signature: &str, expected: usize, data: &[u8]) -> TallyError {
    TallyError::CalldataLength {
        signature: signature.to_string(),
        expected,
        actual: data.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u64_layout_is_big_endian() {
        assert_eq!(encode_u64(1), vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(decode_u64("setDelay(uint256)", &encode_u64(172_800)), Ok(172_800));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = decode_address("setPendingAdmin(address)", &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            TallyError::CalldataLength {
                signature: "setPendingAdmin(address)".into(),
                expected: 32,
                actual: 3,
            }
        );
    }
}
