//! Account addresses: derivation from public keys and the checksummed text form.
//!
//! Address bytes: Blake2b-256("tally/address" || public_key).
//!
//! Text form: `tly_` + base32(address, 52 chars) + base32(checksum, 8 chars),
//! where checksum = first 5 bytes of Blake2b-256(address bytes).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).
//! Total length: 4 (prefix) + 52 + 8 = 64 characters.

use tally_types::{Address, PublicKey};

const ADDRESS_TAG: &[u8] = b"tally/address";

const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[BASE32_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const PREFIX: &str = "tly_";
const BODY_CHARS: usize = 52;
const CHECKSUM_CHARS: usize = 8;

fn encode_base32(bytes: &[u8]) -> String {
    let mut result = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u64 = 0;
    let mut bits = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            result.push(BASE32_ALPHABET[((buffer >> bits) & 0x1F) as usize] as char);
        }
    }
    if bits > 0 {
        result.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize] as char);
    }
    result
}

/// Decode into exactly `N` bytes; `None` on invalid characters or short input.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        let val = *BASE32_DECODE.get(c as usize)?;
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            if pos < N {
                result[pos] = (buffer >> bits) as u8;
                pos += 1;
            }
        }
    }
    (pos == N).then_some(result)
}

fn checksum(address: &Address) -> [u8; 5] {
    let hash = crate::blake2b_256(address.as_bytes());
    let mut out = [0u8; 5];
    out.copy_from_slice(&hash[..5]);
    out
}

/// Derive the account address controlled by `public_key`.
pub fn derive_address(public_key: &PublicKey) -> Address {
    Address::new(crate::blake2b_256_multi(&[ADDRESS_TAG, public_key.as_bytes()]))
}

/// Render an address in its checksummed text form.
pub fn encode_address(address: &Address) -> String {
    format!(
        "{}{}{}",
        PREFIX,
        encode_base32(address.as_bytes()),
        encode_base32(&checksum(address))
    )
}

/// Parse the checksummed text form. `None` if malformed or the checksum fails.
pub fn parse_address(text: &str) -> Option<Address> {
    let encoded = text.strip_prefix(PREFIX)?;
    if encoded.len() != BODY_CHARS + CHECKSUM_CHARS {
        return None;
    }
    let (body, check) = encoded.split_at(BODY_CHARS);
    let address = Address::new(decode_base32_fixed::<32>(body)?);
    let check: [u8; 5] = decode_base32_fixed(check)?;
    (check == checksum(&address)).then_some(address)
}

/// Whether `text` is a well-formed address with a correct checksum.
pub fn validate_address(text: &str) -> bool {
    parse_address(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    #[test]
    fn text_form_roundtrip() {
        let addr = derive_address(&keypair_from_seed(&[7u8; 32]).public);
        let text = encode_address(&addr);
        assert!(text.starts_with("tly_"));
        assert_eq!(text.len(), 64);
        assert_eq!(parse_address(&text), Some(addr));
    }

    #[test]
    fn derive_is_deterministic_and_not_the_key() {
        let kp = keypair_from_seed(&[7u8; 32]);
        assert_eq!(derive_address(&kp.public), derive_address(&kp.public));
        assert_ne!(derive_address(&kp.public).as_bytes(), kp.public.as_bytes());
    }

    #[test]
    fn invalid_checksum_rejected() {
        let mut bad = encode_address(&Address::repeat(3));
        let last = bad.pop().unwrap();
        bad.push(if last == '1' { '3' } else { '1' });
        assert!(!validate_address(&bad));
    }

    #[test]
    fn wrong_prefix_or_length_rejected() {
        assert!(!validate_address("tly_tooshort"));
        assert!(!validate_address("tly_"));
        let good = encode_address(&Address::repeat(3));
        assert!(!validate_address(&good.replacen("tly_", "xyz_", 1)));
    }

    #[test]
    fn non_ascii_rejected() {
        let mut text = encode_address(&Address::repeat(3));
        text.replace_range(10..11, "é");
        assert!(!validate_address(&text));
    }
}
