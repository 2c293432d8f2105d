//! Nullable signature verifier.
//!
//! A proof is "valid" when the first half of the signature repeats the digest;
//! the signer is the address spelled by the public key bytes. This lets tests
//! sign on behalf of any address without key material.

use tally_types::{Address, PublicKey, Signature, SignatureProof, SignatureVerifier};

#[derive(Clone, Copy, Debug, Default)]
pub struct NullVerifier;

impl NullVerifier {
    /// A proof that `signer` authorised `digest`.
    pub fn sign(signer: &Address, digest: &[u8; 32]) -> SignatureProof {
        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(digest);
        SignatureProof {
            public_key: PublicKey(*signer.as_bytes()),
            signature: Signature(sig),
        }
    }
}

impl SignatureVerifier for NullVerifier {
    fn recover(&self, digest: &[u8; 32], proof: &SignatureProof) -> Option<Address> {
        (proof.signature.0[..32] == digest[..]).then(|| Address::new(proof.public_key.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_the_named_signer() {
        let signer = Address::repeat(4);
        let proof = NullVerifier::sign(&signer, &[9u8; 32]);
        assert_eq!(NullVerifier.recover(&[9u8; 32], &proof), Some(signer));
        assert_eq!(NullVerifier.recover(&[8u8; 32], &proof), None);
    }
}
