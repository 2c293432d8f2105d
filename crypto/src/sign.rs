//! Ed25519 message signing, verification and signer recovery.

use crate::address::derive_address;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use tally_types::{Address, PrivateKey, PublicKey, Signature, SignatureProof, SignatureVerifier};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Uses strict verification, so non-canonical signatures and small-order keys
/// are rejected (malleability protection).
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify_strict(message, &dalek_sig).is_ok()
}

/// [`SignatureVerifier`] backed by Ed25519.
///
/// The signer is the address derived from the proof's public key, returned
/// only when the signature over the digest verifies.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn recover(&self, digest: &[u8; 32], proof: &SignatureProof) -> Option<Address> {
        verify_signature(digest, &proof.signature, &proof.public_key)
            .then(|| derive_address(&proof.public_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    #[test]
    fn sign_and_verify() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let msg = b"test message for tally";
        let sig = sign_message(msg, &kp.private);
        assert!(verify_signature(msg, &sig, &kp.public));
    }

    #[test]
    fn wrong_message_fails() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let sig = sign_message(b"correct message", &kp.private);
        assert!(!verify_signature(b"wrong message", &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = keypair_from_seed(&[1u8; 32]);
        let kp2 = keypair_from_seed(&[2u8; 32]);
        let sig = sign_message(b"test", &kp1.private);
        assert!(!verify_signature(b"test", &sig, &kp2.public));
    }

    #[test]
    fn invalid_public_key() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let sig = sign_message(b"test", &kp.private);
        assert!(!verify_signature(b"test", &sig, &PublicKey([0xFF; 32])));
    }

    #[test]
    fn verifier_recovers_derived_address() {
        let kp = keypair_from_seed(&[9u8; 32]);
        let digest = crate::blake2b_256(b"payload");
        let proof = SignatureProof {
            public_key: kp.public,
            signature: sign_message(&digest, &kp.private),
        };
        assert_eq!(
            Ed25519Verifier.recover(&digest, &proof),
            Some(derive_address(&kp.public))
        );
        let other = crate::blake2b_256(b"other payload");
        assert_eq!(Ed25519Verifier.recover(&other, &proof), None);
    }
}
