//! Signature-recovery capability.
//!
//! The core never hard-codes a curve: anything that must authenticate a signer
//! over a digest goes through [`SignatureVerifier`]. Production code plugs in
//! `tally_crypto::Ed25519Verifier`; tests can plug in a mock signer.

use crate::{Address, PublicKey, Signature};
use serde::{Deserialize, Serialize};

/// A detached signature together with the key that claims to have produced it.
///
/// Ed25519 has no public-key recovery, so the claimed key travels with the
/// signature and the verifier derives the signer's address from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProof {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// Recovers the authenticated signer of a 32-byte digest.
pub trait SignatureVerifier {
    /// Returns the signer's address if `proof` authenticates `digest`,
    /// or `None` if it does not.
    fn recover(&self, digest: &[u8; 32], proof: &SignatureProof) -> Option<Address>;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn recover(&self, digest: &[u8; 32], proof: &SignatureProof) -> Option<Address> {
        (**self).recover(digest, proof)
    }
}
