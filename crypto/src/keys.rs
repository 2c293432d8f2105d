//! Ed25519 key generation.

use ed25519_dalek::SigningKey;
use tally_types::{KeyPair, PrivateKey, PublicKey};

/// Generate a new Ed25519 key pair from the operating system's entropy source.
///
/// Returns `None` if the entropy source is unavailable.
pub fn generate_keypair() -> Option<KeyPair> {
    let mut seed = [0u8; 32];
    getrandom::getrandom(&mut seed).ok()?;
    let kp = keypair_from_seed(&seed);
    seed.fill(0);
    Some(kp)
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}
