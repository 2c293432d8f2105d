//! Cryptographic primitives for tally.
//!
//! - **Ed25519** for signing and signature verification
//! - **Blake2b** for hashing (address derivation, typed-message digests, content hashes)
//! - Address derivation and the checksummed `tly_` text form
//! - Domain-separated digests for detached authorisations

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod typed;

pub use address::{derive_address, encode_address, parse_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature, Ed25519Verifier};
pub use typed::{Domain, TypedMessage};
