//! Fundamental types for the tally governance stack.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, vote amounts, asset units, clock readings, signing material,
//! and the signature-recovery capability the core calls into.

pub mod address;
pub mod auth;
pub mod calldata;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;
pub mod unit;
pub mod votes;

pub use address::Address;
pub use auth::{SignatureProof, SignatureVerifier};
pub use error::TallyError;
pub use hash::TxHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::{ChainTime, Timestamp};
pub use unit::UnitId;
pub use votes::Votes;
