//! Detached, replay-protected delegations.
//!
//! A holder signs a [`DelegationMessage`] off-line; anyone may submit it.
//! The verifier checks, in order, that the signature authenticates a
//! non-null signer, that the nonce is the signer's next one, and that the
//! authorisation has not expired. The nonce is consumed only once the
//! delegation itself succeeds, so a rejected submission can be retried.

use crate::error::LedgerError;
use crate::registry::DelegationRegistry;
use crate::source::{PowerSource, Subject};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_crypto::{Domain, TypedMessage};
use tally_types::{Address, ChainTime, SignatureProof, SignatureVerifier, Timestamp};
use tracing::{info, warn};

/// The signed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationMessage {
    pub delegatee: Address,
    pub subject: Subject,
    pub nonce: u64,
    pub expiry: Timestamp,
}

impl TypedMessage for DelegationMessage {
    const TYPE_TAG: &'static [u8] =
        b"Delegation(address delegatee,bytes subject,uint256 nonce,uint256 expiry)";

    fn encode_fields(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 9 + 16);
        out.extend_from_slice(self.delegatee.as_bytes());
        match &self.subject {
            Subject::Unit(unit) => {
                out.push(0x00);
                out.extend_from_slice(&unit.0.to_be_bytes());
            }
            Subject::Units(units) => {
                out.push(0x01);
                out.extend_from_slice(&(units.len() as u64).to_be_bytes());
                for unit in units {
                    out.extend_from_slice(&unit.0.to_be_bytes());
                }
            }
            Subject::Balance => out.push(0x02),
        }
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.expiry.as_secs().to_be_bytes());
        out
    }
}

/// A delegation message plus the holder's signature over its digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    pub delegatee: Address,
    pub subject: Subject,
    pub nonce: u64,
    pub expiry: Timestamp,
    pub proof: SignatureProof,
}

impl SignedDelegation {
    pub fn message(&self) -> DelegationMessage {
        DelegationMessage {
            delegatee: self.delegatee,
            subject: self.subject.clone(),
            nonce: self.nonce,
            expiry: self.expiry,
        }
    }
}

/// Next expected nonce per signer. Persist it with the ledger: losing it
/// re-opens every consumed authorisation to replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceTable(HashMap<Address, u64>);

impl NonceTable {
    pub fn get(&self, account: &Address) -> u64 {
        self.0.get(account).copied().unwrap_or(0)
    }

    fn advance(&mut self, account: Address, used: u64) {
        self.0.insert(account, used + 1);
    }
}

#[derive(Clone, Debug)]
pub struct DelegationVerifier<V> {
    domain: Domain,
    verifier: V,
    nonces: NonceTable,
}

impl<V: SignatureVerifier> DelegationVerifier<V> {
    pub fn new(domain: Domain, verifier: V) -> Self {
        Self::with_nonces(domain, verifier, NonceTable::default())
    }

    /// Resume with a previously saved nonce table.
    pub fn with_nonces(domain: Domain, verifier: V, nonces: NonceTable) -> Self {
        Self {
            domain,
            verifier,
            nonces,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The next nonce `account` must sign with.
    pub fn nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account)
    }

    pub fn nonces(&self) -> &NonceTable {
        &self.nonces
    }

    /// Verify `request` and apply it to `registry` on the signer's behalf.
    /// Returns the signer.
    pub fn delegate_by_sig<S: PowerSource>(
        &mut self,
        registry: &mut DelegationRegistry<S>,
        request: &SignedDelegation,
        now: ChainTime,
    ) -> Result<Address, LedgerError> {
        let digest = request.message().digest(&self.domain);
        let signer = match self.verifier.recover(&digest, &request.proof) {
            Some(signer) if !signer.is_zero() => signer,
            _ => {
                warn!(delegatee = %request.delegatee, "delegation signature rejected");
                return Err(LedgerError::InvalidSignature);
            }
        };

        let expected = self.nonce(&signer);
        if request.nonce != expected {
            return Err(LedgerError::InvalidNonce {
                expected,
                got: request.nonce,
            });
        }
        if now.timestamp > request.expiry {
            return Err(LedgerError::SignatureExpired {
                expiry: request.expiry,
                now: now.timestamp,
            });
        }

        registry.delegate(&request.subject, &signer, &request.delegatee, now)?;
        self.nonces.advance(signer, expected);
        info!(account = %signer, nonce = expected, "signed delegation accepted");
        Ok(signer)
    }
}
