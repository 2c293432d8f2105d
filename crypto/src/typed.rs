//! Domain-separated digests for detached authorisations.
//!
//! A signature over a typed message is only valid for one domain: the signing
//! component's name and version, the network's chain id and the address of
//! the verifying component. The digest is
//!
//! ```text
//! Blake2b-256("tally/typed/v1" || domain_separator || Blake2b-256(type_tag) || fields)
//! ```

use crate::{blake2b_256, blake2b_256_multi};
use tally_types::{Address, NetworkId};

const TYPED_PREFIX: &[u8] = b"tally/typed/v1";

/// The domain a typed message is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        network: NetworkId,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id: network.chain_id(),
            verifying_contract,
        }
    }

    /// Hash identifying this domain.
    pub fn separator(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            &blake2b_256(self.name.as_bytes()),
            &blake2b_256(self.version.as_bytes()),
            &self.chain_id.to_be_bytes(),
            self.verifying_contract.as_bytes(),
        ])
    }
}

/// A message that can be signed under a [`Domain`].
pub trait TypedMessage {
    /// Name and field list of the message type, e.g. `b"Ballot(uint256 proposalId,uint8 support)"`.
    const TYPE_TAG: &'static [u8];

    /// Fixed-width big-endian encoding of the message fields, in declaration order.
    fn encode_fields(&self) -> Vec<u8>;

    fn digest(&self, domain: &Domain) -> [u8; 32] {
        blake2b_256_multi(&[
            TYPED_PREFIX,
            &domain.separator(),
            &blake2b_256(Self::TYPE_TAG),
            &self.encode_fields(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping(u64);

    impl TypedMessage for Ping {
        const TYPE_TAG: &'static [u8] = b"Ping(uint64 n)";

        fn encode_fields(&self) -> Vec<u8> {
            self.0.to_be_bytes().to_vec()
        }
    }

    fn domain(network: NetworkId) -> Domain {
        Domain::new("Test", "1", network, Address::repeat(1))
    }

    #[test]
    fn digest_depends_on_domain() {
        let live = Ping(1).digest(&domain(NetworkId::Live));
        let dev = Ping(1).digest(&domain(NetworkId::Dev));
        assert_ne!(live, dev);

        let mut other = domain(NetworkId::Live);
        other.verifying_contract = Address::repeat(2);
        assert_ne!(live, Ping(1).digest(&other));
    }

    #[test]
    fn digest_depends_on_fields() {
        let d = domain(NetworkId::Live);
        assert_ne!(Ping(1).digest(&d), Ping(2).digest(&d));
        assert_eq!(Ping(1).digest(&d), Ping(1).digest(&d));
    }
}
