//! Deploy header and the [`DeployHash`] it hashes to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bytesrepr::{self, FromBytes, ToBytes};
use crate::crypto::{Digest, PublicKey};
use crate::time::{TimeDiff, Timestamp};

/// The blake2b-256 digest of a deploy's header bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployHash(Digest);

impl DeployHash {
    pub const fn new(digest: Digest) -> Self {
        DeployHash(digest)
    }

    pub fn inner(&self) -> &Digest {
        &self.0
    }
}

impl From<Digest> for DeployHash {
    fn from(digest: Digest) -> Self {
        DeployHash(digest)
    }
}

impl fmt::Display for DeployHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for DeployHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeployHash({})", self.0)
    }
}

impl ToBytes for DeployHash {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for DeployHash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (digest, rem) = Digest::from_bytes(bytes)?;
        Ok((DeployHash(digest), rem))
    }
}

/// Everything a deploy commits to. Its bytes are what the deploy hash covers,
/// and `body_hash` links it to the payment and session code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployHeader {
    account: PublicKey,
    timestamp: Timestamp,
    ttl: TimeDiff,
    gas_price: u64,
    body_hash: Digest,
    dependencies: Vec<DeployHash>,
    chain_name: String,
}

impl DeployHeader {
    pub(crate) fn new(
        account: PublicKey,
        timestamp: Timestamp,
        ttl: TimeDiff,
        gas_price: u64,
        body_hash: Digest,
        dependencies: Vec<DeployHash>,
        chain_name: String,
    ) -> Self {
        DeployHeader {
            account,
            timestamp,
            ttl,
            gas_price,
            body_hash,
            dependencies,
            chain_name,
        }
    }

    pub fn account(&self) -> &PublicKey {
        &self.account
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn ttl(&self) -> TimeDiff {
        self.ttl
    }

    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    pub fn body_hash(&self) -> &Digest {
        &self.body_hash
    }

    /// Deploys that must execute before this one.
    pub fn dependencies(&self) -> &[DeployHash] {
        &self.dependencies
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// The last instant at which a node will still accept the deploy.
    pub fn expires(&self) -> Timestamp {
        self.timestamp.saturating_add(self.ttl)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires() < now
    }
}

impl ToBytes for DeployHeader {
    fn serialized_length(&self) -> usize {
        self.account.serialized_length()
            + self.timestamp.serialized_length()
            + self.ttl.serialized_length()
            + self.gas_price.serialized_length()
            + self.body_hash.serialized_length()
            + self.dependencies.serialized_length()
            + self.chain_name.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.account.write_bytes(writer)?;
        self.timestamp.write_bytes(writer)?;
        self.ttl.write_bytes(writer)?;
        self.gas_price.write_bytes(writer)?;
        self.body_hash.write_bytes(writer)?;
        self.dependencies.write_bytes(writer)?;
        self.chain_name.write_bytes(writer)
    }
}

impl FromBytes for DeployHeader {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (account, rem) = PublicKey::from_bytes(bytes)?;
        let (timestamp, rem) = Timestamp::from_bytes(rem)?;
        let (ttl, rem) = TimeDiff::from_bytes(rem)?;
        let (gas_price, rem) = u64::from_bytes(rem)?;
        let (body_hash, rem) = Digest::from_bytes(rem)?;
        let (dependencies, rem) = Vec::<DeployHash>::from_bytes(rem)?;
        let (chain_name, rem) = String::from_bytes(rem)?;
        let header = DeployHeader {
            account,
            timestamp,
            ttl,
            gas_price,
            body_hash,
            dependencies,
            chain_name,
        };
        Ok((header, rem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Algorithm, KeyPair};

    fn header() -> DeployHeader {
        let key_pair = KeyPair::from_secret_bytes(Algorithm::Ed25519, &[3; 32]).unwrap();
        DeployHeader::new(
            key_pair.public_key().clone(),
            Timestamp::from_millis(1_700_000_000_000),
            TimeDiff::from_minutes(30),
            1,
            Digest::hash(b"body"),
            vec![DeployHash::new(Digest::hash(b"dep"))],
            "casper-test".into(),
        )
    }

    #[test]
    fn header_wire_layout() {
        let header = header();
        let bytes = header.to_bytes().unwrap();
        // 33 key + 3×8 + 32 body hash + 4+32 deps + 4+11 chain name
        assert_eq!(bytes.len(), 33 + 24 + 32 + 36 + 15);
        assert_eq!(bytes.len(), header.serialized_length());
        assert_eq!(&bytes[33..41], &1_700_000_000_000u64.to_le_bytes());
        assert_eq!(&bytes[41..49], &1_800_000u64.to_le_bytes());
        assert_eq!(&bytes[57..89], Digest::hash(b"body").as_bytes());
        assert_eq!(bytesrepr::deserialize::<DeployHeader>(&bytes).unwrap(), header);
    }

    #[test]
    fn header_json_field_names() {
        let json = serde_json::to_value(header()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        let mut expected = vec![
            "account",
            "body_hash",
            "chain_name",
            "dependencies",
            "gas_price",
            "timestamp",
            "ttl",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(json["ttl"], "30m");
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn expiry_is_inclusive() {
        let header = header();
        let expires = header.expires();
        assert_eq!(expires.millis(), 1_700_000_000_000 + 1_800_000);
        assert!(!header.is_expired(expires));
        assert!(header.is_expired(Timestamp::from_millis(expires.millis() + 1)));
    }
}
