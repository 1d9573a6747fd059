//! # Hashing
//!
//! The network hashes everything with BLAKE2b truncated to 256 bits: deploy
//! body and header hashes, TransactionV1 payload hashes, and account-hash
//! derivation. There is exactly one hash function here on purpose. If you
//! find yourself adding a second one, it belongs to a different protocol.

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::bytesrepr::{self, FromBytes, ToBytes};

type Blake2b256 = Blake2b<U32>;

/// Compute the BLAKE2b-256 digest of `data`.
///
/// # Example
///
/// ```
/// use casper_sdk::crypto::blake2b256;
///
/// let digest = blake2b256(b"casper");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn blake2b256(data: impl AsRef<[u8]>) -> [u8; Digest::LENGTH] {
    let mut output = [0u8; Digest::LENGTH];
    output.copy_from_slice(&Blake2b256::digest(data.as_ref()));
    output
}

/// A 32-byte BLAKE2b-256 digest.
///
/// Hex-encoded (64 characters) in JSON and `Display`; raw 32 bytes on the wire.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; Digest::LENGTH]);

impl Digest {
    /// Digest length in bytes.
    pub const LENGTH: usize = 32;

    /// Hashes `data` into a new digest.
    pub fn hash(data: impl AsRef<[u8]>) -> Self {
        Self(blake2b256(data))
    }

    /// Wraps raw digest bytes without hashing them.
    pub const fn from_raw(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn value(&self) -> [u8; Self::LENGTH] {
        self.0
    }

    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; Self::LENGTH];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; Digest::LENGTH]> for Digest {
    fn from(bytes: [u8; Digest::LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl ToBytes for Digest {
    fn serialized_length(&self) -> usize {
        Self::LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.extend_from_slice(&self.0);
        Ok(())
    }
}

impl FromBytes for Digest {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (raw, rem) = <[u8; Self::LENGTH]>::from_bytes(bytes)?;
        Ok((Self(raw), rem))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_empty_input() {
        // BLAKE2b-256 of the empty string.
        assert_eq!(
            Digest::hash(b"").to_hex(),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(Digest::hash(b"abc"), Digest::hash(b"abc"));
        assert_ne!(Digest::hash(b"abc"), Digest::hash(b"abd"));
    }

    #[test]
    fn hex_roundtrip_and_json() {
        let digest = Digest::hash(b"casper");
        assert_eq!(Digest::from_hex(&digest.to_hex()).unwrap(), digest);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        assert!(Digest::from_hex("abcd").is_err());
    }

    #[test]
    fn raw_bytes_on_the_wire() {
        let digest = Digest::from_raw([7u8; 32]);
        assert_eq!(digest.to_bytes().unwrap(), vec![7u8; 32]);
        assert_eq!(bytesrepr::deserialize::<Digest>(&[7u8; 32]).unwrap(), digest);
    }
}
