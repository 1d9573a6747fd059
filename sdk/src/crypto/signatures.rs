//! # Digital Signatures
//!
//! Tagged signatures and the one verification routine every approval goes
//! through. Both schemes produce 64 bytes: Ed25519 `R || S`, and compact
//! secp256k1 ECDSA `r || s`.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{
    Signature as Ed25519Signature, Verifier as _, VerifyingKey as Ed25519VerifyingKey,
};
use k256::ecdsa::{Signature as K256Signature, VerifyingKey as K256VerifyingKey};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::{Algorithm, CryptoError, KeyPair, PublicKey};
use crate::bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};
use crate::config::SIGNATURE_LENGTH;

/// A signature tagged with the algorithm that produced it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signature {
    /// Ed25519 signature.
    Ed25519([u8; SIGNATURE_LENGTH]),
    /// Compact secp256k1 ECDSA signature.
    Secp256k1([u8; SIGNATURE_LENGTH]),
}

impl Signature {
    /// Wraps raw signature bytes for the given algorithm.
    pub fn from_raw(algorithm: Algorithm, raw: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SIGNATURE_LENGTH] = raw
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature { algorithm })?;
        Ok(match algorithm {
            Algorithm::Ed25519 => Signature::Ed25519(bytes),
            Algorithm::Secp256k1 => Signature::Secp256k1(bytes),
        })
    }

    /// Parses `tag ++ raw`.
    pub fn from_tagged_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (tag, raw) = bytes.split_first().ok_or(CryptoError::Empty)?;
        Self::from_raw(Algorithm::from_tag(*tag)?, raw)
    }

    /// Parses the hex form (tag byte first).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Self::from_tagged_bytes(&hex::decode(s)?)
    }

    /// The algorithm that produced this signature.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Signature::Ed25519(_) => Algorithm::Ed25519,
            Signature::Secp256k1(_) => Algorithm::Secp256k1,
        }
    }

    /// The 64 raw signature bytes.
    pub fn raw_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        match self {
            Signature::Ed25519(bytes) | Signature::Secp256k1(bytes) => bytes,
        }
    }

    /// Lowercase hex of `tag ++ raw`.
    pub fn to_hex(&self) -> String {
        let mut tagged = Vec::with_capacity(U8_SERIALIZED_LENGTH + SIGNATURE_LENGTH);
        tagged.push(self.algorithm().tag());
        tagged.extend_from_slice(self.raw_bytes());
        hex::encode(tagged)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = hex::encode(self.raw_bytes());
        write!(f, "Signature::{}({}...{})", self.algorithm(), &raw[..8], &raw[120..])
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl ToBytes for Signature {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH + SIGNATURE_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.algorithm().tag());
        writer.extend_from_slice(self.raw_bytes());
        Ok(())
    }
}

impl FromBytes for Signature {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        let algorithm = Algorithm::from_tag(tag).map_err(|_| bytesrepr::Error::UnknownTag {
            context: "signature",
            tag,
        })?;
        let (raw, rem) = <[u8; SIGNATURE_LENGTH]>::from_bytes(rem)?;
        let signature = match algorithm {
            Algorithm::Ed25519 => Signature::Ed25519(raw),
            Algorithm::Secp256k1 => Signature::Secp256k1(raw),
        };
        Ok((signature, rem))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(D::Error::custom)
    }
}

/// Signs `message` with `key_pair`.
pub fn sign(key_pair: &KeyPair, message: &[u8]) -> Signature {
    key_pair.sign(message)
}

/// Verifies `signature` over `message` against `public_key`.
///
/// Dispatches on the key's tag. A signature whose tag differs from the key's
/// is rejected before any curve arithmetic happens.
pub fn verify(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), CryptoError> {
    match (public_key, signature) {
        (PublicKey::Ed25519(key_bytes), Signature::Ed25519(sig_bytes)) => {
            let verifying_key = Ed25519VerifyingKey::from_bytes(key_bytes).map_err(|_| {
                CryptoError::InvalidPublicKey {
                    algorithm: Algorithm::Ed25519,
                }
            })?;
            verifying_key
                .verify(message, &Ed25519Signature::from_bytes(sig_bytes))
                .map_err(|_| CryptoError::VerificationFailed)
        }
        (PublicKey::Secp256k1(key_bytes), Signature::Secp256k1(sig_bytes)) => {
            let verifying_key = K256VerifyingKey::from_sec1_bytes(key_bytes).map_err(|_| {
                CryptoError::InvalidPublicKey {
                    algorithm: Algorithm::Secp256k1,
                }
            })?;
            let signature = K256Signature::from_slice(sig_bytes).map_err(|_| {
                CryptoError::InvalidSignature {
                    algorithm: Algorithm::Secp256k1,
                }
            })?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| CryptoError::VerificationFailed)
        }
        (key, signature) => Err(CryptoError::AlgorithmMismatch {
            key: key.algorithm(),
            signature: signature.algorithm(),
        }),
    }
}
