//! # Key Management
//!
//! Algorithm-polymorphic keys for the two signature schemes the network
//! accepts: Ed25519 and ECDSA over secp256k1.
//!
//! The algorithm is a tag, not a type hierarchy. Every public key carries its
//! tag on the wire (`0x01` Ed25519, `0x02` secp256k1) and every operation
//! dispatches on it with an exhaustive `match`.
//!
//! ## Security considerations
//!
//! - Secret keys never implement `Serialize` and never appear in `Debug`.
//! - Fresh keys come from `OsRng`.
//! - Key bytes are never logged.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{
    Signer as _, SigningKey as Ed25519SigningKey, VerifyingKey as Ed25519VerifyingKey,
};
use k256::ecdsa::{
    Signature as K256Signature, SigningKey as K256SigningKey, VerifyingKey as K256VerifyingKey,
};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::hash::blake2b256;
use super::signatures::Signature;
use super::CryptoError;
use crate::bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};
use crate::cl::AccountHash;
use crate::config::{
    ED25519_PUBLIC_KEY_LENGTH, ED25519_TAG, SECP256K1_PUBLIC_KEY_LENGTH, SECP256K1_TAG,
    SECRET_KEY_LENGTH,
};

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// The closed set of signature schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    /// Ed25519 (RFC 8032).
    Ed25519,
    /// ECDSA over secp256k1 with SHA-256 message hashing.
    Secp256k1,
}

impl Algorithm {
    /// The one-byte tag that prefixes keys and signatures.
    pub fn tag(self) -> u8 {
        match self {
            Algorithm::Ed25519 => ED25519_TAG,
            Algorithm::Secp256k1 => SECP256K1_TAG,
        }
    }

    /// Resolves a tag byte back to an algorithm.
    pub fn from_tag(tag: u8) -> Result<Self, CryptoError> {
        match tag {
            ED25519_TAG => Ok(Algorithm::Ed25519),
            SECP256K1_TAG => Ok(Algorithm::Secp256k1),
            other => Err(CryptoError::UnknownAlgorithmTag(other)),
        }
    }

    /// Lowercase name, as used in account-hash preimages.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Ed25519 => "ed25519",
            Algorithm::Secp256k1 => "secp256k1",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Ed25519 => write!(f, "Ed25519"),
            Algorithm::Secp256k1 => write!(f, "Secp256k1"),
        }
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A public key tagged with its algorithm.
///
/// Secp256k1 keys are stored in 33-byte compressed SEC1 form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PublicKey {
    /// 32-byte Ed25519 verifying key.
    Ed25519([u8; ED25519_PUBLIC_KEY_LENGTH]),
    /// 33-byte compressed secp256k1 point.
    Secp256k1([u8; SECP256K1_PUBLIC_KEY_LENGTH]),
}

impl PublicKey {
    /// Validates `raw` as a key of the given algorithm.
    pub fn from_raw(algorithm: Algorithm, raw: &[u8]) -> Result<Self, CryptoError> {
        let invalid = CryptoError::InvalidPublicKey { algorithm };
        match algorithm {
            Algorithm::Ed25519 => {
                let bytes: [u8; ED25519_PUBLIC_KEY_LENGTH] =
                    raw.try_into().map_err(|_| invalid.clone())?;
                Ed25519VerifyingKey::from_bytes(&bytes).map_err(|_| invalid)?;
                Ok(PublicKey::Ed25519(bytes))
            }
            Algorithm::Secp256k1 => {
                let bytes: [u8; SECP256K1_PUBLIC_KEY_LENGTH] =
                    raw.try_into().map_err(|_| invalid.clone())?;
                K256VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| invalid)?;
                Ok(PublicKey::Secp256k1(bytes))
            }
        }
    }

    /// Parses the tag-prefixed byte form (`tag ++ raw`).
    pub fn from_tagged_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (tag, raw) = bytes.split_first().ok_or(CryptoError::Empty)?;
        Self::from_raw(Algorithm::from_tag(*tag)?, raw)
    }

    /// Parses the hex form, e.g. `01` followed by 64 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Self::from_tagged_bytes(&hex::decode(s)?)
    }

    /// The algorithm this key belongs to.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            PublicKey::Ed25519(_) => Algorithm::Ed25519,
            PublicKey::Secp256k1(_) => Algorithm::Secp256k1,
        }
    }

    /// The raw key bytes without the tag.
    pub fn raw_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(bytes) => bytes,
            PublicKey::Secp256k1(bytes) => bytes,
        }
    }

    /// Tag byte followed by the raw key bytes.
    pub fn to_tagged_bytes(&self) -> Vec<u8> {
        let raw = self.raw_bytes();
        let mut out = Vec::with_capacity(U8_SERIALIZED_LENGTH + raw.len());
        out.push(self.algorithm().tag());
        out.extend_from_slice(raw);
        out
    }

    /// Lowercase hex of [`to_tagged_bytes`](Self::to_tagged_bytes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_tagged_bytes())
    }

    /// The canonical account identifier for this key:
    /// `blake2b256(algorithm_name ++ 0x00 ++ raw_key_bytes)`.
    pub fn to_account_hash(&self) -> AccountHash {
        let name = self.algorithm().name().as_bytes();
        let raw = self.raw_bytes();
        let mut preimage = Vec::with_capacity(name.len() + 1 + raw.len());
        preimage.extend_from_slice(name);
        preimage.push(0);
        preimage.extend_from_slice(raw);
        AccountHash::new(blake2b256(preimage))
    }

    /// Verifies `signature` over `message`.
    ///
    /// A signature from a different algorithm than the key is reported as
    /// [`CryptoError::AlgorithmMismatch`], never as a panic.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        super::signatures::verify(self, message, signature)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey::{}({})", self.algorithm(), hex::encode(self.raw_bytes()))
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl ToBytes for PublicKey {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH + self.raw_bytes().len()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.algorithm().tag());
        writer.extend_from_slice(self.raw_bytes());
        Ok(())
    }
}

impl FromBytes for PublicKey {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        let algorithm = Algorithm::from_tag(tag).map_err(|_| bytesrepr::Error::UnknownTag {
            context: "public key",
            tag,
        })?;
        let len = match algorithm {
            Algorithm::Ed25519 => ED25519_PUBLIC_KEY_LENGTH,
            Algorithm::Secp256k1 => SECP256K1_PUBLIC_KEY_LENGTH,
        };
        let (raw, rem) = bytesrepr::safe_split_at(rem, len)?;
        let key = Self::from_raw(algorithm, raw)
            .map_err(|_| bytesrepr::Error::Formatting("invalid public key point"))?;
        Ok((key, rem))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// SecretKey / KeyPair
// ---------------------------------------------------------------------------

/// Secret signing material for one of the supported algorithms.
#[derive(Clone)]
pub enum SecretKey {
    /// Ed25519 signing key.
    Ed25519(Ed25519SigningKey),
    /// Secp256k1 ECDSA signing key.
    Secp256k1(K256SigningKey),
}

impl SecretKey {
    /// The algorithm of this key.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SecretKey::Ed25519(_) => Algorithm::Ed25519,
            SecretKey::Secp256k1(_) => Algorithm::Secp256k1,
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey::{}(..)", self.algorithm())
    }
}

/// A secret key together with its derived public key.
///
/// This is what signs deploys and transactions. It stores nothing about what
/// it has signed.
///
/// # Examples
///
/// ```
/// use casper_sdk::crypto::{Algorithm, KeyPair};
///
/// let key_pair = KeyPair::generate(Algorithm::Secp256k1);
/// let signature = key_pair.sign(b"deploy hash bytes");
/// assert!(key_pair.public_key().verify(b"deploy hash bytes", &signature).is_ok());
/// ```
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a fresh key pair from the OS RNG.
    pub fn generate(algorithm: Algorithm) -> Self {
        let secret_key = match algorithm {
            Algorithm::Ed25519 => SecretKey::Ed25519(Ed25519SigningKey::generate(&mut OsRng)),
            Algorithm::Secp256k1 => SecretKey::Secp256k1(K256SigningKey::random(&mut OsRng)),
        };
        Self::from_secret_key(secret_key)
    }

    /// Loads a key pair from raw 32-byte secret key material.
    ///
    /// This is the entry point for key-loading collaborators: they supply the
    /// algorithm and the raw bytes, nothing else.
    pub fn from_secret_bytes(algorithm: Algorithm, bytes: &[u8]) -> Result<Self, CryptoError> {
        let invalid = CryptoError::InvalidSecretKey { algorithm };
        let secret_key = match algorithm {
            Algorithm::Ed25519 => {
                let seed: [u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| invalid)?;
                SecretKey::Ed25519(Ed25519SigningKey::from_bytes(&seed))
            }
            Algorithm::Secp256k1 => {
                SecretKey::Secp256k1(K256SigningKey::from_slice(bytes).map_err(|_| invalid)?)
            }
        };
        Ok(Self::from_secret_key(secret_key))
    }

    /// Loads a key pair from hex-encoded raw secret key bytes.
    pub fn from_hex(algorithm: Algorithm, hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::from_secret_bytes(algorithm, &bytes)
    }

    /// Wraps an existing secret key, deriving its public key.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = match &secret_key {
            SecretKey::Ed25519(signing_key) => {
                PublicKey::Ed25519(signing_key.verifying_key().to_bytes())
            }
            SecretKey::Secp256k1(signing_key) => {
                let point =
                    k256::PublicKey::from(signing_key.verifying_key()).to_encoded_point(true);
                let mut bytes = [0u8; SECP256K1_PUBLIC_KEY_LENGTH];
                bytes.copy_from_slice(point.as_bytes());
                PublicKey::Secp256k1(bytes)
            }
        };
        Self {
            secret_key,
            public_key,
        }
    }

    /// The algorithm of this key pair.
    pub fn algorithm(&self) -> Algorithm {
        self.secret_key.algorithm()
    }

    /// The public half, safe to share.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Exports raw secret key bytes. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        match &self.secret_key {
            SecretKey::Ed25519(signing_key) => signing_key.to_bytes(),
            SecretKey::Secp256k1(signing_key) => {
                let mut bytes = [0u8; SECRET_KEY_LENGTH];
                bytes.copy_from_slice(&signing_key.to_bytes());
                bytes
            }
        }
    }

    /// Signs opaque bytes (in practice, a 32-byte deploy or transaction hash).
    ///
    /// Ed25519 signs the bytes directly. Secp256k1 signs their SHA-256 digest
    /// and always yields a normalized low-S signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        match &self.secret_key {
            SecretKey::Ed25519(signing_key) => {
                Signature::Ed25519(signing_key.sign(message).to_bytes())
            }
            SecretKey::Secp256k1(signing_key) => {
                let signature: K256Signature = signing_key.sign(message);
                let mut bytes = [0u8; 64];
                bytes.copy_from_slice(&signature.to_bytes());
                Signature::Secp256k1(bytes)
            }
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public half only. Secret bytes never leave this type via Debug.
        write!(f, "KeyPair(pub={})", self.public_key.to_hex())
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for KeyPair {}
