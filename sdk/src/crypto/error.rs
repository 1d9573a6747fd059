//! Error type for key and signature operations.

use thiserror::Error;

use super::Algorithm;

/// Errors that can occur while parsing keys, signing, or verifying.
///
/// Deliberately coarse about *why* key material was rejected: error messages
/// end up in logs, and logs are not where secret bytes should be described.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CryptoError {
    /// Secret key bytes were the wrong length or not a valid scalar.
    #[error("invalid {algorithm} secret key")]
    InvalidSecretKey {
        /// Algorithm the bytes were supposed to belong to.
        algorithm: Algorithm,
    },

    /// Public key bytes were the wrong length or not a valid curve point.
    #[error("invalid {algorithm} public key")]
    InvalidPublicKey {
        /// Algorithm the bytes were supposed to belong to.
        algorithm: Algorithm,
    },

    /// Signature bytes were the wrong length or not a valid encoding.
    #[error("invalid {algorithm} signature bytes")]
    InvalidSignature {
        /// Algorithm the bytes were supposed to belong to.
        algorithm: Algorithm,
    },

    /// The leading tag byte does not name a supported algorithm.
    #[error("unknown algorithm tag: {0}")]
    UnknownAlgorithmTag(u8),

    /// The signer's key and the signature use different algorithms.
    #[error("algorithm mismatch: key is {key}, signature is {signature}")]
    AlgorithmMismatch {
        /// Algorithm of the public key.
        key: Algorithm,
        /// Algorithm of the signature.
        signature: Algorithm,
    },

    /// The signature does not verify against the key and message.
    #[error("signature verification failed")]
    VerificationFailed,

    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A hex string decoded to zero bytes, so there is no algorithm tag.
    #[error("empty key or signature encoding")]
    Empty,
}
