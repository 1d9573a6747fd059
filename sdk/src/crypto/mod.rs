//! # Cryptographic Primitives
//!
//! Everything that touches key material or digests:
//!
//! - **hash**: BLAKE2b-256, the network's single hash function.
//! - **keys**: tagged public keys, secret keys and key pairs.
//! - **signatures**: tagged signatures plus `sign` / `verify`.
//!
//! Thin, type-safe wrappers around audited implementations
//! (`ed25519-dalek`, `k256`, `blake2`). Nothing here is hand-rolled.

mod error;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use error::CryptoError;
pub use hash::{blake2b256, Digest};
pub use keys::{Algorithm, KeyPair, PublicKey, SecretKey};
pub use signatures::{sign, verify, Signature};
