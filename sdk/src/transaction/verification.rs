//! Verification: content-hash recomputation and approval checks.
//!
//! A deploy or transaction that arrived over the wire carries its own hash,
//! and nothing stops a sender from lying about it. The checks below are
//! ordered from cheapest to most expensive (hashing before signature
//! verification) so a tampered body fails before any curve arithmetic.

use thiserror::Error;
use tracing::warn;

use super::signing::Approval;
use super::v1::TransactionV1;
use crate::bytesrepr::{self, ToBytes};
use crate::crypto::{CryptoError, Digest, PublicKey};
use crate::deploy::Deploy;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a deploy or transaction failed verification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    /// The deploy header's body hash does not match its payment and session.
    #[error("body hash mismatch: header has {expected}, body hashes to {actual}")]
    BodyHashMismatch { expected: Digest, actual: Digest },

    /// The stored hash does not match the recomputed one.
    #[error("hash mismatch: stored {expected}, computed {actual}")]
    HashMismatch { expected: Digest, actual: Digest },

    /// Nobody has signed.
    #[error("no approvals")]
    NoApprovals,

    /// An approval's signature does not verify against its signer.
    #[error("approval {index} by {signer} is invalid: {source}")]
    InvalidApproval {
        index: usize,
        signer: PublicKey,
        #[source]
        source: CryptoError,
    },

    /// The body could not be re-encoded for hashing.
    #[error("serialization failed: {0}")]
    Serialization(#[from] bytesrepr::Error),
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a deploy.
///
/// Checks, in order:
/// 1. **Body hash**: `blake2b256(payment ++ session)` equals the header's
///    `body_hash`.
/// 2. **Deploy hash**: `blake2b256(header)` equals the stored hash.
/// 3. **Approvals present**: at least one approval exists.
/// 4. **Signatures**: every approval verifies over the deploy hash. A key
///    and signature of different algorithms fail here as an error.
pub fn verify_deploy(deploy: &Deploy) -> Result<(), VerificationError> {
    let result = check_deploy(deploy);
    if let Err(error) = &result {
        warn!(hash = %deploy.hash(), error = %error, "deploy failed verification");
    }
    result
}

fn check_deploy(deploy: &Deploy) -> Result<(), VerificationError> {
    let header = deploy.header();

    let body_hash = Deploy::compute_body_hash(deploy.payment(), deploy.session())?;
    if body_hash != *header.body_hash() {
        return Err(VerificationError::BodyHashMismatch {
            expected: *header.body_hash(),
            actual: body_hash,
        });
    }

    let hash = Digest::hash(header.to_bytes()?);
    if hash != *deploy.hash().inner() {
        return Err(VerificationError::HashMismatch {
            expected: *deploy.hash().inner(),
            actual: hash,
        });
    }

    verify_approvals(&hash, deploy.approvals())
}

/// Verifies a transaction.
///
/// Checks, in order:
/// 1. **Hash**: `blake2b256(payload)` equals the stored hash.
/// 2. **Approvals present**: at least one approval exists.
/// 3. **Signatures**: every approval verifies over the transaction hash.
pub fn verify_transaction(transaction: &TransactionV1) -> Result<(), VerificationError> {
    let result = check_transaction(transaction);
    if let Err(error) = &result {
        warn!(hash = %transaction.hash(), error = %error, "transaction failed verification");
    }
    result
}

fn check_transaction(transaction: &TransactionV1) -> Result<(), VerificationError> {
    let hash = *TransactionV1::compute_hash(transaction.payload())?.inner();
    if hash != *transaction.hash().inner() {
        return Err(VerificationError::HashMismatch {
            expected: *transaction.hash().inner(),
            actual: hash,
        });
    }
    verify_approvals(&hash, transaction.approvals())
}

fn verify_approvals(hash: &Digest, approvals: &[Approval]) -> Result<(), VerificationError> {
    if approvals.is_empty() {
        return Err(VerificationError::NoApprovals);
    }
    for (index, approval) in approvals.iter().enumerate() {
        approval
            .signer()
            .verify(hash.as_bytes(), approval.signature())
            .map_err(|source| VerificationError::InvalidApproval {
                index,
                signer: approval.signer().clone(),
                source,
            })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Algorithm, KeyPair};

    #[test]
    fn empty_approvals_rejected() {
        assert_eq!(
            verify_approvals(&Digest::hash(b"x"), &[]),
            Err(VerificationError::NoApprovals)
        );
    }

    #[test]
    fn foreign_signature_reports_its_index() {
        let hash = Digest::hash(b"x");
        let alice = KeyPair::generate(Algorithm::Ed25519);
        let bob = KeyPair::generate(Algorithm::Ed25519);
        let good = Approval::create(&hash, &alice);
        let bad = Approval::new(
            bob.public_key().clone(),
            *Approval::create(&hash, &alice).signature(),
        );
        match verify_approvals(&hash, &[good, bad]) {
            Err(VerificationError::InvalidApproval { index, signer, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(&signer, bob.public_key());
            }
            other => panic!("expected InvalidApproval, got {other:?}"),
        }
    }

    #[test]
    fn mixed_algorithms_are_an_error_not_a_panic() {
        let hash = Digest::hash(b"x");
        let ed = KeyPair::generate(Algorithm::Ed25519);
        let secp = KeyPair::generate(Algorithm::Secp256k1);
        let approval = Approval::new(
            ed.public_key().clone(),
            *Approval::create(&hash, &secp).signature(),
        );
        match verify_approvals(&hash, &[approval]) {
            Err(VerificationError::InvalidApproval { source, .. }) => {
                assert!(matches!(source, CryptoError::AlgorithmMismatch { .. }));
            }
            other => panic!("expected InvalidApproval, got {other:?}"),
        }
    }
}
