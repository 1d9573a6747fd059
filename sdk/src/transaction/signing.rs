//! Approvals: signatures over a deploy or transaction hash.
//!
//! Signing is a separate step from building because the key may not be at
//! hand when the transaction is assembled (multi-signature accounts collect
//! approvals from several parties). The signed message is always the 32
//! bytes of the content hash, never the full body, so signing never changes
//! the hash.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::v1::TransactionV1;
use crate::bytesrepr::{self, FromBytes, ToBytes};
use crate::crypto::{Digest, KeyPair, PublicKey, Signature};
use crate::deploy::Deploy;

/// A signer's public key and its signature over a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Approval {
    signer: PublicKey,
    signature: Signature,
}

impl Approval {
    pub fn new(signer: PublicKey, signature: Signature) -> Self {
        Approval { signer, signature }
    }

    /// Signs `hash` with `key_pair`.
    pub fn create(hash: &Digest, key_pair: &KeyPair) -> Self {
        Approval {
            signer: key_pair.public_key().clone(),
            signature: key_pair.sign(hash.as_bytes()),
        }
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl ToBytes for Approval {
    fn serialized_length(&self) -> usize {
        self.signer.serialized_length() + self.signature.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.signer.write_bytes(writer)?;
        self.signature.write_bytes(writer)
    }
}

impl FromBytes for Approval {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (signer, rem) = PublicKey::from_bytes(bytes)?;
        let (signature, rem) = Signature::from_bytes(rem)?;
        Ok((Approval { signer, signature }, rem))
    }
}

/// Signs a deploy in place, appending one approval.
///
/// The signing procedure:
/// 1. Take the deploy hash fixed at construction.
/// 2. Sign its 32 bytes with `key_pair` (Ed25519, or ECDSA over SHA-256 for
///    Secp256k1).
/// 3. Append `{signer, signature}` to the approval list.
///
/// Signing twice with the same key appends two approvals; nothing is
/// deduplicated.
pub fn sign_deploy<'a>(deploy: &'a mut Deploy, key_pair: &KeyPair) -> &'a Deploy {
    let approval = Approval::create(deploy.hash().inner(), key_pair);
    debug!(
        hash = %deploy.hash(),
        signer = %approval.signer(),
        approvals = deploy.approvals().len() + 1,
        "approval appended to deploy"
    );
    deploy.push_approval(approval);
    deploy
}

/// Signs a transaction in place, appending one approval. Same procedure as
/// [`sign_deploy`], over the transaction's payload hash.
pub fn sign_transaction<'a>(
    transaction: &'a mut TransactionV1,
    key_pair: &KeyPair,
) -> &'a TransactionV1 {
    let approval = Approval::create(transaction.hash().inner(), key_pair);
    debug!(
        hash = %transaction.hash(),
        signer = %approval.signer(),
        approvals = transaction.approvals().len() + 1,
        "approval appended to transaction"
    );
    transaction.push_approval(approval);
    transaction
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Algorithm;

    #[test]
    fn approval_signs_the_hash_bytes() {
        let key_pair = KeyPair::generate(Algorithm::Ed25519);
        let hash = Digest::hash(b"deploy header");
        let approval = Approval::create(&hash, &key_pair);
        assert_eq!(approval.signer(), key_pair.public_key());
        assert!(approval.signer().verify(hash.as_bytes(), approval.signature()).is_ok());
    }

    #[test]
    fn approval_wire_layout() {
        let key_pair = KeyPair::from_secret_bytes(Algorithm::Secp256k1, &[9; 32]).unwrap();
        let approval = Approval::create(&Digest::hash(b"x"), &key_pair);
        let bytes = approval.to_bytes().unwrap();
        // tag + 33-byte compressed key, tag + 64-byte signature
        assert_eq!(bytes.len(), 1 + 33 + 1 + 64);
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[34], 2);
        assert_eq!(bytesrepr::deserialize::<Approval>(&bytes).unwrap(), approval);
    }

    #[test]
    fn approval_json_shape() {
        let key_pair = KeyPair::from_secret_bytes(Algorithm::Ed25519, &[1; 32]).unwrap();
        let approval = Approval::create(&Digest::hash(b"x"), &key_pair);
        let json = serde_json::to_value(&approval).unwrap();
        assert_eq!(json["signer"], key_pair.public_key().to_hex());
        assert!(json["signature"].as_str().unwrap().starts_with("01"));
        assert_eq!(serde_json::from_value::<Approval>(json).unwrap(), approval);
    }
}
