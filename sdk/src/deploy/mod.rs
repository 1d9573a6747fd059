//! # Deploy Module
//!
//! The legacy transaction format, still accepted by every node: a header,
//! payment code that buys gas, session code that does the work, and the
//! approvals of whoever authorized it.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs       : Deploy construction rules, hashing, binary form
//! header.rs    : DeployHeader and DeployHash
//! executable.rs: ExecutableDeployItem (payment/session code) and TransferTarget
//! builder.rs   : DeployBuilder with one constructor per deploy kind
//! ```
//!
//! ## Hash chain
//!
//! 1. `body_hash = blake2b256(payment ++ session)`
//! 2. the header embeds `body_hash`
//! 3. `deploy_hash = blake2b256(header)`
//!
//! Approvals sign the deploy hash, which therefore covers every byte except
//! the approvals themselves.

pub mod builder;
pub mod executable;
pub mod header;

pub use builder::DeployBuilder;
pub use executable::{ExecutableDeployItem, TransferTarget};
pub use header::{DeployHash, DeployHeader};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes};
use crate::config::{MAX_CHAIN_NAME_LENGTH, MAX_DEPENDENCIES, MAX_TTL_MILLIS};
use crate::crypto::{Digest, KeyPair, PublicKey};
use crate::time::{TimeDiff, Timestamp};
use crate::transaction::signing::{sign_deploy, Approval};
use crate::transaction::verification::{verify_deploy, VerificationError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a deploy cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// The chain name is empty.
    #[error("chain name must not be empty")]
    EmptyChainName,

    /// The chain name exceeds what a node accepts.
    #[error("chain name is {length} bytes, max is {max}")]
    ChainNameTooLong { length: usize, max: usize },

    /// A standard payment has no `U512` `amount` argument.
    #[error("standard payment requires a U512 `amount` argument")]
    MissingPaymentAmount,

    /// A standard payment offers zero motes.
    #[error("standard payment amount must be > 0")]
    ZeroPaymentAmount,

    /// The time-to-live exceeds the network maximum.
    #[error("ttl {ttl} exceeds the maximum of {max}")]
    TtlTooLong { ttl: TimeDiff, max: TimeDiff },

    /// Too many dependencies.
    #[error("{count} dependencies exceed the maximum of {max}")]
    TooManyDependencies { count: usize, max: usize },

    /// The body could not be encoded for hashing.
    #[error("serialization failed: {0}")]
    Serialization(#[from] bytesrepr::Error),
}

// ---------------------------------------------------------------------------
// Deploy
// ---------------------------------------------------------------------------

/// A signed-or-unsigned deploy.
///
/// Construction computes both hashes once. Afterwards only the approval list
/// can change, through [`sign`](Self::sign).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deploy {
    hash: DeployHash,
    header: DeployHeader,
    payment: ExecutableDeployItem,
    session: ExecutableDeployItem,
    approvals: Vec<Approval>,
}

impl Deploy {
    /// Validates the inputs and seals them into an unsigned deploy.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account: PublicKey,
        timestamp: Timestamp,
        ttl: TimeDiff,
        gas_price: u64,
        dependencies: Vec<DeployHash>,
        chain_name: impl Into<String>,
        payment: ExecutableDeployItem,
        session: ExecutableDeployItem,
    ) -> Result<Self, DeployError> {
        let chain_name = chain_name.into();
        if chain_name.is_empty() {
            return Err(DeployError::EmptyChainName);
        }
        if chain_name.len() > MAX_CHAIN_NAME_LENGTH {
            return Err(DeployError::ChainNameTooLong {
                length: chain_name.len(),
                max: MAX_CHAIN_NAME_LENGTH,
            });
        }
        if ttl.millis() > MAX_TTL_MILLIS {
            return Err(DeployError::TtlTooLong {
                ttl,
                max: TimeDiff::from_millis(MAX_TTL_MILLIS),
            });
        }
        if dependencies.len() > MAX_DEPENDENCIES {
            return Err(DeployError::TooManyDependencies {
                count: dependencies.len(),
                max: MAX_DEPENDENCIES,
            });
        }
        if payment.is_standard_payment() {
            let amount = payment
                .payment_amount()
                .ok_or(DeployError::MissingPaymentAmount)?;
            if amount.is_zero() {
                return Err(DeployError::ZeroPaymentAmount);
            }
        }

        let body_hash = Self::compute_body_hash(&payment, &session)?;
        let header = DeployHeader::new(
            account,
            timestamp,
            ttl,
            gas_price,
            body_hash,
            dependencies,
            chain_name,
        );
        let hash = DeployHash::new(Digest::hash(header.to_bytes()?));
        Ok(Deploy {
            hash,
            header,
            payment,
            session,
            approvals: Vec::new(),
        })
    }

    pub(crate) fn compute_body_hash(
        payment: &ExecutableDeployItem,
        session: &ExecutableDeployItem,
    ) -> Result<Digest, bytesrepr::Error> {
        let mut body = Vec::with_capacity(payment.serialized_length() + session.serialized_length());
        payment.write_bytes(&mut body)?;
        session.write_bytes(&mut body)?;
        Ok(Digest::hash(body))
    }

    pub fn hash(&self) -> &DeployHash {
        &self.hash
    }

    pub fn header(&self) -> &DeployHeader {
        &self.header
    }

    pub fn payment(&self) -> &ExecutableDeployItem {
        &self.payment
    }

    pub fn session(&self) -> &ExecutableDeployItem {
        &self.session
    }

    pub fn approvals(&self) -> &[Approval] {
        &self.approvals
    }

    pub fn is_transfer(&self) -> bool {
        self.session.is_transfer()
    }

    /// `true` once `now` is past the header's expiry.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.header.is_expired(now)
    }

    /// Signs the deploy hash and appends the approval.
    pub fn sign(&mut self, key_pair: &KeyPair) {
        sign_deploy(self, key_pair);
    }

    /// Recomputes both hashes and checks every approval.
    pub fn verify(&self) -> Result<(), VerificationError> {
        verify_deploy(self)
    }

    pub(crate) fn push_approval(&mut self, approval: Approval) {
        self.approvals.push(approval);
    }
}

impl ToBytes for Deploy {
    fn serialized_length(&self) -> usize {
        self.header.serialized_length()
            + self.hash.serialized_length()
            + self.payment.serialized_length()
            + self.session.serialized_length()
            + self.approvals.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.header.write_bytes(writer)?;
        self.hash.write_bytes(writer)?;
        self.payment.write_bytes(writer)?;
        self.session.write_bytes(writer)?;
        self.approvals.write_bytes(writer)
    }
}

/// Decoding keeps the stored hash and body hash; [`Deploy::verify`] is what
/// catches a deploy whose hashes no longer match its contents.
impl FromBytes for Deploy {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (header, rem) = DeployHeader::from_bytes(bytes)?;
        let (hash, rem) = DeployHash::from_bytes(rem)?;
        let (payment, rem) = ExecutableDeployItem::from_bytes(rem)?;
        let (session, rem) = ExecutableDeployItem::from_bytes(rem)?;
        let (approvals, rem) = Vec::<Approval>::from_bytes(rem)?;
        let deploy = Deploy {
            hash,
            header,
            payment,
            session,
            approvals,
        };
        Ok((deploy, rem))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
