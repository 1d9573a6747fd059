//! The `TransactionV1` envelope: payload, content hash, and approvals.
//!
//! The hash covers the payload bytes only, so approvals can be appended
//! without disturbing it. Everything but the approval list is frozen at
//! construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::signing::{sign_transaction, Approval};
use super::types::{
    InitiatorAddr, PricingMode, TransactionArgs, TransactionEntryPoint, TransactionScheduling,
    TransactionTarget,
};
use super::verification::{verify_transaction, VerificationError};
use crate::bytesrepr::calltable::envelope_length;
use crate::bytesrepr::{
    self, Bytes, CalltableBuilder, CalltableReader, FromBytes, ToBytes, U16_SERIALIZED_LENGTH,
    U32_SERIALIZED_LENGTH,
};
use crate::config::{MAX_CHAIN_NAME_LENGTH, MAX_TTL_MILLIS};
use crate::crypto::{Digest, KeyPair};
use crate::time::{TimeDiff, Timestamp};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a `TransactionV1` cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionV1Error {
    /// The chain name is empty.
    #[error("chain name must not be empty")]
    EmptyChainName,

    /// The chain name exceeds what a node accepts.
    #[error("chain name is {length} bytes, max is {max}")]
    ChainNameTooLong { length: usize, max: usize },

    /// The time-to-live exceeds the network maximum.
    #[error("ttl {ttl} exceeds the maximum of {max}")]
    TtlTooLong { ttl: TimeDiff, max: TimeDiff },

    /// The entry point is not one the target can run.
    #[error("entry point {entry_point} cannot run against a {target} target")]
    EntryPointMismatch {
        entry_point: TransactionEntryPoint,
        target: &'static str,
    },

    /// A payment-limited transaction offers no payment.
    #[error("payment amount must be > 0")]
    ZeroPaymentAmount,

    /// The payload could not be encoded for hashing.
    #[error("serialization failed: {0}")]
    Serialization(#[from] bytesrepr::Error),
}

// ---------------------------------------------------------------------------
// TransactionV1Hash
// ---------------------------------------------------------------------------

/// The blake2b-256 digest of a transaction's payload bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionV1Hash(Digest);

impl TransactionV1Hash {
    pub const fn new(digest: Digest) -> Self {
        TransactionV1Hash(digest)
    }

    pub fn inner(&self) -> &Digest {
        &self.0
    }
}

impl From<Digest> for TransactionV1Hash {
    fn from(digest: Digest) -> Self {
        TransactionV1Hash(digest)
    }
}

impl fmt::Display for TransactionV1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for TransactionV1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionV1Hash({})", self.0)
    }
}

impl ToBytes for TransactionV1Hash {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for TransactionV1Hash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (digest, rem) = Digest::from_bytes(bytes)?;
        Ok((TransactionV1Hash(digest), rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionV1Fields
// ---------------------------------------------------------------------------

const ARGS_FIELD: u16 = 0;
const TARGET_FIELD: u16 = 1;
const ENTRY_POINT_FIELD: u16 = 2;
const SCHEDULING_FIELD: u16 = 3;

/// What the transaction does.
///
/// On the wire this is a `u16 → Bytes` map keyed by field index, each value
/// holding that field's own encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionV1Fields {
    pub args: TransactionArgs,
    pub entry_point: TransactionEntryPoint,
    pub scheduling: TransactionScheduling,
    pub target: TransactionTarget,
}

impl TransactionV1Fields {
    fn to_map(&self) -> Result<BTreeMap<u16, Bytes>, bytesrepr::Error> {
        let mut map = BTreeMap::new();
        map.insert(ARGS_FIELD, Bytes::from(self.args.to_bytes()?));
        map.insert(TARGET_FIELD, Bytes::from(self.target.to_bytes()?));
        map.insert(ENTRY_POINT_FIELD, Bytes::from(self.entry_point.to_bytes()?));
        map.insert(SCHEDULING_FIELD, Bytes::from(self.scheduling.to_bytes()?));
        Ok(map)
    }
}

fn map_field<T: FromBytes>(map: &BTreeMap<u16, Bytes>, index: u16) -> Result<T, bytesrepr::Error> {
    let bytes = map
        .get(&index)
        .ok_or(bytesrepr::Error::Formatting("missing transaction field"))?;
    bytesrepr::deserialize(bytes.as_slice())
}

impl ToBytes for TransactionV1Fields {
    fn serialized_length(&self) -> usize {
        let entry = |len: usize| U16_SERIALIZED_LENGTH + U32_SERIALIZED_LENGTH + len;
        U32_SERIALIZED_LENGTH
            + entry(self.args.serialized_length())
            + entry(self.target.serialized_length())
            + entry(self.entry_point.serialized_length())
            + entry(self.scheduling.serialized_length())
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.to_map()?.write_bytes(writer)
    }
}

impl FromBytes for TransactionV1Fields {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (map, rem) = BTreeMap::<u16, Bytes>::from_bytes(bytes)?;
        if map.keys().any(|index| *index > SCHEDULING_FIELD) {
            return Err(bytesrepr::Error::Formatting("unexpected transaction field"));
        }
        let fields = TransactionV1Fields {
            args: map_field(&map, ARGS_FIELD)?,
            target: map_field(&map, TARGET_FIELD)?,
            entry_point: map_field(&map, ENTRY_POINT_FIELD)?,
            scheduling: map_field(&map, SCHEDULING_FIELD)?,
        };
        Ok((fields, rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionV1Payload
// ---------------------------------------------------------------------------

/// The hashed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionV1Payload {
    initiator_addr: InitiatorAddr,
    timestamp: Timestamp,
    ttl: TimeDiff,
    chain_name: String,
    pricing_mode: PricingMode,
    fields: TransactionV1Fields,
}

impl TransactionV1Payload {
    pub fn new(
        initiator_addr: InitiatorAddr,
        timestamp: Timestamp,
        ttl: TimeDiff,
        chain_name: impl Into<String>,
        pricing_mode: PricingMode,
        fields: TransactionV1Fields,
    ) -> Self {
        TransactionV1Payload {
            initiator_addr,
            timestamp,
            ttl,
            chain_name: chain_name.into(),
            pricing_mode,
            fields,
        }
    }

    pub fn initiator_addr(&self) -> &InitiatorAddr {
        &self.initiator_addr
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn ttl(&self) -> TimeDiff {
        self.ttl
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    pub fn pricing_mode(&self) -> &PricingMode {
        &self.pricing_mode
    }

    pub fn fields(&self) -> &TransactionV1Fields {
        &self.fields
    }

    /// The last instant at which a node will still accept the transaction.
    pub fn expires(&self) -> Timestamp {
        self.timestamp.saturating_add(self.ttl)
    }

    fn validate(&self) -> Result<(), TransactionV1Error> {
        if self.chain_name.is_empty() {
            return Err(TransactionV1Error::EmptyChainName);
        }
        if self.chain_name.len() > MAX_CHAIN_NAME_LENGTH {
            return Err(TransactionV1Error::ChainNameTooLong {
                length: self.chain_name.len(),
                max: MAX_CHAIN_NAME_LENGTH,
            });
        }
        if self.ttl.millis() > MAX_TTL_MILLIS {
            return Err(TransactionV1Error::TtlTooLong {
                ttl: self.ttl,
                max: TimeDiff::from_millis(MAX_TTL_MILLIS),
            });
        }
        if let PricingMode::PaymentLimited { payment_amount: 0, .. } = self.pricing_mode {
            return Err(TransactionV1Error::ZeroPaymentAmount);
        }

        let entry_point = &self.fields.entry_point;
        let compatible = match &self.fields.target {
            TransactionTarget::Native => entry_point.is_native(),
            TransactionTarget::Stored { .. } => {
                matches!(entry_point, TransactionEntryPoint::Custom(_))
            }
            TransactionTarget::Session { .. } => *entry_point == TransactionEntryPoint::Call,
        };
        if !compatible {
            return Err(TransactionV1Error::EntryPointMismatch {
                entry_point: entry_point.clone(),
                target: self.fields.target.kind(),
            });
        }
        Ok(())
    }
}

impl ToBytes for TransactionV1Payload {
    fn serialized_length(&self) -> usize {
        envelope_length(&[
            self.initiator_addr.serialized_length(),
            self.timestamp.serialized_length(),
            self.ttl.serialized_length(),
            self.chain_name.serialized_length(),
            self.pricing_mode.serialized_length(),
            self.fields.serialized_length(),
        ])
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let envelope = CalltableBuilder::new()
            .add_field(0, &self.initiator_addr)?
            .add_field(1, &self.timestamp)?
            .add_field(2, &self.ttl)?
            .add_field(3, &self.chain_name)?
            .add_field(4, &self.pricing_mode)?
            .add_field(5, &self.fields)?
            .finish()?;
        writer.extend(envelope);
        Ok(())
    }
}

impl FromBytes for TransactionV1Payload {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        reader.ensure_max_index(5)?;
        let payload = TransactionV1Payload {
            initiator_addr: reader.field(0)?,
            timestamp: reader.field(1)?,
            ttl: reader.field(2)?,
            chain_name: reader.field(3)?,
            pricing_mode: reader.field(4)?,
            fields: reader.field(5)?,
        };
        Ok((payload, rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionV1
// ---------------------------------------------------------------------------

/// A payload, its hash, and the approvals collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionV1 {
    hash: TransactionV1Hash,
    payload: TransactionV1Payload,
    approvals: Vec<Approval>,
}

impl TransactionV1 {
    /// Validates `payload` and seals it under its hash, with no approvals.
    pub fn new(payload: TransactionV1Payload) -> Result<Self, TransactionV1Error> {
        payload.validate()?;
        let hash = Self::compute_hash(&payload)?;
        Ok(TransactionV1 {
            hash,
            payload,
            approvals: Vec::new(),
        })
    }

    pub(crate) fn compute_hash(
        payload: &TransactionV1Payload,
    ) -> Result<TransactionV1Hash, bytesrepr::Error> {
        Ok(TransactionV1Hash(Digest::hash(payload.to_bytes()?)))
    }

    pub fn hash(&self) -> &TransactionV1Hash {
        &self.hash
    }

    pub fn payload(&self) -> &TransactionV1Payload {
        &self.payload
    }

    pub fn approvals(&self) -> &[Approval] {
        &self.approvals
    }

    pub fn chain_name(&self) -> &str {
        self.payload.chain_name()
    }

    pub fn expires(&self) -> Timestamp {
        self.payload.expires()
    }

    /// `true` once `now` is past [`expires`](Self::expires).
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires() < now
    }

    /// Signs the hash and appends the approval.
    pub fn sign(&mut self, key_pair: &KeyPair) {
        sign_transaction(self, key_pair);
    }

    /// Recomputes the hash and checks every approval against it.
    pub fn verify(&self) -> Result<(), VerificationError> {
        verify_transaction(self)
    }

    pub(crate) fn push_approval(&mut self, approval: Approval) {
        self.approvals.push(approval);
    }
}

impl ToBytes for TransactionV1 {
    fn serialized_length(&self) -> usize {
        envelope_length(&[
            self.hash.serialized_length(),
            self.payload.serialized_length(),
            self.approvals.serialized_length(),
        ])
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let envelope = CalltableBuilder::new()
            .add_field(0, &self.hash)?
            .add_field(1, &self.payload)?
            .add_field(2, &self.approvals)?
            .finish()?;
        writer.extend(envelope);
        Ok(())
    }
}

/// Decoding keeps the stored hash as-is; [`TransactionV1::verify`] is what
/// catches a hash that no longer matches its payload.
impl FromBytes for TransactionV1 {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        reader.ensure_max_index(2)?;
        let transaction = TransactionV1 {
            hash: reader.field(0)?,
            payload: reader.field(1)?,
            approvals: reader.field(2)?,
        };
        Ok((transaction, rem))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cl::RuntimeArgs;
    use crate::crypto::Algorithm;

    fn payload(target: TransactionTarget, entry_point: TransactionEntryPoint) -> TransactionV1Payload {
        let key_pair = KeyPair::from_secret_bytes(Algorithm::Ed25519, &[7; 32]).unwrap();
        TransactionV1Payload::new(
            InitiatorAddr::PublicKey(key_pair.public_key().clone()),
            Timestamp::from_millis(1_700_000_000_000),
            TimeDiff::from_minutes(30),
            "casper-test",
            PricingMode::Fixed {
                additional_computation_factor: 0,
                gas_price_tolerance: 1,
            },
            TransactionV1Fields {
                args: TransactionArgs::Named(RuntimeArgs::new()),
                entry_point,
                scheduling: TransactionScheduling::Standard,
                target,
            },
        )
    }

    #[test]
    fn hash_is_blake2b_of_payload_bytes() {
        let payload = payload(TransactionTarget::Native, TransactionEntryPoint::Transfer);
        let expected = Digest::hash(payload.to_bytes().unwrap());
        let transaction = TransactionV1::new(payload).unwrap();
        assert_eq!(*transaction.hash().inner(), expected);
        assert!(transaction.approvals().is_empty());
    }

    #[test]
    fn entry_point_must_fit_target() {
        let err = TransactionV1::new(payload(
            TransactionTarget::Native,
            TransactionEntryPoint::Call,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            TransactionV1Error::EntryPointMismatch {
                entry_point: TransactionEntryPoint::Call,
                target: "native",
            }
        );

        let session = TransactionTarget::Session {
            is_install_upgrade: false,
            module_bytes: Bytes::from(vec![1]),
            runtime: Default::default(),
        };
        assert!(TransactionV1::new(payload(session, TransactionEntryPoint::Delegate)).is_err());
    }

    #[test]
    fn fields_reject_unknown_index() {
        let fields = payload(TransactionTarget::Native, TransactionEntryPoint::Transfer).fields;
        let mut map = fields.to_map().unwrap();
        map.insert(9, Bytes::new());
        let bytes = map.to_bytes().unwrap();
        assert_eq!(
            bytesrepr::deserialize::<TransactionV1Fields>(&bytes),
            Err(bytesrepr::Error::Formatting("unexpected transaction field"))
        );
    }

    #[test]
    fn bytes_roundtrip_preserves_everything() {
        let mut transaction =
            TransactionV1::new(payload(TransactionTarget::Native, TransactionEntryPoint::Transfer))
                .unwrap();
        transaction.sign(&KeyPair::generate(Algorithm::Secp256k1));
        let bytes = transaction.to_bytes().unwrap();
        assert_eq!(bytes.len(), transaction.serialized_length());
        assert_eq!(bytesrepr::deserialize::<TransactionV1>(&bytes).unwrap(), transaction);
    }

    #[test]
    fn expiry() {
        let transaction =
            TransactionV1::new(payload(TransactionTarget::Native, TransactionEntryPoint::Transfer))
                .unwrap();
        let expires = Timestamp::from_millis(1_700_000_000_000 + 30 * 60 * 1_000);
        assert_eq!(transaction.expires(), expires);
        assert!(!transaction.is_expired(expires));
        assert!(transaction.is_expired(expires.saturating_add(TimeDiff::from_millis(1))));
    }
}
