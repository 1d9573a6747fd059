//! Value types carried by a [`TransactionV1`](super::TransactionV1) payload.
//!
//! Every enum here is encoded as a call-table: field `0` holds the variant
//! tag and the following fields hold that variant's data, so a variant only
//! pays for the fields it actually has. JSON is externally tagged serde.

use serde::{Deserialize, Serialize};

use crate::bytesrepr::calltable::envelope_length;
use crate::bytesrepr::{
    self, Bytes, CalltableBuilder, CalltableReader, FromBytes, ToBytes, U8_SERIALIZED_LENGTH,
};
use crate::cl::{AccountHash, RuntimeArgs};
use crate::config::DEFAULT_GAS_PRICE_TOLERANCE;
use crate::crypto::{Digest, PublicKey};

const TAG_FIELD: u16 = 0;

fn unknown_tag(context: &'static str, tag: u8) -> bytesrepr::Error {
    bytesrepr::Error::UnknownTag { context, tag }
}

fn write_envelope(writer: &mut Vec<u8>, builder: CalltableBuilder) -> Result<(), bytesrepr::Error> {
    writer.extend(builder.finish()?);
    Ok(())
}

// ---------------------------------------------------------------------------
// InitiatorAddr
// ---------------------------------------------------------------------------

/// Who pays for and is authorized by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum InitiatorAddr {
    PublicKey(PublicKey),
    AccountHash(AccountHash),
}

impl InitiatorAddr {
    const PUBLIC_KEY_TAG: u8 = 0;
    const ACCOUNT_HASH_TAG: u8 = 1;

    /// The account the initiator resolves to.
    pub fn account_hash(&self) -> AccountHash {
        match self {
            InitiatorAddr::PublicKey(public_key) => public_key.to_account_hash(),
            InitiatorAddr::AccountHash(account_hash) => *account_hash,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            InitiatorAddr::PublicKey(_) => Self::PUBLIC_KEY_TAG,
            InitiatorAddr::AccountHash(_) => Self::ACCOUNT_HASH_TAG,
        }
    }
}

impl From<PublicKey> for InitiatorAddr {
    fn from(public_key: PublicKey) -> Self {
        InitiatorAddr::PublicKey(public_key)
    }
}

impl From<AccountHash> for InitiatorAddr {
    fn from(account_hash: AccountHash) -> Self {
        InitiatorAddr::AccountHash(account_hash)
    }
}

impl ToBytes for InitiatorAddr {
    fn serialized_length(&self) -> usize {
        let inner = match self {
            InitiatorAddr::PublicKey(public_key) => public_key.serialized_length(),
            InitiatorAddr::AccountHash(account_hash) => account_hash.serialized_length(),
        };
        envelope_length(&[U8_SERIALIZED_LENGTH, inner])
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &self.tag())?;
        let builder = match self {
            InitiatorAddr::PublicKey(public_key) => builder.add_field(1, public_key)?,
            InitiatorAddr::AccountHash(account_hash) => builder.add_field(1, account_hash)?,
        };
        write_envelope(writer, builder)
    }
}

impl FromBytes for InitiatorAddr {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        reader.ensure_max_index(1)?;
        let addr = match reader.field::<u8>(TAG_FIELD)? {
            Self::PUBLIC_KEY_TAG => InitiatorAddr::PublicKey(reader.field(1)?),
            Self::ACCOUNT_HASH_TAG => InitiatorAddr::AccountHash(reader.field(1)?),
            tag => return Err(unknown_tag("initiator address", tag)),
        };
        Ok((addr, rem))
    }
}

// ---------------------------------------------------------------------------
// PricingMode
// ---------------------------------------------------------------------------

/// How the initiator pays for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum PricingMode {
    /// Pay up front for a fixed amount of motes worth of gas.
    PaymentLimited {
        payment_amount: u64,
        gas_price_tolerance: u8,
        standard_payment: bool,
    },
    /// Pay the network's current price for the transaction's size class.
    Fixed {
        additional_computation_factor: u8,
        gas_price_tolerance: u8,
    },
    /// Execution already paid for, evidenced by `receipt`.
    Prepaid { receipt: Digest },
}

impl PricingMode {
    const PAYMENT_LIMITED_TAG: u8 = 0;
    const FIXED_TAG: u8 = 1;
    const PREPAID_TAG: u8 = 2;

    /// `Fixed` with no additional computation and the default gas price
    /// tolerance.
    pub fn default_fixed() -> Self {
        PricingMode::Fixed {
            additional_computation_factor: 0,
            gas_price_tolerance: DEFAULT_GAS_PRICE_TOLERANCE,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            PricingMode::PaymentLimited { .. } => Self::PAYMENT_LIMITED_TAG,
            PricingMode::Fixed { .. } => Self::FIXED_TAG,
            PricingMode::Prepaid { .. } => Self::PREPAID_TAG,
        }
    }
}

impl ToBytes for PricingMode {
    fn serialized_length(&self) -> usize {
        match self {
            PricingMode::PaymentLimited {
                payment_amount,
                gas_price_tolerance,
                standard_payment,
            } => envelope_length(&[
                U8_SERIALIZED_LENGTH,
                payment_amount.serialized_length(),
                gas_price_tolerance.serialized_length(),
                standard_payment.serialized_length(),
            ]),
            PricingMode::Fixed {
                additional_computation_factor,
                gas_price_tolerance,
            } => envelope_length(&[
                U8_SERIALIZED_LENGTH,
                additional_computation_factor.serialized_length(),
                gas_price_tolerance.serialized_length(),
            ]),
            PricingMode::Prepaid { receipt } => {
                envelope_length(&[U8_SERIALIZED_LENGTH, receipt.serialized_length()])
            }
        }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &self.tag())?;
        let builder = match self {
            PricingMode::PaymentLimited {
                payment_amount,
                gas_price_tolerance,
                standard_payment,
            } => builder
                .add_field(1, payment_amount)?
                .add_field(2, gas_price_tolerance)?
                .add_field(3, standard_payment)?,
            PricingMode::Fixed {
                additional_computation_factor,
                gas_price_tolerance,
            } => builder
                .add_field(1, additional_computation_factor)?
                .add_field(2, gas_price_tolerance)?,
            PricingMode::Prepaid { receipt } => builder.add_field(1, receipt)?,
        };
        write_envelope(writer, builder)
    }
}

impl FromBytes for PricingMode {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        let mode = match reader.field::<u8>(TAG_FIELD)? {
            Self::PAYMENT_LIMITED_TAG => {
                reader.ensure_max_index(3)?;
                PricingMode::PaymentLimited {
                    payment_amount: reader.field(1)?,
                    gas_price_tolerance: reader.field(2)?,
                    standard_payment: reader.field(3)?,
                }
            }
            Self::FIXED_TAG => {
                reader.ensure_max_index(2)?;
                PricingMode::Fixed {
                    additional_computation_factor: reader.field(1)?,
                    gas_price_tolerance: reader.field(2)?,
                }
            }
            Self::PREPAID_TAG => {
                reader.ensure_max_index(1)?;
                PricingMode::Prepaid {
                    receipt: reader.field(1)?,
                }
            }
            tag => return Err(unknown_tag("pricing mode", tag)),
        };
        Ok((mode, rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionRuntime / TransactionScheduling
// ---------------------------------------------------------------------------

/// The virtual machine that runs stored or session code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionRuntime {
    #[default]
    VmCasperV1,
}

impl TransactionRuntime {
    const VM_CASPER_V1_TAG: u8 = 0;
}

impl ToBytes for TransactionRuntime {
    fn serialized_length(&self) -> usize {
        envelope_length(&[U8_SERIALIZED_LENGTH])
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &Self::VM_CASPER_V1_TAG)?;
        write_envelope(writer, builder)
    }
}

impl FromBytes for TransactionRuntime {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        reader.ensure_max_index(TAG_FIELD)?;
        match reader.field::<u8>(TAG_FIELD)? {
            Self::VM_CASPER_V1_TAG => Ok((TransactionRuntime::VmCasperV1, rem)),
            tag => Err(unknown_tag("transaction runtime", tag)),
        }
    }
}

/// When the transaction executes. Only immediate execution exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionScheduling {
    #[default]
    Standard,
}

impl TransactionScheduling {
    const STANDARD_TAG: u8 = 0;
}

impl ToBytes for TransactionScheduling {
    fn serialized_length(&self) -> usize {
        envelope_length(&[U8_SERIALIZED_LENGTH])
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &Self::STANDARD_TAG)?;
        write_envelope(writer, builder)
    }
}

impl FromBytes for TransactionScheduling {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        reader.ensure_max_index(TAG_FIELD)?;
        match reader.field::<u8>(TAG_FIELD)? {
            Self::STANDARD_TAG => Ok((TransactionScheduling::Standard, rem)),
            tag => Err(unknown_tag("transaction scheduling", tag)),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionInvocationTarget
// ---------------------------------------------------------------------------

/// Identifies stored code to invoke.
///
/// For the package variants, `version` and `protocol_version_major` are
/// independent: each is present in the encoding exactly when it is `Some`,
/// in both the binary and JSON forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum TransactionInvocationTarget {
    /// A contract by its hash.
    ByHash(Digest),
    /// A contract by a named key in the initiator's account.
    ByName(String),
    /// A package by hash. `version: None` selects the latest version.
    ByPackageHash {
        addr: Digest,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol_version_major: Option<u32>,
    },
    /// A package by a named key in the initiator's account.
    ByPackageName {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol_version_major: Option<u32>,
    },
}

impl TransactionInvocationTarget {
    const BY_HASH_TAG: u8 = 0;
    const BY_NAME_TAG: u8 = 1;
    const BY_PACKAGE_HASH_TAG: u8 = 2;
    const BY_PACKAGE_NAME_TAG: u8 = 3;

    fn tag(&self) -> u8 {
        match self {
            TransactionInvocationTarget::ByHash(_) => Self::BY_HASH_TAG,
            TransactionInvocationTarget::ByName(_) => Self::BY_NAME_TAG,
            TransactionInvocationTarget::ByPackageHash { .. } => Self::BY_PACKAGE_HASH_TAG,
            TransactionInvocationTarget::ByPackageName { .. } => Self::BY_PACKAGE_NAME_TAG,
        }
    }
}

fn package_field_lengths(
    first: usize,
    version: &Option<u32>,
    protocol_version_major: &Option<u32>,
) -> Vec<usize> {
    let mut lengths = vec![U8_SERIALIZED_LENGTH, first];
    lengths.extend(version.as_ref().map(ToBytes::serialized_length));
    lengths.extend(protocol_version_major.as_ref().map(ToBytes::serialized_length));
    lengths
}

impl ToBytes for TransactionInvocationTarget {
    fn serialized_length(&self) -> usize {
        match self {
            TransactionInvocationTarget::ByHash(hash) => {
                envelope_length(&[U8_SERIALIZED_LENGTH, hash.serialized_length()])
            }
            TransactionInvocationTarget::ByName(name) => {
                envelope_length(&[U8_SERIALIZED_LENGTH, name.serialized_length()])
            }
            TransactionInvocationTarget::ByPackageHash {
                addr,
                version,
                protocol_version_major,
            } => envelope_length(&package_field_lengths(
                addr.serialized_length(),
                version,
                protocol_version_major,
            )),
            TransactionInvocationTarget::ByPackageName {
                name,
                version,
                protocol_version_major,
            } => envelope_length(&package_field_lengths(
                name.serialized_length(),
                version,
                protocol_version_major,
            )),
        }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &self.tag())?;
        let builder = match self {
            TransactionInvocationTarget::ByHash(hash) => builder.add_field(1, hash)?,
            TransactionInvocationTarget::ByName(name) => builder.add_field(1, name)?,
            TransactionInvocationTarget::ByPackageHash {
                addr,
                version,
                protocol_version_major,
            } => builder
                .add_field(1, addr)?
                .add_optional_field(2, version.as_ref())?
                .add_optional_field(3, protocol_version_major.as_ref())?,
            TransactionInvocationTarget::ByPackageName {
                name,
                version,
                protocol_version_major,
            } => builder
                .add_field(1, name)?
                .add_optional_field(2, version.as_ref())?
                .add_optional_field(3, protocol_version_major.as_ref())?,
        };
        write_envelope(writer, builder)
    }
}

impl FromBytes for TransactionInvocationTarget {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        let target = match reader.field::<u8>(TAG_FIELD)? {
            Self::BY_HASH_TAG => {
                reader.ensure_max_index(1)?;
                TransactionInvocationTarget::ByHash(reader.field(1)?)
            }
            Self::BY_NAME_TAG => {
                reader.ensure_max_index(1)?;
                TransactionInvocationTarget::ByName(reader.field(1)?)
            }
            Self::BY_PACKAGE_HASH_TAG => {
                reader.ensure_max_index(3)?;
                TransactionInvocationTarget::ByPackageHash {
                    addr: reader.field(1)?,
                    version: reader.optional_field(2)?,
                    protocol_version_major: reader.optional_field(3)?,
                }
            }
            Self::BY_PACKAGE_NAME_TAG => {
                reader.ensure_max_index(3)?;
                TransactionInvocationTarget::ByPackageName {
                    name: reader.field(1)?,
                    version: reader.optional_field(2)?,
                    protocol_version_major: reader.optional_field(3)?,
                }
            }
            tag => return Err(unknown_tag("invocation target", tag)),
        };
        Ok((target, rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionTarget
// ---------------------------------------------------------------------------

/// What executes: a native system operation, stored code, or inline wasm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum TransactionTarget {
    Native,
    Stored {
        id: TransactionInvocationTarget,
        runtime: TransactionRuntime,
    },
    Session {
        is_install_upgrade: bool,
        module_bytes: Bytes,
        runtime: TransactionRuntime,
    },
}

impl TransactionTarget {
    const NATIVE_TAG: u8 = 0;
    const STORED_TAG: u8 = 1;
    const SESSION_TAG: u8 = 2;

    fn tag(&self) -> u8 {
        match self {
            TransactionTarget::Native => Self::NATIVE_TAG,
            TransactionTarget::Stored { .. } => Self::STORED_TAG,
            TransactionTarget::Session { .. } => Self::SESSION_TAG,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            TransactionTarget::Native => "native",
            TransactionTarget::Stored { .. } => "stored",
            TransactionTarget::Session { .. } => "session",
        }
    }
}

impl ToBytes for TransactionTarget {
    fn serialized_length(&self) -> usize {
        match self {
            TransactionTarget::Native => envelope_length(&[U8_SERIALIZED_LENGTH]),
            TransactionTarget::Stored { id, runtime } => envelope_length(&[
                U8_SERIALIZED_LENGTH,
                id.serialized_length(),
                runtime.serialized_length(),
            ]),
            TransactionTarget::Session {
                is_install_upgrade,
                module_bytes,
                runtime,
            } => envelope_length(&[
                U8_SERIALIZED_LENGTH,
                is_install_upgrade.serialized_length(),
                runtime.serialized_length(),
                module_bytes.serialized_length(),
            ]),
        }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &self.tag())?;
        let builder = match self {
            TransactionTarget::Native => builder,
            TransactionTarget::Stored { id, runtime } => {
                builder.add_field(1, id)?.add_field(2, runtime)?
            }
            TransactionTarget::Session {
                is_install_upgrade,
                module_bytes,
                runtime,
            } => builder
                .add_field(1, is_install_upgrade)?
                .add_field(2, runtime)?
                .add_field(3, module_bytes)?,
        };
        write_envelope(writer, builder)
    }
}

impl FromBytes for TransactionTarget {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        let target = match reader.field::<u8>(TAG_FIELD)? {
            Self::NATIVE_TAG => {
                reader.ensure_max_index(TAG_FIELD)?;
                TransactionTarget::Native
            }
            Self::STORED_TAG => {
                reader.ensure_max_index(2)?;
                TransactionTarget::Stored {
                    id: reader.field(1)?,
                    runtime: reader.field(2)?,
                }
            }
            Self::SESSION_TAG => {
                reader.ensure_max_index(3)?;
                TransactionTarget::Session {
                    is_install_upgrade: reader.field(1)?,
                    runtime: reader.field(2)?,
                    module_bytes: reader.field(3)?,
                }
            }
            tag => return Err(unknown_tag("transaction target", tag)),
        };
        Ok((target, rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionEntryPoint
// ---------------------------------------------------------------------------

/// The function a transaction invokes.
///
/// `Call` runs session wasm, `Custom` names an entry point of stored code,
/// and the rest are native system operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum TransactionEntryPoint {
    Call,
    Custom(String),
    Transfer,
    AddBid,
    WithdrawBid,
    Delegate,
    Undelegate,
    Redelegate,
    ActivateBid,
    ChangeBidPublicKey,
    AddReservations,
    CancelReservations,
}

impl TransactionEntryPoint {
    const CALL_TAG: u8 = 0;
    const CUSTOM_TAG: u8 = 1;
    const TRANSFER_TAG: u8 = 2;
    const ADD_BID_TAG: u8 = 3;
    const WITHDRAW_BID_TAG: u8 = 4;
    const DELEGATE_TAG: u8 = 5;
    const UNDELEGATE_TAG: u8 = 6;
    const REDELEGATE_TAG: u8 = 7;
    const ACTIVATE_BID_TAG: u8 = 8;
    const CHANGE_BID_PUBLIC_KEY_TAG: u8 = 9;
    const ADD_RESERVATIONS_TAG: u8 = 10;
    const CANCEL_RESERVATIONS_TAG: u8 = 11;

    /// `true` for the system operations that only a native target can run.
    pub fn is_native(&self) -> bool {
        !matches!(
            self,
            TransactionEntryPoint::Call | TransactionEntryPoint::Custom(_)
        )
    }

    fn tag(&self) -> u8 {
        match self {
            TransactionEntryPoint::Call => Self::CALL_TAG,
            TransactionEntryPoint::Custom(_) => Self::CUSTOM_TAG,
            TransactionEntryPoint::Transfer => Self::TRANSFER_TAG,
            TransactionEntryPoint::AddBid => Self::ADD_BID_TAG,
            TransactionEntryPoint::WithdrawBid => Self::WITHDRAW_BID_TAG,
            TransactionEntryPoint::Delegate => Self::DELEGATE_TAG,
            TransactionEntryPoint::Undelegate => Self::UNDELEGATE_TAG,
            TransactionEntryPoint::Redelegate => Self::REDELEGATE_TAG,
            TransactionEntryPoint::ActivateBid => Self::ACTIVATE_BID_TAG,
            TransactionEntryPoint::ChangeBidPublicKey => Self::CHANGE_BID_PUBLIC_KEY_TAG,
            TransactionEntryPoint::AddReservations => Self::ADD_RESERVATIONS_TAG,
            TransactionEntryPoint::CancelReservations => Self::CANCEL_RESERVATIONS_TAG,
        }
    }
}

impl std::fmt::Display for TransactionEntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionEntryPoint::Custom(name) => write!(f, "custom({name})"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl ToBytes for TransactionEntryPoint {
    fn serialized_length(&self) -> usize {
        match self {
            TransactionEntryPoint::Custom(name) => {
                envelope_length(&[U8_SERIALIZED_LENGTH, name.serialized_length()])
            }
            _ => envelope_length(&[U8_SERIALIZED_LENGTH]),
        }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = CalltableBuilder::new().add_field(TAG_FIELD, &self.tag())?;
        let builder = match self {
            TransactionEntryPoint::Custom(name) => builder.add_field(1, name)?,
            _ => builder,
        };
        write_envelope(writer, builder)
    }
}

impl FromBytes for TransactionEntryPoint {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        let tag = reader.field::<u8>(TAG_FIELD)?;
        if tag == Self::CUSTOM_TAG {
            reader.ensure_max_index(1)?;
            return Ok((TransactionEntryPoint::Custom(reader.field(1)?), rem));
        }
        reader.ensure_max_index(TAG_FIELD)?;
        let entry_point = match tag {
            Self::CALL_TAG => TransactionEntryPoint::Call,
            Self::TRANSFER_TAG => TransactionEntryPoint::Transfer,
            Self::ADD_BID_TAG => TransactionEntryPoint::AddBid,
            Self::WITHDRAW_BID_TAG => TransactionEntryPoint::WithdrawBid,
            Self::DELEGATE_TAG => TransactionEntryPoint::Delegate,
            Self::UNDELEGATE_TAG => TransactionEntryPoint::Undelegate,
            Self::REDELEGATE_TAG => TransactionEntryPoint::Redelegate,
            Self::ACTIVATE_BID_TAG => TransactionEntryPoint::ActivateBid,
            Self::CHANGE_BID_PUBLIC_KEY_TAG => TransactionEntryPoint::ChangeBidPublicKey,
            Self::ADD_RESERVATIONS_TAG => TransactionEntryPoint::AddReservations,
            Self::CANCEL_RESERVATIONS_TAG => TransactionEntryPoint::CancelReservations,
            tag => return Err(unknown_tag("entry point", tag)),
        };
        Ok((entry_point, rem))
    }
}

// ---------------------------------------------------------------------------
// TransactionArgs
// ---------------------------------------------------------------------------

/// Arguments passed to the entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum TransactionArgs {
    /// Named, typed arguments.
    Named(RuntimeArgs),
    /// Opaque pre-encoded arguments, interpreted by the callee.
    Bytesrepr(Bytes),
}

impl TransactionArgs {
    const NAMED_TAG: u8 = 0;
    const BYTESREPR_TAG: u8 = 1;

    /// The named arguments, if this is the `Named` form.
    pub fn as_named(&self) -> Option<&RuntimeArgs> {
        match self {
            TransactionArgs::Named(args) => Some(args),
            TransactionArgs::Bytesrepr(_) => None,
        }
    }
}

impl Default for TransactionArgs {
    fn default() -> Self {
        TransactionArgs::Named(RuntimeArgs::new())
    }
}

impl ToBytes for TransactionArgs {
    fn serialized_length(&self) -> usize {
        let inner = match self {
            TransactionArgs::Named(args) => args.serialized_length(),
            TransactionArgs::Bytesrepr(bytes) => bytes.serialized_length(),
        };
        envelope_length(&[U8_SERIALIZED_LENGTH, inner])
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let builder = match self {
            TransactionArgs::Named(args) => CalltableBuilder::new()
                .add_field(TAG_FIELD, &Self::NAMED_TAG)?
                .add_field(1, args)?,
            TransactionArgs::Bytesrepr(bytes) => CalltableBuilder::new()
                .add_field(TAG_FIELD, &Self::BYTESREPR_TAG)?
                .add_field(1, bytes)?,
        };
        write_envelope(writer, builder)
    }
}

impl FromBytes for TransactionArgs {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (reader, rem) = CalltableReader::from_bytes(bytes)?;
        reader.ensure_max_index(1)?;
        let args = match reader.field::<u8>(TAG_FIELD)? {
            Self::NAMED_TAG => TransactionArgs::Named(reader.field(1)?),
            Self::BYTESREPR_TAG => TransactionArgs::Bytesrepr(reader.field(1)?),
            tag => return Err(unknown_tag("transaction args", tag)),
        };
        Ok((args, rem))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roundtrip<T: ToBytes + FromBytes + PartialEq + std::fmt::Debug>(value: &T) {
        let bytes = value.to_bytes().unwrap();
        assert_eq!(bytes.len(), value.serialized_length());
        assert_eq!(&bytesrepr::deserialize::<T>(&bytes).unwrap(), value);
    }

    #[test]
    fn scheduling_envelope_layout() {
        assert_eq!(
            TransactionScheduling::Standard.to_bytes().unwrap(),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn package_optionals_are_absent_fields() {
        let target = TransactionInvocationTarget::ByPackageHash {
            addr: Digest::hash(b"package"),
            version: None,
            protocol_version_major: Some(2),
        };
        let bytes = target.to_bytes().unwrap();
        let (reader, _) = CalltableReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.optional_field::<u32>(2).unwrap(), None);
        assert_eq!(reader.field::<u32>(3).unwrap(), 2);
        roundtrip(&target);
    }

    #[test]
    fn package_version_zero_is_present() {
        let target = TransactionInvocationTarget::ByPackageName {
            name: "pkg".into(),
            version: Some(0),
            protocol_version_major: None,
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json, json!({"ByPackageName": {"name": "pkg", "version": 0}}));
        roundtrip(&target);
    }

    #[test]
    fn package_json_accepts_missing_optionals() {
        let json = json!({"ByPackageName": {"name": "pkg"}});
        assert_eq!(
            serde_json::from_value::<TransactionInvocationTarget>(json).unwrap(),
            TransactionInvocationTarget::ByPackageName {
                name: "pkg".into(),
                version: None,
                protocol_version_major: None,
            }
        );
    }

    #[test]
    fn every_entry_point_roundtrips() {
        let entry_points = [
            TransactionEntryPoint::Call,
            TransactionEntryPoint::Custom("mint".into()),
            TransactionEntryPoint::Transfer,
            TransactionEntryPoint::AddBid,
            TransactionEntryPoint::WithdrawBid,
            TransactionEntryPoint::Delegate,
            TransactionEntryPoint::Undelegate,
            TransactionEntryPoint::Redelegate,
            TransactionEntryPoint::ActivateBid,
            TransactionEntryPoint::ChangeBidPublicKey,
            TransactionEntryPoint::AddReservations,
            TransactionEntryPoint::CancelReservations,
        ];
        for (tag, entry_point) in entry_points.iter().enumerate() {
            assert_eq!(entry_point.tag() as usize, tag);
            roundtrip(entry_point);
        }
        assert!(!TransactionEntryPoint::Call.is_native());
        assert!(TransactionEntryPoint::Delegate.is_native());
    }

    #[test]
    fn target_variants_roundtrip() {
        roundtrip(&TransactionTarget::Native);
        roundtrip(&TransactionTarget::Stored {
            id: TransactionInvocationTarget::ByName("counter".into()),
            runtime: TransactionRuntime::VmCasperV1,
        });
        roundtrip(&TransactionTarget::Session {
            is_install_upgrade: true,
            module_bytes: Bytes::from(vec![0, 97, 115, 109]),
            runtime: TransactionRuntime::VmCasperV1,
        });
    }

    #[test]
    fn pricing_mode_json_and_bytes() {
        let mode = PricingMode::PaymentLimited {
            payment_amount: 2_500_000_000,
            gas_price_tolerance: 1,
            standard_payment: true,
        };
        assert_eq!(
            serde_json::to_value(&mode).unwrap(),
            json!({"PaymentLimited": {
                "payment_amount": 2_500_000_000u64,
                "gas_price_tolerance": 1,
                "standard_payment": true
            }})
        );
        roundtrip(&mode);
        roundtrip(&PricingMode::Fixed {
            additional_computation_factor: 0,
            gas_price_tolerance: 5,
        });
        roundtrip(&PricingMode::Prepaid {
            receipt: Digest::hash(b"receipt"),
        });
    }

    #[test]
    fn unit_variants_serialize_as_strings() {
        assert_eq!(serde_json::to_value(TransactionTarget::Native).unwrap(), json!("Native"));
        assert_eq!(
            serde_json::to_value(TransactionRuntime::VmCasperV1).unwrap(),
            json!("VmCasperV1")
        );
        assert_eq!(
            serde_json::to_value(TransactionEntryPoint::Custom("inc".into())).unwrap(),
            json!({"Custom": "inc"})
        );
    }

    #[test]
    fn unknown_tags_rejected() {
        let bytes = CalltableBuilder::new()
            .add_field(TAG_FIELD, &9u8)
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(
            bytesrepr::deserialize::<TransactionTarget>(&bytes),
            Err(bytesrepr::Error::UnknownTag {
                context: "transaction target",
                tag: 9
            })
        );
        assert!(serde_json::from_value::<TransactionTarget>(json!("Wasm")).is_err());
    }

    #[test]
    fn initiator_resolves_account_hash() {
        let key = crate::crypto::KeyPair::generate(crate::crypto::Algorithm::Secp256k1);
        let addr = InitiatorAddr::from(key.public_key().clone());
        assert_eq!(addr.account_hash(), key.public_key().to_account_hash());
        roundtrip(&addr);
        roundtrip(&InitiatorAddr::AccountHash(AccountHash::new([3; 32])));
    }
}
