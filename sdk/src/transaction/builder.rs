//! Fluent construction of [`TransactionV1`]s.
//!
//! Each transaction kind has its own constructor that fixes the target, the
//! entry point and the arguments; the remaining knobs (chain name, initiator,
//! timing, pricing) are set with chained calls in any order. [`build`]
//! checks that every required field is present before anything is hashed.
//!
//! [`build`]: TransactionV1Builder::build

use primitive_types::U512;
use thiserror::Error;
use tracing::debug;

use super::types::{
    InitiatorAddr, PricingMode, TransactionArgs, TransactionEntryPoint,
    TransactionInvocationTarget, TransactionRuntime, TransactionScheduling, TransactionTarget,
};
use super::v1::{TransactionV1, TransactionV1Error, TransactionV1Fields, TransactionV1Payload};
use crate::bytesrepr::Bytes;
use crate::cl::{CLValueError, RuntimeArgs, URef};
use crate::config::{
    ARG_AMOUNT, ARG_DELEGATOR, ARG_ID, ARG_NEW_VALIDATOR, ARG_SOURCE, ARG_VALIDATOR,
    DEFAULT_TTL_MILLIS,
};
use crate::crypto::{Digest, PublicKey};
use crate::deploy::{DeployError, TransferTarget};
use crate::time::{TimeDiff, Timestamp};

/// Errors raised by [`TransactionV1Builder::build`] and
/// [`DeployBuilder::build`](crate::deploy::DeployBuilder::build).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderError {
    /// A required field was never set.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Arguments were supplied for a kind whose arguments are fixed by its
    /// constructor.
    #[error("{0} transactions take no custom arguments")]
    FixedArguments(&'static str),

    /// An argument could not be encoded as a CLValue.
    #[error("invalid argument: {0}")]
    Argument(#[from] CLValueError),

    /// The assembled deploy violates a construction rule.
    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// The assembled transaction violates a construction rule.
    #[error(transparent)]
    Transaction(#[from] TransactionV1Error),
}

/// Staging area for a [`TransactionV1`], consumed by [`build`](Self::build).
///
/// # Example
///
/// ```rust,no_run
/// use casper_sdk::crypto::{Algorithm, KeyPair};
/// use casper_sdk::transaction::{PricingMode, TransactionV1Builder};
///
/// let sender = KeyPair::generate(Algorithm::Ed25519);
/// let recipient = KeyPair::generate(Algorithm::Ed25519);
/// let mut transaction = TransactionV1Builder::new_transfer(
///     2_500_000_000u64,
///     None,
///     recipient.public_key().clone(),
///     Some(1),
/// )
/// .unwrap()
/// .chain_name("casper-test")
/// .initiator_addr(sender.public_key().clone())
/// .pricing_mode(PricingMode::default_fixed())
/// .build()
/// .unwrap();
///
/// transaction.sign(&sender);
/// assert!(transaction.verify().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct TransactionV1Builder {
    kind: &'static str,
    chain_name: Option<String>,
    initiator_addr: Option<InitiatorAddr>,
    timestamp: Option<Timestamp>,
    ttl: TimeDiff,
    pricing_mode: Option<PricingMode>,
    args: TransactionArgs,
    custom_args: bool,
    target: TransactionTarget,
    entry_point: TransactionEntryPoint,
    scheduling: TransactionScheduling,
}

impl TransactionV1Builder {
    fn with_target(
        kind: &'static str,
        target: TransactionTarget,
        entry_point: TransactionEntryPoint,
        args: RuntimeArgs,
    ) -> Self {
        TransactionV1Builder {
            kind,
            chain_name: None,
            initiator_addr: None,
            timestamp: None,
            ttl: TimeDiff::from_millis(DEFAULT_TTL_MILLIS),
            pricing_mode: None,
            args: TransactionArgs::Named(args),
            custom_args: false,
            target,
            entry_point,
            scheduling: TransactionScheduling::Standard,
        }
    }

    fn stored(
        kind: &'static str,
        id: TransactionInvocationTarget,
        entry_point: impl Into<String>,
    ) -> Self {
        let target = TransactionTarget::Stored {
            id,
            runtime: TransactionRuntime::VmCasperV1,
        };
        let entry_point = TransactionEntryPoint::Custom(entry_point.into());
        Self::with_target(kind, target, entry_point, RuntimeArgs::new())
    }

    // -- Native ----------------------------------------------------------------

    /// A native motes transfer. `source` and `id` are only sent when set.
    pub fn new_transfer(
        amount: impl Into<U512>,
        source: Option<URef>,
        target: impl Into<TransferTarget>,
        id: Option<u64>,
    ) -> Result<Self, BuilderError> {
        let mut args = RuntimeArgs::new();
        args.insert(ARG_AMOUNT, amount.into())?;
        if let Some(source) = source {
            args.insert(ARG_SOURCE, source)?;
        }
        TransferTarget::insert_into(target.into(), &mut args)?;
        if let Some(id) = id {
            args.insert(ARG_ID, id)?;
        }
        Ok(Self::with_target(
            "native-transfer",
            TransactionTarget::Native,
            TransactionEntryPoint::Transfer,
            args,
        ))
    }

    /// Stakes `amount` with `validator`. The delegator is the initiator.
    pub fn new_delegate(
        delegator: PublicKey,
        validator: PublicKey,
        amount: impl Into<U512>,
    ) -> Result<Self, BuilderError> {
        Self::new_staking(
            "native-delegate",
            TransactionEntryPoint::Delegate,
            delegator,
            validator,
            amount.into(),
        )
    }

    /// Withdraws `amount` of stake from `validator`.
    pub fn new_undelegate(
        delegator: PublicKey,
        validator: PublicKey,
        amount: impl Into<U512>,
    ) -> Result<Self, BuilderError> {
        Self::new_staking(
            "native-undelegate",
            TransactionEntryPoint::Undelegate,
            delegator,
            validator,
            amount.into(),
        )
    }

    /// Moves `amount` of stake from `validator` to `new_validator`.
    pub fn new_redelegate(
        delegator: PublicKey,
        validator: PublicKey,
        new_validator: PublicKey,
        amount: impl Into<U512>,
    ) -> Result<Self, BuilderError> {
        let mut builder = Self::new_staking(
            "native-redelegate",
            TransactionEntryPoint::Redelegate,
            delegator,
            validator,
            amount.into(),
        )?;
        if let TransactionArgs::Named(args) = &mut builder.args {
            args.insert(ARG_NEW_VALIDATOR, new_validator)?;
        }
        Ok(builder)
    }

    fn new_staking(
        kind: &'static str,
        entry_point: TransactionEntryPoint,
        delegator: PublicKey,
        validator: PublicKey,
        amount: U512,
    ) -> Result<Self, BuilderError> {
        let mut args = RuntimeArgs::new();
        args.insert(ARG_DELEGATOR, delegator.clone())?;
        args.insert(ARG_VALIDATOR, validator)?;
        args.insert(ARG_AMOUNT, amount)?;
        Ok(
            Self::with_target(kind, TransactionTarget::Native, entry_point, args)
                .initiator_addr(delegator),
        )
    }

    // -- Stored ----------------------------------------------------------------

    /// Calls `entry_point` on the contract with this hash.
    pub fn new_contract_call_by_hash(hash: Digest, entry_point: impl Into<String>) -> Self {
        Self::stored(
            "contract-call-by-hash",
            TransactionInvocationTarget::ByHash(hash),
            entry_point,
        )
    }

    /// Calls `entry_point` on the contract under this named key.
    pub fn new_contract_call_by_name(
        name: impl Into<String>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self::stored(
            "contract-call-by-name",
            TransactionInvocationTarget::ByName(name.into()),
            entry_point,
        )
    }

    /// Calls `entry_point` on a package version. `version` and
    /// `protocol_version_major` are independent; `None` leaves either out.
    pub fn new_package_call_by_hash(
        addr: Digest,
        version: Option<u32>,
        protocol_version_major: Option<u32>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self::stored(
            "package-call-by-hash",
            TransactionInvocationTarget::ByPackageHash {
                addr,
                version,
                protocol_version_major,
            },
            entry_point,
        )
    }

    /// Like [`new_package_call_by_hash`](Self::new_package_call_by_hash), for
    /// a package under a named key.
    pub fn new_package_call_by_name(
        name: impl Into<String>,
        version: Option<u32>,
        protocol_version_major: Option<u32>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self::stored(
            "package-call-by-name",
            TransactionInvocationTarget::ByPackageName {
                name: name.into(),
                version,
                protocol_version_major,
            },
            entry_point,
        )
    }

    // -- Session ---------------------------------------------------------------

    /// Runs inline wasm. `is_install_upgrade` marks contract installs.
    pub fn new_session(is_install_upgrade: bool, module_bytes: impl Into<Bytes>) -> Self {
        let target = TransactionTarget::Session {
            is_install_upgrade,
            module_bytes: module_bytes.into(),
            runtime: TransactionRuntime::VmCasperV1,
        };
        Self::with_target("session", target, TransactionEntryPoint::Call, RuntimeArgs::new())
    }

    // -- Knobs -----------------------------------------------------------------

    pub fn chain_name(mut self, chain_name: impl Into<String>) -> Self {
        self.chain_name = Some(chain_name.into());
        self
    }

    pub fn initiator_addr(mut self, initiator_addr: impl Into<InitiatorAddr>) -> Self {
        self.initiator_addr = Some(initiator_addr.into());
        self
    }

    /// Defaults to the time of [`build`](Self::build).
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn ttl(mut self, ttl: TimeDiff) -> Self {
        self.ttl = ttl;
        self
    }

    /// Required. [`PricingMode::default_fixed`] suits most calls.
    pub fn pricing_mode(mut self, pricing_mode: PricingMode) -> Self {
        self.pricing_mode = Some(pricing_mode);
        self
    }

    /// Sets the arguments of a contract call or session. Native kinds carry
    /// theirs already, and [`build`](Self::build) rejects a replacement.
    pub fn runtime_args(mut self, args: RuntimeArgs) -> Self {
        self.args = TransactionArgs::Named(args);
        self.custom_args = true;
        self
    }

    /// Like [`runtime_args`](Self::runtime_args), with opaque pre-encoded
    /// bytes.
    pub fn bytesrepr_args(mut self, args: impl Into<Bytes>) -> Self {
        self.args = TransactionArgs::Bytesrepr(args.into());
        self.custom_args = true;
        self
    }

    /// Checks required fields, then hashes the payload.
    pub fn build(self) -> Result<TransactionV1, BuilderError> {
        let chain_name = self.chain_name.ok_or(BuilderError::MissingField("chain_name"))?;
        let initiator_addr = self
            .initiator_addr
            .ok_or(BuilderError::MissingField("initiator_addr"))?;
        let pricing_mode = self
            .pricing_mode
            .ok_or(BuilderError::MissingField("pricing_mode"))?;
        if self.custom_args && self.target == TransactionTarget::Native {
            return Err(BuilderError::FixedArguments(self.kind));
        }
        let timestamp = self.timestamp.unwrap_or_else(Timestamp::now);

        let fields = TransactionV1Fields {
            args: self.args,
            entry_point: self.entry_point,
            scheduling: self.scheduling,
            target: self.target,
        };
        let payload = TransactionV1Payload::new(
            initiator_addr,
            timestamp,
            self.ttl,
            chain_name,
            pricing_mode,
            fields,
        );
        let transaction = TransactionV1::new(payload)?;
        debug!(
            kind = self.kind,
            hash = %transaction.hash(),
            chain_name = transaction.chain_name(),
            "transaction built"
        );
        Ok(transaction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Algorithm, KeyPair};

    fn key(seed: u8) -> PublicKey {
        KeyPair::from_secret_bytes(Algorithm::Ed25519, &[seed; 32])
            .unwrap()
            .public_key()
            .clone()
    }

    fn named_args(transaction: &TransactionV1) -> Vec<String> {
        transaction
            .payload()
            .fields()
            .args
            .as_named()
            .unwrap()
            .iter()
            .map(|arg| arg.name().to_string())
            .collect()
    }

    #[test]
    fn missing_fields_reported_regardless_of_order() {
        let builder = TransactionV1Builder::new_contract_call_by_name("counter", "inc");
        assert_eq!(
            builder.clone().initiator_addr(key(1)).build().unwrap_err(),
            BuilderError::MissingField("chain_name")
        );
        assert_eq!(
            builder.clone().chain_name("casper-test").build().unwrap_err(),
            BuilderError::MissingField("initiator_addr")
        );
        assert_eq!(
            builder
                .clone()
                .initiator_addr(key(1))
                .chain_name("casper-test")
                .build()
                .unwrap_err(),
            BuilderError::MissingField("pricing_mode")
        );
        assert!(builder
            .pricing_mode(PricingMode::default_fixed())
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .build()
            .is_ok());
    }

    #[test]
    fn pricing_mode_is_taken_as_given() {
        let pricing_mode = PricingMode::PaymentLimited {
            payment_amount: 2_500_000_000,
            gas_price_tolerance: 3,
            standard_payment: true,
        };
        let transaction = TransactionV1Builder::new_contract_call_by_name("counter", "inc")
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .pricing_mode(pricing_mode.clone())
            .build()
            .unwrap();
        assert_eq!(transaction.payload().pricing_mode(), &pricing_mode);
        assert_eq!(
            PricingMode::default_fixed(),
            PricingMode::Fixed {
                additional_computation_factor: 0,
                gas_price_tolerance: 1
            }
        );
    }

    #[test]
    fn native_kinds_reject_custom_args() {
        let mut extra = RuntimeArgs::new();
        extra.insert("amount", U512::from(1u64)).unwrap();
        let err = TransactionV1Builder::new_delegate(key(1), key(2), 500u64)
            .unwrap()
            .chain_name("casper-test")
            .pricing_mode(PricingMode::default_fixed())
            .runtime_args(extra)
            .build()
            .unwrap_err();
        assert_eq!(err, BuilderError::FixedArguments("native-delegate"));

        let err = TransactionV1Builder::new_transfer(10u64, None, key(2), None)
            .unwrap()
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .pricing_mode(PricingMode::default_fixed())
            .bytesrepr_args(vec![0u8, 0, 0, 0])
            .build()
            .unwrap_err();
        assert_eq!(err, BuilderError::FixedArguments("native-transfer"));
    }

    #[test]
    fn contract_calls_accept_custom_args() {
        let mut args = RuntimeArgs::new();
        args.insert("step", 2u32).unwrap();
        let transaction = TransactionV1Builder::new_contract_call_by_name("counter", "inc")
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .pricing_mode(PricingMode::default_fixed())
            .runtime_args(args)
            .build()
            .unwrap();
        assert_eq!(named_args(&transaction), ["step"]);
    }

    #[test]
    fn transfer_omits_unset_source_and_id() {
        let transaction = TransactionV1Builder::new_transfer(10u64, None, key(2), None)
            .unwrap()
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .pricing_mode(PricingMode::default_fixed())
            .build()
            .unwrap();
        assert_eq!(named_args(&transaction), ["amount", "target"]);
        assert_eq!(transaction.payload().fields().target, TransactionTarget::Native);
        assert_eq!(
            transaction.payload().fields().entry_point,
            TransactionEntryPoint::Transfer
        );
    }

    #[test]
    fn redelegate_args_and_initiator() {
        let transaction = TransactionV1Builder::new_redelegate(key(1), key(2), key(3), 500u64)
            .unwrap()
            .chain_name("casper-test")
            .pricing_mode(PricingMode::default_fixed())
            .build()
            .unwrap();
        assert_eq!(
            named_args(&transaction),
            ["delegator", "validator", "amount", "new_validator"]
        );
        assert_eq!(
            *transaction.payload().initiator_addr(),
            InitiatorAddr::PublicKey(key(1))
        );
    }

    #[test]
    fn session_uses_call_entry_point() {
        let transaction = TransactionV1Builder::new_session(true, vec![0, 97, 115, 109])
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .pricing_mode(PricingMode::default_fixed())
            .build()
            .unwrap();
        assert_eq!(transaction.payload().fields().entry_point, TransactionEntryPoint::Call);
    }

    #[test]
    fn invalid_payload_surfaces_as_transaction_error() {
        let err = TransactionV1Builder::new_contract_call_by_hash(Digest::hash(b"c"), "run")
            .chain_name("casper-test")
            .initiator_addr(key(1))
            .ttl(TimeDiff::from_millis(crate::config::MAX_TTL_MILLIS + 1))
            .pricing_mode(PricingMode::default_fixed())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuilderError::Transaction(TransactionV1Error::TtlTooLong { .. })
        ));
    }
}
