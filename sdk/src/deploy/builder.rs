//! Fluent construction of [`Deploy`]s.
//!
//! One constructor per deploy kind sets the session code; everything else
//! is a chained setter. Required: account, chain name, payment, session.
//! Staking constructors go through the auction system contract, whose hash
//! differs per network and is therefore a parameter.

use primitive_types::U512;
use tracing::debug;

use super::executable::{ExecutableDeployItem, TransferTarget};
use super::header::DeployHash;
use super::Deploy;
use crate::bytesrepr::Bytes;
use crate::cl::{RuntimeArgs, URef};
use crate::config::{
    ARG_AMOUNT, ARG_DELEGATOR, ARG_NEW_VALIDATOR, ARG_VALIDATOR, AUCTION_DELEGATE_ENTRY_POINT,
    AUCTION_REDELEGATE_ENTRY_POINT, AUCTION_UNDELEGATE_ENTRY_POINT, DEFAULT_GAS_PRICE,
    DEFAULT_TTL_MILLIS,
};
use crate::crypto::{Digest, PublicKey};
use crate::time::{TimeDiff, Timestamp};
use crate::transaction::BuilderError;

#[derive(Debug, Clone)]
enum Payment {
    Standard(U512),
    Custom(ExecutableDeployItem),
}

/// Staging area for a [`Deploy`], consumed by [`build`](Self::build).
///
/// # Example
///
/// ```rust,no_run
/// use casper_sdk::crypto::{Algorithm, KeyPair};
/// use casper_sdk::deploy::DeployBuilder;
///
/// let sender = KeyPair::generate(Algorithm::Ed25519);
/// let recipient = KeyPair::generate(Algorithm::Secp256k1);
/// let mut deploy = DeployBuilder::new_transfer(
///     2_500_000_000u64,
///     None,
///     recipient.public_key().clone(),
///     Some(42),
/// )
/// .unwrap()
/// .account(sender.public_key().clone())
/// .chain_name("casper-test")
/// .standard_payment(100_000_000u64)
/// .build()
/// .unwrap();
///
/// deploy.sign(&sender);
/// ```
#[derive(Debug, Clone)]
pub struct DeployBuilder {
    kind: &'static str,
    account: Option<PublicKey>,
    chain_name: Option<String>,
    payment: Option<Payment>,
    session: Option<ExecutableDeployItem>,
    timestamp: Option<Timestamp>,
    ttl: TimeDiff,
    gas_price: u64,
    dependencies: Vec<DeployHash>,
}

impl Default for DeployBuilder {
    fn default() -> Self {
        DeployBuilder {
            kind: "custom",
            account: None,
            chain_name: None,
            payment: None,
            session: None,
            timestamp: None,
            ttl: TimeDiff::from_millis(DEFAULT_TTL_MILLIS),
            gas_price: DEFAULT_GAS_PRICE,
            dependencies: Vec::new(),
        }
    }
}

impl DeployBuilder {
    /// An empty builder; set the session with [`session`](Self::session).
    pub fn new() -> Self {
        Self::default()
    }

    fn with_session(kind: &'static str, session: ExecutableDeployItem) -> Self {
        DeployBuilder {
            kind,
            session: Some(session),
            ..Self::default()
        }
    }

    /// A native transfer to `target`.
    pub fn new_transfer(
        amount: impl Into<U512>,
        source: Option<URef>,
        target: impl Into<TransferTarget>,
        id: Option<u64>,
    ) -> Result<Self, BuilderError> {
        let session = ExecutableDeployItem::new_transfer(amount, source, target, id)?;
        Ok(Self::with_session("transfer", session))
    }

    /// Stakes `amount` with `validator` through the auction contract. The
    /// delegator becomes the deploy's account.
    pub fn new_delegate(
        auction_contract: Digest,
        delegator: PublicKey,
        validator: PublicKey,
        amount: impl Into<U512>,
    ) -> Result<Self, BuilderError> {
        Self::new_auction_call(
            "delegate",
            auction_contract,
            AUCTION_DELEGATE_ENTRY_POINT,
            delegator,
            validator,
            amount.into(),
        )
    }

    /// Withdraws `amount` of stake from `validator`.
    pub fn new_undelegate(
        auction_contract: Digest,
        delegator: PublicKey,
        validator: PublicKey,
        amount: impl Into<U512>,
    ) -> Result<Self, BuilderError> {
        Self::new_auction_call(
            "undelegate",
            auction_contract,
            AUCTION_UNDELEGATE_ENTRY_POINT,
            delegator,
            validator,
            amount.into(),
        )
    }

    /// Moves `amount` of stake from `validator` to `new_validator`.
    pub fn new_redelegate(
        auction_contract: Digest,
        delegator: PublicKey,
        validator: PublicKey,
        new_validator: PublicKey,
        amount: impl Into<U512>,
    ) -> Result<Self, BuilderError> {
        let mut args = Self::staking_args(delegator.clone(), validator, amount.into())?;
        args.insert(ARG_NEW_VALIDATOR, new_validator)?;
        let session = ExecutableDeployItem::new_stored_contract_by_hash(
            auction_contract,
            AUCTION_REDELEGATE_ENTRY_POINT,
            args,
        );
        Ok(Self::with_session("redelegate", session).account(delegator))
    }

    fn new_auction_call(
        kind: &'static str,
        auction_contract: Digest,
        entry_point: &str,
        delegator: PublicKey,
        validator: PublicKey,
        amount: U512,
    ) -> Result<Self, BuilderError> {
        let args = Self::staking_args(delegator.clone(), validator, amount)?;
        let session =
            ExecutableDeployItem::new_stored_contract_by_hash(auction_contract, entry_point, args);
        Ok(Self::with_session(kind, session).account(delegator))
    }

    fn staking_args(
        delegator: PublicKey,
        validator: PublicKey,
        amount: U512,
    ) -> Result<RuntimeArgs, BuilderError> {
        let mut args = RuntimeArgs::new();
        args.insert(ARG_DELEGATOR, delegator)?;
        args.insert(ARG_VALIDATOR, validator)?;
        args.insert(ARG_AMOUNT, amount)?;
        Ok(args)
    }

    pub fn new_stored_contract_by_hash(
        hash: Digest,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        let session = ExecutableDeployItem::new_stored_contract_by_hash(hash, entry_point, args);
        Self::with_session("stored-contract-by-hash", session)
    }

    pub fn new_stored_contract_by_name(
        name: impl Into<String>,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        let session = ExecutableDeployItem::new_stored_contract_by_name(name, entry_point, args);
        Self::with_session("stored-contract-by-name", session)
    }

    /// `version: None` calls the latest enabled version of the package.
    pub fn new_versioned_contract_by_hash(
        hash: Digest,
        version: Option<u32>,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        let session = ExecutableDeployItem::new_stored_versioned_contract_by_hash(
            hash,
            version,
            entry_point,
            args,
        );
        Self::with_session("versioned-contract-by-hash", session)
    }

    pub fn new_versioned_contract_by_name(
        name: impl Into<String>,
        version: Option<u32>,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        let session = ExecutableDeployItem::new_stored_versioned_contract_by_name(
            name,
            version,
            entry_point,
            args,
        );
        Self::with_session("versioned-contract-by-name", session)
    }

    /// Runs inline wasm as the session.
    pub fn new_module_bytes(module_bytes: impl Into<Bytes>, args: RuntimeArgs) -> Self {
        let session = ExecutableDeployItem::new_module_bytes(module_bytes, args);
        Self::with_session("module-bytes", session)
    }

    // -- Setters ---------------------------------------------------------------

    pub fn account(mut self, account: PublicKey) -> Self {
        self.account = Some(account);
        self
    }

    pub fn chain_name(mut self, chain_name: impl Into<String>) -> Self {
        self.chain_name = Some(chain_name.into());
        self
    }

    pub fn session(mut self, session: ExecutableDeployItem) -> Self {
        self.session = Some(session);
        self
    }

    /// Pays with the node's built-in payment code. Replaces any earlier
    /// payment.
    pub fn standard_payment(mut self, amount: impl Into<U512>) -> Self {
        self.payment = Some(Payment::Standard(amount.into()));
        self
    }

    /// Pays with custom code. Replaces any earlier payment.
    pub fn payment(mut self, payment: ExecutableDeployItem) -> Self {
        self.payment = Some(Payment::Custom(payment));
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

    pub fn gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Deploys that must execute before this one.
    pub fn dependencies(mut self, dependencies: Vec<DeployHash>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Checks required fields, then computes the body hash and deploy hash.
    pub fn build(self) -> Result<Deploy, BuilderError> {
        let account = self.account.ok_or(BuilderError::MissingField("account"))?;
        let chain_name = self.chain_name.ok_or(BuilderError::MissingField("chain_name"))?;
        let session = self.session.ok_or(BuilderError::MissingField("session"))?;
        let payment = match self.payment.ok_or(BuilderError::MissingField("payment"))? {
            Payment::Standard(amount) => ExecutableDeployItem::standard_payment(amount)?,
            Payment::Custom(payment) => payment,
        };
        let timestamp = self.timestamp.unwrap_or_else(Timestamp::now);

        let deploy = Deploy::new(
            account,
            timestamp,
            self.ttl,
            self.gas_price,
            self.dependencies,
            chain_name,
            payment,
            session,
        )?;
        debug!(
            kind = self.kind,
            hash = %deploy.hash(),
            chain_name = deploy.header().chain_name(),
            "deploy built"
        );
        Ok(deploy)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Algorithm, KeyPair};
    use crate::deploy::DeployError;

    fn key(seed: u8) -> PublicKey {
        KeyPair::from_secret_bytes(Algorithm::Ed25519, &[seed; 32])
            .unwrap()
            .public_key()
            .clone()
    }

    fn complete() -> DeployBuilder {
        DeployBuilder::new_stored_contract_by_name("counter", "counter_inc", RuntimeArgs::new())
            .account(key(1))
            .chain_name("casper-test")
            .standard_payment(2_500_000_000u64)
    }

    #[test]
    fn each_required_field_is_reported() {
        assert!(complete().build().is_ok());

        let mut missing_account = complete();
        missing_account.account = None;
        assert_eq!(
            missing_account.build().unwrap_err(),
            BuilderError::MissingField("account")
        );

        let mut missing_chain = complete();
        missing_chain.chain_name = None;
        assert_eq!(
            missing_chain.build().unwrap_err(),
            BuilderError::MissingField("chain_name")
        );

        assert_eq!(
            DeployBuilder::new()
                .account(key(1))
                .chain_name("casper-test")
                .standard_payment(1u64)
                .build()
                .unwrap_err(),
            BuilderError::MissingField("session")
        );

        let mut missing_payment = complete();
        missing_payment.payment = None;
        assert_eq!(
            missing_payment.build().unwrap_err(),
            BuilderError::MissingField("payment")
        );
    }

    #[test]
    fn later_payment_wins() {
        let custom = ExecutableDeployItem::new_module_bytes(vec![1, 2, 3], RuntimeArgs::new());
        let deploy = complete().payment(custom.clone()).build().unwrap();
        assert_eq!(*deploy.payment(), custom);

        let deploy = complete()
            .payment(custom)
            .standard_payment(7u64)
            .build()
            .unwrap();
        assert_eq!(deploy.payment().payment_amount(), Some(U512::from(7u64)));
    }

    #[test]
    fn delegate_targets_auction_contract() {
        let auction = Digest::hash(b"auction");
        let deploy = DeployBuilder::new_delegate(auction, key(1), key(2), 500_000_000_000u64)
            .unwrap()
            .chain_name("casper-test")
            .standard_payment(2_500_000_000u64)
            .build()
            .unwrap();
        assert_eq!(deploy.header().account(), &key(1));
        match deploy.session() {
            ExecutableDeployItem::StoredContractByHash {
                hash,
                entry_point,
                args,
            } => {
                assert_eq!(*hash, auction);
                assert_eq!(entry_point, "delegate");
                let names: Vec<_> = args.iter().map(|arg| arg.name()).collect();
                assert_eq!(names, ["delegator", "validator", "amount"]);
            }
            other => panic!("unexpected session {other:?}"),
        }
    }

    #[test]
    fn redelegate_adds_new_validator() {
        let deploy = DeployBuilder::new_redelegate(Digest::hash(b"auction"), key(1), key(2), key(3), 1u64)
            .unwrap()
            .chain_name("casper-test")
            .standard_payment(2_500_000_000u64)
            .build()
            .unwrap();
        assert_eq!(deploy.session().entry_point_name(), "redelegate");
        assert!(deploy.session().args().get("new_validator").is_some());
    }

    #[test]
    fn construction_errors_pass_through() {
        let err = complete()
            .dependencies(vec![DeployHash::default(); 11])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuilderError::Deploy(DeployError::TooManyDependencies { .. })
        ));
    }

    #[test]
    fn defaults_come_from_config() {
        let deploy = complete().build().unwrap();
        assert_eq!(deploy.header().ttl().millis(), DEFAULT_TTL_MILLIS);
        assert_eq!(deploy.header().gas_price(), DEFAULT_GAS_PRICE);
        assert!(deploy.header().dependencies().is_empty());
    }
}
