//! # Transaction Module
//!
//! Construction, signing and verification of `TransactionV1`, the current
//! transaction format, plus the approval machinery it shares with the legacy
//! [`Deploy`](crate::deploy::Deploy).
//!
//! ## Architecture
//!
//! ```text
//! types.rs       : Payload value types (InitiatorAddr, PricingMode, targets, entry points)
//! v1.rs          : TransactionV1, its payload, fields map and hash
//! builder.rs     : TransactionV1Builder with one constructor per transaction kind
//! signing.rs     : Approval and the sign_* helpers shared with deploys
//! verification.rs: Hash recomputation and approval checks
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: pick a [`TransactionV1Builder`] constructor, set the chain
//!    name, initiator and pricing mode, call `build()`.
//! 2. **Sign**: call [`TransactionV1::sign`] once per required signer.
//! 3. **Submit**: serialize to JSON and hand it to the node's RPC endpoint.
//! 4. **Verify**: anyone can run [`TransactionV1::verify`] on a received copy.
//!
//! ## Design Decisions
//!
//! - Every payload structure is a call-table envelope, so optional
//!   knobs cost nothing when unset and new fields can be added without
//!   breaking old decoders.
//! - The payload's `fields` are a `u16 → Bytes` map on the wire but a typed
//!   struct in memory; nothing outside [`v1`] sees the map.
//! - The hash is computed once, at construction. Approvals sign the hash and
//!   are not part of it.

pub mod builder;
pub mod signing;
pub mod types;
pub mod v1;
pub mod verification;

pub use builder::{BuilderError, TransactionV1Builder};
pub use signing::{sign_deploy, sign_transaction, Approval};
pub use types::{
    InitiatorAddr, PricingMode, TransactionArgs, TransactionEntryPoint,
    TransactionInvocationTarget, TransactionRuntime, TransactionScheduling, TransactionTarget,
};
pub use v1::{
    TransactionV1, TransactionV1Error, TransactionV1Fields, TransactionV1Hash,
    TransactionV1Payload,
};
pub use verification::{verify_deploy, verify_transaction, VerificationError};
