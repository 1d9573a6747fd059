//! # Protocol Configuration & Constants
//!
//! Every magic number the client core depends on lives here. Builders read
//! their defaults from this module; nothing else should hardcode a TTL, a
//! tag byte, or an argument name.
//!
//! These values mirror what nodes enforce. Change one and the network will
//! tell you about it, usually by rejecting your deploy.

// ---------------------------------------------------------------------------
// Chain names
// ---------------------------------------------------------------------------

/// Mainnet chain name.
pub const MAINNET_CHAIN_NAME: &str = "casper";

/// Public testnet chain name.
pub const TESTNET_CHAIN_NAME: &str = "casper-test";

/// Chain name used by local NCTL/CCTL networks.
pub const LOCAL_CHAIN_NAME: &str = "casper-net-1";

/// Upper bound on the chain name length a node will accept.
pub const MAX_CHAIN_NAME_LENGTH: usize = 256;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Default time-to-live: 30 minutes.
pub const DEFAULT_TTL_MILLIS: u64 = 30 * 60 * 1_000;

/// Longest TTL a node accepts: one day.
pub const MAX_TTL_MILLIS: u64 = 24 * 60 * 60 * 1_000;

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Default deploy gas price.
pub const DEFAULT_GAS_PRICE: u64 = 1;

/// Default gas price tolerance for TransactionV1 pricing modes.
pub const DEFAULT_GAS_PRICE_TOLERANCE: u8 = 1;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum number of dependencies a deploy may declare.
pub const MAX_DEPENDENCIES: usize = 10;

/// Maximum nesting depth accepted when decoding a CLType descriptor.
pub const MAX_CL_TYPE_DEPTH: u8 = 50;

/// Maximum element count of a list whose elements encode to zero bytes
/// (`List(Unit)` and the like). Any other element costs at least one byte, so
/// its count is already bounded by the input length.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1_024;

// ---------------------------------------------------------------------------
// Cryptographic parameters
// ---------------------------------------------------------------------------

/// Wire tag of Ed25519 keys and signatures.
pub const ED25519_TAG: u8 = 1;

/// Wire tag of secp256k1 keys and signatures.
pub const SECP256K1_TAG: u8 = 2;

/// Ed25519 public key length.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// Compressed secp256k1 public key length.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;

/// Raw secret key length, both algorithms.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Raw signature length, both algorithms.
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of hashes, account hashes and URef addresses.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Runtime argument names
// ---------------------------------------------------------------------------

/// Payment or transfer amount (`U512`).
pub const ARG_AMOUNT: &str = "amount";
/// Transfer target.
pub const ARG_TARGET: &str = "target";
/// Optional transfer source purse.
pub const ARG_SOURCE: &str = "source";
/// Optional transfer id (`Option<u64>`).
pub const ARG_ID: &str = "id";
/// Delegator public key.
pub const ARG_DELEGATOR: &str = "delegator";
/// Validator public key.
pub const ARG_VALIDATOR: &str = "validator";
/// Redelegation target validator.
pub const ARG_NEW_VALIDATOR: &str = "new_validator";

// ---------------------------------------------------------------------------
// System contract entry points
// ---------------------------------------------------------------------------

/// Auction entry point for delegating stake.
pub const AUCTION_DELEGATE_ENTRY_POINT: &str = "delegate";
/// Auction entry point for undelegating stake.
pub const AUCTION_UNDELEGATE_ENTRY_POINT: &str = "undelegate";
/// Auction entry point for moving stake between validators.
pub const AUCTION_REDELEGATE_ENTRY_POINT: &str = "redelegate";

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns `true` when a node would accept `chain_name`.
pub fn chain_name_is_valid(chain_name: &str) -> bool {
    !chain_name.is_empty() && chain_name.len() <= MAX_CHAIN_NAME_LENGTH
}
