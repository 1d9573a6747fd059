//! Global-state addresses: [`AccountHash`], [`URef`] and [`Key`].
//!
//! Each has a binary form (tag byte where applicable, then fixed-width
//! payload) and a prefixed text form used in JSON and `parsed` output, e.g.
//! `account-hash-<hex>` or `uref-<hex>-007`.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes, U64_SERIALIZED_LENGTH, U8_SERIALIZED_LENGTH};
use crate::config::HASH_LENGTH;
use crate::crypto::PublicKey;

const ACCOUNT_HASH_PREFIX: &str = "account-hash-";
const HASH_PREFIX: &str = "hash-";
const UREF_PREFIX: &str = "uref-";
const TRANSFER_PREFIX: &str = "transfer-";
const DEPLOY_INFO_PREFIX: &str = "deploy-";
const ERA_INFO_PREFIX: &str = "era-";
const BALANCE_PREFIX: &str = "balance-";
const BID_PREFIX: &str = "bid-";
const WITHDRAW_PREFIX: &str = "withdraw-";
const DICTIONARY_PREFIX: &str = "dictionary-";

/// Errors from parsing the text form of a key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyParseError {
    /// The string does not start with any known prefix.
    #[error("unrecognised key prefix in {0:?}")]
    UnknownPrefix(String),

    /// The hex portion could not be decoded.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The decoded address is not 32 bytes.
    #[error("expected 32 address bytes, found {0}")]
    Length(usize),

    /// The URef access-rights suffix is missing or not octal 0..=7.
    #[error("invalid access rights suffix")]
    AccessRights,

    /// The era id is not a decimal `u64`.
    #[error("invalid era id")]
    EraId,
}

fn parse_addr(hex_str: &str) -> Result<[u8; HASH_LENGTH], KeyParseError> {
    let bytes = hex::decode(hex_str)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| KeyParseError::Length(len))
}

// ---------------------------------------------------------------------------
// AccessRights
// ---------------------------------------------------------------------------

/// Access-rights bit set carried by a [`URef`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessRights(u8);

impl AccessRights {
    pub const NONE: Self = AccessRights(0);
    pub const READ: Self = AccessRights(0b001);
    pub const WRITE: Self = AccessRights(0b010);
    pub const ADD: Self = AccessRights(0b100);
    pub const READ_WRITE: Self = AccessRights(0b011);
    pub const READ_ADD: Self = AccessRights(0b101);
    pub const ADD_WRITE: Self = AccessRights(0b110);
    pub const READ_ADD_WRITE: Self = AccessRights(0b111);

    /// Accepts only the three defined bits.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits <= Self::READ_ADD_WRITE.0).then_some(AccessRights(bits))
    }

    /// The raw bit pattern.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_readable(self) -> bool {
        self.contains(Self::READ)
    }

    pub fn is_writeable(self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn is_addable(self) -> bool {
        self.contains(Self::ADD)
    }
}

impl BitOr for AccessRights {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        AccessRights(self.0 | rhs.0)
    }
}

impl ToBytes for AccessRights {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.0);
        Ok(())
    }
}

impl FromBytes for AccessRights {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (bits, rem) = u8::from_bytes(bytes)?;
        let rights =
            Self::from_bits(bits).ok_or(bytesrepr::Error::Formatting("invalid access rights"))?;
        Ok((rights, rem))
    }
}

// ---------------------------------------------------------------------------
// AccountHash
// ---------------------------------------------------------------------------

/// The canonical 32-byte account identifier derived from a public key.
///
/// See [`PublicKey::to_account_hash`] for the derivation.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountHash([u8; HASH_LENGTH]);

impl AccountHash {
    pub const fn new(value: [u8; HASH_LENGTH]) -> Self {
        AccountHash(value)
    }

    pub fn value(&self) -> [u8; HASH_LENGTH] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// `account-hash-<hex>`.
    pub fn to_formatted_string(&self) -> String {
        format!("{ACCOUNT_HASH_PREFIX}{}", hex::encode(self.0))
    }

    /// Parses `account-hash-<hex>`.
    pub fn from_formatted_str(s: &str) -> Result<Self, KeyParseError> {
        let hex_str = s
            .strip_prefix(ACCOUNT_HASH_PREFIX)
            .ok_or_else(|| KeyParseError::UnknownPrefix(s.to_string()))?;
        parse_addr(hex_str).map(AccountHash)
    }
}

impl From<&PublicKey> for AccountHash {
    fn from(public_key: &PublicKey) -> Self {
        public_key.to_account_hash()
    }
}

impl fmt::Display for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl fmt::Debug for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountHash({})", hex::encode(self.0))
    }
}

impl FromStr for AccountHash {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted_str(s)
    }
}

impl ToBytes for AccountHash {
    fn serialized_length(&self) -> usize {
        HASH_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for AccountHash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (value, rem) = <[u8; HASH_LENGTH]>::from_bytes(bytes)?;
        Ok((AccountHash(value), rem))
    }
}

impl Serialize for AccountHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_formatted_string())
    }
}

impl<'de> Deserialize<'de> for AccountHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_formatted_str(&text).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// URef
// ---------------------------------------------------------------------------

/// An unforgeable reference: a 32-byte address plus access rights.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct URef {
    addr: [u8; HASH_LENGTH],
    access_rights: AccessRights,
}

impl URef {
    pub const fn new(addr: [u8; HASH_LENGTH], access_rights: AccessRights) -> Self {
        URef {
            addr,
            access_rights,
        }
    }

    pub fn addr(&self) -> [u8; HASH_LENGTH] {
        self.addr
    }

    pub fn access_rights(&self) -> AccessRights {
        self.access_rights
    }

    /// `uref-<hex>-<rights as three octal digits>`.
    pub fn to_formatted_string(&self) -> String {
        format!(
            "{UREF_PREFIX}{}-{:03o}",
            hex::encode(self.addr),
            self.access_rights.bits()
        )
    }

    /// Parses `uref-<hex>-<octal rights>`.
    pub fn from_formatted_str(s: &str) -> Result<Self, KeyParseError> {
        let body = s
            .strip_prefix(UREF_PREFIX)
            .ok_or_else(|| KeyParseError::UnknownPrefix(s.to_string()))?;
        let (hex_str, rights) = body.rsplit_once('-').ok_or(KeyParseError::AccessRights)?;
        let bits = u8::from_str_radix(rights, 8).map_err(|_| KeyParseError::AccessRights)?;
        let access_rights = AccessRights::from_bits(bits).ok_or(KeyParseError::AccessRights)?;
        Ok(URef::new(parse_addr(hex_str)?, access_rights))
    }
}

impl fmt::Display for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl fmt::Debug for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "URef({})", self.to_formatted_string())
    }
}

impl FromStr for URef {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted_str(s)
    }
}

impl ToBytes for URef {
    fn serialized_length(&self) -> usize {
        HASH_LENGTH + U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.addr.write_bytes(writer)?;
        self.access_rights.write_bytes(writer)
    }
}

impl FromBytes for URef {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (addr, rem) = <[u8; HASH_LENGTH]>::from_bytes(bytes)?;
        let (access_rights, rem) = AccessRights::from_bytes(rem)?;
        Ok((URef::new(addr, access_rights), rem))
    }
}

impl Serialize for URef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_formatted_string())
    }
}

impl<'de> Deserialize<'de> for URef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_formatted_str(&text).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

mod key_tags {
    pub const ACCOUNT: u8 = 0;
    pub const HASH: u8 = 1;
    pub const UREF: u8 = 2;
    pub const TRANSFER: u8 = 3;
    pub const DEPLOY_INFO: u8 = 4;
    pub const ERA_INFO: u8 = 5;
    pub const BALANCE: u8 = 6;
    pub const BID: u8 = 7;
    pub const WITHDRAW: u8 = 8;
    pub const DICTIONARY: u8 = 9;
}

/// An address in global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Account(AccountHash),
    Hash([u8; HASH_LENGTH]),
    URef(URef),
    Transfer([u8; HASH_LENGTH]),
    DeployInfo([u8; HASH_LENGTH]),
    EraInfo(u64),
    Balance([u8; HASH_LENGTH]),
    Bid(AccountHash),
    Withdraw(AccountHash),
    Dictionary([u8; HASH_LENGTH]),
}

impl Key {
    fn tag(&self) -> u8 {
        match self {
            Key::Account(_) => key_tags::ACCOUNT,
            Key::Hash(_) => key_tags::HASH,
            Key::URef(_) => key_tags::UREF,
            Key::Transfer(_) => key_tags::TRANSFER,
            Key::DeployInfo(_) => key_tags::DEPLOY_INFO,
            Key::EraInfo(_) => key_tags::ERA_INFO,
            Key::Balance(_) => key_tags::BALANCE,
            Key::Bid(_) => key_tags::BID,
            Key::Withdraw(_) => key_tags::WITHDRAW,
            Key::Dictionary(_) => key_tags::DICTIONARY,
        }
    }

    /// The prefixed text form, e.g. `hash-<hex>` or `era-42`.
    pub fn to_formatted_string(&self) -> String {
        match self {
            Key::Account(account_hash) => account_hash.to_formatted_string(),
            Key::Hash(addr) => format!("{HASH_PREFIX}{}", hex::encode(addr)),
            Key::URef(uref) => uref.to_formatted_string(),
            Key::Transfer(addr) => format!("{TRANSFER_PREFIX}{}", hex::encode(addr)),
            Key::DeployInfo(addr) => format!("{DEPLOY_INFO_PREFIX}{}", hex::encode(addr)),
            Key::EraInfo(era_id) => format!("{ERA_INFO_PREFIX}{era_id}"),
            Key::Balance(addr) => format!("{BALANCE_PREFIX}{}", hex::encode(addr)),
            Key::Bid(account_hash) => format!("{BID_PREFIX}{}", hex::encode(account_hash.0)),
            Key::Withdraw(account_hash) => {
                format!("{WITHDRAW_PREFIX}{}", hex::encode(account_hash.0))
            }
            Key::Dictionary(addr) => format!("{DICTIONARY_PREFIX}{}", hex::encode(addr)),
        }
    }

    /// Parses any of the prefixed text forms.
    pub fn from_formatted_str(s: &str) -> Result<Self, KeyParseError> {
        // `account-hash-` must be tried before `hash-`.
        if s.starts_with(ACCOUNT_HASH_PREFIX) {
            return AccountHash::from_formatted_str(s).map(Key::Account);
        }
        if s.starts_with(UREF_PREFIX) {
            return URef::from_formatted_str(s).map(Key::URef);
        }
        if let Some(era_id) = s.strip_prefix(ERA_INFO_PREFIX) {
            return era_id
                .parse()
                .map(Key::EraInfo)
                .map_err(|_| KeyParseError::EraId);
        }
        let addr_variants: [(&str, fn([u8; HASH_LENGTH]) -> Key); 7] = [
            (HASH_PREFIX, Key::Hash),
            (TRANSFER_PREFIX, Key::Transfer),
            (DEPLOY_INFO_PREFIX, Key::DeployInfo),
            (BALANCE_PREFIX, Key::Balance),
            (BID_PREFIX, |addr| Key::Bid(AccountHash(addr))),
            (WITHDRAW_PREFIX, |addr| Key::Withdraw(AccountHash(addr))),
            (DICTIONARY_PREFIX, Key::Dictionary),
        ];
        for (prefix, make) in addr_variants {
            if let Some(hex_str) = s.strip_prefix(prefix) {
                return parse_addr(hex_str).map(make);
            }
        }
        Err(KeyParseError::UnknownPrefix(s.to_string()))
    }
}

impl From<AccountHash> for Key {
    fn from(account_hash: AccountHash) -> Self {
        Key::Account(account_hash)
    }
}

impl From<URef> for Key {
    fn from(uref: URef) -> Self {
        Key::URef(uref)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_formatted_str(s)
    }
}

impl ToBytes for Key {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                Key::URef(uref) => uref.serialized_length(),
                Key::EraInfo(_) => U64_SERIALIZED_LENGTH,
                _ => HASH_LENGTH,
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.tag());
        match self {
            Key::Account(account_hash) | Key::Bid(account_hash) | Key::Withdraw(account_hash) => {
                account_hash.write_bytes(writer)
            }
            Key::Hash(addr)
            | Key::Transfer(addr)
            | Key::DeployInfo(addr)
            | Key::Balance(addr)
            | Key::Dictionary(addr) => addr.write_bytes(writer),
            Key::URef(uref) => uref.write_bytes(writer),
            Key::EraInfo(era_id) => era_id.write_bytes(writer),
        }
    }
}

impl FromBytes for Key {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        match tag {
            key_tags::ACCOUNT => AccountHash::from_bytes(rem).map(|(h, r)| (Key::Account(h), r)),
            key_tags::HASH => <[u8; 32]>::from_bytes(rem).map(|(a, r)| (Key::Hash(a), r)),
            key_tags::UREF => URef::from_bytes(rem).map(|(u, r)| (Key::URef(u), r)),
            key_tags::TRANSFER => <[u8; 32]>::from_bytes(rem).map(|(a, r)| (Key::Transfer(a), r)),
            key_tags::DEPLOY_INFO => {
                <[u8; 32]>::from_bytes(rem).map(|(a, r)| (Key::DeployInfo(a), r))
            }
            key_tags::ERA_INFO => u64::from_bytes(rem).map(|(e, r)| (Key::EraInfo(e), r)),
            key_tags::BALANCE => <[u8; 32]>::from_bytes(rem).map(|(a, r)| (Key::Balance(a), r)),
            key_tags::BID => AccountHash::from_bytes(rem).map(|(h, r)| (Key::Bid(h), r)),
            key_tags::WITHDRAW => AccountHash::from_bytes(rem).map(|(h, r)| (Key::Withdraw(h), r)),
            key_tags::DICTIONARY => {
                <[u8; 32]>::from_bytes(rem).map(|(a, r)| (Key::Dictionary(a), r))
            }
            tag => Err(bytesrepr::Error::UnknownTag { context: "key", tag }),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_formatted_string())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_formatted_str(&text).map_err(D::Error::custom)
    }
}
