//! What a deploy runs: inline wasm, a stored contract, or a native transfer.
//!
//! A deploy carries two of these: `payment` (buys gas) and `session` (does
//! the work). The standard payment is an empty `ModuleBytes` with a single
//! `amount` argument, which tells the node to use its built-in payment code.

use primitive_types::U512;
use serde::{Deserialize, Serialize};

use crate::bytesrepr::{self, Bytes, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};
use crate::cl::{AccountHash, CLValueError, RuntimeArgs, URef};
use crate::config::{ARG_AMOUNT, ARG_ID, ARG_SOURCE, ARG_TARGET};
use crate::crypto::{Digest, PublicKey};

const MODULE_BYTES_TAG: u8 = 0;
const STORED_CONTRACT_BY_HASH_TAG: u8 = 1;
const STORED_CONTRACT_BY_NAME_TAG: u8 = 2;
const STORED_VERSIONED_CONTRACT_BY_HASH_TAG: u8 = 3;
const STORED_VERSIONED_CONTRACT_BY_NAME_TAG: u8 = 4;
const TRANSFER_TAG: u8 = 5;

/// Entry point reported for inline module bytes.
const MODULE_BYTES_ENTRY_POINT: &str = "call";
/// Entry point reported for native transfers.
const TRANSFER_ENTRY_POINT: &str = "transfer";

/// The recipient of a native transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferTarget {
    /// The account controlled by this key.
    PublicKey(PublicKey),
    /// The account with this hash.
    AccountHash(AccountHash),
    /// A specific purse.
    URef(URef),
}

impl TransferTarget {
    /// Appends the `target` argument. Account hashes travel as a bare
    /// `ByteArray(32)`.
    pub(crate) fn insert_into(self, args: &mut RuntimeArgs) -> Result<(), CLValueError> {
        match self {
            TransferTarget::PublicKey(public_key) => args.insert(ARG_TARGET, public_key),
            TransferTarget::AccountHash(account_hash) => {
                args.insert(ARG_TARGET, account_hash.value())
            }
            TransferTarget::URef(uref) => args.insert(ARG_TARGET, uref),
        }
    }
}

impl From<PublicKey> for TransferTarget {
    fn from(public_key: PublicKey) -> Self {
        TransferTarget::PublicKey(public_key)
    }
}

impl From<AccountHash> for TransferTarget {
    fn from(account_hash: AccountHash) -> Self {
        TransferTarget::AccountHash(account_hash)
    }
}

impl From<URef> for TransferTarget {
    fn from(uref: URef) -> Self {
        TransferTarget::URef(uref)
    }
}

/// Executable code of a deploy's payment or session.
///
/// JSON is externally tagged by variant name. The versioned variants are
/// always written as `StoredVersionedContractBy*`, the spelling nodes emit,
/// and also accept the older `StoredVersionContractBy*` spellings on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum ExecutableDeployItem {
    /// Inline wasm. Empty `module_bytes` means the standard payment.
    ModuleBytes {
        module_bytes: Bytes,
        args: RuntimeArgs,
    },
    StoredContractByHash {
        hash: Digest,
        entry_point: String,
        args: RuntimeArgs,
    },
    StoredContractByName {
        name: String,
        entry_point: String,
        args: RuntimeArgs,
    },
    /// `version: None` selects the latest enabled version.
    #[serde(alias = "StoredVersionContractByHash")]
    StoredVersionedContractByHash {
        hash: Digest,
        version: Option<u32>,
        entry_point: String,
        args: RuntimeArgs,
    },
    #[serde(alias = "StoredVersionContractByName")]
    StoredVersionedContractByName {
        name: String,
        version: Option<u32>,
        entry_point: String,
        args: RuntimeArgs,
    },
    /// Native motes transfer.
    Transfer { args: RuntimeArgs },
}

impl ExecutableDeployItem {
    /// The payment item that asks the node for its built-in payment logic.
    pub fn standard_payment(amount: impl Into<U512>) -> Result<Self, CLValueError> {
        let mut args = RuntimeArgs::new();
        args.insert(ARG_AMOUNT, amount.into())?;
        Ok(ExecutableDeployItem::ModuleBytes {
            module_bytes: Bytes::new(),
            args,
        })
    }

    /// A native transfer. `source` defaults to the sender's main purse and
    /// is omitted from the arguments when `None`.
    pub fn new_transfer(
        amount: impl Into<U512>,
        source: Option<URef>,
        target: impl Into<TransferTarget>,
        id: Option<u64>,
    ) -> Result<Self, CLValueError> {
        let mut args = RuntimeArgs::new();
        args.insert(ARG_AMOUNT, amount.into())?;
        if let Some(source) = source {
            args.insert(ARG_SOURCE, source)?;
        }
        TransferTarget::insert_into(target.into(), &mut args)?;
        args.insert(ARG_ID, id)?;
        Ok(ExecutableDeployItem::Transfer { args })
    }

    pub fn new_module_bytes(module_bytes: impl Into<Bytes>, args: RuntimeArgs) -> Self {
        ExecutableDeployItem::ModuleBytes {
            module_bytes: module_bytes.into(),
            args,
        }
    }

    pub fn new_stored_contract_by_hash(
        hash: Digest,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        ExecutableDeployItem::StoredContractByHash {
            hash,
            entry_point: entry_point.into(),
            args,
        }
    }

    pub fn new_stored_contract_by_name(
        name: impl Into<String>,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        ExecutableDeployItem::StoredContractByName {
            name: name.into(),
            entry_point: entry_point.into(),
            args,
        }
    }

    pub fn new_stored_versioned_contract_by_hash(
        hash: Digest,
        version: Option<u32>,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        ExecutableDeployItem::StoredVersionedContractByHash {
            hash,
            version,
            entry_point: entry_point.into(),
            args,
        }
    }

    pub fn new_stored_versioned_contract_by_name(
        name: impl Into<String>,
        version: Option<u32>,
        entry_point: impl Into<String>,
        args: RuntimeArgs,
    ) -> Self {
        ExecutableDeployItem::StoredVersionedContractByName {
            name: name.into(),
            version,
            entry_point: entry_point.into(),
            args,
        }
    }

    pub fn args(&self) -> &RuntimeArgs {
        match self {
            ExecutableDeployItem::ModuleBytes { args, .. }
            | ExecutableDeployItem::StoredContractByHash { args, .. }
            | ExecutableDeployItem::StoredContractByName { args, .. }
            | ExecutableDeployItem::StoredVersionedContractByHash { args, .. }
            | ExecutableDeployItem::StoredVersionedContractByName { args, .. }
            | ExecutableDeployItem::Transfer { args } => args,
        }
    }

    pub fn entry_point_name(&self) -> &str {
        match self {
            ExecutableDeployItem::ModuleBytes { .. } => MODULE_BYTES_ENTRY_POINT,
            ExecutableDeployItem::Transfer { .. } => TRANSFER_ENTRY_POINT,
            ExecutableDeployItem::StoredContractByHash { entry_point, .. }
            | ExecutableDeployItem::StoredContractByName { entry_point, .. }
            | ExecutableDeployItem::StoredVersionedContractByHash { entry_point, .. }
            | ExecutableDeployItem::StoredVersionedContractByName { entry_point, .. } => {
                entry_point
            }
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, ExecutableDeployItem::Transfer { .. })
    }

    /// `true` for an empty `ModuleBytes`.
    pub fn is_standard_payment(&self) -> bool {
        matches!(
            self,
            ExecutableDeployItem::ModuleBytes { module_bytes, .. } if module_bytes.is_empty()
        )
    }

    /// The `amount` argument, if present and typed `U512`.
    pub fn payment_amount(&self) -> Option<U512> {
        self.args().get(ARG_AMOUNT)?.to_t().ok()
    }

    fn tag(&self) -> u8 {
        match self {
            ExecutableDeployItem::ModuleBytes { .. } => MODULE_BYTES_TAG,
            ExecutableDeployItem::StoredContractByHash { .. } => STORED_CONTRACT_BY_HASH_TAG,
            ExecutableDeployItem::StoredContractByName { .. } => STORED_CONTRACT_BY_NAME_TAG,
            ExecutableDeployItem::StoredVersionedContractByHash { .. } => {
                STORED_VERSIONED_CONTRACT_BY_HASH_TAG
            }
            ExecutableDeployItem::StoredVersionedContractByName { .. } => {
                STORED_VERSIONED_CONTRACT_BY_NAME_TAG
            }
            ExecutableDeployItem::Transfer { .. } => TRANSFER_TAG,
        }
    }
}

impl ToBytes for ExecutableDeployItem {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                ExecutableDeployItem::ModuleBytes { module_bytes, args } => {
                    module_bytes.serialized_length() + args.serialized_length()
                }
                ExecutableDeployItem::StoredContractByHash {
                    hash,
                    entry_point,
                    args,
                } => hash.serialized_length() + entry_point.serialized_length() + args.serialized_length(),
                ExecutableDeployItem::StoredContractByName {
                    name,
                    entry_point,
                    args,
                } => name.serialized_length() + entry_point.serialized_length() + args.serialized_length(),
                ExecutableDeployItem::StoredVersionedContractByHash {
                    hash,
                    version,
                    entry_point,
                    args,
                } => {
                    hash.serialized_length()
                        + version.serialized_length()
                        + entry_point.serialized_length()
                        + args.serialized_length()
                }
                ExecutableDeployItem::StoredVersionedContractByName {
                    name,
                    version,
                    entry_point,
                    args,
                } => {
                    name.serialized_length()
                        + version.serialized_length()
                        + entry_point.serialized_length()
                        + args.serialized_length()
                }
                ExecutableDeployItem::Transfer { args } => args.serialized_length(),
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.tag());
        match self {
            ExecutableDeployItem::ModuleBytes { module_bytes, args } => {
                module_bytes.write_bytes(writer)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::StoredContractByHash {
                hash,
                entry_point,
                args,
            } => {
                hash.write_bytes(writer)?;
                entry_point.write_bytes(writer)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::StoredContractByName {
                name,
                entry_point,
                args,
            } => {
                name.write_bytes(writer)?;
                entry_point.write_bytes(writer)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::StoredVersionedContractByHash {
                hash,
                version,
                entry_point,
                args,
            } => {
                hash.write_bytes(writer)?;
                version.write_bytes(writer)?;
                entry_point.write_bytes(writer)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::StoredVersionedContractByName {
                name,
                version,
                entry_point,
                args,
            } => {
                name.write_bytes(writer)?;
                version.write_bytes(writer)?;
                entry_point.write_bytes(writer)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::Transfer { args } => args.write_bytes(writer),
        }
    }
}

impl FromBytes for ExecutableDeployItem {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        match tag {
            MODULE_BYTES_TAG => {
                let (module_bytes, rem) = Bytes::from_bytes(rem)?;
                let (args, rem) = RuntimeArgs::from_bytes(rem)?;
                Ok((ExecutableDeployItem::ModuleBytes { module_bytes, args }, rem))
            }
            STORED_CONTRACT_BY_HASH_TAG => {
                let (hash, rem) = Digest::from_bytes(rem)?;
                let (entry_point, rem) = String::from_bytes(rem)?;
                let (args, rem) = RuntimeArgs::from_bytes(rem)?;
                let item = ExecutableDeployItem::StoredContractByHash {
                    hash,
                    entry_point,
                    args,
                };
                Ok((item, rem))
            }
            STORED_CONTRACT_BY_NAME_TAG => {
                let (name, rem) = String::from_bytes(rem)?;
                let (entry_point, rem) = String::from_bytes(rem)?;
                let (args, rem) = RuntimeArgs::from_bytes(rem)?;
                let item = ExecutableDeployItem::StoredContractByName {
                    name,
                    entry_point,
                    args,
                };
                Ok((item, rem))
            }
            STORED_VERSIONED_CONTRACT_BY_HASH_TAG => {
                let (hash, rem) = Digest::from_bytes(rem)?;
                let (version, rem) = Option::<u32>::from_bytes(rem)?;
                let (entry_point, rem) = String::from_bytes(rem)?;
                let (args, rem) = RuntimeArgs::from_bytes(rem)?;
                let item = ExecutableDeployItem::StoredVersionedContractByHash {
                    hash,
                    version,
                    entry_point,
                    args,
                };
                Ok((item, rem))
            }
            STORED_VERSIONED_CONTRACT_BY_NAME_TAG => {
                let (name, rem) = String::from_bytes(rem)?;
                let (version, rem) = Option::<u32>::from_bytes(rem)?;
                let (entry_point, rem) = String::from_bytes(rem)?;
                let (args, rem) = RuntimeArgs::from_bytes(rem)?;
                let item = ExecutableDeployItem::StoredVersionedContractByName {
                    name,
                    version,
                    entry_point,
                    args,
                };
                Ok((item, rem))
            }
            TRANSFER_TAG => {
                let (args, rem) = RuntimeArgs::from_bytes(rem)?;
                Ok((ExecutableDeployItem::Transfer { args }, rem))
            }
            tag => Err(bytesrepr::Error::UnknownTag {
                context: "executable deploy item",
                tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Algorithm, KeyPair};
    use serde_json::json;

    #[test]
    fn standard_payment_shape() {
        let payment = ExecutableDeployItem::standard_payment(2_500_000_000u64).unwrap();
        assert!(payment.is_standard_payment());
        assert_eq!(payment.payment_amount(), Some(U512::from(2_500_000_000u64)));
        assert_eq!(payment.entry_point_name(), "call");
        assert_eq!(payment.to_bytes().unwrap()[0], MODULE_BYTES_TAG);
    }

    #[test]
    fn transfer_args_in_order() {
        let target = KeyPair::generate(Algorithm::Ed25519).public_key().clone();
        let transfer = ExecutableDeployItem::new_transfer(10u64, None, target, Some(7)).unwrap();
        assert!(transfer.is_transfer());
        let names: Vec<_> = transfer.args().iter().map(|arg| arg.name()).collect();
        assert_eq!(names, ["amount", "target", "id"]);
        assert_eq!(
            transfer.args().get("id").unwrap().to_t::<Option<u64>>().unwrap(),
            Some(7)
        );
    }

    #[test]
    fn transfer_to_account_hash_uses_byte_array() {
        let target = AccountHash::new([5; 32]);
        let source = URef::new([1; 32], crate::cl::AccessRights::READ_ADD_WRITE);
        let transfer =
            ExecutableDeployItem::new_transfer(10u64, Some(source), target, None).unwrap();
        let target_arg = transfer.args().get("target").unwrap();
        assert_eq!(target_arg.to_t::<[u8; 32]>().unwrap(), [5; 32]);
        assert_eq!(
            transfer.args().get("source").unwrap().to_t::<URef>().unwrap(),
            source
        );
    }

    #[test]
    fn every_variant_roundtrips_through_bytes() {
        let mut args = RuntimeArgs::new();
        args.insert("x", 1u32).unwrap();
        let hash = Digest::hash(b"contract");
        let items = [
            ExecutableDeployItem::new_module_bytes(vec![0, 97, 115, 109], args.clone()),
            ExecutableDeployItem::new_stored_contract_by_hash(hash, "run", args.clone()),
            ExecutableDeployItem::new_stored_contract_by_name("counter", "inc", args.clone()),
            ExecutableDeployItem::new_stored_versioned_contract_by_hash(hash, Some(2), "run", args.clone()),
            ExecutableDeployItem::new_stored_versioned_contract_by_name("pkg", None, "run", args.clone()),
            ExecutableDeployItem::Transfer { args },
        ];
        for (tag, item) in items.into_iter().enumerate() {
            let bytes = item.to_bytes().unwrap();
            assert_eq!(bytes[0] as usize, tag);
            assert_eq!(bytes.len(), item.serialized_length());
            assert_eq!(bytesrepr::deserialize::<ExecutableDeployItem>(&bytes).unwrap(), item);
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        assert_eq!(
            bytesrepr::deserialize::<ExecutableDeployItem>(&[6, 0, 0, 0, 0]),
            Err(bytesrepr::Error::UnknownTag {
                context: "executable deploy item",
                tag: 6
            })
        );
    }

    #[test]
    fn json_variant_names_and_alias() {
        let item = ExecutableDeployItem::new_stored_versioned_contract_by_name(
            "pkg",
            Some(1),
            "run",
            RuntimeArgs::new(),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            json!({"StoredVersionedContractByName": {
                "name": "pkg", "version": 1, "entry_point": "run", "args": []
            }})
        );

        let legacy = json!({"StoredVersionContractByName": {
            "name": "pkg", "version": 1, "entry_point": "run", "args": []
        }});
        assert_eq!(serde_json::from_value::<ExecutableDeployItem>(legacy).unwrap(), item);
    }

    #[test]
    fn versioned_by_hash_writes_versioned_spelling() {
        let item = ExecutableDeployItem::new_stored_versioned_contract_by_hash(
            Digest::from_raw([5; 32]),
            None,
            "run",
            RuntimeArgs::new(),
        );
        let text = serde_json::to_string(&item).unwrap();
        assert!(text.starts_with(r#"{"StoredVersionedContractByHash":"#));
        assert!(!text.contains("StoredVersionContract"));

        let legacy = text.replace("StoredVersionedContractByHash", "StoredVersionContractByHash");
        assert_eq!(serde_json::from_str::<ExecutableDeployItem>(&legacy).unwrap(), item);
    }

    #[test]
    fn json_unknown_variant_rejected() {
        let bogus = json!({"StoredContractByPackage": {"args": []}});
        assert!(serde_json::from_value::<ExecutableDeployItem>(bogus).is_err());
    }
}
