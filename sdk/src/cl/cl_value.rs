//! # CLValue
//!
//! An immutable `(bytes, cl_type)` pair. The bytes are always a canonical
//! encoding of a value of `cl_type`; every constructor either produces such
//! bytes itself or walks the supplied ones to prove it.
//!
//! Wire layout, data first and descriptor last:
//!
//! ```text
//! u32 len ++ payload[len] ++ type descriptor
//! ```

use std::collections::BTreeSet;

use primitive_types::{U128, U256, U512};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{CLType, CLTyped, Key, URef};
use crate::bytesrepr::{
    self, Bytes, FromBytes, ToBytes, OPTION_NONE_TAG, OPTION_SOME_TAG, RESULT_ERR_TAG,
    RESULT_OK_TAG, U32_SERIALIZED_LENGTH,
};
use crate::crypto::PublicKey;

/// Errors from constructing or extracting a [`CLValue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CLValueError {
    /// The bytes are not a canonical encoding of the declared type.
    #[error("serialization error: {0}")]
    Serialization(#[from] bytesrepr::Error),

    /// The requested type does not match the value's declared type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the caller asked for.
        expected: CLType,
        /// Type the value actually has.
        found: CLType,
    },

    /// A numeric value does not fit the requested type.
    #[error("{value} is out of range for {cl_type}")]
    Range {
        /// Target numeric type.
        cl_type: CLType,
        /// The rejected value, as text.
        value: String,
    },

    /// A numeric factory was asked for a non-numeric type.
    #[error("{0} is not a numeric type")]
    NotNumeric(CLType),
}

/// A typed value in canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CLValue {
    cl_type: CLType,
    bytes: Bytes,
}

impl CLValue {
    // -----------------------------------------------------------------------
    // Typed factories and extraction
    // -----------------------------------------------------------------------

    /// Encodes a native value.
    ///
    /// ```
    /// use casper_sdk::cl::{CLType, CLValue};
    ///
    /// let value = CLValue::from_t(Some(7u64)).unwrap();
    /// assert_eq!(value.cl_type(), &CLType::option(CLType::U64));
    /// assert_eq!(value.to_t::<Option<u64>>().unwrap(), Some(7));
    /// ```
    pub fn from_t<T: CLTyped + ToBytes>(value: T) -> Result<Self, CLValueError> {
        Ok(CLValue {
            cl_type: T::cl_type(),
            bytes: value.to_bytes()?.into(),
        })
    }

    /// Decodes into a native value after checking the declared type.
    pub fn to_t<T: CLTyped + FromBytes>(&self) -> Result<T, CLValueError> {
        let expected = T::cl_type();
        if expected != self.cl_type {
            return Err(CLValueError::TypeMismatch {
                expected,
                found: self.cl_type.clone(),
            });
        }
        Ok(bytesrepr::deserialize(&self.bytes)?)
    }

    /// Consuming form of [`to_t`](Self::to_t).
    pub fn into_t<T: CLTyped + FromBytes>(self) -> Result<T, CLValueError> {
        self.to_t()
    }

    /// Pairs a type with bytes, rejecting bytes that are not a canonical
    /// encoding of exactly one value of that type.
    pub fn from_components(cl_type: CLType, bytes: Vec<u8>) -> Result<Self, CLValueError> {
        validate(&cl_type, &bytes)?;
        Ok(CLValue {
            cl_type,
            bytes: bytes.into(),
        })
    }

    /// The unit value.
    pub fn unit() -> Self {
        CLValue {
            cl_type: CLType::Unit,
            bytes: Bytes::new(),
        }
    }

    pub fn cl_type(&self) -> &CLType {
        &self.cl_type
    }

    /// The payload bytes, without length prefix or descriptor.
    pub fn inner_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_components(self) -> (CLType, Bytes) {
        (self.cl_type, self.bytes)
    }

    // -----------------------------------------------------------------------
    // Numeric factories
    // -----------------------------------------------------------------------

    /// Range-checked integer factory for every numeric type.
    pub fn from_integer(cl_type: &CLType, value: i128) -> Result<Self, CLValueError> {
        let out_of_range = || CLValueError::Range {
            cl_type: cl_type.clone(),
            value: value.to_string(),
        };
        match cl_type {
            CLType::I32 => Self::from_t(i32::try_from(value).map_err(|_| out_of_range())?),
            CLType::I64 => Self::from_t(i64::try_from(value).map_err(|_| out_of_range())?),
            CLType::U8 => Self::from_t(u8::try_from(value).map_err(|_| out_of_range())?),
            CLType::U32 => Self::from_t(u32::try_from(value).map_err(|_| out_of_range())?),
            CLType::U64 => Self::from_t(u64::try_from(value).map_err(|_| out_of_range())?),
            CLType::U128 | CLType::U256 | CLType::U512 => {
                let magnitude = u128::try_from(value).map_err(|_| out_of_range())?;
                match cl_type {
                    CLType::U128 => Self::from_t(U128::from(magnitude)),
                    CLType::U256 => Self::from_t(U256::from(magnitude)),
                    _ => Self::from_t(U512::from(magnitude)),
                }
            }
            other => Err(CLValueError::NotNumeric(other.clone())),
        }
    }

    /// Parses a decimal string into any numeric type. The only way to reach
    /// the upper ranges of `U256` and `U512`.
    pub fn from_dec_str(cl_type: &CLType, text: &str) -> Result<Self, CLValueError> {
        let out_of_range = || CLValueError::Range {
            cl_type: cl_type.clone(),
            value: text.to_string(),
        };
        match cl_type {
            CLType::U128 => Self::from_t(U128::from_dec_str(text).map_err(|_| out_of_range())?),
            CLType::U256 => Self::from_t(U256::from_dec_str(text).map_err(|_| out_of_range())?),
            CLType::U512 => Self::from_t(U512::from_dec_str(text).map_err(|_| out_of_range())?),
            CLType::I32 | CLType::I64 | CLType::U8 | CLType::U32 | CLType::U64 => {
                let value: i128 = text.parse().map_err(|_| out_of_range())?;
                Self::from_integer(cl_type, value)
            }
            other => Err(CLValueError::NotNumeric(other.clone())),
        }
    }

    // -----------------------------------------------------------------------
    // Dynamic composites
    // -----------------------------------------------------------------------

    /// `Option(inner_type)` from an optional, already-encoded value.
    pub fn option(inner_type: CLType, value: Option<CLValue>) -> Result<Self, CLValueError> {
        let bytes = match value {
            None => vec![OPTION_NONE_TAG],
            Some(value) => {
                expect_type(&inner_type, &value)?;
                let mut bytes = Vec::with_capacity(1 + value.bytes.len());
                bytes.push(OPTION_SOME_TAG);
                bytes.extend_from_slice(&value.bytes);
                bytes
            }
        };
        Ok(CLValue {
            cl_type: CLType::option(inner_type),
            bytes: bytes.into(),
        })
    }

    /// `List(element_type)`. Every item must have exactly `element_type`.
    pub fn list(element_type: CLType, items: Vec<CLValue>) -> Result<Self, CLValueError> {
        let mut bytes = Vec::with_capacity(
            U32_SERIALIZED_LENGTH + items.iter().map(|item| item.bytes.len()).sum::<usize>(),
        );
        bytesrepr::write_u32_length(&mut bytes, items.len())?;
        for item in &items {
            expect_type(&element_type, item)?;
            bytesrepr::check_zero_width(item.bytes.as_slice(), &[], items.len())?;
            bytes.extend_from_slice(&item.bytes);
        }
        Ok(CLValue {
            cl_type: CLType::list(element_type),
            bytes: bytes.into(),
        })
    }

    /// `ByteArray(len)`; the bytes are stored verbatim.
    pub fn byte_array(bytes: Vec<u8>) -> Result<Self, CLValueError> {
        let size = u32::try_from(bytes.len()).map_err(|_| bytesrepr::Error::OutOfMemory)?;
        Ok(CLValue {
            cl_type: CLType::ByteArray(size),
            bytes: bytes.into(),
        })
    }

    /// `Map(key_type, value_type)`. Entries stay in the order given; a key
    /// may appear only once.
    pub fn map(
        key_type: CLType,
        value_type: CLType,
        entries: Vec<(CLValue, CLValue)>,
    ) -> Result<Self, CLValueError> {
        let mut bytes = Vec::new();
        bytesrepr::write_u32_length(&mut bytes, entries.len())?;
        let mut seen = BTreeSet::new();
        for (key, value) in &entries {
            expect_type(&key_type, key)?;
            expect_type(&value_type, value)?;
            if !seen.insert(key.bytes.as_slice()) {
                return Err(bytesrepr::Error::Formatting(DUPLICATE_MAP_KEY).into());
            }
            bytes.extend_from_slice(&key.bytes);
            bytes.extend_from_slice(&value.bytes);
        }
        Ok(CLValue {
            cl_type: CLType::map(key_type, value_type),
            bytes: bytes.into(),
        })
    }

    /// The `Ok` arm of `Result(value.cl_type, err_type)`.
    pub fn result_ok(value: CLValue, err_type: CLType) -> Self {
        let mut bytes = vec![RESULT_OK_TAG];
        bytes.extend_from_slice(&value.bytes);
        CLValue {
            cl_type: CLType::result(value.cl_type, err_type),
            bytes: bytes.into(),
        }
    }

    /// The `Err` arm of `Result(ok_type, error.cl_type)`.
    pub fn result_err(ok_type: CLType, error: CLValue) -> Self {
        let mut bytes = vec![RESULT_ERR_TAG];
        bytes.extend_from_slice(&error.bytes);
        CLValue {
            cl_type: CLType::result(ok_type, error.cl_type),
            bytes: bytes.into(),
        }
    }

    pub fn tuple1(t0: CLValue) -> Self {
        CLValue {
            cl_type: CLType::tuple1(t0.cl_type),
            bytes: t0.bytes,
        }
    }

    pub fn tuple2(t0: CLValue, t1: CLValue) -> Self {
        let bytes = [t0.bytes.as_slice(), t1.bytes.as_slice()].concat();
        CLValue {
            cl_type: CLType::tuple2(t0.cl_type, t1.cl_type),
            bytes: bytes.into(),
        }
    }

    pub fn tuple3(t0: CLValue, t1: CLValue, t2: CLValue) -> Self {
        let bytes = [t0.bytes.as_slice(), t1.bytes.as_slice(), t2.bytes.as_slice()].concat();
        CLValue {
            cl_type: CLType::tuple3(t0.cl_type, t1.cl_type, t2.cl_type),
            bytes: bytes.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Renders the decoded value as JSON, as nodes do in the `parsed` field.
    ///
    /// Integers up to 64 bits are numbers; `U128` and wider are decimal
    /// strings. `Unit` and absent options are `null`. Returns `None` only if
    /// the bytes fail to decode, which no constructor allows.
    pub fn parsed(&self) -> Option<Value> {
        decode(&self.cl_type, &self.bytes).ok().map(|(value, _)| value)
    }
}

fn expect_type(expected: &CLType, value: &CLValue) -> Result<(), CLValueError> {
    if &value.cl_type == expected {
        Ok(())
    } else {
        Err(CLValueError::TypeMismatch {
            expected: expected.clone(),
            found: value.cl_type.clone(),
        })
    }
}

fn validate(cl_type: &CLType, bytes: &[u8]) -> Result<(), bytesrepr::Error> {
    let rem = skip(cl_type, bytes)?;
    if rem.is_empty() {
        Ok(())
    } else {
        Err(bytesrepr::Error::LeftOverBytes(rem.len()))
    }
}

const DUPLICATE_MAP_KEY: &str = "duplicate map key";

// ---------------------------------------------------------------------------
// Validation walk
// ---------------------------------------------------------------------------

fn skip_leaf<T: FromBytes>(bytes: &[u8]) -> Result<&[u8], bytesrepr::Error> {
    T::from_bytes(bytes).map(|(_, rem)| rem)
}

/// Checks that `bytes` start with one canonical value of `cl_type` and
/// returns what follows it. Builds nothing, so the work is bounded by the
/// input length.
fn skip<'a>(cl_type: &CLType, bytes: &'a [u8]) -> Result<&'a [u8], bytesrepr::Error> {
    match cl_type {
        CLType::Bool => skip_leaf::<bool>(bytes),
        CLType::I32 => skip_leaf::<i32>(bytes),
        CLType::I64 => skip_leaf::<i64>(bytes),
        CLType::U8 => skip_leaf::<u8>(bytes),
        CLType::U32 => skip_leaf::<u32>(bytes),
        CLType::U64 => skip_leaf::<u64>(bytes),
        CLType::U128 => skip_leaf::<U128>(bytes),
        CLType::U256 => skip_leaf::<U256>(bytes),
        CLType::U512 => skip_leaf::<U512>(bytes),
        CLType::Unit => Ok(bytes),
        CLType::String => skip_leaf::<String>(bytes),
        CLType::Key => skip_leaf::<Key>(bytes),
        CLType::URef => skip_leaf::<URef>(bytes),
        CLType::PublicKey => skip_leaf::<PublicKey>(bytes),
        CLType::Option(inner) => {
            let (tag, rem) = u8::from_bytes(bytes)?;
            match tag {
                OPTION_NONE_TAG => Ok(rem),
                OPTION_SOME_TAG => skip(inner, rem),
                tag => Err(bytesrepr::Error::UnknownTag {
                    context: "option",
                    tag,
                }),
            }
        }
        CLType::List(inner) => {
            let (count, mut rem) = u32::from_bytes(bytes)?;
            let count = count as usize;
            for _ in 0..count {
                let next = skip(inner, rem)?;
                bytesrepr::check_zero_width(rem, next, count)?;
                rem = next;
            }
            Ok(rem)
        }
        CLType::ByteArray(size) => {
            bytesrepr::safe_split_at(bytes, *size as usize).map(|(_, rem)| rem)
        }
        CLType::Result { ok, err } => {
            let (tag, rem) = u8::from_bytes(bytes)?;
            match tag {
                RESULT_OK_TAG => skip(ok, rem),
                RESULT_ERR_TAG => skip(err, rem),
                tag => Err(bytesrepr::Error::UnknownTag {
                    context: "result",
                    tag,
                }),
            }
        }
        CLType::Map { key, value } => {
            // Canonical bytes make byte equality key equality, so a repeated
            // key can be caught without decoding it.
            let (count, mut rem) = u32::from_bytes(bytes)?;
            let mut seen = BTreeSet::new();
            for _ in 0..count {
                let after_key = skip(key, rem)?;
                let key_len = rem.len().saturating_sub(after_key.len());
                if !seen.insert(&rem[..key_len]) {
                    return Err(bytesrepr::Error::Formatting(DUPLICATE_MAP_KEY));
                }
                rem = skip(value, after_key)?;
            }
            Ok(rem)
        }
        CLType::Tuple1(types) => skip_sequence(types, bytes),
        CLType::Tuple2(types) => skip_sequence(types, bytes),
        CLType::Tuple3(types) => skip_sequence(types, bytes),
        CLType::Any => Ok(&bytes[bytes.len()..]),
    }
}

fn skip_sequence<'a>(types: &[Box<CLType>], bytes: &'a [u8]) -> Result<&'a [u8], bytesrepr::Error> {
    types.iter().try_fold(bytes, |rem, cl_type| skip(cl_type, rem))
}

// ---------------------------------------------------------------------------
// Rendering walk
// ---------------------------------------------------------------------------

type Decoded<'a> = Result<(Value, &'a [u8]), bytesrepr::Error>;

fn leaf<T: FromBytes>(bytes: &[u8], render: impl FnOnce(T) -> Value) -> Decoded<'_> {
    let (value, rem) = T::from_bytes(bytes)?;
    Ok((render(value), rem))
}

fn sequence<'a>(types: &[Box<CLType>], mut bytes: &'a [u8]) -> Decoded<'a> {
    let mut items = Vec::with_capacity(types.len());
    for cl_type in types {
        let (item, rem) = decode(cl_type, bytes)?;
        items.push(item);
        bytes = rem;
    }
    Ok((Value::Array(items), bytes))
}

/// Walks `bytes` as one value of `cl_type`, rendering it as JSON. Only run on
/// bytes that already passed [`skip`].
fn decode<'a>(cl_type: &CLType, bytes: &'a [u8]) -> Decoded<'a> {
    match cl_type {
        CLType::Bool => leaf(bytes, Value::Bool),
        CLType::I32 => leaf(bytes, |v: i32| Value::from(v)),
        CLType::I64 => leaf(bytes, |v: i64| Value::from(v)),
        CLType::U8 => leaf(bytes, |v: u8| Value::from(v)),
        CLType::U32 => leaf(bytes, |v: u32| Value::from(v)),
        CLType::U64 => leaf(bytes, |v: u64| Value::from(v)),
        CLType::U128 => leaf(bytes, |v: U128| Value::String(v.to_string())),
        CLType::U256 => leaf(bytes, |v: U256| Value::String(v.to_string())),
        CLType::U512 => leaf(bytes, |v: U512| Value::String(v.to_string())),
        CLType::Unit => Ok((Value::Null, bytes)),
        CLType::String => leaf(bytes, Value::String),
        CLType::Key => leaf(bytes, |key: Key| Value::String(key.to_formatted_string())),
        CLType::URef => leaf(bytes, |uref: URef| Value::String(uref.to_formatted_string())),
        CLType::PublicKey => leaf(bytes, |key: PublicKey| Value::String(key.to_hex())),
        CLType::Option(inner) => {
            let (tag, rem) = u8::from_bytes(bytes)?;
            match tag {
                OPTION_NONE_TAG => Ok((Value::Null, rem)),
                OPTION_SOME_TAG => decode(inner, rem),
                tag => Err(bytesrepr::Error::UnknownTag {
                    context: "option",
                    tag,
                }),
            }
        }
        CLType::List(inner) => {
            let (count, mut rem) = u32::from_bytes(bytes)?;
            let mut items = Vec::with_capacity((count as usize).min(rem.len()));
            for _ in 0..count {
                let (item, next) = decode(inner, rem)?;
                items.push(item);
                rem = next;
            }
            Ok((Value::Array(items), rem))
        }
        CLType::ByteArray(size) => {
            let (raw, rem) = bytesrepr::safe_split_at(bytes, *size as usize)?;
            Ok((Value::String(hex::encode(raw)), rem))
        }
        CLType::Result { ok, err } => {
            let (tag, rem) = u8::from_bytes(bytes)?;
            let (arm, inner) = match tag {
                RESULT_OK_TAG => ("Ok", ok),
                RESULT_ERR_TAG => ("Err", err),
                tag => {
                    return Err(bytesrepr::Error::UnknownTag {
                        context: "result",
                        tag,
                    })
                }
            };
            let (value, rem) = decode(inner, rem)?;
            let mut object = Map::new();
            object.insert(arm.to_string(), value);
            Ok((Value::Object(object), rem))
        }
        CLType::Map { key, value } => {
            let (count, mut rem) = u32::from_bytes(bytes)?;
            let mut entries = Vec::with_capacity((count as usize).min(rem.len()));
            for _ in 0..count {
                let (k, next) = decode(key, rem)?;
                let (v, next) = decode(value, next)?;
                let mut entry = Map::new();
                entry.insert("key".to_string(), k);
                entry.insert("value".to_string(), v);
                entries.push(Value::Object(entry));
                rem = next;
            }
            Ok((Value::Array(entries), rem))
        }
        CLType::Tuple1(types) => sequence(types, bytes),
        CLType::Tuple2(types) => sequence(types, bytes),
        CLType::Tuple3(types) => sequence(types, bytes),
        // Structure unknown: the value owns every remaining byte.
        CLType::Any => Ok((Value::String(hex::encode(bytes)), &bytes[bytes.len()..])),
    }
}

// ---------------------------------------------------------------------------
// Binary & JSON forms
// ---------------------------------------------------------------------------

impl ToBytes for CLValue {
    fn serialized_length(&self) -> usize {
        self.bytes.serialized_length() + self.cl_type.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.bytes.write_bytes(writer)?;
        self.cl_type.write_bytes(writer)
    }
}

impl FromBytes for CLValue {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (payload, rem) = Bytes::from_bytes(bytes)?;
        let (cl_type, rem) = CLType::from_bytes(rem)?;
        validate(&cl_type, &payload)?;
        Ok((
            CLValue {
                cl_type,
                bytes: payload,
            },
            rem,
        ))
    }
}

#[derive(Serialize)]
struct CLValueJsonRef<'a> {
    cl_type: &'a CLType,
    bytes: &'a Bytes,
    parsed: Option<Value>,
}

#[derive(Deserialize)]
struct CLValueJson {
    cl_type: CLType,
    bytes: Bytes,
}

impl Serialize for CLValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CLValueJsonRef {
            cl_type: &self.cl_type,
            bytes: &self.bytes,
            parsed: self.parsed(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CLValue {
    /// `parsed` is informational and ignored; `bytes` is authoritative.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let CLValueJson { cl_type, bytes } = CLValueJson::deserialize(deserializer)?;
        CLValue::from_components(cl_type, bytes.into_inner()).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cl::{AccessRights, AccountHash};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn roundtrip<T>(value: T)
    where
        T: CLTyped + ToBytes + FromBytes + PartialEq + std::fmt::Debug + Clone,
    {
        let cl_value = CLValue::from_t(value.clone()).unwrap();
        let wire = cl_value.to_bytes().unwrap();
        let decoded: CLValue = bytesrepr::deserialize(&wire).unwrap();
        assert_eq!(decoded, cl_value);
        assert_eq!(decoded.into_t::<T>().unwrap(), value);
    }

    #[test]
    fn boundaries_roundtrip() {
        roundtrip(0u8);
        roundtrip(255u8);
        roundtrip(i32::MIN);
        roundtrip(u64::MAX);
        roundtrip(U512::MAX);
        roundtrip(U128::zero());
        roundtrip(Vec::<u32>::new());
        roundtrip(None::<String>);
        roundtrip(Some(String::from("present")));
        roundtrip(Some(vec![U512::from(1u64), U512::from(u64::MAX)]));
        roundtrip(());
        roundtrip([7u8; 32]);
        roundtrip(Key::Account(AccountHash::new([3; 32])));
        roundtrip(URef::new([4; 32], AccessRights::READ_ADD_WRITE));
        roundtrip((1u8, String::from("two"), true));
    }

    #[test]
    fn wire_layout_is_data_then_type() {
        let value = CLValue::from_t(7u32).unwrap();
        assert_eq!(value.to_bytes().unwrap(), vec![4, 0, 0, 0, 7, 0, 0, 0, 4]);

        let unit = CLValue::unit();
        assert_eq!(unit.to_bytes().unwrap(), vec![0, 0, 0, 0, 9]);
    }

    #[test]
    fn u512_large_integer_survives() {
        let value = CLValue::from_t(U512::from(5_123_456_789_012u64)).unwrap();
        assert_eq!(value.cl_type(), &CLType::U512);
        let decoded: CLValue = bytesrepr::deserialize(&value.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.to_t::<U512>().unwrap(), U512::from(5_123_456_789_012u64));
    }

    #[test]
    fn list_of_optional_strings() {
        let items = vec![
            Some(String::from("a")),
            Some(String::from("b")),
            None,
            Some(String::from("d")),
        ];
        let value = CLValue::from_t(items.clone()).unwrap();
        let payload = value.inner_bytes();
        assert_eq!(&payload[..4], &[4, 0, 0, 0]);
        assert_eq!(payload[4], OPTION_SOME_TAG);

        let decoded: Vec<Option<String>> = value.to_t().unwrap();
        assert_eq!(decoded, items);
        assert_eq!(decoded[2], None);

        let dynamic = CLValue::list(
            CLType::option(CLType::String),
            items
                .iter()
                .map(|item| {
                    let inner = item.as_ref().map(|s| CLValue::from_t(s.clone()).unwrap());
                    CLValue::option(CLType::String, inner).unwrap()
                })
                .collect(),
        )
        .unwrap();
        assert_eq!(dynamic, value);
    }

    #[test]
    fn integer_range_checks() {
        assert!(CLValue::from_integer(&CLType::U8, 255).is_ok());
        assert_eq!(
            CLValue::from_integer(&CLType::U8, 256),
            Err(CLValueError::Range {
                cl_type: CLType::U8,
                value: "256".into()
            })
        );
        assert!(CLValue::from_integer(&CLType::U64, -1).is_err());
        assert!(CLValue::from_integer(&CLType::I32, i32::MIN as i128).is_ok());
        assert_eq!(
            CLValue::from_integer(&CLType::String, 1),
            Err(CLValueError::NotNumeric(CLType::String))
        );
        let big = CLValue::from_integer(&CLType::U256, 1_000).unwrap();
        assert_eq!(big.to_t::<U256>().unwrap(), U256::from(1_000u64));
    }

    #[test]
    fn decimal_strings() {
        let max = U512::MAX.to_string();
        let value = CLValue::from_dec_str(&CLType::U512, &max).unwrap();
        assert_eq!(value.to_t::<U512>().unwrap(), U512::MAX);
        assert!(CLValue::from_dec_str(&CLType::U128, &U256::MAX.to_string()).is_err());
        assert!(CLValue::from_dec_str(&CLType::U8, "300").is_err());
        assert_eq!(
            CLValue::from_dec_str(&CLType::I64, "-5").unwrap().to_t::<i64>(),
            Ok(-5)
        );
    }

    #[test]
    fn type_mismatch_on_extraction() {
        let value = CLValue::from_t(1u64).unwrap();
        assert_eq!(
            value.to_t::<u32>(),
            Err(CLValueError::TypeMismatch {
                expected: CLType::U32,
                found: CLType::U64
            })
        );
        let option = CLValue::from_t(Some(1u8)).unwrap();
        assert!(option.to_t::<Option<u64>>().is_err());
    }

    #[test]
    fn heterogeneous_list_rejected() {
        let items = vec![CLValue::from_t(1u8).unwrap(), CLValue::from_t(1u32).unwrap()];
        assert!(matches!(
            CLValue::list(CLType::U8, items),
            Err(CLValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn byte_array_length_must_match() {
        assert_eq!(
            CLValue::from_components(CLType::ByteArray(32), vec![0; 31]),
            Err(CLValueError::Serialization(bytesrepr::Error::EarlyEndOfStream))
        );
        assert_eq!(
            CLValue::from_components(CLType::ByteArray(32), vec![0; 33]),
            Err(CLValueError::Serialization(bytesrepr::Error::LeftOverBytes(1)))
        );
        let value = CLValue::byte_array(vec![1, 2, 3]).unwrap();
        assert_eq!(value.cl_type(), &CLType::ByteArray(3));
    }

    #[test]
    fn malformed_payloads_rejected() {
        assert!(CLValue::from_components(CLType::Bool, vec![2]).is_err());
        assert!(CLValue::from_components(CLType::option(CLType::U8), vec![3, 0]).is_err());
        assert!(CLValue::from_components(CLType::String, vec![5, 0, 0, 0, b'a']).is_err());
        // Trailing zero in a big-integer magnitude is not canonical.
        assert!(CLValue::from_components(CLType::U512, vec![2, 1, 0]).is_err());
    }

    #[test]
    fn map_preserves_insertion_order() {
        let entries = vec![
            (CLValue::from_t("zebra").unwrap(), CLValue::from_t(1u8).unwrap()),
            (CLValue::from_t("apple").unwrap(), CLValue::from_t(2u8).unwrap()),
        ];
        let value = CLValue::map(CLType::String, CLType::U8, entries).unwrap();
        assert_eq!(
            value.parsed().unwrap(),
            json!([{"key": "zebra", "value": 1}, {"key": "apple", "value": 2}])
        );
        let payload = value.inner_bytes();
        assert_eq!(&payload[..4], &[2, 0, 0, 0]);
        assert_eq!(&payload[8..13], b"zebra");
    }

    #[test]
    fn results_and_tuples() {
        let ok = CLValue::result_ok(CLValue::from_t(5u32).unwrap(), CLType::String);
        assert_eq!(ok.to_t::<Result<u32, String>>().unwrap(), Ok(5));
        assert_eq!(ok.parsed().unwrap(), json!({"Ok": 5}));

        let err = CLValue::result_err(CLType::U32, CLValue::from_t("boom").unwrap());
        assert_eq!(err.to_t::<Result<u32, String>>().unwrap(), Err("boom".into()));

        let pair = CLValue::tuple2(CLValue::from_t(1u8).unwrap(), CLValue::from_t(true).unwrap());
        assert_eq!(pair.to_t::<(u8, bool)>().unwrap(), (1, true));
        assert_eq!(pair.parsed().unwrap(), json!([1, true]));
    }

    #[test]
    fn zero_width_list_with_huge_count_rejected() {
        let hostile = u32::MAX.to_le_bytes().to_vec();
        assert_eq!(
            CLValue::from_components(CLType::list(CLType::Unit), hostile.clone()),
            Err(CLValueError::Serialization(bytesrepr::Error::Formatting(
                "too many zero-width elements"
            )))
        );

        let mut wire = vec![4, 0, 0, 0];
        wire.extend_from_slice(&hostile);
        wire.extend_from_slice(&[14, 9]);
        assert!(bytesrepr::deserialize::<CLValue>(&wire).is_err());

        let nested = CLType::list(CLType::tuple2(CLType::Unit, CLType::Unit));
        assert!(CLValue::from_components(nested, hostile).is_err());
    }

    #[test]
    fn small_unit_lists_still_accepted() {
        let value = CLValue::from_t(vec![(), (), ()]).unwrap();
        assert_eq!(value.inner_bytes(), &[3, 0, 0, 0]);
        let decoded: CLValue = bytesrepr::deserialize(&value.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.to_t::<Vec<()>>().unwrap().len(), 3);
        assert_eq!(decoded.parsed(), Some(json!([null, null, null])));

        let dynamic = CLValue::list(CLType::Unit, vec![CLValue::unit(); 3]).unwrap();
        assert_eq!(dynamic, value);
        let too_many = vec![CLValue::unit(); crate::config::MAX_ZERO_WIDTH_ELEMENTS + 1];
        assert!(CLValue::list(CLType::Unit, too_many).is_err());
    }

    #[test]
    fn duplicate_map_keys_rejected_on_both_sides() {
        let entry = || (CLValue::from_t("a").unwrap(), CLValue::from_t(1u8).unwrap());
        assert_eq!(
            CLValue::map(CLType::String, CLType::U8, vec![entry(), entry()]),
            Err(CLValueError::Serialization(bytesrepr::Error::Formatting(
                "duplicate map key"
            )))
        );

        // Two "a" -> 1 entries written by hand.
        let mut payload = vec![2, 0, 0, 0];
        for _ in 0..2 {
            payload.extend_from_slice(&[1, 0, 0, 0, b'a', 1]);
        }
        let map_type = CLType::map(CLType::String, CLType::U8);
        assert!(CLValue::from_components(map_type.clone(), payload.clone()).is_err());

        let mut wire = (payload.len() as u32).to_le_bytes().to_vec();
        wire.extend_from_slice(&payload);
        wire.extend_from_slice(&map_type.to_bytes().unwrap());
        assert!(bytesrepr::deserialize::<CLValue>(&wire).is_err());

        let unit_keys = CLType::map(CLType::Unit, CLType::Unit);
        assert!(CLValue::from_components(unit_keys, u32::MAX.to_le_bytes().to_vec()).is_err());
    }

    #[test]
    fn every_accepted_map_reads_back_typed() {
        let entries = vec![
            (CLValue::from_t("b").unwrap(), CLValue::from_t(2u8).unwrap()),
            (CLValue::from_t("a").unwrap(), CLValue::from_t(1u8).unwrap()),
        ];
        let value = CLValue::map(CLType::String, CLType::U8, entries).unwrap();
        let decoded: CLValue = bytesrepr::deserialize(&value.to_bytes().unwrap()).unwrap();
        let typed: BTreeMap<String, u8> = decoded.to_t().unwrap();
        assert_eq!(typed.len(), 2);
        assert_eq!(typed["a"], 1);
    }

    #[test]
    fn typed_map_matches_dynamic_map_when_sorted() {
        let mut typed = BTreeMap::new();
        typed.insert(String::from("a"), 1u64);
        typed.insert(String::from("b"), 2u64);
        let dynamic = CLValue::map(
            CLType::String,
            CLType::U64,
            vec![
                (CLValue::from_t("a").unwrap(), CLValue::from_t(1u64).unwrap()),
                (CLValue::from_t("b").unwrap(), CLValue::from_t(2u64).unwrap()),
            ],
        )
        .unwrap();
        assert_eq!(CLValue::from_t(typed).unwrap(), dynamic);
    }

    #[test]
    fn parsed_rendering() {
        assert_eq!(CLValue::from_t(u64::MAX).unwrap().parsed(), Some(json!(u64::MAX)));
        assert_eq!(
            CLValue::from_t(U512::from(10u64)).unwrap().parsed(),
            Some(json!("10"))
        );
        assert_eq!(CLValue::unit().parsed(), Some(Value::Null));
        assert_eq!(CLValue::from_t(None::<u8>).unwrap().parsed(), Some(Value::Null));
        assert_eq!(
            CLValue::from_t([0xABu8; 2]).unwrap().parsed(),
            Some(json!("abab"))
        );
    }

    #[test]
    fn json_shape_and_roundtrip() {
        let value = CLValue::from_t(U512::from(1_000u64)).unwrap();
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            json!({"cl_type": "U512", "bytes": "02e803", "parsed": "1000"})
        );
        assert_eq!(serde_json::from_value::<CLValue>(json).unwrap(), value);
    }

    #[test]
    fn json_with_inconsistent_bytes_rejected() {
        let bad = json!({"cl_type": "U32", "bytes": "0100", "parsed": 1});
        assert!(serde_json::from_value::<CLValue>(bad).is_err());
    }
}
