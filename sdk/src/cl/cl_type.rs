//! # CLType
//!
//! The closed, recursive set of shapes a [`CLValue`](super::CLValue) can take.
//!
//! Three representations, all round-trippable:
//!
//! | Form   | Example                                   |
//! |--------|-------------------------------------------|
//! | binary | `0x0d 0x0e 0x08` (`Option`, `List`, `U512`) |
//! | name   | `Option(List(U512))`                      |
//! | JSON   | `{"Option":{"List":"U512"}}`              |
//!
//! The binary descriptor is a tag byte per level. Composites append their
//! nested descriptors; `ByteArray` appends its size as a `u32`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bytesrepr::{self, FromBytes, ToBytes, U32_SERIALIZED_LENGTH, U8_SERIALIZED_LENGTH};
use crate::config::MAX_CL_TYPE_DEPTH;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Binary discriminants of every [`CLType`] variant.
pub mod tags {
    pub const BOOL: u8 = 0;
    pub const I32: u8 = 1;
    pub const I64: u8 = 2;
    pub const U8: u8 = 3;
    pub const U32: u8 = 4;
    pub const U64: u8 = 5;
    pub const U128: u8 = 6;
    pub const U256: u8 = 7;
    pub const U512: u8 = 8;
    pub const UNIT: u8 = 9;
    pub const STRING: u8 = 10;
    pub const KEY: u8 = 11;
    pub const UREF: u8 = 12;
    pub const OPTION: u8 = 13;
    pub const LIST: u8 = 14;
    pub const BYTE_ARRAY: u8 = 15;
    pub const RESULT: u8 = 16;
    pub const MAP: u8 = 17;
    pub const TUPLE1: u8 = 18;
    pub const TUPLE2: u8 = 19;
    pub const TUPLE3: u8 = 20;
    pub const ANY: u8 = 21;
    pub const PUBLIC_KEY: u8 = 22;
}

/// Leaf variants paired with their canonical names. Shared by the name
/// parser, the JSON visitor and `Display`, so the three cannot drift.
const LEAVES: [(&str, CLType); 15] = [
    ("Bool", CLType::Bool),
    ("I32", CLType::I32),
    ("I64", CLType::I64),
    ("U8", CLType::U8),
    ("U32", CLType::U32),
    ("U64", CLType::U64),
    ("U128", CLType::U128),
    ("U256", CLType::U256),
    ("U512", CLType::U512),
    ("Unit", CLType::Unit),
    ("String", CLType::String),
    ("Key", CLType::Key),
    ("URef", CLType::URef),
    ("PublicKey", CLType::PublicKey),
    ("Any", CLType::Any),
];

fn leaf_from_name(name: &str) -> Option<CLType> {
    LEAVES
        .iter()
        .find(|(leaf_name, _)| *leaf_name == name)
        .map(|(_, cl_type)| cl_type.clone())
}

// ---------------------------------------------------------------------------
// CLType
// ---------------------------------------------------------------------------

/// A CL type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CLType {
    Bool,
    I32,
    I64,
    U8,
    U32,
    U64,
    U128,
    U256,
    U512,
    Unit,
    String,
    Key,
    URef,
    PublicKey,
    /// `Option<T>`.
    Option(Box<CLType>),
    /// Homogeneous variable-length list.
    List(Box<CLType>),
    /// Fixed-length byte array of the given size.
    ByteArray(u32),
    /// `Result<ok, err>`.
    Result { ok: Box<CLType>, err: Box<CLType> },
    /// Ordered map. Entry order on the wire is insertion order.
    Map { key: Box<CLType>, value: Box<CLType> },
    Tuple1([Box<CLType>; 1]),
    Tuple2([Box<CLType>; 2]),
    Tuple3([Box<CLType>; 3]),
    /// Opaque value whose structure the descriptor does not state.
    Any,
}

impl CLType {
    /// `Option(inner)`.
    pub fn option(inner: CLType) -> Self {
        CLType::Option(Box::new(inner))
    }

    /// `List(inner)`.
    pub fn list(inner: CLType) -> Self {
        CLType::List(Box::new(inner))
    }

    /// `Result(ok, err)`.
    pub fn result(ok: CLType, err: CLType) -> Self {
        CLType::Result {
            ok: Box::new(ok),
            err: Box::new(err),
        }
    }

    /// `Map(key, value)`.
    pub fn map(key: CLType, value: CLType) -> Self {
        CLType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// `Tuple1(t0)`.
    pub fn tuple1(t0: CLType) -> Self {
        CLType::Tuple1([Box::new(t0)])
    }

    /// `Tuple2(t0, t1)`.
    pub fn tuple2(t0: CLType, t1: CLType) -> Self {
        CLType::Tuple2([Box::new(t0), Box::new(t1)])
    }

    /// `Tuple3(t0, t1, t2)`.
    pub fn tuple3(t0: CLType, t1: CLType, t2: CLType) -> Self {
        CLType::Tuple3([Box::new(t0), Box::new(t1), Box::new(t2)])
    }

    /// The leading tag byte of this descriptor.
    pub fn tag(&self) -> u8 {
        match self {
            CLType::Bool => tags::BOOL,
            CLType::I32 => tags::I32,
            CLType::I64 => tags::I64,
            CLType::U8 => tags::U8,
            CLType::U32 => tags::U32,
            CLType::U64 => tags::U64,
            CLType::U128 => tags::U128,
            CLType::U256 => tags::U256,
            CLType::U512 => tags::U512,
            CLType::Unit => tags::UNIT,
            CLType::String => tags::STRING,
            CLType::Key => tags::KEY,
            CLType::URef => tags::UREF,
            CLType::PublicKey => tags::PUBLIC_KEY,
            CLType::Option(_) => tags::OPTION,
            CLType::List(_) => tags::LIST,
            CLType::ByteArray(_) => tags::BYTE_ARRAY,
            CLType::Result { .. } => tags::RESULT,
            CLType::Map { .. } => tags::MAP,
            CLType::Tuple1(_) => tags::TUPLE1,
            CLType::Tuple2(_) => tags::TUPLE2,
            CLType::Tuple3(_) => tags::TUPLE3,
            CLType::Any => tags::ANY,
        }
    }

    /// `true` for variants with nested types or a size.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            CLType::Option(_)
                | CLType::List(_)
                | CLType::ByteArray(_)
                | CLType::Result { .. }
                | CLType::Map { .. }
                | CLType::Tuple1(_)
                | CLType::Tuple2(_)
                | CLType::Tuple3(_)
        )
    }

    fn leaf_name(&self) -> Option<&'static str> {
        LEAVES
            .iter()
            .find(|(_, cl_type)| cl_type == self)
            .map(|(name, _)| *name)
    }

    fn from_bytes_with_depth(bytes: &[u8], depth: u8) -> Result<(Self, &[u8]), bytesrepr::Error> {
        if depth >= MAX_CL_TYPE_DEPTH {
            return Err(bytesrepr::Error::ExceededRecursionDepth);
        }
        let next = depth + 1;
        let (tag, rem) = u8::from_bytes(bytes)?;
        let parsed = match tag {
            tags::BOOL => (CLType::Bool, rem),
            tags::I32 => (CLType::I32, rem),
            tags::I64 => (CLType::I64, rem),
            tags::U8 => (CLType::U8, rem),
            tags::U32 => (CLType::U32, rem),
            tags::U64 => (CLType::U64, rem),
            tags::U128 => (CLType::U128, rem),
            tags::U256 => (CLType::U256, rem),
            tags::U512 => (CLType::U512, rem),
            tags::UNIT => (CLType::Unit, rem),
            tags::STRING => (CLType::String, rem),
            tags::KEY => (CLType::Key, rem),
            tags::UREF => (CLType::URef, rem),
            tags::PUBLIC_KEY => (CLType::PublicKey, rem),
            tags::ANY => (CLType::Any, rem),
            tags::OPTION => {
                let (inner, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::option(inner), rem)
            }
            tags::LIST => {
                let (inner, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::list(inner), rem)
            }
            tags::BYTE_ARRAY => {
                let (size, rem) = u32::from_bytes(rem)?;
                (CLType::ByteArray(size), rem)
            }
            tags::RESULT => {
                let (ok, rem) = Self::from_bytes_with_depth(rem, next)?;
                let (err, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::result(ok, err), rem)
            }
            tags::MAP => {
                let (key, rem) = Self::from_bytes_with_depth(rem, next)?;
                let (value, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::map(key, value), rem)
            }
            tags::TUPLE1 => {
                let (t0, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::tuple1(t0), rem)
            }
            tags::TUPLE2 => {
                let (t0, rem) = Self::from_bytes_with_depth(rem, next)?;
                let (t1, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::tuple2(t0, t1), rem)
            }
            tags::TUPLE3 => {
                let (t0, rem) = Self::from_bytes_with_depth(rem, next)?;
                let (t1, rem) = Self::from_bytes_with_depth(rem, next)?;
                let (t2, rem) = Self::from_bytes_with_depth(rem, next)?;
                (CLType::tuple3(t0, t1, t2), rem)
            }
            tag => {
                return Err(bytesrepr::Error::UnknownTag {
                    context: "cl type",
                    tag,
                })
            }
        };
        Ok(parsed)
    }
}

// ---------------------------------------------------------------------------
// Binary descriptor
// ---------------------------------------------------------------------------

impl ToBytes for CLType {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                CLType::Option(inner) | CLType::List(inner) => inner.serialized_length(),
                CLType::ByteArray(_) => U32_SERIALIZED_LENGTH,
                CLType::Result { ok: a, err: b } | CLType::Map { key: a, value: b } => {
                    a.serialized_length() + b.serialized_length()
                }
                CLType::Tuple1(types) => types.iter().map(|t| t.serialized_length()).sum(),
                CLType::Tuple2(types) => types.iter().map(|t| t.serialized_length()).sum(),
                CLType::Tuple3(types) => types.iter().map(|t| t.serialized_length()).sum(),
                _ => 0,
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.push(self.tag());
        match self {
            CLType::Option(inner) | CLType::List(inner) => inner.write_bytes(writer),
            CLType::ByteArray(size) => size.write_bytes(writer),
            CLType::Result { ok: a, err: b } | CLType::Map { key: a, value: b } => {
                a.write_bytes(writer)?;
                b.write_bytes(writer)
            }
            CLType::Tuple1(types) => types.iter().try_for_each(|t| t.write_bytes(writer)),
            CLType::Tuple2(types) => types.iter().try_for_each(|t| t.write_bytes(writer)),
            CLType::Tuple3(types) => types.iter().try_for_each(|t| t.write_bytes(writer)),
            _ => Ok(()),
        }
    }
}

impl FromBytes for CLType {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        Self::from_bytes_with_depth(bytes, 0)
    }
}

// ---------------------------------------------------------------------------
// Canonical names
// ---------------------------------------------------------------------------

impl fmt::Display for CLType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.leaf_name() {
            return f.write_str(name);
        }
        match self {
            CLType::Option(inner) => write!(f, "Option({inner})"),
            CLType::List(inner) => write!(f, "List({inner})"),
            CLType::ByteArray(size) => write!(f, "ByteArray({size})"),
            CLType::Result { ok, err } => write!(f, "Result({ok}, {err})"),
            CLType::Map { key, value } => write!(f, "Map({key}, {value})"),
            CLType::Tuple1([t0]) => write!(f, "Tuple1({t0})"),
            CLType::Tuple2([t0, t1]) => write!(f, "Tuple2({t0}, {t1})"),
            CLType::Tuple3([t0, t1, t2]) => write!(f, "Tuple3({t0}, {t1}, {t2})"),
            // Every leaf is covered by `leaf_name`.
            _ => Ok(()),
        }
    }
}

/// A canonical type name that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CLType name {input:?}: {reason}")]
pub struct CLTypeParseError {
    input: String,
    reason: &'static str,
}

struct NameParser<'a> {
    input: &'a str,
    pos: usize,
    depth: u8,
}

impl<'a> NameParser<'a> {
    fn fail<T>(&self, reason: &'static str) -> Result<T, CLTypeParseError> {
        Err(CLTypeParseError {
            input: self.input.to_string(),
            reason,
        })
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, expected: char) -> Result<(), CLTypeParseError> {
        self.skip_whitespace();
        if self.input[self.pos..].starts_with(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            self.fail("unexpected character")
        }
    }

    fn ident(&mut self) -> &'a str {
        self.skip_whitespace();
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn parse(&mut self) -> Result<CLType, CLTypeParseError> {
        if self.depth >= MAX_CL_TYPE_DEPTH {
            return self.fail("nesting too deep");
        }
        let name = self.ident();
        if let Some(leaf) = leaf_from_name(name) {
            return Ok(leaf);
        }

        self.eat('(')?;
        let cl_type = if name == "ByteArray" {
            let size = self.ident();
            match size.parse::<u32>() {
                Ok(size) => CLType::ByteArray(size),
                Err(_) => return self.fail("invalid ByteArray size"),
            }
        } else {
            self.depth += 1;
            let first = self.parse()?;
            let mut rest = Vec::new();
            while self.eat(',').is_ok() {
                rest.push(self.parse()?);
            }
            self.depth -= 1;
            let mut rest = rest.into_iter();
            match (name, rest.next(), rest.next(), rest.next()) {
                ("Option", None, ..) => CLType::option(first),
                ("List", None, ..) => CLType::list(first),
                ("Tuple1", None, ..) => CLType::tuple1(first),
                ("Result", Some(err), None, _) => CLType::result(first, err),
                ("Map", Some(value), None, _) => CLType::map(first, value),
                ("Tuple2", Some(t1), None, _) => CLType::tuple2(first, t1),
                ("Tuple3", Some(t1), Some(t2), None) => CLType::tuple3(first, t1, t2),
                _ => return self.fail("unknown type or wrong arity"),
            }
        };
        self.eat(')')?;
        Ok(cl_type)
    }
}

impl FromStr for CLType {
    type Err = CLTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = NameParser {
            input: s,
            pos: 0,
            depth: 0,
        };
        let cl_type = parser.parse()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return parser.fail("trailing characters");
        }
        Ok(cl_type)
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ResultTypesRef<'a> {
    ok: &'a CLType,
    err: &'a CLType,
}

#[derive(Serialize)]
struct MapTypesRef<'a> {
    key: &'a CLType,
    value: &'a CLType,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ResultTypes {
    ok: CLType,
    err: CLType,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MapTypes {
    key: CLType,
    value: CLType,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Tuple1Repr {
    Bare(CLType),
    Seq([CLType; 1]),
}

impl Serialize for CLType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(name) = self.leaf_name() {
            return serializer.serialize_str(name);
        }
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            CLType::Option(inner) => map.serialize_entry("Option", inner)?,
            CLType::List(inner) => map.serialize_entry("List", inner)?,
            CLType::ByteArray(size) => map.serialize_entry("ByteArray", size)?,
            CLType::Result { ok, err } => map.serialize_entry("Result", &ResultTypesRef { ok, err })?,
            CLType::Map { key, value } => map.serialize_entry("Map", &MapTypesRef { key, value })?,
            CLType::Tuple1([t0]) => map.serialize_entry("Tuple1", t0)?,
            CLType::Tuple2(types) => map.serialize_entry("Tuple2", types)?,
            CLType::Tuple3(types) => map.serialize_entry("Tuple3", types)?,
            _ => {}
        }
        map.end()
    }
}

struct CLTypeVisitor;

impl<'de> Visitor<'de> for CLTypeVisitor {
    type Value = CLType;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a CLType name or a single-key composite object")
    }

    fn visit_str<E: de::Error>(self, name: &str) -> Result<CLType, E> {
        leaf_from_name(name).ok_or_else(|| E::unknown_variant(name, &[]))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CLType, A::Error> {
        let variant: String = access
            .next_key()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let cl_type = match variant.as_str() {
            "Option" => CLType::option(access.next_value()?),
            "List" => CLType::list(access.next_value()?),
            "ByteArray" => CLType::ByteArray(access.next_value()?),
            "Result" => {
                let ResultTypes { ok, err } = access.next_value()?;
                CLType::result(ok, err)
            }
            "Map" => {
                let MapTypes { key, value } = access.next_value()?;
                CLType::map(key, value)
            }
            "Tuple1" => match access.next_value()? {
                Tuple1Repr::Bare(t0) | Tuple1Repr::Seq([t0]) => CLType::tuple1(t0),
            },
            "Tuple2" => {
                let [t0, t1]: [CLType; 2] = access.next_value()?;
                CLType::tuple2(t0, t1)
            }
            "Tuple3" => {
                let [t0, t1, t2]: [CLType; 3] = access.next_value()?;
                CLType::tuple3(t0, t1, t2)
            }
            other => {
                return Err(de::Error::unknown_variant(
                    other,
                    &[
                        "Option", "List", "ByteArray", "Result", "Map", "Tuple1", "Tuple2",
                        "Tuple3",
                    ],
                ))
            }
        };
        if access.next_key::<String>()?.is_some() {
            return Err(de::Error::custom("composite CLType must have exactly one key"));
        }
        Ok(cl_type)
    }
}

impl<'de> Deserialize<'de> for CLType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CLTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn composites() -> Vec<CLType> {
        vec![
            CLType::option(CLType::list(CLType::U512)),
            CLType::list(CLType::String),
            CLType::ByteArray(32),
            CLType::result(CLType::Unit, CLType::String),
            CLType::map(CLType::String, CLType::option(CLType::U64)),
            CLType::tuple1(CLType::Bool),
            CLType::tuple2(CLType::Key, CLType::URef),
            CLType::tuple3(CLType::U8, CLType::PublicKey, CLType::ByteArray(4)),
        ]
    }

    #[test]
    fn leaf_tags() {
        assert_eq!(CLType::Bool.to_bytes().unwrap(), vec![0]);
        assert_eq!(CLType::U512.to_bytes().unwrap(), vec![8]);
        assert_eq!(CLType::Any.to_bytes().unwrap(), vec![21]);
        assert_eq!(CLType::PublicKey.to_bytes().unwrap(), vec![22]);
    }

    #[test]
    fn composite_descriptors() {
        assert_eq!(
            CLType::option(CLType::list(CLType::U512)).to_bytes().unwrap(),
            vec![13, 14, 8]
        );
        assert_eq!(CLType::ByteArray(32).to_bytes().unwrap(), vec![15, 32, 0, 0, 0]);
        assert_eq!(
            CLType::map(CLType::String, CLType::U8).to_bytes().unwrap(),
            vec![17, 10, 3]
        );
    }

    #[test]
    fn binary_roundtrip_and_length() {
        for cl_type in composites() {
            let bytes = cl_type.to_bytes().unwrap();
            assert_eq!(bytes.len(), cl_type.serialized_length());
            assert_eq!(bytesrepr::deserialize::<CLType>(&bytes).unwrap(), cl_type);
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        assert_eq!(
            bytesrepr::deserialize::<CLType>(&[23]),
            Err(bytesrepr::Error::UnknownTag {
                context: "cl type",
                tag: 23
            })
        );
        assert_eq!(
            bytesrepr::deserialize::<CLType>(&[13]),
            Err(bytesrepr::Error::EarlyEndOfStream)
        );
    }

    #[test]
    fn hostile_nesting_is_bounded() {
        let mut bytes = vec![tags::OPTION; 10_000];
        bytes.push(tags::BOOL);
        assert_eq!(
            bytesrepr::deserialize::<CLType>(&bytes),
            Err(bytesrepr::Error::ExceededRecursionDepth)
        );
    }

    #[test]
    fn names_roundtrip() {
        assert_eq!(
            CLType::option(CLType::list(CLType::U512)).to_string(),
            "Option(List(U512))"
        );
        for cl_type in composites() {
            assert_eq!(cl_type.to_string().parse::<CLType>().unwrap(), cl_type);
        }
        for (name, leaf) in LEAVES {
            assert_eq!(name.parse::<CLType>().unwrap(), leaf);
        }
    }

    #[test]
    fn bad_names_rejected() {
        assert!("Option".parse::<CLType>().is_err());
        assert!("Map(U8)".parse::<CLType>().is_err());
        assert!("Tuple2(U8, U8, U8)".parse::<CLType>().is_err());
        assert!("U8 junk".parse::<CLType>().is_err());
        assert!("I8".parse::<CLType>().is_err());
    }

    #[test]
    fn json_shapes() {
        assert_eq!(serde_json::to_value(CLType::U512).unwrap(), json!("U512"));
        assert_eq!(
            serde_json::to_value(CLType::option(CLType::String)).unwrap(),
            json!({"Option": "String"})
        );
        assert_eq!(
            serde_json::to_value(CLType::ByteArray(32)).unwrap(),
            json!({"ByteArray": 32})
        );
        assert_eq!(
            serde_json::to_value(CLType::result(CLType::U8, CLType::String)).unwrap(),
            json!({"Result": {"ok": "U8", "err": "String"}})
        );
        assert_eq!(
            serde_json::to_value(CLType::map(CLType::String, CLType::U64)).unwrap(),
            json!({"Map": {"key": "String", "value": "U64"}})
        );
        assert_eq!(
            serde_json::to_value(CLType::tuple1(CLType::Bool)).unwrap(),
            json!({"Tuple1": "Bool"})
        );
        assert_eq!(
            serde_json::to_value(CLType::tuple2(CLType::U8, CLType::U32)).unwrap(),
            json!({"Tuple2": ["U8", "U32"]})
        );
        assert_eq!(
            serde_json::to_value(CLType::tuple3(CLType::U8, CLType::U32, CLType::Unit)).unwrap(),
            json!({"Tuple3": ["U8", "U32", "Unit"]})
        );
    }

    #[test]
    fn json_roundtrip_all_composites() {
        for cl_type in composites() {
            let json = serde_json::to_string(&cl_type).unwrap();
            assert_eq!(serde_json::from_str::<CLType>(&json).unwrap(), cl_type);
        }
    }

    #[test]
    fn json_tuple1_accepts_array_form() {
        let parsed: CLType = serde_json::from_value(json!({"Tuple1": ["U8"]})).unwrap();
        assert_eq!(parsed, CLType::tuple1(CLType::U8));
    }

    #[test]
    fn json_unknown_variants_rejected() {
        assert!(serde_json::from_value::<CLType>(json!("U16")).is_err());
        assert!(serde_json::from_value::<CLType>(json!({"Set": "U8"})).is_err());
        assert!(serde_json::from_value::<CLType>(json!({"Option": "U8", "List": "U8"})).is_err());
        assert!(serde_json::from_value::<CLType>(json!({"Map": {"key": "U8"}})).is_err());
    }
}
