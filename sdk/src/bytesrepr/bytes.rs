use std::fmt;
use std::ops::Deref;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::{safe_split_at, write_u32_length, Error, FromBytes, ToBytes, U32_SERIALIZED_LENGTH};

/// An owned byte vector with a `u32` length prefix on the wire and a hex
/// string in JSON.
///
/// Used for wasm module bytes, CLValue payloads and call-table bodies.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Creates an empty byte vector.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consumes `self`, returning the inner vector.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 32 {
            write!(
                f,
                "Bytes({}..{} bytes)",
                hex::encode(&self.0[..16]),
                self.0.len()
            )
        } else {
            write!(f, "Bytes({})", hex::encode(&self.0))
        }
    }
}

impl ToBytes for Bytes {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH + self.0.len()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_u32_length(writer, self.0.len())?;
        writer.extend_from_slice(&self.0);
        Ok(())
    }
}

impl FromBytes for Bytes {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (len, rem) = u32::from_bytes(bytes)?;
        let (raw, rem) = safe_split_at(rem, len as usize)?;
        Ok((Self(raw.to_vec()), rem))
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        hex::decode(&hex_str).map(Self).map_err(D::Error::custom)
    }
}
