//! Named runtime arguments.
//!
//! Order matters: the engine binds some arguments positionally, so
//! [`RuntimeArgs`] is a list, not a map, and duplicate names are kept.

use serde::{Deserialize, Serialize};

use super::{CLTyped, CLValue, CLValueError};
use crate::bytesrepr::{self, FromBytes, ToBytes};

/// A `(name, value)` pair. JSON form is the two-element array
/// `["name", {"cl_type": .., "bytes": .., "parsed": ..}]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedArg(String, CLValue);

impl NamedArg {
    pub fn new(name: impl Into<String>, value: CLValue) -> Self {
        NamedArg(name.into(), value)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> &CLValue {
        &self.1
    }
}

impl ToBytes for NamedArg {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length() + self.1.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)?;
        self.1.write_bytes(writer)
    }
}

impl FromBytes for NamedArg {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (name, rem) = String::from_bytes(bytes)?;
        let (value, rem) = CLValue::from_bytes(rem)?;
        Ok((NamedArg(name, value), rem))
    }
}

/// An ordered list of [`NamedArg`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeArgs(Vec<NamedArg>);

impl RuntimeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value` and appends it under `name`.
    pub fn insert<T: CLTyped + ToBytes>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), CLValueError> {
        self.0.push(NamedArg::new(name, CLValue::from_t(value)?));
        Ok(())
    }

    /// Appends an already-encoded value under `name`.
    pub fn insert_cl_value(&mut self, name: impl Into<String>, value: CLValue) {
        self.0.push(NamedArg::new(name, value));
    }

    /// The first value named `name`.
    pub fn get(&self, name: &str) -> Option<&CLValue> {
        self.0
            .iter()
            .find(|arg| arg.name() == name)
            .map(NamedArg::value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedArg> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<NamedArg> {
        self.0
    }
}

impl From<Vec<NamedArg>> for RuntimeArgs {
    fn from(args: Vec<NamedArg>) -> Self {
        RuntimeArgs(args)
    }
}

impl ToBytes for RuntimeArgs {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for RuntimeArgs {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (args, rem) = Vec::<NamedArg>::from_bytes(bytes)?;
        Ok((RuntimeArgs(args), rem))
    }
}
