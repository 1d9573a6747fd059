//! # Canonical Binary Encoding
//!
//! The byte layout every node hashes and verifies. If two implementations
//! disagree on a single byte here, they disagree on every deploy hash built
//! on top of it, so this module is deliberately boring and exhaustively tested.
//!
//! ## Rules of the road
//!
//! - Fixed-width integers are little-endian.
//! - Strings, byte vectors and lists carry a `u32` LE length/count prefix.
//! - Fixed-size byte arrays carry no prefix at all.
//! - `Option` is a tag byte (`0` absent, `1` present) followed by the value.
//! - `Result` is a tag byte (`0` err, `1` ok) followed by the value.
//! - 128/256/512-bit integers are a one-byte length followed by the minimal
//!   little-endian magnitude (see [`uint`]).
//!
//! Decoding never truncates silently: [`deserialize`] insists on consuming
//! every byte, and [`FromBytes`] implementations return
//! [`Error::EarlyEndOfStream`] instead of reading past the end.

mod bytes;
pub mod calltable;
mod uint;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::MAX_ZERO_WIDTH_ELEMENTS;

pub use bytes::Bytes;
pub use calltable::{CalltableBuilder, CalltableReader};

/// Serialized length of a `bool`.
pub const BOOL_SERIALIZED_LENGTH: usize = 1;
/// Serialized length of a `u8`.
pub const U8_SERIALIZED_LENGTH: usize = 1;
/// Serialized length of a `u16`.
pub const U16_SERIALIZED_LENGTH: usize = 2;
/// Serialized length of a `u32` (and of every length prefix).
pub const U32_SERIALIZED_LENGTH: usize = 4;
/// Serialized length of an `i32`.
pub const I32_SERIALIZED_LENGTH: usize = 4;
/// Serialized length of a `u64`.
pub const U64_SERIALIZED_LENGTH: usize = 8;
/// Serialized length of an `i64`.
pub const I64_SERIALIZED_LENGTH: usize = 8;

pub(crate) const OPTION_NONE_TAG: u8 = 0;
pub(crate) const OPTION_SOME_TAG: u8 = 1;
pub(crate) const RESULT_ERR_TAG: u8 = 0;
pub(crate) const RESULT_OK_TAG: u8 = 1;

/// Errors raised while encoding or decoding canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input ended before the value was complete.
    #[error("early end of stream")]
    EarlyEndOfStream,

    /// The bytes are structurally invalid (bad bool, bad UTF-8, non-canonical
    /// integer, misordered call-table, ...).
    #[error("formatting error: {0}")]
    Formatting(&'static str),

    /// A discriminant byte was not one of the values the decoder knows.
    #[error("unknown {context} tag: {tag}")]
    UnknownTag {
        /// What was being decoded.
        context: &'static str,
        /// The offending tag value.
        tag: u8,
    },

    /// Decoding succeeded but bytes were left over.
    #[error("{0} left-over bytes after deserialization")]
    LeftOverBytes(usize),

    /// A length does not fit into the `u32` prefix.
    #[error("serialized value exceeds u32::MAX bytes")]
    OutOfMemory,

    /// A recursive type descriptor nests deeper than the configured limit.
    #[error("exceeded recursion depth limit")]
    ExceededRecursionDepth,
}

/// Types that can be written in the canonical binary format.
pub trait ToBytes {
    /// Serializes `self` into a fresh byte vector.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::with_capacity(self.serialized_length());
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    /// Exact number of bytes [`to_bytes`](Self::to_bytes) will produce.
    fn serialized_length(&self) -> usize;

    /// Appends the canonical encoding of `self` to `writer`.
    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error>;
}

/// Types that can be read back from the canonical binary format.
pub trait FromBytes: Sized {
    /// Decodes a value from the front of `bytes`, returning the remainder.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error>;
}

/// Serializes a value. Thin convenience wrapper over [`ToBytes::to_bytes`].
pub fn serialize<T: ToBytes + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    value.to_bytes()
}

/// Decodes a value and fails if any trailing bytes remain.
pub fn deserialize<T: FromBytes>(bytes: &[u8]) -> Result<T, Error> {
    let (value, remainder) = T::from_bytes(bytes)?;
    if remainder.is_empty() {
        Ok(value)
    } else {
        Err(Error::LeftOverBytes(remainder.len()))
    }
}

/// `split_at` that reports a short buffer instead of panicking.
pub fn safe_split_at(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), Error> {
    if n > bytes.len() {
        Err(Error::EarlyEndOfStream)
    } else {
        Ok(bytes.split_at(n))
    }
}

pub(crate) fn write_u32_length(writer: &mut Vec<u8>, len: usize) -> Result<(), Error> {
    let len = u32::try_from(len).map_err(|_| Error::OutOfMemory)?;
    writer.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

/// Rejects a collection of `count` elements once one of them has consumed no
/// input and `count` exceeds [`MAX_ZERO_WIDTH_ELEMENTS`]. `before` and `after`
/// are the input around a single element.
pub(crate) fn check_zero_width(before: &[u8], after: &[u8], count: usize) -> Result<(), Error> {
    if after.len() == before.len() && count > MAX_ZERO_WIDTH_ELEMENTS {
        Err(Error::Formatting("too many zero-width elements"))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Primitive implementations
// ---------------------------------------------------------------------------

impl ToBytes for bool {
    fn serialized_length(&self) -> usize {
        BOOL_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(u8::from(*self));
        Ok(())
    }
}

impl FromBytes for bool {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        match bytes.split_first() {
            None => Err(Error::EarlyEndOfStream),
            Some((0, rem)) => Ok((false, rem)),
            Some((1, rem)) => Ok((true, rem)),
            Some(_) => Err(Error::Formatting("bool must be 0 or 1")),
        }
    }
}

macro_rules! impl_fixed_width {
    ($($ty:ty => $len:expr),* $(,)?) => {$(
        impl ToBytes for $ty {
            fn serialized_length(&self) -> usize {
                $len
            }

            fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
                writer.extend_from_slice(&self.to_le_bytes());
                Ok(())
            }
        }

        impl FromBytes for $ty {
            fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
                let (head, rem) = safe_split_at(bytes, $len)?;
                let mut buf = [0u8; $len];
                buf.copy_from_slice(head);
                Ok((<$ty>::from_le_bytes(buf), rem))
            }
        }
    )*};
}

impl_fixed_width!(
    u8 => U8_SERIALIZED_LENGTH,
    u16 => U16_SERIALIZED_LENGTH,
    u32 => U32_SERIALIZED_LENGTH,
    i32 => I32_SERIALIZED_LENGTH,
    u64 => U64_SERIALIZED_LENGTH,
    i64 => I64_SERIALIZED_LENGTH,
);

impl ToBytes for () {
    fn serialized_length(&self) -> usize {
        0
    }

    fn write_bytes(&self, _writer: &mut Vec<u8>) -> Result<(), Error> {
        Ok(())
    }
}

impl FromBytes for () {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        Ok(((), bytes))
    }
}

impl ToBytes for str {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH + self.len()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_u32_length(writer, self.len())?;
        writer.extend_from_slice(self.as_bytes());
        Ok(())
    }
}

impl ToBytes for String {
    fn serialized_length(&self) -> usize {
        self.as_str().serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        self.as_str().write_bytes(writer)
    }
}

impl FromBytes for String {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (len, rem) = u32::from_bytes(bytes)?;
        let (raw, rem) = safe_split_at(rem, len as usize)?;
        let s = std::str::from_utf8(raw).map_err(|_| Error::Formatting("invalid UTF-8"))?;
        Ok((s.to_owned(), rem))
    }
}

impl<const N: usize> ToBytes for [u8; N] {
    fn serialized_length(&self) -> usize {
        N
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.extend_from_slice(self);
        Ok(())
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (head, rem) = safe_split_at(bytes, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        Ok((out, rem))
    }
}

impl<T: ToBytes> ToBytes for Vec<T> {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH + self.iter().map(ToBytes::serialized_length).sum::<usize>()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_u32_length(writer, self.len())?;
        let start = writer.len();
        for item in self {
            item.write_bytes(writer)?;
        }
        // Mirror the decoder's bound so every encoded list reads back.
        check_zero_width(&writer[start..], &writer[writer.len()..], self.len())
    }
}

impl<T: FromBytes> FromBytes for Vec<T> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (count, mut rem) = u32::from_bytes(bytes)?;
        let count = count as usize;
        // Elements take at least one byte unless zero-width, and those are
        // capped below, so the count never drives the allocation.
        let mut out = Vec::with_capacity(count.min(rem.len()));
        for _ in 0..count {
            let (item, next) = T::from_bytes(rem)?;
            check_zero_width(rem, next, count)?;
            out.push(item);
            rem = next;
        }
        Ok((out, rem))
    }
}

impl<T: ToBytes> ToBytes for Option<T> {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH + self.as_ref().map_or(0, ToBytes::serialized_length)
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            None => writer.push(OPTION_NONE_TAG),
            Some(value) => {
                writer.push(OPTION_SOME_TAG);
                value.write_bytes(writer)?;
            }
        }
        Ok(())
    }
}

impl<T: FromBytes> FromBytes for Option<T> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        match tag {
            OPTION_NONE_TAG => Ok((None, rem)),
            OPTION_SOME_TAG => {
                let (value, rem) = T::from_bytes(rem)?;
                Ok((Some(value), rem))
            }
            tag => Err(Error::UnknownTag {
                context: "option",
                tag,
            }),
        }
    }
}

impl<T: ToBytes, E: ToBytes> ToBytes for Result<T, E> {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                Ok(value) => value.serialized_length(),
                Err(error) => error.serialized_length(),
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            Ok(value) => {
                writer.push(RESULT_OK_TAG);
                value.write_bytes(writer)
            }
            Err(error) => {
                writer.push(RESULT_ERR_TAG);
                error.write_bytes(writer)
            }
        }
    }
}

impl<T: FromBytes, E: FromBytes> FromBytes for Result<T, E> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        match tag {
            RESULT_OK_TAG => {
                let (value, rem) = T::from_bytes(rem)?;
                Ok((Ok(value), rem))
            }
            RESULT_ERR_TAG => {
                let (error, rem) = E::from_bytes(rem)?;
                Ok((Err(error), rem))
            }
            tag => Err(Error::UnknownTag {
                context: "result",
                tag,
            }),
        }
    }
}

impl<K: ToBytes, V: ToBytes> ToBytes for BTreeMap<K, V> {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH
            + self
                .iter()
                .map(|(k, v)| k.serialized_length() + v.serialized_length())
                .sum::<usize>()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_u32_length(writer, self.len())?;
        for (key, value) in self {
            key.write_bytes(writer)?;
            value.write_bytes(writer)?;
        }
        Ok(())
    }
}

impl<K: FromBytes + Ord, V: FromBytes> FromBytes for BTreeMap<K, V> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (count, mut rem) = u32::from_bytes(bytes)?;
        let mut out = BTreeMap::new();
        for _ in 0..count {
            let (key, next) = K::from_bytes(rem)?;
            let (value, next) = V::from_bytes(next)?;
            if out.insert(key, value).is_some() {
                return Err(Error::Formatting("duplicate map key"));
            }
            rem = next;
        }
        Ok((out, rem))
    }
}

impl<T1: ToBytes> ToBytes for (T1,) {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        self.0.write_bytes(writer)
    }
}

impl<T1: FromBytes> FromBytes for (T1,) {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (t1, rem) = T1::from_bytes(bytes)?;
        Ok(((t1,), rem))
    }
}

impl<T1: ToBytes, T2: ToBytes> ToBytes for (T1, T2) {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length() + self.1.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        self.0.write_bytes(writer)?;
        self.1.write_bytes(writer)
    }
}

impl<T1: FromBytes, T2: FromBytes> FromBytes for (T1, T2) {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (t1, rem) = T1::from_bytes(bytes)?;
        let (t2, rem) = T2::from_bytes(rem)?;
        Ok(((t1, t2), rem))
    }
}

impl<T1: ToBytes, T2: ToBytes, T3: ToBytes> ToBytes for (T1, T2, T3) {
    fn serialized_length(&self) -> usize {
        self.0.serialized_length() + self.1.serialized_length() + self.2.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        self.0.write_bytes(writer)?;
        self.1.write_bytes(writer)?;
        self.2.write_bytes(writer)
    }
}

impl<T1: FromBytes, T2: FromBytes, T3: FromBytes> FromBytes for (T1, T2, T3) {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (t1, rem) = T1::from_bytes(bytes)?;
        let (t2, rem) = T2::from_bytes(rem)?;
        let (t3, rem) = T3::from_bytes(rem)?;
        Ok(((t1, t2, t3), rem))
    }
}

impl<T: ToBytes + ?Sized> ToBytes for Box<T> {
    fn serialized_length(&self) -> usize {
        (**self).serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        (**self).write_bytes(writer)
    }
}

impl<T: ToBytes + ?Sized> ToBytes for &T {
    fn serialized_length(&self) -> usize {
        (**self).serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        (**self).write_bytes(writer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(0x0102_0304u32.to_bytes().unwrap(), vec![4, 3, 2, 1]);
        assert_eq!((-1i32).to_bytes().unwrap(), vec![0xFF; 4]);
        assert_eq!(1u64.to_bytes().unwrap(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn string_has_u32_length_prefix() {
        let bytes = "abc".to_bytes().unwrap();
        assert_eq!(bytes, vec![3, 0, 0, 0, b'a', b'b', b'c']);
        assert_eq!(deserialize::<String>(&bytes).unwrap(), "abc");
    }

    #[test]
    fn invalid_utf8_is_a_formatting_error() {
        let bytes = vec![2, 0, 0, 0, 0xC3, 0x28];
        assert!(matches!(
            deserialize::<String>(&bytes),
            Err(Error::Formatting(_))
        ));
    }

    #[test]
    fn option_tags() {
        assert_eq!(None::<u8>.to_bytes().unwrap(), vec![0]);
        assert_eq!(Some(7u8).to_bytes().unwrap(), vec![1, 7]);
        assert_eq!(
            deserialize::<Option<u8>>(&[2, 7]),
            Err(Error::UnknownTag {
                context: "option",
                tag: 2
            })
        );
    }

    #[test]
    fn result_tags() {
        let ok: Result<u8, String> = Ok(5);
        let err: Result<u8, String> = Err("x".into());
        assert_eq!(ok.to_bytes().unwrap(), vec![1, 5]);
        assert_eq!(err.to_bytes().unwrap(), vec![0, 1, 0, 0, 0, b'x']);
    }

    #[test]
    fn vec_count_prefix_and_truncation() {
        let bytes = vec![1u32, 2u32].to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
        assert_eq!(
            deserialize::<Vec<u32>>(&bytes[..bytes.len() - 1]),
            Err(Error::EarlyEndOfStream)
        );
    }

    #[test]
    fn zero_width_list_counts_are_bounded() {
        assert_eq!(
            deserialize::<Vec<()>>(&u32::MAX.to_le_bytes()),
            Err(Error::Formatting("too many zero-width elements"))
        );

        let at_limit = vec![(); MAX_ZERO_WIDTH_ELEMENTS];
        let bytes = at_limit.to_bytes().unwrap();
        assert_eq!(deserialize::<Vec<()>>(&bytes).unwrap().len(), MAX_ZERO_WIDTH_ELEMENTS);

        let over = vec![(); MAX_ZERO_WIDTH_ELEMENTS + 1];
        assert!(over.to_bytes().is_err());
        // Non-empty elements are bounded by the input instead.
        assert!(vec![0u8; MAX_ZERO_WIDTH_ELEMENTS + 1].to_bytes().is_ok());
    }

    #[test]
    fn hostile_count_fails_without_allocating() {
        let mut bytes = u32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(deserialize::<Vec<u64>>(&bytes), Err(Error::EarlyEndOfStream));
    }

    #[test]
    fn fixed_array_has_no_prefix() {
        let arr = [9u8; 4];
        assert_eq!(arr.to_bytes().unwrap(), vec![9, 9, 9, 9]);
        assert_eq!(deserialize::<[u8; 4]>(&[1, 2, 3]), Err(Error::EarlyEndOfStream));
        assert_eq!(deserialize::<[u8; 2]>(&[1, 2, 3]), Err(Error::LeftOverBytes(1)));
    }

    #[test]
    fn bad_bool_rejected() {
        assert!(matches!(deserialize::<bool>(&[2]), Err(Error::Formatting(_))));
    }

    #[test]
    fn serialized_length_matches_output() {
        let value = (String::from("hello"), Some(vec![1u64, 2, 3]), true);
        assert_eq!(value.serialized_length(), value.to_bytes().unwrap().len());
    }

    #[test]
    fn hostile_vec_count_does_not_panic() {
        let bytes = u32::MAX.to_le_bytes();
        assert_eq!(deserialize::<Vec<u64>>(&bytes), Err(Error::EarlyEndOfStream));
    }
}
