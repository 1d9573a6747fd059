//! Call-table envelope used by every TransactionV1 structure.
//!
//! ```text
//! u32 field_count
//! field_count × (u16 index, u32 offset)
//! u32 body_len, body bytes
//! ```
//!
//! Each field's bytes are the slice of the body from its offset up to the
//! next field's offset (or the end of the body). Indices must be strictly
//! increasing and the first offset must be zero. A missing index means the
//! field is absent, which is how optional knobs stay out of the encoding
//! entirely.

use super::{
    safe_split_at, write_u32_length, Error, FromBytes, ToBytes, U16_SERIALIZED_LENGTH,
    U32_SERIALIZED_LENGTH,
};

/// Size of an envelope whose fields encode to `field_lengths` bytes each.
pub fn envelope_length(field_lengths: &[usize]) -> usize {
    U32_SERIALIZED_LENGTH * 2
        + field_lengths.len() * (U16_SERIALIZED_LENGTH + U32_SERIALIZED_LENGTH)
        + field_lengths.iter().sum::<usize>()
}

/// Accumulates fields in index order and produces the envelope bytes.
#[derive(Debug, Default)]
pub struct CalltableBuilder {
    fields: Vec<(u16, u32)>,
    body: Vec<u8>,
}

impl CalltableBuilder {
    /// Starts an empty envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Indices must be added in strictly increasing order.
    pub fn add_field<T: ToBytes + ?Sized>(mut self, index: u16, value: &T) -> Result<Self, Error> {
        if let Some((last, _)) = self.fields.last() {
            if index <= *last {
                return Err(Error::Formatting("call-table indices must increase"));
            }
        }
        let offset = u32::try_from(self.body.len()).map_err(|_| Error::OutOfMemory)?;
        self.fields.push((index, offset));
        value.write_bytes(&mut self.body)?;
        Ok(self)
    }

    /// Appends a field only when `value` is present.
    pub fn add_optional_field<T: ToBytes>(
        self,
        index: u16,
        value: Option<&T>,
    ) -> Result<Self, Error> {
        match value {
            Some(value) => self.add_field(index, value),
            None => Ok(self),
        }
    }

    /// Writes the finished envelope.
    pub fn finish(self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(
            U32_SERIALIZED_LENGTH * 2
                + self.fields.len() * (U16_SERIALIZED_LENGTH + U32_SERIALIZED_LENGTH)
                + self.body.len(),
        );
        write_u32_length(&mut out, self.fields.len())?;
        for (index, offset) in &self.fields {
            index.write_bytes(&mut out)?;
            offset.write_bytes(&mut out)?;
        }
        write_u32_length(&mut out, self.body.len())?;
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

/// A parsed envelope that hands out typed fields by index.
#[derive(Debug)]
pub struct CalltableReader<'a> {
    fields: Vec<(u16, u32)>,
    body: &'a [u8],
}

impl<'a> CalltableReader<'a> {
    /// Parses an envelope from the front of `bytes`.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<(Self, &'a [u8]), Error> {
        let (count, mut rem) = u32::from_bytes(bytes)?;
        let mut fields: Vec<(u16, u32)> = Vec::with_capacity((count as usize).min(rem.len()));
        for _ in 0..count {
            let (index, next) = u16::from_bytes(rem)?;
            let (offset, next) = u32::from_bytes(next)?;
            if let Some((last_index, last_offset)) = fields.last() {
                if index <= *last_index || offset < *last_offset {
                    return Err(Error::Formatting("call-table fields out of order"));
                }
            } else if offset != 0 {
                return Err(Error::Formatting("first call-table offset must be zero"));
            }
            fields.push((index, offset));
            rem = next;
        }
        let (body_len, rem) = u32::from_bytes(rem)?;
        let (body, rem) = safe_split_at(rem, body_len as usize)?;
        if let Some((_, last_offset)) = fields.last() {
            if *last_offset as usize > body.len() {
                return Err(Error::Formatting("call-table offset past end of body"));
            }
        } else if !body.is_empty() {
            return Err(Error::Formatting("call-table body without fields"));
        }
        Ok((Self { fields, body }, rem))
    }

    fn slice(&self, index: u16) -> Option<&'a [u8]> {
        let position = self.fields.iter().position(|(i, _)| *i == index)?;
        let start = self.fields[position].1 as usize;
        let end = self
            .fields
            .get(position + 1)
            .map_or(self.body.len(), |(_, offset)| *offset as usize);
        Some(&self.body[start..end])
    }

    /// Decodes an optional field; absent fields yield `None`.
    pub fn optional_field<T: FromBytes>(&self, index: u16) -> Result<Option<T>, Error> {
        self.slice(index)
            .map(super::deserialize::<T>)
            .transpose()
    }

    /// Decodes a mandatory field.
    pub fn field<T: FromBytes>(&self, index: u16) -> Result<T, Error> {
        self.optional_field(index)?
            .ok_or(Error::Formatting("missing call-table field"))
    }

    /// Rejects any field index above `max_index`.
    pub fn ensure_max_index(&self, max_index: u16) -> Result<(), Error> {
        if self.fields.iter().any(|(index, _)| *index > max_index) {
            Err(Error::Formatting("unexpected call-table field"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_layout() {
        let bytes = CalltableBuilder::new()
            .add_field(0, &7u8)
            .unwrap()
            .add_field(1, &0x0102u16)
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(
            bytes,
            vec![
                2, 0, 0, 0, // field count
                0, 0, 0, 0, 0, 0, // index 0 @ 0
                1, 0, 1, 0, 0, 0, // index 1 @ 1
                3, 0, 0, 0, // body length
                7, 2, 1,
            ]
        );
    }

    #[test]
    fn absent_field_reads_as_none() {
        let bytes = CalltableBuilder::new()
            .add_field(0, &1u8)
            .unwrap()
            .add_optional_field::<u32>(2, None)
            .unwrap()
            .add_field(3, &9u32)
            .unwrap()
            .finish()
            .unwrap();
        let (reader, rem) = CalltableReader::from_bytes(&bytes).unwrap();
        assert!(rem.is_empty());
        assert_eq!(reader.field::<u8>(0).unwrap(), 1);
        assert_eq!(reader.optional_field::<u32>(2).unwrap(), None);
        assert_eq!(reader.field::<u32>(3).unwrap(), 9);
    }

    #[test]
    fn indices_must_increase() {
        let result = CalltableBuilder::new()
            .add_field(1, &1u8)
            .unwrap()
            .add_field(1, &2u8);
        assert!(result.is_err());
    }

    #[test]
    fn field_with_trailing_bytes_rejected() {
        // Field 0 claims the whole 2-byte body but decodes as a u8.
        let bytes = CalltableBuilder::new()
            .add_field(0, &0x0101u16)
            .unwrap()
            .finish()
            .unwrap();
        let (reader, _) = CalltableReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.field::<u8>(0), Err(Error::LeftOverBytes(1)));
    }

    #[test]
    fn envelope_length_matches_output() {
        let bytes = CalltableBuilder::new()
            .add_field(0, &1u8)
            .unwrap()
            .add_field(1, "abc")
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(envelope_length(&[1, 7]), bytes.len());
    }

    #[test]
    fn unknown_index_rejected() {
        let bytes = CalltableBuilder::new()
            .add_field(7, &1u8)
            .unwrap()
            .finish()
            .unwrap();
        let (reader, _) = CalltableReader::from_bytes(&bytes).unwrap();
        assert!(reader.ensure_max_index(3).is_err());
    }
}
