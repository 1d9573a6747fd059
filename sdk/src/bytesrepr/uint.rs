//! Variable-length encoding for the 128/256/512-bit unsigned integers.
//!
//! Layout: one length byte `n`, then the `n` least-significant bytes of the
//! little-endian representation. Trailing zero bytes are stripped, so zero is
//! the single byte `0x00`. Decoding rejects `n` larger than the type width
//! and rejects a non-canonical trailing zero.

use primitive_types::{U128, U256, U512};

use super::{safe_split_at, Error, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};

macro_rules! impl_big_uint {
    ($ty:ident, $width:expr) => {
        impl ToBytes for $ty {
            fn serialized_length(&self) -> usize {
                U8_SERIALIZED_LENGTH + (self.bits() + 7) / 8
            }

            fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
                let mut buf = [0u8; $width];
                self.to_little_endian(&mut buf);
                let len = buf.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
                writer.push(len as u8);
                writer.extend_from_slice(&buf[..len]);
                Ok(())
            }
        }

        impl FromBytes for $ty {
            fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
                let (len, rem) = u8::from_bytes(bytes)?;
                let len = len as usize;
                if len > $width {
                    return Err(Error::Formatting(concat!(
                        stringify!($ty),
                        " length prefix exceeds width"
                    )));
                }
                let (magnitude, rem) = safe_split_at(rem, len)?;
                if magnitude.last() == Some(&0) {
                    return Err(Error::Formatting(concat!(
                        stringify!($ty),
                        " has a non-canonical trailing zero"
                    )));
                }
                Ok(($ty::from_little_endian(magnitude), rem))
            }
        }
    };
}

impl_big_uint!(U128, 16);
impl_big_uint!(U256, 32);
impl_big_uint!(U512, 64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytesrepr::deserialize;

    #[test]
    fn zero_is_single_byte() {
        assert_eq!(U512::zero().to_bytes().unwrap(), vec![0]);
        assert_eq!(deserialize::<U512>(&[0]).unwrap(), U512::zero());
    }

    #[test]
    fn minimal_magnitude() {
        // 0x0100 needs two bytes: 00 01.
        let value = U256::from(0x0100u64);
        assert_eq!(value.to_bytes().unwrap(), vec![2, 0x00, 0x01]);
        assert_eq!(value.serialized_length(), 3);
    }

    #[test]
    fn max_values_use_full_width() {
        let bytes = U128::max_value().to_bytes().unwrap();
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[0], 16);
        assert_eq!(deserialize::<U128>(&bytes).unwrap(), U128::max_value());
        assert_eq!(U512::max_value().serialized_length(), 65);
    }

    #[test]
    fn rejects_oversized_length() {
        let mut bytes = vec![17u8];
        bytes.extend_from_slice(&[1u8; 17]);
        assert!(matches!(
            deserialize::<U128>(&bytes),
            Err(Error::Formatting(_))
        ));
    }

    #[test]
    fn rejects_trailing_zero() {
        assert!(matches!(
            deserialize::<U512>(&[2, 5, 0]),
            Err(Error::Formatting(_))
        ));
    }

    #[test]
    fn truncated_magnitude() {
        assert_eq!(deserialize::<U512>(&[3, 1, 2]), Err(Error::EarlyEndOfStream));
    }
}
