//! Datatype message (type 0x0003).
//!
//! Every dataset this engine touches holds IEEE-754 binary64 values in
//! little-endian order, so only that one floating-point layout is encoded
//! and accepted. Anything else parses to `UnsupportedDatatype`.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;

/// HDF5 datatype class id for floating point.
const CLASS_FLOAT: u8 = 1;

/// Floating-point datatype description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datatype {
    pub size: u32,
    pub bit_offset: u16,
    pub bit_precision: u16,
    pub exponent_location: u8,
    pub exponent_size: u8,
    pub mantissa_location: u8,
    pub mantissa_size: u8,
    pub exponent_bias: u32,
}

impl Datatype {
    /// Native `f64`, little-endian.
    pub const F64_LE: Datatype = Datatype {
        size: 8,
        bit_offset: 0,
        bit_precision: 64,
        exponent_location: 52,
        exponent_size: 11,
        mantissa_location: 0,
        mantissa_size: 52,
        exponent_bias: 1023,
    };

    /// Encode as a version 1 datatype message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(20);
        buf.push((1 << 4) | CLASS_FLOAT);
        // Sign bit at position 63; implied leading mantissa bit.
        buf.extend_from_slice(&[0x20, 0x3f, 0x00]);
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&self.bit_offset.to_le_bytes());
        buf.extend_from_slice(&self.bit_precision.to_le_bytes());
        buf.push(self.exponent_location);
        buf.push(self.exponent_size);
        buf.push(self.mantissa_location);
        buf.push(self.mantissa_size);
        buf.extend_from_slice(&self.exponent_bias.to_le_bytes());
        buf
    }

    /// Decode a datatype message, accepting only little-endian binary64.
    pub fn parse(data: &[u8]) -> Result<Datatype, FormatError> {
        if data.len() < 8 {
            return Err(FormatError::UnexpectedEof {
                expected: 8,
                available: data.len(),
            });
        }
        let class = data[0] & 0x0F;
        let size = LittleEndian::read_u32(&data[4..8]);
        let unsupported = FormatError::UnsupportedDatatype { class, size };

        // Bit 0 set is big-endian, bit 6 set is VAX order.
        let little_endian = data[1] & 0x41 == 0;
        if class != CLASS_FLOAT || size != 8 || !little_endian {
            return Err(unsupported);
        }
        if data.len() < 20 {
            return Err(FormatError::UnexpectedEof {
                expected: 20,
                available: data.len(),
            });
        }
        let dt = Datatype {
            size,
            bit_offset: LittleEndian::read_u16(&data[8..10]),
            bit_precision: LittleEndian::read_u16(&data[10..12]),
            exponent_location: data[12],
            exponent_size: data[13],
            mantissa_location: data[14],
            mantissa_size: data[15],
            exponent_bias: LittleEndian::read_u32(&data[16..20]),
        };
        if dt != Self::F64_LE {
            return Err(unsupported);
        }
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_encoding_matches_hdf5_native_double() {
        let bytes = Datatype::F64_LE.serialize();
        assert_eq!(
            bytes,
            vec![
                0x11, 0x20, 0x3f, 0x00, 8, 0, 0, 0, 0, 0, 64, 0, 52, 11, 0, 52, 0xff, 0x03, 0, 0
            ]
        );
        assert_eq!(Datatype::parse(&bytes).unwrap(), Datatype::F64_LE);
    }

    #[test]
    fn big_endian_double_is_rejected() {
        let mut bytes = Datatype::F64_LE.serialize();
        bytes[1] |= 0x01;
        assert!(matches!(
            Datatype::parse(&bytes),
            Err(FormatError::UnsupportedDatatype { class: 1, size: 8 })
        ));
    }

    #[test]
    fn single_precision_is_rejected() {
        let mut bytes = Datatype::F64_LE.serialize();
        bytes[4] = 4;
        assert!(matches!(
            Datatype::parse(&bytes),
            Err(FormatError::UnsupportedDatatype { class: 1, size: 4 })
        ));
    }

    #[test]
    fn integer_class_is_rejected() {
        // 32-bit signed little-endian integer.
        let bytes = [0x10, 0x08, 0, 0, 4, 0, 0, 0, 0, 0, 32, 0];
        assert!(matches!(
            Datatype::parse(&bytes),
            Err(FormatError::UnsupportedDatatype { class: 0, size: 4 })
        ));
    }
}
