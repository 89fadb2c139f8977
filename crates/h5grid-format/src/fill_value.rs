//! Fill value message (type 0x0005).

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;

/// When raw storage is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocTime {
    Early,
    Late,
    Incremental,
}

/// Dataset fill value for `f64` datasets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillValue {
    pub alloc_time: AllocTime,
    /// `None` when no fill value is defined.
    pub value: Option<f64>,
}

impl FillValue {
    /// No user-defined fill value; storage allocated late.
    pub fn undefined() -> Self {
        Self {
            alloc_time: AllocTime::Late,
            value: None,
        }
    }

    /// A defined fill value, written when storage is allocated early.
    pub fn defined(value: f64) -> Self {
        Self {
            alloc_time: AllocTime::Early,
            value: Some(value),
        }
    }

    /// Encode as a version 3 message.
    pub fn serialize(&self) -> Vec<u8> {
        let alloc = match self.alloc_time {
            AllocTime::Early => 1u8,
            AllocTime::Late => 2,
            AllocTime::Incremental => 3,
        };
        match self.value {
            // write time "on allocation", fill defined
            Some(v) => {
                let mut buf = vec![3, alloc | 0x20];
                buf.extend_from_slice(&8u32.to_le_bytes());
                buf.extend_from_slice(&v.to_le_bytes());
                buf
            }
            // write time "if set", no value stored
            None => vec![3, alloc | (2 << 2)],
        }
    }

    /// Decode a version 2 or 3 message.
    pub fn parse(data: &[u8]) -> Result<FillValue, FormatError> {
        let eof = |expected| FormatError::UnexpectedEof {
            expected,
            available: data.len(),
        };
        if data.len() < 2 {
            return Err(eof(2));
        }
        let (alloc_bits, defined, mut pos) = match data[0] {
            2 => {
                if data.len() < 4 {
                    return Err(eof(4));
                }
                (data[1], data[3] != 0, 4)
            }
            3 => (data[1] & 0x03, data[1] & 0x20 != 0, 2),
            version => {
                return Err(FormatError::UnsupportedMessageVersion {
                    message: "fill value",
                    version,
                })
            }
        };
        let alloc_time = match alloc_bits {
            1 => AllocTime::Early,
            3 => AllocTime::Incremental,
            _ => AllocTime::Late,
        };

        let value = if defined {
            if data.len() < pos + 4 {
                return Err(eof(pos + 4));
            }
            let size = LittleEndian::read_u32(&data[pos..pos + 4]) as usize;
            pos += 4;
            match size {
                0 => None,
                8 if data.len() >= pos + 8 => Some(LittleEndian::read_f64(&data[pos..pos + 8])),
                8 => return Err(eof(pos + 8)),
                other => {
                    return Err(FormatError::UnsupportedDatatype {
                        class: 1,
                        size: other as u32,
                    })
                }
            }
        } else {
            None
        };

        Ok(FillValue { alloc_time, value })
    }
}
