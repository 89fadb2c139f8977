//! Data layout message (type 0x0008), contiguous storage only.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;
use crate::UNDEFINED_ADDRESS;

const CLASS_CONTIGUOUS: u8 = 1;

/// Contiguous raw-data placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    /// File address of the data, `None` while unallocated.
    pub address: Option<u64>,
    /// Size of the data in bytes.
    pub size: u64,
}

impl DataLayout {
    pub fn contiguous(address: Option<u64>, size: u64) -> Self {
        Self { address, size }
    }

    /// Encode as a version 3 contiguous layout message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(18);
        buf.push(3);
        buf.push(CLASS_CONTIGUOUS);
        buf.extend_from_slice(&self.address.unwrap_or(UNDEFINED_ADDRESS).to_le_bytes());
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf
    }

    /// Decode a version 3 or 4 layout message with 8-byte offsets.
    pub fn parse(data: &[u8]) -> Result<DataLayout, FormatError> {
        if data.len() < 2 {
            return Err(FormatError::UnexpectedEof {
                expected: 2,
                available: data.len(),
            });
        }
        let version = data[0];
        if !(3..=4).contains(&version) {
            return Err(FormatError::UnsupportedMessageVersion {
                message: "data layout",
                version,
            });
        }
        match data[1] {
            CLASS_CONTIGUOUS => {
                if data.len() < 18 {
                    return Err(FormatError::UnexpectedEof {
                        expected: 18,
                        available: data.len(),
                    });
                }
                let raw = LittleEndian::read_u64(&data[2..10]);
                let address = (raw != UNDEFINED_ADDRESS).then_some(raw);
                let size = LittleEndian::read_u64(&data[10..18]);
                Ok(DataLayout { address, size })
            }
            other => Err(FormatError::UnsupportedLayout(other)),
        }
    }
}
