//! Dataspace message (type 0x0001): the extent of a dataset.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;

/// Dataspace class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataspaceType {
    /// A single element with rank 0.
    Scalar,
    /// A rectangular array.
    Simple,
    /// No elements at all.
    Null,
}

/// Parsed or to-be-written dataspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataspace {
    pub space_type: DataspaceType,
    /// Current extent per dimension (empty for scalar/null).
    pub dims: Vec<u64>,
    /// Maximum extent per dimension, when stored.
    pub max_dims: Option<Vec<u64>>,
}

impl Dataspace {
    /// A fixed-size simple dataspace.
    pub fn simple(dims: &[u64]) -> Self {
        Self {
            space_type: DataspaceType::Simple,
            dims: dims.to_vec(),
            max_dims: None,
        }
    }

    /// A scalar dataspace.
    #[cfg(test)]
    pub(crate) fn scalar() -> Self {
        Self {
            space_type: DataspaceType::Scalar,
            dims: Vec::new(),
            max_dims: None,
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total element count. `None` on overflow.
    pub fn num_elements(&self) -> Option<u64> {
        match self.space_type {
            DataspaceType::Null => Some(0),
            DataspaceType::Scalar => Some(1),
            DataspaceType::Simple => self
                .dims
                .iter()
                .try_fold(1u64, |acc, &d| acc.checked_mul(d)),
        }
    }

    /// Encode as a version 2 message.
    pub fn serialize(&self) -> Vec<u8> {
        let rank = self.dims.len();
        let flags = if self.max_dims.is_some() { 0x01 } else { 0x00 };
        let type_byte = match self.space_type {
            DataspaceType::Scalar => 0,
            DataspaceType::Simple => 1,
            DataspaceType::Null => 2,
        };
        let mut buf = Vec::with_capacity(4 + rank * 16);
        buf.extend_from_slice(&[2, rank as u8, flags, type_byte]);
        for d in &self.dims {
            buf.extend_from_slice(&d.to_le_bytes());
        }
        if let Some(max) = &self.max_dims {
            for d in max {
                buf.extend_from_slice(&d.to_le_bytes());
            }
        }
        buf
    }

    /// Decode a version 1 or version 2 message with 8-byte lengths.
    pub fn parse(data: &[u8]) -> Result<Dataspace, FormatError> {
        let eof = |expected| FormatError::UnexpectedEof {
            expected,
            available: data.len(),
        };
        if data.len() < 4 {
            return Err(eof(4));
        }
        let version = data[0];
        let rank = data[1] as usize;
        let flags = data[2];

        let (space_type, mut pos) = match version {
            1 => {
                // Version 1 has no type byte: rank 0 means scalar.
                let t = if rank == 0 {
                    DataspaceType::Scalar
                } else {
                    DataspaceType::Simple
                };
                (t, 8)
            }
            2 => {
                let t = match data[3] {
                    0 => DataspaceType::Scalar,
                    1 => DataspaceType::Simple,
                    2 => DataspaceType::Null,
                    _ => {
                        return Err(FormatError::UnsupportedMessageVersion {
                            message: "dataspace type",
                            version: data[3],
                        })
                    }
                };
                (t, 4)
            }
            v => {
                return Err(FormatError::UnsupportedMessageVersion {
                    message: "dataspace",
                    version: v,
                })
            }
        };

        let read_dims = |pos: &mut usize| -> Result<Vec<u64>, FormatError> {
            let end = *pos + rank * 8;
            if data.len() < end {
                return Err(eof(end));
            }
            let dims = data[*pos..end]
                .chunks_exact(8)
                .map(LittleEndian::read_u64)
                .collect();
            *pos = end;
            Ok(dims)
        };

        let dims = read_dims(&mut pos)?;
        let max_dims = if flags & 0x01 != 0 {
            Some(read_dims(&mut pos)?)
        } else {
            None
        };

        Ok(Dataspace {
            space_type,
            dims,
            max_dims,
        })
    }
}
