//! HDF5 superblock, versions 2 and 3.
//!
//! Layout with 8-byte offsets and lengths (48 bytes total):
//!
//! ```text
//! 0   signature (8)
//! 8   version (1) | offset size (1) | length size (1) | consistency flags (1)
//! 12  base address (8)
//! 20  superblock extension address (8)
//! 28  end-of-file address (8)
//! 36  root group object header address (8)
//! 44  checksum (4)
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::jenkins_lookup3;
use crate::error::FormatError;
use crate::signature::HDF5_SIGNATURE;
use crate::UNDEFINED_ADDRESS;

/// Serialized size of a v2/v3 superblock with 8-byte offsets.
pub const SUPERBLOCK_SIZE: usize = 48;

/// Parsed HDF5 superblock (v2 or v3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    /// Superblock version (2 or 3).
    pub version: u8,
    /// Size of offsets in bytes.
    pub offset_size: u8,
    /// Size of lengths in bytes.
    pub length_size: u8,
    /// File consistency flags.
    pub consistency_flags: u8,
    /// File base address.
    pub base_address: u64,
    /// Superblock extension address, `None` when undefined.
    pub extension_address: Option<u64>,
    /// End-of-file address.
    pub eof_address: u64,
    /// Root group object header address.
    pub root_group_address: u64,
}

impl Superblock {
    /// A superblock for a new file with 8-byte offsets and lengths.
    pub fn new(version: u8, eof_address: u64, root_group_address: u64) -> Self {
        Self {
            version,
            offset_size: 8,
            length_size: 8,
            consistency_flags: 0,
            base_address: 0,
            extension_address: None,
            eof_address,
            root_group_address,
        }
    }

    /// Serialize to the 48-byte on-disk form, checksum included.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SUPERBLOCK_SIZE);
        buf.extend_from_slice(&HDF5_SIGNATURE);
        buf.push(self.version);
        buf.push(self.offset_size);
        buf.push(self.length_size);
        buf.push(self.consistency_flags);
        buf.extend_from_slice(&self.base_address.to_le_bytes());
        buf.extend_from_slice(&self.extension_address.unwrap_or(UNDEFINED_ADDRESS).to_le_bytes());
        buf.extend_from_slice(&self.eof_address.to_le_bytes());
        buf.extend_from_slice(&self.root_group_address.to_le_bytes());
        let checksum = jenkins_lookup3(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Parse a superblock from `data` starting at `signature_offset`.
    pub fn parse(data: &[u8], signature_offset: usize) -> Result<Superblock, FormatError> {
        let d = data.get(signature_offset..).unwrap_or(&[]);
        if d.len() < 12 {
            return Err(FormatError::UnexpectedEof {
                expected: signature_offset + 12,
                available: data.len(),
            });
        }
        if d[..8] != HDF5_SIGNATURE {
            return Err(FormatError::SignatureNotFound);
        }

        let version = d[8];
        if !matches!(version, 2 | 3) {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let offset_size = d[9];
        let length_size = d[10];
        if offset_size != 8 {
            return Err(FormatError::InvalidOffsetSize(offset_size));
        }
        if length_size != 8 {
            return Err(FormatError::InvalidLengthSize(length_size));
        }
        if d.len() < SUPERBLOCK_SIZE {
            return Err(FormatError::UnexpectedEof {
                expected: signature_offset + SUPERBLOCK_SIZE,
                available: data.len(),
            });
        }

        let stored = LittleEndian::read_u32(&d[44..48]);
        let computed = jenkins_lookup3(&d[..44]);
        if stored != computed {
            return Err(FormatError::ChecksumMismatch {
                expected: stored,
                computed,
            });
        }

        let extension = LittleEndian::read_u64(&d[20..28]);
        Ok(Superblock {
            version,
            offset_size,
            length_size,
            consistency_flags: d[11],
            base_address: LittleEndian::read_u64(&d[12..20]),
            extension_address: (extension != UNDEFINED_ADDRESS).then_some(extension),
            eof_address: LittleEndian::read_u64(&d[28..36]),
            root_group_address: LittleEndian::read_u64(&d[36..44]),
        })
    }
}
