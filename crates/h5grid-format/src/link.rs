//! Link (0x0006) and link info (0x0002) messages for compact groups.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;
use crate::UNDEFINED_ADDRESS;

const FLAG_CREATION_ORDER: u8 = 0x04;
const FLAG_LINK_TYPE: u8 = 0x08;
const FLAG_CHARSET: u8 = 0x10;

/// A named link stored directly in a group's object header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMessage {
    pub name: String,
    /// Object header address for hard links; `None` for soft/external links.
    pub address: Option<u64>,
}

impl LinkMessage {
    /// A hard link to the object header at `address`.
    pub fn hard(name: &str, address: u64) -> Self {
        Self {
            name: name.to_string(),
            address: Some(address),
        }
    }

    /// Encode as a version 1 hard link.
    pub fn serialize(&self) -> Vec<u8> {
        let name = self.name.as_bytes();
        let (width_bits, width) = match name.len() {
            0..=0xFF => (0u8, 1usize),
            0x100..=0xFFFF => (1, 2),
            _ => (2, 4),
        };
        let utf8 = !self.name.is_ascii();
        let mut flags = width_bits;
        if utf8 {
            flags |= FLAG_CHARSET;
        }

        let mut buf = Vec::with_capacity(2 + 1 + width + name.len() + 8);
        buf.push(1);
        buf.push(flags);
        if utf8 {
            buf.push(1);
        }
        buf.extend_from_slice(&(name.len() as u32).to_le_bytes()[..width]);
        buf.extend_from_slice(name);
        buf.extend_from_slice(&self.address.unwrap_or(UNDEFINED_ADDRESS).to_le_bytes());
        buf
    }

    /// Decode a version 1 link message with 8-byte offsets.
    pub fn parse(data: &[u8]) -> Result<LinkMessage, FormatError> {
        let need = |pos: usize, n: usize| -> Result<(), FormatError> {
            if pos.saturating_add(n) > data.len() {
                Err(FormatError::UnexpectedEof {
                    expected: pos + n,
                    available: data.len(),
                })
            } else {
                Ok(())
            }
        };
        need(0, 2)?;
        if data[0] != 1 {
            return Err(FormatError::UnsupportedMessageVersion {
                message: "link",
                version: data[0],
            });
        }
        let flags = data[1];
        let mut pos = 2;

        let mut link_type = 0u8;
        if flags & FLAG_LINK_TYPE != 0 {
            need(pos, 1)?;
            link_type = data[pos];
            pos += 1;
        }
        if flags & FLAG_CREATION_ORDER != 0 {
            pos += 8;
        }
        if flags & FLAG_CHARSET != 0 {
            pos += 1;
        }

        let width = 1usize << (flags & 0x03);
        need(pos, width)?;
        let mut len_bytes = [0u8; 8];
        len_bytes[..width].copy_from_slice(&data[pos..pos + width]);
        let name_len = u64::from_le_bytes(len_bytes) as usize;
        pos += width;

        need(pos, name_len)?;
        let name = String::from_utf8_lossy(&data[pos..pos + name_len]).into_owned();
        pos += name_len;

        let address = if link_type == 0 {
            need(pos, 8)?;
            Some(LittleEndian::read_u64(&data[pos..pos + 8]))
        } else {
            None
        };

        Ok(LinkMessage { name, address })
    }
}

/// Link info message for a group whose links all live in its header.
pub fn link_info_message() -> Vec<u8> {
    let mut buf = Vec::with_capacity(18);
    buf.push(0);
    buf.push(0);
    // No fractal heap, no name index.
    buf.extend_from_slice(&UNDEFINED_ADDRESS.to_le_bytes());
    buf.extend_from_slice(&UNDEFINED_ADDRESS.to_le_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_link_roundtrip() {
        let link = LinkMessage::hard("temperature", 0x1234);
        let bytes = link.serialize();
        assert_eq!(&bytes[..3], &[1, 0, 11]);
        assert_eq!(LinkMessage::parse(&bytes).unwrap(), link);
    }

    #[test]
    fn long_name_uses_two_byte_length() {
        let name = "x".repeat(300);
        let bytes = LinkMessage::hard(&name, 8).serialize();
        assert_eq!(bytes[1] & 0x03, 1);
        let parsed = LinkMessage::parse(&bytes).unwrap();
        assert_eq!(parsed.name.len(), 300);
        assert_eq!(parsed.address, Some(8));
    }

    #[test]
    fn utf8_name_sets_charset() {
        let link = LinkMessage::hard("druck_\u{e4}", 96);
        let bytes = link.serialize();
        assert_eq!(bytes[1] & FLAG_CHARSET, FLAG_CHARSET);
        assert_eq!(LinkMessage::parse(&bytes).unwrap(), link);
    }

    #[test]
    fn soft_link_has_no_address() {
        // version 1, link type present, type 1 (soft), name "s", target "/a"
        let data = [1u8, FLAG_LINK_TYPE, 1, 1, b's', 2, 0, b'/', b'a'];
        let parsed = LinkMessage::parse(&data).unwrap();
        assert_eq!(parsed.name, "s");
        assert_eq!(parsed.address, None);
    }

    #[test]
    fn link_info_is_compact() {
        let li = link_info_message();
        assert_eq!(li.len(), 18);
        assert_eq!(&li[2..], &[0xFF; 16]);
    }
}
