//! Version 2 object headers (`OHDR`), with continuation chunks (`OCHK`).
//!
//! The writer always emits a single chunk. The parser follows
//! continuation messages so headers produced by other HDF5 writers,
//! which split large headers across chunks, can still be read.

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::jenkins_lookup3;
use crate::error::FormatError;
use crate::message_type::MessageType;

const OHDR_SIGNATURE: [u8; 4] = *b"OHDR";
const OCHK_SIGNATURE: [u8; 4] = *b"OCHK";

/// Header flag bit: attribute creation order tracked (adds 2 bytes per message header).
const FLAG_CREATION_ORDER: u8 = 0x04;
/// Header flag bit: attribute phase-change thresholds stored.
const FLAG_ATTR_PHASE_CHANGE: u8 = 0x10;
/// Header flag bit: access/modification/change/birth times stored.
const FLAG_TIMES: u8 = 0x20;

/// Message flag bit: the message is constant.
pub const MSG_FLAG_CONSTANT: u8 = 0x01;
/// Message flag bit: readers that do not understand the message must fail.
const MSG_FLAG_MUST_UNDERSTAND: u8 = 0x08;

/// A single header message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMessage {
    /// The message type.
    pub msg_type: MessageType,
    /// Message flags byte.
    pub flags: u8,
    /// Raw message payload.
    pub data: Vec<u8>,
}

/// Parsed v2 object header.
#[derive(Debug, Clone)]
pub struct ObjectHeader {
    /// Header flags byte.
    pub flags: u8,
    /// All non-nil messages from every chunk, in file order.
    pub messages: Vec<HeaderMessage>,
}

/// Builder for a single-chunk v2 object header.
#[derive(Debug, Default)]
pub struct ObjectHeaderWriter {
    messages: Vec<HeaderMessage>,
}

impl ObjectHeaderWriter {
    /// Create a writer with no messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message with flags 0.
    pub fn add_message(&mut self, msg_type: MessageType, data: Vec<u8>) {
        self.add_message_with_flags(msg_type, data, 0);
    }

    /// Append a message with explicit flags.
    pub fn add_message_with_flags(&mut self, msg_type: MessageType, data: Vec<u8>, flags: u8) {
        self.messages.push(HeaderMessage {
            msg_type,
            flags,
            data,
        });
    }

    /// Serialize to `OHDR` + messages + checksum.
    pub fn serialize(&self) -> Vec<u8> {
        let chunk_size: usize = self.messages.iter().map(|m| 4 + m.data.len()).sum();
        let (flags, width) = if chunk_size <= 0xFF {
            (0x00u8, 1usize)
        } else if chunk_size <= 0xFFFF {
            (0x01, 2)
        } else {
            (0x02, 4)
        };

        let mut buf = Vec::with_capacity(6 + width + chunk_size + 4);
        buf.extend_from_slice(&OHDR_SIGNATURE);
        buf.push(2);
        buf.push(flags);
        buf.extend_from_slice(&(chunk_size as u32).to_le_bytes()[..width]);

        for msg in &self.messages {
            buf.push(msg.msg_type.to_u16() as u8);
            buf.extend_from_slice(&(msg.data.len() as u16).to_le_bytes());
            buf.push(msg.flags);
            buf.extend_from_slice(&msg.data);
        }

        let checksum = jenkins_lookup3(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }
}

fn ensure_len(data: &[u8], offset: usize, needed: usize) -> Result<(), FormatError> {
    match offset.checked_add(needed) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(FormatError::UnexpectedEof {
            expected: offset.saturating_add(needed),
            available: data.len(),
        }),
    }
}

fn verify_checksum(data: &[u8], start: usize, end: usize) -> Result<(), FormatError> {
    ensure_len(data, end, 4)?;
    let stored = LittleEndian::read_u32(&data[end..end + 4]);
    let computed = jenkins_lookup3(&data[start..end]);
    if stored != computed {
        return Err(FormatError::ChecksumMismatch {
            expected: stored,
            computed,
        });
    }
    Ok(())
}

impl ObjectHeader {
    /// Parse the object header at `address` in `data`.
    pub fn parse(data: &[u8], address: u64) -> Result<ObjectHeader, FormatError> {
        let invalid = || FormatError::InvalidObjectHeader { address };
        let offset = usize::try_from(address).map_err(|_| invalid())?;
        ensure_len(data, offset, 6)?;
        if data[offset..offset + 4] != OHDR_SIGNATURE || data[offset + 4] != 2 {
            return Err(invalid());
        }
        let flags = data[offset + 5];
        let mut pos = offset + 6;

        if flags & FLAG_TIMES != 0 {
            pos += 16;
        }
        if flags & FLAG_ATTR_PHASE_CHANGE != 0 {
            pos += 4;
        }

        let width = 1usize << (flags & 0x03);
        ensure_len(data, pos, width)?;
        let mut size_bytes = [0u8; 8];
        size_bytes[..width].copy_from_slice(&data[pos..pos + width]);
        let chunk_size = usize::try_from(u64::from_le_bytes(size_bytes)).map_err(|_| invalid())?;
        pos += width;

        ensure_len(data, pos, chunk_size)?;
        let chunk_end = pos + chunk_size;
        verify_checksum(data, offset, chunk_end)?;

        let creation_order = flags & FLAG_CREATION_ORDER != 0;
        let mut messages = Vec::new();
        let mut pending = Vec::new();
        parse_messages(data, pos, chunk_end, creation_order, &mut messages, &mut pending)?;

        while let Some((cont_addr, cont_len)) = pending.pop() {
            let start = usize::try_from(cont_addr).map_err(|_| invalid())?;
            let len = usize::try_from(cont_len).map_err(|_| invalid())?;
            ensure_len(data, start, len)?;
            if len < 8 || data[start..start + 4] != OCHK_SIGNATURE {
                return Err(FormatError::InvalidObjectHeader { address: cont_addr });
            }
            let end = start + len - 4;
            verify_checksum(data, start, end)?;
            parse_messages(data, start + 4, end, creation_order, &mut messages, &mut pending)?;
        }

        Ok(ObjectHeader { flags, messages })
    }

    /// First message of the given type.
    pub fn find(&self, msg_type: MessageType) -> Option<&HeaderMessage> {
        self.messages.iter().find(|m| m.msg_type == msg_type)
    }

    /// All messages of the given type, in order.
    pub fn find_all(&self, msg_type: MessageType) -> impl Iterator<Item = &HeaderMessage> {
        self.messages.iter().filter(move |m| m.msg_type == msg_type)
    }
}

fn parse_messages(
    data: &[u8],
    start: usize,
    end: usize,
    creation_order: bool,
    messages: &mut Vec<HeaderMessage>,
    continuations: &mut Vec<(u64, u64)>,
) -> Result<(), FormatError> {
    let header_len = if creation_order { 6 } else { 4 };
    let mut pos = start;

    // Fewer bytes than a message header at the end of a chunk is a gap.
    while pos + header_len <= end {
        let raw_type = data[pos] as u16;
        let size = LittleEndian::read_u16(&data[pos + 1..pos + 3]) as usize;
        let flags = data[pos + 3];
        pos += header_len;
        if pos + size > end {
            return Err(FormatError::UnexpectedEof {
                expected: pos + size,
                available: end,
            });
        }
        let payload = &data[pos..pos + size];
        pos += size;

        match MessageType::from_u16(raw_type) {
            MessageType::Nil => {}
            MessageType::ObjectHeaderContinuation => {
                ensure_len(payload, 0, 16)?;
                continuations.push((
                    LittleEndian::read_u64(&payload[0..8]),
                    LittleEndian::read_u64(&payload[8..16]),
                ));
            }
            MessageType::Unknown(id) if flags & MSG_FLAG_MUST_UNDERSTAND != 0 => {
                return Err(FormatError::UnsupportedMessage(id));
            }
            msg_type => messages.push(HeaderMessage {
                msg_type,
                flags,
                data: payload.to_vec(),
            }),
        }
    }
    Ok(())
}
