//! Binary encoding of work items, queue keys and identity values.
//!
//! # Queue key
//!
//! ```text
//! byte 0     priority (0 first)
//! byte 1     min(depth, 127)
//! bytes 2-5  doc id, big-endian
//! ```
//!
//! Keys compare as raw unsigned bytes, which orders the queue by priority,
//! then depth, then discovery order. Depths past 127 share one bucket.
//!
//! # Work item record
//!
//! ```text
//! url         u16 length (BE) + modified UTF-8
//! doc_id      i32 BE
//! parent_id   i32 BE
//! parent_url  u16 length (BE) + modified UTF-8
//! depth       i16 BE
//! priority    i8
//! anchor      u16 length (BE) + modified UTF-8
//! ```
//!
//! Strings use the JVM's "modified UTF-8" (`DataOutput.writeUTF`) so that
//! logs written by Java crawlers decode unchanged.

use crate::item::WorkItem;
use crate::types::DocId;
use thiserror::Error;

/// Length of a queue key.
pub const KEY_LEN: usize = 6;

/// Depths at or beyond this share one ordering bucket.
pub const MAX_KEY_DEPTH: i16 = 127;

/// Largest encoded length of a string field.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Errors from the record codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A string field is too long for its 16-bit length prefix.
    #[error("{field} is {len} bytes encoded, limit is 65535")]
    StringTooLong {
        /// Field name.
        field: &'static str,
        /// Encoded length.
        len: usize,
    },

    /// The record ends inside a field.
    #[error("record truncated in {field}")]
    Truncated {
        /// Field being read.
        field: &'static str,
    },

    /// Bytes follow the last field.
    #[error("{extra} trailing bytes after record")]
    TrailingBytes {
        /// Extra byte count.
        extra: usize,
    },

    /// A string field is not valid modified UTF-8.
    #[error("malformed string in {field}")]
    MalformedString {
        /// Field being read.
        field: &'static str,
    },

    /// An identity value is not 4 bytes.
    #[error("doc id value has {len} bytes, expected 4")]
    InvalidDocIdValue {
        /// Actual length.
        len: usize,
    },
}

/// The 6-byte queue key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(pub [u8; KEY_LEN]);

impl SortKey {
    /// Builds the key for an item's ordering fields.
    ///
    /// Negative priorities and depths are clamped to 0; validation rejects
    /// them before they reach the queue.
    #[must_use]
    pub fn new(priority: i8, depth: i16, doc_id: DocId) -> Self {
        let mut key = [0u8; KEY_LEN];
        key[0] = priority.max(0) as u8;
        key[1] = depth.clamp(0, MAX_KEY_DEPTH) as u8;
        key[2..].copy_from_slice(&(doc_id.as_i32() as u32).to_be_bytes());
        Self(key)
    }

    /// Key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Splits a stored key back into (priority, capped depth, doc id).
    #[must_use]
    pub fn parts(&self) -> (u8, u8, DocId) {
        let id = u32::from_be_bytes([self.0[2], self.0[3], self.0[4], self.0[5]]);
        (self.0[0], self.0[1], DocId::new(id as i32))
    }
}

impl AsRef<[u8]> for SortKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Computes the queue key of an item.
#[must_use]
pub fn encode_key(priority: i8, depth: i16, doc_id: DocId) -> SortKey {
    SortKey::new(priority, depth, doc_id)
}

/// Serializes a work item.
///
/// # Errors
///
/// `StringTooLong` if a string field encodes to more than 65535 bytes.
pub fn encode_record(item: &WorkItem) -> Result<Vec<u8>, RecordError> {
    let mut buf = Vec::with_capacity(
        item.url.len() + item.parent_url.len() + item.anchor.len() + 17,
    );
    write_string(&mut buf, "url", &item.url)?;
    buf.extend_from_slice(&item.doc_id.as_i32().to_be_bytes());
    buf.extend_from_slice(&item.parent_doc_id.as_i32().to_be_bytes());
    write_string(&mut buf, "parent_url", &item.parent_url)?;
    buf.extend_from_slice(&item.depth.to_be_bytes());
    buf.extend_from_slice(&item.priority.to_be_bytes());
    write_string(&mut buf, "anchor", &item.anchor)?;
    Ok(buf)
}

/// Deserializes a work item. An empty buffer is "no item".
///
/// # Errors
///
/// Truncated records, trailing bytes and malformed strings.
pub fn decode_record(bytes: &[u8]) -> Result<Option<WorkItem>, RecordError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let mut reader = Reader { bytes, pos: 0 };
    let url = reader.string("url")?;
    let doc_id = DocId::new(i32::from_be_bytes(reader.array("doc_id")?));
    let parent_doc_id = DocId::new(i32::from_be_bytes(reader.array("parent_doc_id")?));
    let parent_url = reader.string("parent_url")?;
    let depth = i16::from_be_bytes(reader.array("depth")?);
    let priority = i8::from_be_bytes(reader.array("priority")?);
    let anchor = reader.string("anchor")?;

    let extra = bytes.len() - reader.pos;
    if extra != 0 {
        return Err(RecordError::TrailingBytes { extra });
    }

    Ok(Some(WorkItem {
        url,
        doc_id,
        parent_doc_id,
        parent_url,
        depth,
        priority,
        anchor,
    }))
}

/// Identity table value for `id`.
#[must_use]
pub fn encode_doc_id(id: DocId) -> [u8; 4] {
    id.as_i32().to_be_bytes()
}

/// Reads an identity table value.
pub fn decode_doc_id(bytes: &[u8]) -> Result<DocId, RecordError> {
    let raw: [u8; 4] = bytes
        .try_into()
        .map_err(|_| RecordError::InvalidDocIdValue { len: bytes.len() })?;
    Ok(DocId::new(i32::from_be_bytes(raw)))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], RecordError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(RecordError::Truncated { field })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], RecordError> {
        self.take(field, N)?
            .try_into()
            .map_err(|_| RecordError::Truncated { field })
    }

    fn string(&mut self, field: &'static str) -> Result<String, RecordError> {
        let len = u16::from_be_bytes(self.array(field)?) as usize;
        decode_modified_utf8(self.take(field, len)?)
            .ok_or(RecordError::MalformedString { field })
    }
}

fn write_string(buf: &mut Vec<u8>, field: &'static str, value: &str) -> Result<(), RecordError> {
    let len = modified_utf8_len(value);
    if len > MAX_STRING_LEN {
        return Err(RecordError::StringTooLong { field, len });
    }
    buf.extend_from_slice(&(len as u16).to_be_bytes());
    encode_modified_utf8(value, buf);
    Ok(())
}

/// Encoded length of `value` in modified UTF-8.
#[must_use]
pub fn modified_utf8_len(value: &str) -> usize {
    value
        .encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}

fn encode_modified_utf8(value: &str, out: &mut Vec<u8>) {
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
}

fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        match b0 >> 4 {
            0x0..=0x7 if b0 != 0 => {
                units.push(u16::from(b0));
                i += 1;
            }
            0xC | 0xD => {
                let b1 = continuation(bytes, i + 1)?;
                units.push((u16::from(b0 & 0x1F) << 6) | b1);
                i += 2;
            }
            0xE => {
                let b1 = continuation(bytes, i + 1)?;
                let b2 = continuation(bytes, i + 2)?;
                units.push((u16::from(b0 & 0x0F) << 12) | (b1 << 6) | b2);
                i += 3;
            }
            _ => return None,
        }
    }
    String::from_utf16(&units).ok()
}

fn continuation(bytes: &[u8], at: usize) -> Option<u16> {
    match bytes.get(at) {
        Some(b) if b & 0xC0 == 0x80 => Some(u16::from(b & 0x3F)),
        _ => None,
    }
}
