//! Streaming table log reader.

use crate::error::{CoreError, CoreResult};
use crate::log::record::{
    compute_crc32, LogRecord, LogRecordType, CRC_SIZE, HEADER_SIZE, LOG_MAGIC, LOG_VERSION,
};
use frontier_storage::StorageBackend;

/// A record read back from a log, with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedRecord {
    /// Offset of the first envelope byte.
    pub offset: u64,
    /// Offset just past the checksum.
    pub end: u64,
    /// The decoded record.
    pub record: LogRecord,
}

/// Reads log records one at a time.
///
/// - an incomplete header or body at the end of the log is a torn write and
///   ends iteration cleanly ([`LogReader::torn_at`] reports where)
/// - bad magic, a newer version, an unknown type or a CRC mismatch are
///   corruption errors
pub struct LogReader<'a> {
    database: &'a str,
    backend: &'a dyn StorageBackend,
    size: u64,
    offset: u64,
    torn_at: Option<u64>,
    finished: bool,
}

impl<'a> LogReader<'a> {
    /// Creates a reader over the whole of `backend`.
    pub fn new(database: &'a str, backend: &'a dyn StorageBackend) -> CoreResult<Self> {
        let size = backend.size()?;
        Ok(Self {
            database,
            backend,
            size,
            offset: 0,
            torn_at: None,
            finished: false,
        })
    }

    /// Offset of a torn trailing record, once iteration has reached it.
    #[must_use]
    pub fn torn_at(&self) -> Option<u64> {
        self.torn_at
    }

    fn remaining(&self) -> u64 {
        self.size - self.offset
    }

    fn read_next(&mut self) -> CoreResult<Option<PositionedRecord>> {
        if self.finished || self.remaining() == 0 {
            self.finished = true;
            return Ok(None);
        }

        let start = self.offset;
        if self.remaining() < HEADER_SIZE as u64 {
            return Ok(self.torn(start));
        }

        let header = self.backend.read_at(start, HEADER_SIZE)?;
        if header[0..4] != LOG_MAGIC {
            self.finished = true;
            return Err(CoreError::log_corruption(
                self.database,
                format!("invalid magic at offset {start}"),
            ));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version > LOG_VERSION {
            self.finished = true;
            return Err(CoreError::log_corruption(
                self.database,
                format!("unsupported version {version} at offset {start}"),
            ));
        }

        let type_byte = header[6];
        let Some(record_type) = LogRecordType::from_byte(type_byte) else {
            self.finished = true;
            return Err(CoreError::log_corruption(
                self.database,
                format!("unknown record type {type_byte} at offset {start}"),
            ));
        };

        let payload_len = u32::from_le_bytes([header[7], header[8], header[9], header[10]]) as u64;
        let total = HEADER_SIZE as u64 + payload_len + CRC_SIZE as u64;
        if self.remaining() < total {
            return Ok(self.torn(start));
        }

        let body = self.backend.read_at(start + HEADER_SIZE as u64, (total - HEADER_SIZE as u64) as usize)?;
        let (payload, crc_bytes) = body.split_at(payload_len as usize);

        let mut checked = header;
        checked.extend_from_slice(payload);
        let actual = compute_crc32(&checked);
        let expected = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        if actual != expected {
            self.finished = true;
            return Err(CoreError::ChecksumMismatch {
                database: self.database.to_string(),
                offset: start,
                expected,
                actual,
            });
        }

        let record = LogRecord::decode_payload(self.database, record_type, payload)?;
        self.offset = start + total;

        Ok(Some(PositionedRecord {
            offset: start,
            end: self.offset,
            record,
        }))
    }

    fn torn(&mut self, start: u64) -> Option<PositionedRecord> {
        self.torn_at = Some(start);
        self.finished = true;
        None
    }
}

impl Iterator for LogReader<'_> {
    type Item = CoreResult<PositionedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
