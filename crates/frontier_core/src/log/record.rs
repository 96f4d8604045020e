//! Table log record types and serialization.

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionId;

/// Magic bytes identifying a log record.
pub const LOG_MAGIC: [u8; 4] = *b"FRLG";

/// Current log format version.
pub const LOG_VERSION: u16 = 1;

/// magic (4) + version (2) + type (1) + length (4)
pub const HEADER_SIZE: usize = 11;

/// Trailing CRC32.
pub const CRC_SIZE: usize = 4;

/// Type of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// Start of a transaction.
    Begin = 1,
    /// Insert or overwrite a row.
    Put = 2,
    /// Remove a row.
    Delete = 3,
    /// Upsert a named counter.
    Counter = 4,
    /// End of a transaction.
    Commit = 5,
}

impl LogRecordType {
    /// Converts a byte to a record type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Begin),
            2 => Some(Self::Put),
            3 => Some(Self::Delete),
            4 => Some(Self::Counter),
            5 => Some(Self::Commit),
            _ => None,
        }
    }

    /// Converts the record type to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One mutation in a table log.
///
/// Records with [`TransactionId::AUTO_COMMIT`] apply as soon as they are
/// read back; the others wait for the matching `Commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Start of a transaction.
    Begin {
        /// Transaction ID.
        txid: TransactionId,
    },
    /// Insert or overwrite a row.
    Put {
        /// Owning transaction.
        txid: TransactionId,
        /// Row key.
        key: Vec<u8>,
        /// Row value.
        value: Vec<u8>,
    },
    /// Remove a row.
    Delete {
        /// Owning transaction.
        txid: TransactionId,
        /// Row key.
        key: Vec<u8>,
    },
    /// Upsert a named counter.
    Counter {
        /// Owning transaction.
        txid: TransactionId,
        /// Counter name.
        name: String,
        /// New value.
        value: i64,
    },
    /// End of a transaction.
    Commit {
        /// Transaction ID.
        txid: TransactionId,
    },
}

impl LogRecord {
    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> LogRecordType {
        match self {
            Self::Begin { .. } => LogRecordType::Begin,
            Self::Put { .. } => LogRecordType::Put,
            Self::Delete { .. } => LogRecordType::Delete,
            Self::Counter { .. } => LogRecordType::Counter,
            Self::Commit { .. } => LogRecordType::Commit,
        }
    }

    /// Returns the owning transaction.
    #[must_use]
    pub fn txid(&self) -> TransactionId {
        match self {
            Self::Begin { txid }
            | Self::Put { txid, .. }
            | Self::Delete { txid, .. }
            | Self::Counter { txid, .. }
            | Self::Commit { txid } => *txid,
        }
    }

    /// Serializes the record payload (without envelope).
    ///
    /// # Errors
    ///
    /// Fails if a key, value or counter name does not fit its length field.
    pub fn encode_payload(&self) -> CoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.txid().as_u64().to_le_bytes());

        match self {
            Self::Begin { .. } | Self::Commit { .. } => {}
            Self::Put { key, value, .. } => {
                put_bytes(&mut buf, key)?;
                put_bytes(&mut buf, value)?;
            }
            Self::Delete { key, .. } => put_bytes(&mut buf, key)?,
            Self::Counter { name, value, .. } => {
                let len = u16::try_from(name.len())
                    .map_err(|_| CoreError::invalid_operation("counter name too long"))?;
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(name.as_bytes());
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }

        Ok(buf)
    }

    /// Deserializes a record from its type and payload.
    ///
    /// `database` only labels corruption errors.
    pub fn decode_payload(
        database: &str,
        record_type: LogRecordType,
        payload: &[u8],
    ) -> CoreResult<Self> {
        let mut cur = Cursor {
            database,
            payload,
            pos: 0,
        };

        let txid = TransactionId::new(cur.u64()?);
        let record = match record_type {
            LogRecordType::Begin => Self::Begin { txid },
            LogRecordType::Commit => Self::Commit { txid },
            LogRecordType::Put => {
                let key = cur.bytes()?;
                let value = cur.bytes()?;
                Self::Put { txid, key, value }
            }
            LogRecordType::Delete => Self::Delete {
                txid,
                key: cur.bytes()?,
            },
            LogRecordType::Counter => {
                let len = u16::from_le_bytes(cur.array()?);
                let name = std::str::from_utf8(cur.take(len as usize)?)
                    .map_err(|_| cur.corrupt("counter name is not UTF-8"))?
                    .to_string();
                let value = i64::from_le_bytes(cur.array()?);
                Self::Counter { txid, name, value }
            }
        };

        if cur.pos != payload.len() {
            return Err(cur.corrupt(&format!(
                "trailing bytes in {:?} record: expected {} bytes, got {}",
                record_type,
                cur.pos,
                payload.len()
            )));
        }

        Ok(record)
    }

    /// Serializes the record with its envelope and checksum.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        let payload = self.encode_payload()?;
        let len = u32::try_from(payload.len())
            .map_err(|_| CoreError::invalid_operation("log record payload too large"))?;

        let mut data = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        data.extend_from_slice(&LOG_MAGIC);
        data.extend_from_slice(&LOG_VERSION.to_le_bytes());
        data.push(self.record_type().as_byte());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&payload);

        let crc = compute_crc32(&data);
        data.extend_from_slice(&crc.to_le_bytes());
        Ok(data)
    }
}

struct Cursor<'a> {
    database: &'a str,
    payload: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn corrupt(&self, message: &str) -> CoreError {
        CoreError::log_corruption(self.database, message)
    }

    fn take(&mut self, len: usize) -> CoreResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.payload.len())
            .ok_or_else(|| self.corrupt("unexpected end of payload"))?;
        let slice = &self.payload[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> CoreResult<[u8; N]> {
        self.take(N)?
            .try_into()
            .map_err(|_| self.corrupt("invalid fixed-width field"))
    }

    fn u64(&mut self) -> CoreResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn bytes(&mut self) -> CoreResult<Vec<u8>> {
        let len = u32::from_le_bytes(self.array()?) as usize;
        Ok(self.take(len)?.to_vec())
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> CoreResult<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| CoreError::invalid_operation("log field larger than 4 GiB"))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Computes the CRC32 (IEEE) of `data`.
pub fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc = CRC32_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: u64) -> TransactionId {
        TransactionId::new(id)
    }

    #[test]
    fn record_type_bytes() {
        for b in 1..=5 {
            assert_eq!(LogRecordType::from_byte(b).unwrap().as_byte(), b);
        }
        assert!(LogRecordType::from_byte(0).is_none());
        assert!(LogRecordType::from_byte(6).is_none());
    }

    #[test]
    fn payloads_decode_back() {
        let records = [
            LogRecord::Begin { txid: txn(3) },
            LogRecord::Put {
                txid: txn(3),
                key: vec![0, 0, 0, 0, 0, 1],
                value: b"item".to_vec(),
            },
            LogRecord::Delete {
                txid: TransactionId::AUTO_COMMIT,
                key: b"http://a.com/".to_vec(),
            },
            LogRecord::Counter {
                txid: txn(3),
                name: "last-doc-id".into(),
                value: -9,
            },
            LogRecord::Commit { txid: txn(3) },
        ];

        for record in records {
            let payload = record.encode_payload().unwrap();
            let decoded =
                LogRecord::decode_payload("t", record.record_type(), &payload).unwrap();
            assert_eq!(decoded, record);
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut payload = LogRecord::Commit { txid: txn(1) }.encode_payload().unwrap();
        payload.push(0);
        assert!(matches!(
            LogRecord::decode_payload("t", LogRecordType::Commit, &payload),
            Err(CoreError::LogCorruption { .. })
        ));
    }

    #[test]
    fn short_payload_rejected() {
        let payload = LogRecord::Put {
            txid: txn(1),
            key: b"k".to_vec(),
            value: b"value".to_vec(),
        }
        .encode_payload()
        .unwrap();
        assert!(LogRecord::decode_payload("t", LogRecordType::Put, &payload[..payload.len() - 1])
            .is_err());
    }

    #[test]
    fn envelope_layout() {
        let data = LogRecord::Begin { txid: txn(1) }.encode().unwrap();
        assert_eq!(&data[0..4], b"FRLG");
        assert_eq!(u16::from_le_bytes([data[4], data[5]]), LOG_VERSION);
        assert_eq!(data[6], LogRecordType::Begin.as_byte());
        assert_eq!(data.len(), HEADER_SIZE + 8 + CRC_SIZE);

        let crc_at = data.len() - CRC_SIZE;
        let stored = u32::from_le_bytes(data[crc_at..].try_into().unwrap());
        assert_eq!(stored, compute_crc32(&data[..crc_at]));
    }

    #[test]
    fn crc32_known_value() {
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
    }
}
