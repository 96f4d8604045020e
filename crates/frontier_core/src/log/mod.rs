//! Per-table mutation log.
//!
//! Every table appends its mutations to its own log. The live state is
//! rebuilt on open by replaying the log; see [`crate::store`].

mod reader;
mod record;
mod writer;

pub use reader::{LogReader, PositionedRecord};
pub use record::{
    compute_crc32, LogRecord, LogRecordType, CRC_SIZE, HEADER_SIZE, LOG_MAGIC, LOG_VERSION,
};
pub use writer::LogWriter;
