//! Table log writer.

use crate::error::CoreResult;
use crate::log::record::LogRecord;
use frontier_storage::StorageBackend;

/// Appends encoded records to a table's backend.
///
/// In deferred mode records accumulate in memory and reach the backend in
/// one append once the buffer passes `flush_threshold`, on
/// [`LogWriter::flush`], and on close.
pub struct LogWriter {
    backend: Box<dyn StorageBackend>,
    deferred: bool,
    flush_threshold: usize,
    buffer: Vec<u8>,
}

impl LogWriter {
    /// Creates a writer over `backend`.
    pub fn new(backend: Box<dyn StorageBackend>, deferred: bool, flush_threshold: usize) -> Self {
        Self {
            backend,
            deferred,
            flush_threshold,
            buffer: Vec::new(),
        }
    }

    /// Borrows the backend for reading. Buffered bytes are not visible.
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// Bytes waiting in the deferred buffer.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Size of the durable part of the log.
    pub fn size(&self) -> CoreResult<u64> {
        Ok(self.backend.size()?)
    }

    /// Writes encoded records as one unit.
    ///
    /// Direct mode appends and flushes immediately. Deferred mode first
    /// drains a full buffer, so a failed drain leaves `data` unwritten and
    /// the caller can skip applying it.
    pub fn write(&mut self, data: &[u8]) -> CoreResult<()> {
        if !self.deferred {
            return self.append_now(data);
        }

        if self.buffer.len() >= self.flush_threshold {
            self.flush()?;
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Encodes and writes a single record.
    pub fn write_record(&mut self, record: &LogRecord) -> CoreResult<()> {
        let data = record.encode()?;
        self.write(&data)
    }

    /// Moves buffered bytes to the backend.
    pub fn flush(&mut self) -> CoreResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let data = std::mem::take(&mut self.buffer);
        if let Err(err) = self.append_now(&data) {
            self.buffer = data;
            return Err(err);
        }
        Ok(())
    }

    /// Flushes and forces the log to disk.
    pub fn sync(&mut self) -> CoreResult<()> {
        self.flush()?;
        self.backend.sync()?;
        Ok(())
    }

    /// Cuts the durable log back to `size` and clears the buffer.
    pub fn truncate(&mut self, size: u64) -> CoreResult<()> {
        self.buffer.clear();
        self.backend.truncate(size)?;
        Ok(())
    }

    /// Swaps in a rewritten backend, returning the old one.
    pub fn replace_backend(&mut self, backend: Box<dyn StorageBackend>) -> Box<dyn StorageBackend> {
        self.buffer.clear();
        std::mem::replace(&mut self.backend, backend)
    }

    fn append_now(&mut self, data: &[u8]) -> CoreResult<()> {
        let before = self.backend.size()?;
        let result = self
            .backend
            .append(data)
            .and_then(|_| self.backend.flush());
        if let Err(err) = result {
            // a partial append must not survive into the next record
            let _ = self.backend.truncate(before);
            return Err(err.into());
        }
        Ok(())
    }
}
