//! A single ordered byte table.

use crate::config::{Config, DatabaseConfig};
use crate::error::{CoreError, CoreResult};
use crate::log::{LogReader, LogRecord, LogWriter, PositionedRecord};
use crate::store::transaction::Transaction;
use crate::types::TransactionId;
use frontier_storage::StorageBackend;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rows and counters of a table as of the last commit.
#[derive(Debug, Default)]
pub(crate) struct TableState {
    pub(crate) rows: BTreeMap<Vec<u8>, Vec<u8>>,
    pub(crate) counters: BTreeMap<String, i64>,
}

impl TableState {
    pub(crate) fn apply(&mut self, record: LogRecord) {
        match record {
            LogRecord::Put { key, value, .. } => {
                self.rows.insert(key, value);
            }
            LogRecord::Delete { key, .. } => {
                self.rows.remove(&key);
            }
            LogRecord::Counter { name, value, .. } => {
                self.counters.insert(name, value);
            }
            LogRecord::Begin { .. } | LogRecord::Commit { .. } => {}
        }
    }
}

/// What a log replay found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records read, committed or not.
    pub records: u64,
    /// Transactions applied.
    pub committed_transactions: u64,
    /// Bytes cut from the end of the log (torn write or unfinished
    /// transaction).
    pub truncated_bytes: u64,
}

/// An ordered key-value table with byte keys and values, plus a namespace of
/// named `i64` counters.
///
/// Reads see the last committed state. Writers are serialized by a writer
/// lock acquired with the environment's lock timeout; a [`Transaction`]
/// holds it until it commits or is dropped. The lock is not reentrant: a
/// thread holding a transaction must write through it, not through the
/// table.
pub struct Database {
    name: String,
    config: DatabaseConfig,
    sync_on_commit: bool,
    lock_timeout: Duration,
    state: RwLock<TableState>,
    log: Mutex<LogWriter>,
    writer: Mutex<()>,
    next_txid: AtomicU64,
    closed: AtomicBool,
    recovery: RecoveryStats,
}

impl Database {
    /// Opens a table over `backend`, replaying its log.
    ///
    /// # Errors
    ///
    /// Fails on corruption (bad checksum, magic, version or type) and on
    /// backend errors. A torn tail is cut off, not reported.
    pub fn open(
        name: &str,
        mut backend: Box<dyn StorageBackend>,
        config: DatabaseConfig,
        options: &Config,
    ) -> CoreResult<Self> {
        let (state, recovery, last_txid) = replay(name, &mut backend)?;

        if recovery.records > 0 {
            info!(
                database = name,
                records = recovery.records,
                rows = state.rows.len(),
                transactions = recovery.committed_transactions,
                "recovered table from log"
            );
        }

        Ok(Self {
            name: name.to_string(),
            config,
            sync_on_commit: options.sync_on_commit,
            lock_timeout: options.lock_timeout,
            state: RwLock::new(state),
            log: Mutex::new(LogWriter::new(
                backend,
                config.deferred_write,
                options.deferred_flush_threshold,
            )),
            writer: Mutex::new(()),
            next_txid: AtomicU64::new(last_txid + 1),
            closed: AtomicBool::new(false),
            recovery,
        })
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Durability settings.
    #[must_use]
    pub fn config(&self) -> DatabaseConfig {
        self.config
    }

    /// What the replay on open found.
    #[must_use]
    pub fn recovery(&self) -> RecoveryStats {
        self.recovery
    }

    /// Returns `true` once [`Database::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // ---- reads ----

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        Ok(self.state.read().rows.get(key).cloned())
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &[u8]) -> CoreResult<bool> {
        self.ensure_open()?;
        Ok(self.state.read().rows.contains_key(key))
    }

    /// Number of rows.
    pub fn count(&self) -> CoreResult<u64> {
        self.ensure_open()?;
        Ok(self.state.read().rows.len() as u64)
    }

    /// The first `n` rows in ascending unsigned byte order of their keys.
    pub fn scan_first_n(&self, n: usize) -> CoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.ensure_open()?;
        Ok(self
            .state
            .read()
            .rows
            .iter()
            .take(n)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Visits rows in key order until `visit` returns `false`.
    ///
    /// The table's read lock is held for the whole walk.
    pub fn scan_while<F>(&self, mut visit: F) -> CoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        self.ensure_open()?;
        let state = self.state.read();
        for (key, value) in &state.rows {
            if !visit(key, value) {
                break;
            }
        }
        Ok(())
    }

    /// Reads a counter; absent counters read as 0.
    pub fn counter(&self, name: &str) -> CoreResult<i64> {
        self.ensure_open()?;
        Ok(self.state.read().counters.get(name).copied().unwrap_or(0))
    }

    /// Reads a counter, distinguishing "never written".
    pub fn counter_opt(&self, name: &str) -> CoreResult<Option<i64>> {
        self.ensure_open()?;
        Ok(self.state.read().counters.get(name).copied())
    }

    /// All counters, sorted by name.
    pub fn list_counters(&self) -> CoreResult<Vec<(String, i64)>> {
        self.ensure_open()?;
        Ok(self
            .state
            .read()
            .counters
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect())
    }

    /// Size of the log on its backend, excluding buffered bytes.
    pub fn log_size(&self) -> CoreResult<u64> {
        self.log.lock().size()
    }

    // ---- auto-commit writes ----

    /// Inserts or overwrites a row.
    pub fn put(&self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        self.write_auto(vec![LogRecord::Put {
            txid: TransactionId::AUTO_COMMIT,
            key: key.to_vec(),
            value: value.to_vec(),
        }])
    }

    /// Removes a row. Returns `true` if it existed.
    pub fn delete(&self, key: &[u8]) -> CoreResult<bool> {
        let _guard = self.lock_writer()?;
        self.ensure_open()?;
        if !self.state.read().rows.contains_key(key) {
            return Ok(false);
        }
        self.append_and_apply(vec![LogRecord::Delete {
            txid: TransactionId::AUTO_COMMIT,
            key: key.to_vec(),
        }])?;
        Ok(true)
    }

    /// Removes the first `n` rows in key order. Returns how many went.
    pub fn delete_first_n(&self, n: usize) -> CoreResult<usize> {
        let _guard = self.lock_writer()?;
        self.ensure_open()?;
        let records: Vec<LogRecord> = self
            .state
            .read()
            .rows
            .keys()
            .take(n)
            .map(|key| LogRecord::Delete {
                txid: TransactionId::AUTO_COMMIT,
                key: key.clone(),
            })
            .collect();
        let removed = records.len();
        if removed > 0 {
            self.append_and_apply(records)?;
        }
        Ok(removed)
    }

    /// Upserts a counter.
    pub fn set_counter(&self, name: &str, value: i64) -> CoreResult<()> {
        self.write_auto(vec![LogRecord::Counter {
            txid: TransactionId::AUTO_COMMIT,
            name: name.to_string(),
            value,
        }])
    }

    // ---- transactions ----

    /// Starts a transaction, or returns `None` for non-transactional
    /// tables.
    ///
    /// # Errors
    ///
    /// `LockTimeout` if another writer holds the table for longer than the
    /// configured timeout.
    pub fn begin_transaction(&self) -> CoreResult<Option<Transaction<'_>>> {
        if !self.config.transactional {
            return Ok(None);
        }
        let guard = self.lock_writer()?;
        self.ensure_open()?;
        let txid = TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst));
        Ok(Some(Transaction::new(self, txid, guard)))
    }

    /// Appends `Begin, records..., Commit` and applies `records`.
    ///
    /// Called by [`Transaction::commit`] with the writer lock held.
    pub(crate) fn commit_records(
        &self,
        txid: TransactionId,
        records: Vec<LogRecord>,
    ) -> CoreResult<()> {
        self.ensure_open()?;
        if records.is_empty() {
            return Ok(());
        }

        let mut data = LogRecord::Begin { txid }.encode()?;
        for record in &records {
            data.extend_from_slice(&record.encode()?);
        }
        data.extend_from_slice(&LogRecord::Commit { txid }.encode()?);

        {
            let mut log = self.log.lock();
            let before = log.size()?;
            log.write(&data)?;
            if self.sync_on_commit {
                if let Err(err) = log.sync() {
                    let _ = log.truncate(before);
                    return Err(err);
                }
            }
        }

        let mut state = self.state.write();
        for record in records {
            state.apply(record);
        }
        Ok(())
    }

    pub(crate) fn state(&self) -> parking_lot::RwLockReadGuard<'_, TableState> {
        self.state.read()
    }

    // ---- maintenance ----

    /// Pushes buffered writes to the backend and syncs it.
    pub fn sync(&self) -> CoreResult<()> {
        self.ensure_open()?;
        self.log.lock().sync()
    }

    /// Drops every row and counter, emptying the log.
    pub fn truncate(&self) -> CoreResult<()> {
        let _guard = self.lock_writer()?;
        self.ensure_open()?;
        self.log.lock().truncate(0)?;
        *self.state.write() = TableState::default();
        debug!(database = %self.name, "table truncated");
        Ok(())
    }

    /// Rewrites the log as a snapshot of the live state.
    ///
    /// `install` receives the snapshot bytes. It may write them elsewhere
    /// and return a backend holding exactly those bytes, which then
    /// replaces the current one. Returning `None` rewrites the current
    /// backend in place.
    pub fn compact_with<F>(&self, install: F) -> CoreResult<(u64, u64)>
    where
        F: FnOnce(&[u8]) -> CoreResult<Option<Box<dyn StorageBackend>>>,
    {
        let _guard = self.lock_writer()?;
        self.ensure_open()?;

        let mut log = self.log.lock();
        log.flush()?;
        let before = log.size()?;

        let snapshot = self.snapshot()?;
        match install(&snapshot)? {
            Some(backend) => {
                log.replace_backend(backend);
            }
            None => {
                log.truncate(0)?;
                log.write(&snapshot)?;
                log.sync()?;
            }
        }

        let after = log.size()?;
        debug!(database = %self.name, before, after, "log compacted");
        Ok((before, after))
    }

    fn snapshot(&self) -> CoreResult<Vec<u8>> {
        let state = self.state.read();
        let mut data = Vec::new();
        for (key, value) in &state.rows {
            data.extend_from_slice(
                &LogRecord::Put {
                    txid: TransactionId::AUTO_COMMIT,
                    key: key.clone(),
                    value: value.clone(),
                }
                .encode()?,
            );
        }
        for (name, value) in &state.counters {
            data.extend_from_slice(
                &LogRecord::Counter {
                    txid: TransactionId::AUTO_COMMIT,
                    name: name.clone(),
                    value: *value,
                }
                .encode()?,
            );
        }
        Ok(data)
    }

    /// Flushes and closes the table. Later operations fail with
    /// `DatabaseClosed`. Closing twice is a no-op.
    pub fn close(&self) -> CoreResult<()> {
        let _guard = self.lock_writer()?;
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.log.lock().sync()
    }

    // ---- internals ----

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_closed() {
            return Err(CoreError::DatabaseClosed {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    fn lock_writer(&self) -> CoreResult<MutexGuard<'_, ()>> {
        self.writer
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| CoreError::LockTimeout {
                database: self.name.clone(),
                waited_ms: self.lock_timeout.as_millis() as u64,
            })
    }

    fn write_auto(&self, records: Vec<LogRecord>) -> CoreResult<()> {
        let _guard = self.lock_writer()?;
        self.ensure_open()?;
        self.append_and_apply(records)
    }

    fn append_and_apply(&self, records: Vec<LogRecord>) -> CoreResult<()> {
        let mut data = Vec::new();
        for record in &records {
            data.extend_from_slice(&record.encode()?);
        }
        self.log.lock().write(&data)?;

        let mut state = self.state.write();
        for record in records {
            state.apply(record);
        }
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if !self.is_closed() {
            if let Err(err) = self.log.get_mut().flush() {
                warn!(database = %self.name, error = %err, "buffered writes lost on drop");
            }
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Rebuilds the committed state from a log, cutting off a torn tail or an
/// unfinished transaction.
fn replay(
    name: &str,
    backend: &mut Box<dyn StorageBackend>,
) -> CoreResult<(TableState, RecoveryStats, u64)> {
    let mut state = TableState::default();
    let mut stats = RecoveryStats::default();
    let mut open_txn: Option<(TransactionId, Vec<LogRecord>)> = None;
    let mut committed_end = 0u64;
    let mut last_txid = 0u64;

    {
        let mut reader = LogReader::new(name, backend.as_ref())?;
        for item in &mut reader {
            let PositionedRecord { end, record, .. } = item?;
            stats.records += 1;
            let txid = record.txid();
            last_txid = last_txid.max(txid.as_u64());

            match record {
                LogRecord::Begin { .. } => {
                    if let Some((abandoned, _)) = open_txn.replace((txid, Vec::new())) {
                        warn!(database = name, txid = %abandoned, "transaction without commit discarded");
                    }
                }
                LogRecord::Commit { .. } => match open_txn.take() {
                    Some((open, records)) if open == txid => {
                        for record in records {
                            state.apply(record);
                        }
                        stats.committed_transactions += 1;
                        committed_end = end;
                    }
                    _ => {
                        return Err(CoreError::log_corruption(
                            name,
                            format!("commit of {txid} without matching begin"),
                        ));
                    }
                },
                record if txid == TransactionId::AUTO_COMMIT => {
                    if open_txn.is_some() {
                        return Err(CoreError::log_corruption(
                            name,
                            "auto-commit record inside a transaction",
                        ));
                    }
                    state.apply(record);
                    committed_end = end;
                }
                record => match open_txn.as_mut() {
                    Some((open, records)) if *open == txid => records.push(record),
                    _ => {
                        return Err(CoreError::log_corruption(
                            name,
                            format!("record of {txid} outside its transaction"),
                        ));
                    }
                },
            }
        }
    }

    let size = backend.size()?;
    if committed_end < size {
        warn!(
            database = name,
            offset = committed_end,
            bytes = size - committed_end,
            "discarding incomplete log tail"
        );
        backend.truncate(committed_end)?;
        stats.truncated_bytes = size - committed_end;
    }

    Ok((state, stats, last_txid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_storage::InMemoryBackend;

    fn transactional() -> DatabaseConfig {
        DatabaseConfig {
            transactional: true,
            deferred_write: false,
        }
    }

    fn deferred() -> DatabaseConfig {
        DatabaseConfig {
            transactional: false,
            deferred_write: true,
        }
    }

    fn open(backend: &InMemoryBackend, config: DatabaseConfig) -> Database {
        Database::open("t", Box::new(backend.clone()), config, &Config::default()).unwrap()
    }

    #[test]
    fn put_get_delete() {
        let db = open(&InMemoryBackend::new(), DatabaseConfig::default());
        db.put(b"b", b"2").unwrap();
        db.put(b"a", b"1").unwrap();

        assert_eq!(db.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert!(db.contains(b"b").unwrap());
        assert_eq!(db.count().unwrap(), 2);

        assert!(db.delete(b"a").unwrap());
        assert!(!db.delete(b"a").unwrap());
        assert_eq!(db.get(b"a").unwrap(), None);
    }

    #[test]
    fn scan_uses_unsigned_byte_order() {
        let db = open(&InMemoryBackend::new(), DatabaseConfig::default());
        db.put(&[0x80], b"high").unwrap();
        db.put(&[0x7F], b"low").unwrap();
        db.put(&[0x00, 0xFF], b"first").unwrap();

        let keys: Vec<_> = db
            .scan_first_n(10)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![vec![0x00, 0xFF], vec![0x7F], vec![0x80]]);
    }

    #[test]
    fn delete_first_n_removes_smallest() {
        let db = open(&InMemoryBackend::new(), DatabaseConfig::default());
        for key in [3u8, 1, 2, 5, 4] {
            db.put(&[key], &[key]).unwrap();
        }

        assert_eq!(db.delete_first_n(2).unwrap(), 2);
        let keys: Vec<_> = db.scan_first_n(10).unwrap().into_iter().map(|(k, _)| k[0]).collect();
        assert_eq!(keys, vec![3, 4, 5]);
        assert_eq!(db.delete_first_n(10).unwrap(), 3);
        assert_eq!(db.delete_first_n(1).unwrap(), 0);
    }

    #[test]
    fn counters_default_to_zero() {
        let db = open(&InMemoryBackend::new(), DatabaseConfig::default());
        assert_eq!(db.counter("missing").unwrap(), 0);
        assert_eq!(db.counter_opt("missing").unwrap(), None);

        db.set_counter("b", 2).unwrap();
        db.set_counter("a", 1).unwrap();
        db.set_counter("a", 7).unwrap();
        assert_eq!(
            db.list_counters().unwrap(),
            vec![("a".to_string(), 7), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn state_survives_reopen() {
        let backend = InMemoryBackend::new();
        {
            let db = open(&backend, DatabaseConfig::default());
            db.put(b"k", b"v").unwrap();
            db.set_counter("c", 3).unwrap();
            db.delete(b"k").unwrap();
            db.put(b"k2", b"v2").unwrap();
        }

        let db = open(&backend, DatabaseConfig::default());
        assert_eq!(db.get(b"k").unwrap(), None);
        assert_eq!(db.get(b"k2").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(db.counter("c").unwrap(), 3);
        assert_eq!(db.recovery().records, 4);
    }

    #[test]
    fn non_transactional_table_has_no_transactions() {
        let db = open(&InMemoryBackend::new(), DatabaseConfig::default());
        assert!(db.begin_transaction().unwrap().is_none());
    }

    #[test]
    fn committed_transaction_replays() {
        let backend = InMemoryBackend::new();
        {
            let db = open(&backend, transactional());
            let mut txn = db.begin_transaction().unwrap().unwrap();
            txn.put(b"k", b"v");
            txn.set_counter("last", 1);
            txn.commit().unwrap();
        }

        let db = open(&backend, transactional());
        assert_eq!(db.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(db.counter("last").unwrap(), 1);
        assert_eq!(db.recovery().committed_transactions, 1);
    }

    #[test]
    fn unfinished_transaction_is_cut_off() {
        let backend = InMemoryBackend::new();
        {
            let db = open(&backend, transactional());
            db.put(b"before", b"1").unwrap();
        }
        let committed = backend.size().unwrap();

        // a crash after Begin and one Put, before Commit
        let mut raw = backend.clone();
        let txid = TransactionId::new(9);
        raw.append(&LogRecord::Begin { txid }.encode().unwrap()).unwrap();
        raw.append(
            &LogRecord::Put {
                txid,
                key: b"lost".to_vec(),
                value: b"x".to_vec(),
            }
            .encode()
            .unwrap(),
        )
        .unwrap();

        let db = open(&backend, transactional());
        assert_eq!(db.get(b"lost").unwrap(), None);
        assert_eq!(db.get(b"before").unwrap(), Some(b"1".to_vec()));
        assert_eq!(backend.size().unwrap(), committed);
        assert!(db.recovery().truncated_bytes > 0);
    }

    #[test]
    fn torn_tail_is_cut_off() {
        let backend = InMemoryBackend::new();
        {
            let db = open(&backend, DatabaseConfig::default());
            db.put(b"a", b"1").unwrap();
            db.put(b"b", b"2").unwrap();
        }
        let mut raw = backend.clone();
        raw.truncate(backend.size().unwrap() - 2).unwrap();

        let db = open(&backend, DatabaseConfig::default());
        assert_eq!(db.count().unwrap(), 1);

        // the log is usable again after the cut
        db.put(b"c", b"3").unwrap();
        drop(db);
        assert_eq!(open(&backend, DatabaseConfig::default()).count().unwrap(), 2);
    }

    #[test]
    fn flipped_byte_fails_open() {
        let backend = InMemoryBackend::new();
        {
            let db = open(&backend, DatabaseConfig::default());
            db.put(b"key", b"value").unwrap();
        }
        assert!(backend.corrupt_byte(20, 0xAA));

        let result = Database::open(
            "t",
            Box::new(backend.clone()),
            DatabaseConfig::default(),
            &Config::default(),
        );
        assert!(matches!(result, Err(CoreError::ChecksumMismatch { .. })));
    }

    #[test]
    fn deferred_writes_reach_backend_on_sync() {
        let backend = InMemoryBackend::new();
        let db = open(&backend, deferred());
        db.put(b"k", b"v").unwrap();

        assert_eq!(db.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(backend.size().unwrap(), 0);

        db.sync().unwrap();
        assert!(backend.size().unwrap() > 0);
    }

    #[test]
    fn closed_table_rejects_operations() {
        let db = open(&InMemoryBackend::new(), DatabaseConfig::default());
        db.close().unwrap();
        db.close().unwrap();

        assert!(matches!(db.get(b"k"), Err(CoreError::DatabaseClosed { .. })));
        assert!(matches!(db.put(b"k", b"v"), Err(CoreError::DatabaseClosed { .. })));
        assert!(matches!(db.count(), Err(CoreError::DatabaseClosed { .. })));
    }

    #[test]
    fn writer_lock_times_out() {
        let options = Config::default().lock_timeout(Duration::from_millis(20));
        let db = Database::open("t", Box::new(InMemoryBackend::new()), transactional(), &options)
            .unwrap();

        let _txn = db.begin_transaction().unwrap().unwrap();
        std::thread::scope(|s| {
            s.spawn(|| {
                assert!(matches!(
                    db.put(b"k", b"v"),
                    Err(CoreError::LockTimeout { waited_ms: 20, .. })
                ));
            });
        });
    }

    #[test]
    fn truncate_empties_table_and_log() {
        let backend = InMemoryBackend::new();
        let db = open(&backend, DatabaseConfig::default());
        db.put(b"k", b"v").unwrap();
        db.set_counter("c", 1).unwrap();

        db.truncate().unwrap();
        assert_eq!(db.count().unwrap(), 0);
        assert_eq!(db.counter_opt("c").unwrap(), None);
        assert_eq!(backend.size().unwrap(), 0);
    }

    #[test]
    fn compact_in_place_keeps_state() {
        let backend = InMemoryBackend::new();
        let db = open(&backend, DatabaseConfig::default());
        for i in 0..20u8 {
            db.put(&[i], &[i]).unwrap();
        }
        db.delete_first_n(15).unwrap();
        db.set_counter("c", 5).unwrap();

        let (before, after) = db.compact_with(|_| Ok(None)).unwrap();
        assert!(after < before);
        drop(db);

        let db = open(&backend, DatabaseConfig::default());
        assert_eq!(db.count().unwrap(), 5);
        assert_eq!(db.counter("c").unwrap(), 5);
    }
}
