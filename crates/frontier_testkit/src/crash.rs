//! Crash recovery testing.
//!
//! [`FaultyBackend`] wraps an in-memory log and fails on demand. Once it
//! has "crashed" every later call fails too, so whatever bytes made it into
//! the buffer stay there for the next open to replay.

use crate::fixtures::SharedBackends;
use frontier_core::{BackendFactory, Config, CrawlStore, Environment};
use frontier_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Fault switches shared by every handle of one [`FaultyBackend`].
#[derive(Debug)]
pub struct Faults {
    crashed: AtomicBool,
    fail_on_sync: AtomicBool,
    crash_after: AtomicUsize,
    written: AtomicUsize,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            crashed: AtomicBool::new(false),
            fail_on_sync: AtomicBool::new(false),
            crash_after: AtomicUsize::new(usize::MAX),
            written: AtomicUsize::new(0),
        }
    }
}

impl Faults {
    /// Crashes once `bytes` more bytes have been appended. The append that
    /// crosses the limit is written partially.
    pub fn crash_after(&self, bytes: usize) {
        let written = self.written.load(Ordering::SeqCst);
        self.crash_after
            .store(written.saturating_add(bytes), Ordering::SeqCst);
    }

    /// Makes `sync` fail (without crashing) while set.
    pub fn set_fail_on_sync(&self, fail: bool) {
        self.fail_on_sync.store(fail, Ordering::SeqCst);
    }

    /// Whether the backend has crashed.
    pub fn is_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    fn check(&self, operation: &str) -> StorageResult<()> {
        if self.is_crashed() {
            return Err(simulated(operation));
        }
        Ok(())
    }
}

/// An in-memory backend that fails when told to.
#[derive(Debug, Clone)]
pub struct FaultyBackend {
    inner: InMemoryBackend,
    faults: Arc<Faults>,
}

impl FaultyBackend {
    /// Wraps `inner`.
    pub fn new(inner: InMemoryBackend) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults::default()),
        }
    }

    /// Switches controlling this backend and its clones.
    pub fn faults(&self) -> Arc<Faults> {
        Arc::clone(&self.faults)
    }
}

impl StorageBackend for FaultyBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.faults.check("read")?;
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        self.faults.check("append")?;
        let written = self.faults.written.load(Ordering::SeqCst);
        let limit = self.faults.crash_after.load(Ordering::SeqCst);

        if written.saturating_add(data.len()) > limit {
            self.faults.crashed.store(true, Ordering::SeqCst);
            let partial = limit.saturating_sub(written);
            if partial > 0 {
                let _ = self.inner.append(&data[..partial]);
            }
            return Err(simulated("partial append"));
        }

        self.faults.written.fetch_add(data.len(), Ordering::SeqCst);
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.faults.check("flush")?;
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.faults.check("size")?;
        self.inner.size()
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.faults.check("sync")?;
        if self.faults.fail_on_sync.load(Ordering::SeqCst) {
            return Err(simulated("sync"));
        }
        self.inner.sync()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.faults.check("truncate")?;
        self.inner.truncate(new_size)
    }
}

fn simulated(operation: &str) -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("simulated failure during {operation}"),
    ))
}

/// Opens a store over `logs` in which `table` goes through a
/// [`FaultyBackend`]. Returns the store and the switches of that table.
pub fn store_with_faulty_table(
    logs: &SharedBackends,
    table: &str,
    config: Config,
) -> (CrawlStore, Arc<Faults>) {
    let faulty = FaultyBackend::new(logs.backend(table));
    let faults = faulty.faults();
    let shared = logs.clone();
    let table = table.to_string();

    let factory: BackendFactory = Arc::new(move |name: &str| {
        if name == table {
            Ok(Box::new(faulty.clone()) as Box<dyn StorageBackend>)
        } else {
            Ok(Box::new(shared.backend(name)) as Box<dyn StorageBackend>)
        }
    });
    let env = Environment::open_with_backends(config, factory).expect("failed to open environment");
    let store = CrawlStore::from_environment(env).expect("failed to open crawl store");
    (store, faults)
}
