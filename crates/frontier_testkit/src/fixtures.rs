//! Test fixtures and crawl store helpers.
//!
//! Provides stores that clean up after themselves and a shared set of
//! in-memory table logs that outlive the store, for restart tests.

use frontier_core::{BackendFactory, Candidate, Config, CrawlStore, Environment};
use frontier_storage::{InMemoryBackend, StorageBackend};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// In-memory table logs keyed by table name.
///
/// Every environment opened through [`factory`](Self::factory) writes to the
/// same buffers, so dropping a store and opening another one replays what
/// the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct SharedBackends {
    tables: Arc<Mutex<BTreeMap<String, InMemoryBackend>>>,
}

impl SharedBackends {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the log of `name`, created empty on first use.
    pub fn backend(&self, name: &str) -> InMemoryBackend {
        self.tables
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Factory for [`Environment::open_with_backends`].
    pub fn factory(&self) -> BackendFactory {
        let shared = self.clone();
        Arc::new(move |name: &str| {
            Ok(Box::new(shared.backend(name)) as Box<dyn StorageBackend>)
        })
    }

    /// Opens an environment over these logs.
    pub fn environment(&self, config: Config) -> Environment {
        Environment::open_with_backends(config, self.factory()).expect("failed to open environment")
    }

    /// Opens a crawl store over these logs.
    pub fn store(&self, config: Config) -> CrawlStore {
        CrawlStore::from_environment(self.environment(config)).expect("failed to open crawl store")
    }

    /// Current bytes of the log of `name`.
    pub fn bytes(&self, name: &str) -> Vec<u8> {
        self.backend(name).data()
    }

    /// Replaces the log of `name` with `bytes`.
    pub fn replace(&self, name: &str, bytes: Vec<u8>) {
        self.tables
            .lock()
            .insert(name.to_string(), InMemoryBackend::with_data(bytes));
    }
}

/// A crawl store with automatic cleanup.
pub struct TestStore {
    /// The store.
    pub store: CrawlStore,
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates an in-memory store.
    pub fn memory(config: Config) -> Self {
        Self {
            store: CrawlStore::open_in_memory(config).expect("failed to open in-memory store"),
            _temp_dir: None,
        }
    }

    /// Creates a store in a fresh temporary directory.
    pub fn file(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let store = CrawlStore::open(temp_dir.path(), config).expect("failed to open store");
        Self {
            store,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Directory holding the table logs, if file based.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestStore {
    type Target = CrawlStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs `f` with a resumable in-memory store.
pub fn with_memory_store<F, R>(f: F) -> R
where
    F: FnOnce(&CrawlStore) -> R,
{
    let store = TestStore::memory(Config::default().resumable(true));
    f(&store)
}

/// Runs `f` with a resumable store in a temporary directory.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&CrawlStore) -> R,
{
    let store = TestStore::file(Config::default().resumable(true));
    f(&store)
}

/// `count` distinct seed candidates on one host.
pub fn seeds(count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|i| Candidate::seed(format!("http://seed.test/{i}")))
        .collect()
}
