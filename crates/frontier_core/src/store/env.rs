//! Environments: a set of named tables opened together.

use crate::config::{Config, DatabaseConfig};
use crate::dir::EnvironmentDir;
use crate::error::{CoreError, CoreResult};
use crate::store::database::Database;
use frontier_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Produces the backend for a table by name.
pub type BackendFactory = Arc<dyn Fn(&str) -> CoreResult<Box<dyn StorageBackend>> + Send + Sync>;

enum Layout {
    Directory(EnvironmentDir),
    Custom(BackendFactory),
}

/// One embedded store per crawl.
///
/// Tables are opened lazily by name and shared: asking twice for the same
/// name returns the same [`Arc<Database>`].
///
/// # Example
///
/// ```rust
/// use frontier_core::{Config, Environment};
///
/// let env = Environment::open_in_memory(Config::default()).unwrap();
/// let ids = env.open_database("DocIDs").unwrap();
/// ids.put(b"http://a.com/", &1i32.to_be_bytes()).unwrap();
/// assert_eq!(ids.count().unwrap(), 1);
/// ```
pub struct Environment {
    config: Config,
    layout: Layout,
    databases: Mutex<BTreeMap<String, Arc<Database>>>,
    closed: AtomicBool,
}

impl Environment {
    /// Opens an environment in `path`, taking the directory lock.
    ///
    /// # Errors
    ///
    /// `EnvironmentLocked` if another process has the directory open, or
    /// `InvalidEnvironment` if it is missing and `create_if_missing` is off.
    pub fn open(path: &Path, config: Config) -> CoreResult<Self> {
        let dir = EnvironmentDir::open(path, config.create_if_missing)?;
        info!(path = %path.display(), resumable = config.resumable, "environment opened");
        Ok(Self::with_layout(config, Layout::Directory(dir)))
    }

    /// Opens an environment whose tables live in memory.
    pub fn open_in_memory(config: Config) -> CoreResult<Self> {
        let factory: BackendFactory =
            Arc::new(|_: &str| Ok(Box::new(InMemoryBackend::new()) as Box<dyn StorageBackend>));
        Ok(Self::with_layout(config, Layout::Custom(factory)))
    }

    /// Opens an environment whose table backends come from `factory`.
    ///
    /// Handing out clones of the same [`InMemoryBackend`] across two
    /// environments simulates a restart.
    pub fn open_with_backends(config: Config, factory: BackendFactory) -> CoreResult<Self> {
        Ok(Self::with_layout(config, Layout::Custom(factory)))
    }

    fn with_layout(config: Config, layout: Layout) -> Self {
        Self {
            config,
            layout,
            databases: Mutex::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Configuration the environment was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory of an on-disk environment.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.layout {
            Layout::Directory(dir) => Some(dir.path()),
            Layout::Custom(_) => None,
        }
    }

    /// Opens a table with the durability implied by the crawl mode.
    pub fn open_database(&self, name: &str) -> CoreResult<Arc<Database>> {
        self.open_database_with(name, self.config.database_config())
    }

    /// Opens a table with explicit durability settings.
    ///
    /// Settings only apply on first open; later calls return the cached
    /// handle as is.
    pub fn open_database_with(&self, name: &str, config: DatabaseConfig) -> CoreResult<Arc<Database>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CoreError::invalid_operation("environment is closed"));
        }

        let mut databases = self.databases.lock();
        if let Some(db) = databases.get(name) {
            return Ok(Arc::clone(db));
        }

        let backend = self.backend_for(name)?;
        let db = Arc::new(Database::open(name, backend, config, &self.config)?);
        databases.insert(name.to_string(), Arc::clone(&db));
        Ok(db)
    }

    fn backend_for(&self, name: &str) -> CoreResult<Box<dyn StorageBackend>> {
        match &self.layout {
            Layout::Directory(dir) => Ok(Box::new(FileBackend::open(&dir.log_path(name))?)),
            Layout::Custom(factory) => factory(name),
        }
    }

    /// Names of the opened tables plus, on disk, every table with a log.
    pub fn database_names(&self) -> CoreResult<Vec<String>> {
        let mut names: Vec<String> = self.databases.lock().keys().cloned().collect();
        if let Layout::Directory(dir) = &self.layout {
            for name in dir.list_logs()? {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Rewrites a table's log as a snapshot of its live state.
    ///
    /// On disk the snapshot goes to a scratch file that is synced and then
    /// renamed over the live log. Returns the log sizes before and after.
    pub fn compact(&self, name: &str) -> CoreResult<(u64, u64)> {
        let db = self.open_database(name)?;
        match &self.layout {
            Layout::Directory(dir) => db.compact_with(|snapshot| {
                let scratch = dir.compact_path(name);
                let live = dir.log_path(name);
                {
                    let mut file = FileBackend::create(&scratch)?;
                    file.append(snapshot)?;
                    file.sync()?;
                }
                fs::rename(&scratch, &live)?;
                dir.sync_directory()?;
                Ok(Some(Box::new(FileBackend::open(&live)?) as Box<dyn StorageBackend>))
            }),
            Layout::Custom(_) => db.compact_with(|_| Ok(None)),
        }
    }

    /// Flushes and syncs every open table.
    pub fn sync(&self) -> CoreResult<()> {
        for db in self.databases.lock().values() {
            if !db.is_closed() {
                db.sync()?;
            }
        }
        Ok(())
    }

    /// Closes every open table. The directory lock is released when the
    /// environment is dropped.
    pub fn close(&self) -> CoreResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let mut first_error = None;
        for db in self.databases.lock().values() {
            if let Err(err) = db.close() {
                first_error.get_or_insert(err);
            }
        }
        info!("environment closed");
        first_error.map_or(Ok(()), Err)
    }

    /// Returns `true` once [`Environment::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("path", &self.path())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
