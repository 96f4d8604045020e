//! Environment directory management.
//!
//! ```text
//! <crawl_storage>/
//! ├─ LOCK               # Advisory lock, one process per environment
//! ├─ DocIDs.log         # URL -> doc id table
//! ├─ PendingURLsDB.log  # Work queue table
//! └─ Statistics.log     # Crawl counters
//! ```

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const LOG_EXTENSION: &str = "log";
const COMPACT_SUFFIX: &str = "compact";

/// Holds the exclusive lock on an environment directory.
///
/// The lock is released when this value is dropped.
#[derive(Debug)]
pub struct EnvironmentDir {
    path: PathBuf,
    _lock_file: File,
}

impl EnvironmentDir {
    /// Opens (and optionally creates) an environment directory.
    ///
    /// # Errors
    ///
    /// - the directory is missing and `create_if_missing` is false
    /// - the path is not a directory
    /// - another process holds the lock (`EnvironmentLocked`)
    pub fn open(path: &Path, create_if_missing: bool) -> CoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(CoreError::invalid_environment(format!(
                    "directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(CoreError::invalid_environment(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::EnvironmentLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the log backing the table `name`.
    #[must_use]
    pub fn log_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{name}.{LOG_EXTENSION}"))
    }

    /// Scratch path a compaction writes before renaming over the log.
    #[must_use]
    pub fn compact_path(&self, name: &str) -> PathBuf {
        self.path
            .join(format!("{name}.{LOG_EXTENSION}.{COMPACT_SUFFIX}"))
    }

    /// Names of the tables that have a log in this directory, sorted.
    pub fn list_logs(&self) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Makes a completed rename durable.
    pub fn sync_directory(&self) -> CoreResult<()> {
        #[cfg(unix)]
        {
            File::open(&self.path)?.sync_all()?;
        }
        Ok(())
    }
}
