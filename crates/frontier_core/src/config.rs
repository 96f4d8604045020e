//! Crawl store configuration.

use std::time::Duration;

/// Configuration consumed when opening a crawl environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether the crawl survives restarts.
    ///
    /// Resumable crawls write through transactions and recover the doc id
    /// sequence, the queue and the statistics on open. Non-resumable crawls
    /// buffer writes and start from empty tables.
    pub resumable: bool,

    /// Whether store failures halt the crawl (fatal) or are logged and
    /// replaced by sentinel values (degraded).
    pub halt_on_error: bool,

    /// How long a writer waits for a contended table.
    pub lock_timeout: Duration,

    /// Whether transaction commits fsync the table log.
    pub sync_on_commit: bool,

    /// Buffered log bytes that trigger a flush in deferred-write tables.
    pub deferred_flush_threshold: usize,

    /// Whether to create the environment directory if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resumable: false,
            halt_on_error: false,
            lock_timeout: Duration::from_millis(500),
            sync_on_commit: true,
            deferred_flush_threshold: 1024 * 1024, // 1 MiB
            create_if_missing: true,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the crawl is resumable.
    #[must_use]
    pub const fn resumable(mut self, value: bool) -> Self {
        self.resumable = value;
        self
    }

    /// Sets whether store failures halt the crawl.
    #[must_use]
    pub const fn halt_on_error(mut self, value: bool) -> Self {
        self.halt_on_error = value;
        self
    }

    /// Sets the writer lock-wait timeout.
    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets whether commits fsync the log.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets the deferred-write flush threshold in bytes.
    #[must_use]
    pub const fn deferred_flush_threshold(mut self, bytes: usize) -> Self {
        self.deferred_flush_threshold = bytes;
        self
    }

    /// Sets whether to create a missing environment directory.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Table settings implied by the crawl mode.
    #[must_use]
    pub const fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            transactional: self.resumable,
            deferred_write: !self.resumable,
        }
    }
}

/// Per-table durability settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `begin_transaction` hands out transactions instead of `None`.
    pub transactional: bool,
    /// Log bytes are buffered in memory and flushed in batches.
    pub deferred_write: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            transactional: false,
            deferred_write: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(!config.resumable);
        assert!(!config.halt_on_error);
        assert_eq!(config.lock_timeout, Duration::from_millis(500));
        assert!(config.create_if_missing);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .resumable(true)
            .halt_on_error(true)
            .sync_on_commit(false)
            .deferred_flush_threshold(4096);

        assert!(config.resumable);
        assert!(config.halt_on_error);
        assert!(!config.sync_on_commit);
        assert_eq!(config.deferred_flush_threshold, 4096);
    }

    #[test]
    fn crawl_mode_selects_table_durability() {
        let resumable = Config::new().resumable(true).database_config();
        assert!(resumable.transactional);
        assert!(!resumable.deferred_write);

        let throwaway = Config::new().database_config();
        assert!(!throwaway.transactional);
        assert!(throwaway.deferred_write);
    }
}
