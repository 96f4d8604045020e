//! Crawl statistics.

use crate::error::CoreResult;
use crate::policy::ErrorPolicy;
use crate::scope::DurabilityScope;
use crate::store::Database;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pages handed to the frontier.
pub const SCHEDULED_PAGES: &str = "Scheduled-Pages";

/// Pages acknowledged as processed.
pub const PROCESSED_PAGES: &str = "Processed-Pages";

/// Named `i64` counters, kept in memory and, for resumable crawls, in the
/// statistics table.
pub struct CrawlCounters {
    db: Arc<Database>,
    policy: Arc<ErrorPolicy>,
    persist: bool,
    values: Mutex<BTreeMap<String, i64>>,
}

impl CrawlCounters {
    /// Opens the counters, reloading persisted values when `resumable`.
    pub fn open(db: Arc<Database>, policy: Arc<ErrorPolicy>, resumable: bool) -> CoreResult<Self> {
        let mut values = BTreeMap::new();
        values.insert(SCHEDULED_PAGES.to_string(), 0);
        values.insert(PROCESSED_PAGES.to_string(), 0);
        if resumable {
            values.extend(db.list_counters()?);
        }

        Ok(Self {
            db,
            policy,
            persist: resumable,
            values: Mutex::new(values),
        })
    }

    /// Adds `delta` to a counter and returns the new value.
    ///
    /// With a halting policy a failed write leaves the counter unchanged.
    pub fn increment(&self, name: &str, delta: i64) -> CoreResult<i64> {
        let mut values = self.values.lock();
        let value = values.get(name).copied().unwrap_or(0).saturating_add(delta);

        if self.persist {
            let result = DurabilityScope::run(&self.db, |scope| scope.set_counter(name, value));
            self.policy.recover(result, (), "increment_counter")?;
        }

        values.insert(name.to_string(), value);
        Ok(value)
    }

    /// Current value; unknown counters read as 0.
    #[must_use]
    pub fn get(&self, name: &str) -> i64 {
        self.values.lock().get(name).copied().unwrap_or(0)
    }

    /// All counters, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.values.lock().clone()
    }
}

impl std::fmt::Debug for CrawlCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlCounters")
            .field("values", &*self.values.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::Environment;

    fn counters(env: &Environment, halt_on_error: bool) -> CrawlCounters {
        CrawlCounters::open(
            env.open_database("Statistics").unwrap(),
            Arc::new(ErrorPolicy::new(halt_on_error)),
            env.config().resumable,
        )
        .unwrap()
    }

    #[test]
    fn starts_with_named_counters() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let stats = counters(&env, true);
        assert_eq!(stats.snapshot().len(), 2);
        assert_eq!(stats.get(SCHEDULED_PAGES), 0);
        assert_eq!(stats.get("unknown"), 0);
    }

    #[test]
    fn increments_accumulate() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let stats = counters(&env, true);
        assert_eq!(stats.increment(PROCESSED_PAGES, 3).unwrap(), 3);
        assert_eq!(stats.increment(PROCESSED_PAGES, 2).unwrap(), 5);
        assert_eq!(stats.get(PROCESSED_PAGES), 5);
    }

    #[test]
    fn resumable_counters_reload() {
        let env = Environment::open_in_memory(Config::default().resumable(true)).unwrap();
        counters(&env, true).increment(SCHEDULED_PAGES, 7).unwrap();
        assert_eq!(counters(&env, true).get(SCHEDULED_PAGES), 7);
    }

    #[test]
    fn non_resumable_counters_stay_in_memory() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        counters(&env, true).increment(SCHEDULED_PAGES, 7).unwrap();
        assert_eq!(counters(&env, true).get(SCHEDULED_PAGES), 0);
        assert!(env
            .open_database("Statistics")
            .unwrap()
            .list_counters()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn halting_failure_keeps_old_value() {
        let env = Environment::open_in_memory(Config::default().resumable(true)).unwrap();
        let stats = counters(&env, true);
        stats.increment(SCHEDULED_PAGES, 1).unwrap();
        env.close().unwrap();

        assert!(stats.increment(SCHEDULED_PAGES, 1).is_err());
        assert_eq!(stats.get(SCHEDULED_PAGES), 1);
    }

    #[test]
    fn degraded_failure_counts_in_memory() {
        let env = Environment::open_in_memory(Config::default().resumable(true)).unwrap();
        let stats = counters(&env, false);
        env.close().unwrap();

        assert_eq!(stats.increment(SCHEDULED_PAGES, 1).unwrap(), 1);
    }
}
