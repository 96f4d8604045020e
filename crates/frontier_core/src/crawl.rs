//! One crawl's persistent state, wired together.

use crate::codec::encode_record;
use crate::config::Config;
use crate::counters::{CrawlCounters, PROCESSED_PAGES, SCHEDULED_PAGES};
use crate::error::CoreResult;
use crate::frontier::Frontier;
use crate::identity::{IdentityRegistry, Registration};
use crate::item::{Candidate, WorkItem};
use crate::policy::ErrorPolicy;
use crate::store::Environment;
use crate::types::DocId;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity table.
pub const DOC_IDS_TABLE: &str = "DocIDs";

/// Work queue table.
pub const QUEUE_TABLE: &str = "PendingURLsDB";

/// Statistics table.
pub const STATISTICS_TABLE: &str = "Statistics";

/// The frontier of one crawl: identities, queue and statistics on one
/// environment.
///
/// # Example
///
/// ```rust
/// use frontier_core::{Candidate, Config, CrawlStore};
///
/// let store = CrawlStore::open_in_memory(Config::default()).unwrap();
/// let seed = store.schedule(Candidate::seed("http://example.com/")).unwrap().unwrap();
/// assert!(store.schedule(Candidate::seed("http://example.com/")).unwrap().is_none());
///
/// let batch = store.next_batch(10).unwrap();
/// assert_eq!(batch, vec![seed]);
/// store.complete(batch.len()).unwrap();
/// assert_eq!(store.frontier().size().unwrap(), 0);
/// ```
pub struct CrawlStore {
    env: Environment,
    policy: Arc<ErrorPolicy>,
    identities: IdentityRegistry,
    frontier: Frontier,
    counters: CrawlCounters,
}

impl CrawlStore {
    /// Opens the crawl state stored in `path`.
    ///
    /// A non-resumable crawl discards whatever the directory held.
    pub fn open(path: &Path, config: Config) -> CoreResult<Self> {
        Self::from_environment(Environment::open(path, config)?)
    }

    /// Opens a crawl whose state lives in memory.
    pub fn open_in_memory(config: Config) -> CoreResult<Self> {
        Self::from_environment(Environment::open_in_memory(config)?)
    }

    /// Opens the crawl tables in an existing environment.
    pub fn from_environment(env: Environment) -> CoreResult<Self> {
        let config = env.config().clone();
        let doc_ids = env.open_database(DOC_IDS_TABLE)?;
        let queue = env.open_database(QUEUE_TABLE)?;
        let statistics = env.open_database(STATISTICS_TABLE)?;

        if !config.resumable {
            for table in [&doc_ids, &queue, &statistics] {
                table.truncate()?;
            }
        }

        let policy = Arc::new(ErrorPolicy::new(config.halt_on_error));
        let identities = IdentityRegistry::open(doc_ids, Arc::clone(&policy), config.resumable)?;
        let frontier = Frontier::new(queue, Arc::clone(&policy));
        let counters = CrawlCounters::open(statistics, Arc::clone(&policy), config.resumable)?;

        info!(
            resumable = config.resumable,
            known_urls = identities.count(),
            pending = frontier.size()?,
            "crawl store ready"
        );

        Ok(Self {
            env,
            policy,
            identities,
            frontier,
            counters,
        })
    }

    /// Identity registry.
    #[must_use]
    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// Work queue.
    #[must_use]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Statistics.
    #[must_use]
    pub fn counters(&self) -> &CrawlCounters {
        &self.counters
    }

    /// Underlying environment.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Store failures swallowed so far.
    #[must_use]
    pub fn degraded_errors(&self) -> u64 {
        self.policy.degraded_count()
    }

    /// Queues a discovered URL unless it has been seen before.
    ///
    /// The candidate is checked before its URL is registered, so a URL is
    /// never marked seen without being queued. Returns the queued item, or
    /// `None` for a known URL.
    ///
    /// A degraded store also returns `None`. That case is logged and counted
    /// in [`degraded_errors`](Self::degraded_errors); a known URL is not.
    pub fn schedule(&self, candidate: Candidate) -> CoreResult<Option<WorkItem>> {
        check(&candidate)?;

        let registration = self.identities.register(&candidate.url)?;
        if registration == Registration::FAILED {
            warn!(url = %candidate.url, "not scheduled, identity table unavailable");
            return Ok(None);
        }
        if !registration.is_new {
            return Ok(None);
        }

        let item = candidate.into_item(registration.doc_id);
        self.frontier.enqueue(&item)?;
        self.counters.increment(SCHEDULED_PAGES, 1)?;
        debug!(url = %item.url, doc_id = %item.doc_id, "scheduled");
        Ok(Some(item))
    }

    /// Queues several candidates, enqueueing the new ones as one batch.
    pub fn schedule_all(&self, candidates: Vec<Candidate>) -> CoreResult<Vec<WorkItem>> {
        for candidate in &candidates {
            check(candidate)?;
        }

        let mut items = Vec::new();
        for candidate in candidates {
            let registration = self.identities.register(&candidate.url)?;
            if registration.is_new {
                items.push(candidate.into_item(registration.doc_id));
            }
        }

        if !items.is_empty() {
            self.frontier.enqueue_all(&items)?;
            self.counters
                .increment(SCHEDULED_PAGES, items.len() as i64)?;
        }
        Ok(items)
    }

    /// Next items to crawl, still queued until [`complete`](Self::complete).
    pub fn next_batch(&self, max_count: usize) -> CoreResult<Vec<WorkItem>> {
        self.frontier.dequeue_batch(max_count)
    }

    /// Acknowledges the `count` first items of the queue as processed.
    pub fn complete(&self, count: usize) -> CoreResult<usize> {
        let removed = self.frontier.acknowledge(count)?;
        if removed > 0 {
            self.counters.increment(PROCESSED_PAGES, removed as i64)?;
        }
        Ok(removed)
    }

    /// Pushes buffered writes of every table to disk.
    pub fn sync(&self) -> CoreResult<()> {
        self.policy.recover(self.env.sync(), (), "sync")
    }

    /// Flushes and closes every table.
    pub fn close(&self) -> CoreResult<()> {
        info!(
            known_urls = self.identities.count(),
            degraded_errors = self.degraded_errors(),
            "closing crawl store"
        );
        self.env.close()
    }
}

impl std::fmt::Debug for CrawlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlStore")
            .field("env", &self.env)
            .field("identities", &self.identities)
            .finish_non_exhaustive()
    }
}

fn check(candidate: &Candidate) -> CoreResult<()> {
    let probe = candidate.clone().into_item(DocId::new(1));
    probe.validate()?;
    encode_record(&probe)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tempfile::tempdir;

    #[test]
    fn schedule_queues_new_urls_once() {
        let store = CrawlStore::open_in_memory(Config::default()).unwrap();
        let seed = store
            .schedule(Candidate::seed("http://a.com/"))
            .unwrap()
            .unwrap();
        assert_eq!(seed.doc_id, DocId::new(1));
        assert!(store.schedule(Candidate::seed("http://a.com/")).unwrap().is_none());

        let link = store
            .schedule(Candidate::link(&seed, "http://a.com/b", "b"))
            .unwrap()
            .unwrap();
        assert_eq!(link.doc_id, DocId::new(2));
        assert_eq!(link.depth, 1);
        assert_eq!(store.counters().get(SCHEDULED_PAGES), 2);
        assert_eq!(store.frontier().size().unwrap(), 2);
    }

    #[test]
    fn invalid_candidate_is_not_marked_seen() {
        let store = CrawlStore::open_in_memory(Config::default()).unwrap();
        let bad = Candidate::seed("http://a.com/").with_priority(-1);
        assert!(matches!(
            store.schedule(bad),
            Err(CoreError::InvalidWorkItem { .. })
        ));
        assert!(!store.identities().is_seen("http://a.com/").unwrap());

        let mut long = Candidate::seed("http://a.com/");
        long.anchor = "x".repeat(70_000);
        assert!(store.schedule(long).is_err());
        assert!(!store.identities().is_seen("http://a.com/").unwrap());
    }

    #[test]
    fn schedule_all_skips_known() {
        let store = CrawlStore::open_in_memory(Config::default().resumable(true)).unwrap();
        store.schedule(Candidate::seed("http://a.com/1")).unwrap();

        let items = store
            .schedule_all(vec![
                Candidate::seed("http://a.com/1"),
                Candidate::seed("http://a.com/2"),
                Candidate::seed("http://a.com/3"),
            ])
            .unwrap();
        let ids: Vec<i32> = items.iter().map(|i| i.doc_id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(store.counters().get(SCHEDULED_PAGES), 3);
    }

    #[test]
    fn complete_counts_processed() {
        let store = CrawlStore::open_in_memory(Config::default()).unwrap();
        for i in 0..5 {
            store
                .schedule(Candidate::seed(format!("http://a.com/{i}")))
                .unwrap();
        }

        let batch = store.next_batch(3).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(store.complete(batch.len()).unwrap(), 3);
        assert_eq!(store.counters().get(PROCESSED_PAGES), 3);
        assert_eq!(store.frontier().size().unwrap(), 2);
    }

    #[test]
    fn resumable_store_survives_restart() {
        let temp = tempdir().unwrap();
        let config = Config::default().resumable(true);
        {
            let store = CrawlStore::open(temp.path(), config.clone()).unwrap();
            for i in 0..4 {
                store
                    .schedule(Candidate::seed(format!("http://a.com/{i}")))
                    .unwrap();
            }
            store.complete(1).unwrap();
            store.close().unwrap();
        }

        let store = CrawlStore::open(temp.path(), config).unwrap();
        assert_eq!(store.identities().count(), 4);
        assert_eq!(store.frontier().size().unwrap(), 3);
        assert_eq!(store.counters().get(SCHEDULED_PAGES), 4);
        assert_eq!(store.counters().get(PROCESSED_PAGES), 1);

        let next = store
            .schedule(Candidate::seed("http://a.com/new"))
            .unwrap()
            .unwrap();
        assert_eq!(next.doc_id, DocId::new(5));
    }

    #[test]
    fn non_resumable_store_starts_empty() {
        let temp = tempdir().unwrap();
        {
            let store = CrawlStore::open(temp.path(), Config::default()).unwrap();
            store.schedule(Candidate::seed("http://a.com/")).unwrap();
            store.close().unwrap();
        }

        let store = CrawlStore::open(temp.path(), Config::default()).unwrap();
        assert_eq!(store.identities().count(), 0);
        assert_eq!(store.frontier().size().unwrap(), 0);
        assert!(!store.identities().is_seen("http://a.com/").unwrap());
    }

    #[test]
    fn degraded_store_keeps_going_after_close() {
        let store = CrawlStore::open_in_memory(Config::default()).unwrap();
        store.schedule(Candidate::seed("http://a.com/")).unwrap();
        store.close().unwrap();

        assert!(store.schedule(Candidate::seed("http://b.com/")).unwrap().is_none());
        assert!(store.next_batch(10).unwrap().is_empty());
        assert_eq!(store.complete(1).unwrap(), 0);
        store.sync().unwrap();
        assert!(store.degraded_errors() >= 3);
    }

    #[test]
    fn degraded_schedule_is_counted_but_known_url_is_not() {
        let store = CrawlStore::open_in_memory(Config::default()).unwrap();
        store.schedule(Candidate::seed("http://a.com/")).unwrap();

        assert!(store.schedule(Candidate::seed("http://a.com/")).unwrap().is_none());
        assert_eq!(store.degraded_errors(), 0);

        store.close().unwrap();
        assert!(store.schedule(Candidate::seed("http://b.com/")).unwrap().is_none());
        assert_eq!(store.degraded_errors(), 1);
    }

    #[test]
    fn halting_store_fails_after_close() {
        let store = CrawlStore::open_in_memory(Config::default().halt_on_error(true)).unwrap();
        store.close().unwrap();
        assert!(store.schedule(Candidate::seed("http://a.com/")).is_err());
        assert!(store.next_batch(1).is_err());
    }
}
