//! The durable, priority-ordered work queue.

use crate::codec::{decode_record, encode_record, SortKey};
use crate::error::CoreResult;
use crate::item::WorkItem;
use crate::policy::ErrorPolicy;
use crate::scope::DurabilityScope;
use crate::store::Database;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pending work items keyed by [`SortKey`].
///
/// A scan in key order yields items by priority, then capped depth, then
/// doc id. `enqueue`, `dequeue_batch` and `acknowledge` serialize on one
/// mutex of their own; the identity registry does not share it.
///
/// [`dequeue_batch`](Self::dequeue_batch) does not remove anything and
/// [`acknowledge`](Self::acknowledge) deletes whatever is smallest at the
/// time it runs. A crash between the two re-delivers the batch, so delivery
/// is at least once.
pub struct Frontier {
    db: Arc<Database>,
    policy: Arc<ErrorPolicy>,
    mutex: Mutex<()>,
}

impl Frontier {
    /// Creates a frontier over the queue table.
    pub fn new(db: Arc<Database>, policy: Arc<ErrorPolicy>) -> Self {
        Self {
            db,
            policy,
            mutex: Mutex::new(()),
        }
    }

    /// Adds an item. An item with the same key is overwritten.
    ///
    /// # Errors
    ///
    /// `InvalidWorkItem` and over-long strings are returned whatever the
    /// policy; store failures follow it.
    pub fn enqueue(&self, item: &WorkItem) -> CoreResult<()> {
        let (key, record) = prepare(item)?;
        let _guard = self.mutex.lock();
        let result = DurabilityScope::run(&self.db, |scope| scope.put(key.as_bytes(), &record));
        self.policy.recover(result, (), "enqueue")
    }

    /// Adds a batch in one durability scope: all of it or, on a
    /// transactional table, none of it.
    ///
    /// Every item is validated and encoded before the store is touched.
    pub fn enqueue_all(&self, items: &[WorkItem]) -> CoreResult<()> {
        let prepared = items.iter().map(prepare).collect::<CoreResult<Vec<_>>>()?;
        if prepared.is_empty() {
            return Ok(());
        }

        let _guard = self.mutex.lock();
        let result = DurabilityScope::run(&self.db, |scope| {
            for (key, record) in &prepared {
                scope.put(key.as_bytes(), record)?;
            }
            Ok(())
        });
        debug!(items = prepared.len(), "batch enqueued");
        self.policy.recover(result, (), "enqueue_all")
    }

    /// Returns up to `max_count` items in crawl order without removing them.
    ///
    /// Empty and undecodable records are skipped. Degraded: empty.
    pub fn dequeue_batch(&self, max_count: usize) -> CoreResult<Vec<WorkItem>> {
        let _guard = self.mutex.lock();
        let result = self.scan(max_count);
        self.policy.recover(result, Vec::new(), "dequeue_batch")
    }

    /// Removes the `count` smallest entries. Returns how many were removed.
    ///
    /// Degraded: 0.
    pub fn acknowledge(&self, count: usize) -> CoreResult<usize> {
        if count == 0 {
            return Ok(0);
        }
        let _guard = self.mutex.lock();
        let result = DurabilityScope::run(&self.db, |scope| scope.delete_first_n(count));
        self.policy.recover(result, 0, "acknowledge")
    }

    /// Pending entries, counted in the store. Degraded: 0.
    pub fn size(&self) -> CoreResult<i64> {
        let result = self
            .db
            .count()
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        self.policy.recover(result, 0, "size")
    }

    fn scan(&self, max_count: usize) -> CoreResult<Vec<WorkItem>> {
        let mut items = Vec::with_capacity(max_count.min(1024));
        if max_count == 0 {
            return Ok(items);
        }

        self.db.scan_while(|key, value| {
            match decode_record(value) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => debug!(key = ?key, "empty queue record skipped"),
                Err(err) => warn!(key = ?key, error = %err, "undecodable queue record skipped"),
            }
            items.len() < max_count
        })?;
        Ok(items)
    }
}

fn prepare(item: &WorkItem) -> CoreResult<(SortKey, Vec<u8>)> {
    item.validate()?;
    Ok((item.sort_key(), encode_record(item)?))
}

impl std::fmt::Debug for Frontier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontier")
            .field("table", &self.db.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_key, RecordError};
    use crate::config::Config;
    use crate::error::CoreError;
    use crate::store::Environment;
    use crate::types::DocId;

    fn frontier(env: &Environment, halt_on_error: bool) -> Frontier {
        Frontier::new(
            env.open_database("PendingURLsDB").unwrap(),
            Arc::new(ErrorPolicy::new(halt_on_error)),
        )
    }

    fn item(priority: i8, depth: i16, doc_id: i32) -> WorkItem {
        WorkItem::new(format!("http://a.com/{doc_id}"), DocId::new(doc_id))
            .with_priority(priority)
            .with_depth(depth)
    }

    fn ids(items: &[WorkItem]) -> Vec<i32> {
        items.iter().map(|i| i.doc_id.as_i32()).collect()
    }

    #[test]
    fn scenario_priority_then_depth() {
        for resumable in [false, true] {
            let env = Environment::open_in_memory(Config::default().resumable(resumable)).unwrap();
            let queue = frontier(&env, true);
            queue.enqueue(&item(1, 0, 5)).unwrap();
            queue.enqueue(&item(0, 2, 3)).unwrap();
            queue.enqueue(&item(0, 0, 1)).unwrap();

            assert_eq!(ids(&queue.dequeue_batch(3).unwrap()), vec![1, 3, 5]);
        }
    }

    #[test]
    fn dequeue_does_not_remove() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let queue = frontier(&env, true);
        queue.enqueue(&item(0, 0, 1)).unwrap();

        assert_eq!(queue.dequeue_batch(10).unwrap().len(), 1);
        assert_eq!(queue.dequeue_batch(10).unwrap().len(), 1);
        assert_eq!(queue.size().unwrap(), 1);
        assert!(queue.dequeue_batch(0).unwrap().is_empty());
    }

    #[test]
    fn acknowledge_removes_smallest() {
        let env = Environment::open_in_memory(Config::default().resumable(true)).unwrap();
        let queue = frontier(&env, true);
        for id in [4, 2, 5, 1, 3] {
            queue.enqueue(&item(0, 0, id)).unwrap();
        }

        assert_eq!(queue.acknowledge(2).unwrap(), 2);
        assert_eq!(queue.size().unwrap(), 3);
        assert_eq!(ids(&queue.dequeue_batch(10).unwrap()), vec![3, 4, 5]);
        assert_eq!(queue.acknowledge(10).unwrap(), 3);
        assert_eq!(queue.acknowledge(1).unwrap(), 0);
    }

    #[test]
    fn enqueue_all_is_atomic_on_rejection() {
        let env = Environment::open_in_memory(Config::default().resumable(true)).unwrap();
        let queue = frontier(&env, false);
        let batch = vec![item(0, 0, 1), item(0, 0, 0)];

        assert!(matches!(
            queue.enqueue_all(&batch),
            Err(CoreError::InvalidWorkItem { .. })
        ));
        assert_eq!(queue.size().unwrap(), 0);

        queue.enqueue_all(&[item(0, 0, 1), item(0, 1, 2)]).unwrap();
        assert_eq!(queue.size().unwrap(), 2);
        queue.enqueue_all(&[]).unwrap();
    }

    #[test]
    fn overlong_strings_are_rejected() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let queue = frontier(&env, false);
        let long = item(0, 0, 1).with_anchor("a".repeat(70_000));
        assert!(matches!(
            queue.enqueue(&long),
            Err(CoreError::Record(RecordError::StringTooLong { field: "anchor", .. }))
        ));
    }

    #[test]
    fn corrupt_and_empty_records_are_skipped() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let db = env.open_database("PendingURLsDB").unwrap();
        let queue = frontier(&env, true);

        queue.enqueue(&item(0, 0, 3)).unwrap();
        db.put(encode_key(0, 0, DocId::new(1)).as_bytes(), b"").unwrap();
        db.put(encode_key(0, 0, DocId::new(2)).as_bytes(), &[0, 9, b'x'])
            .unwrap();
        queue.enqueue(&item(0, 0, 4)).unwrap();

        assert_eq!(ids(&queue.dequeue_batch(2).unwrap()), vec![3, 4]);
        assert_eq!(queue.size().unwrap(), 4);
    }

    #[test]
    fn same_item_requeued_with_new_priority_is_a_new_entry() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let queue = frontier(&env, true);
        queue.enqueue(&item(5, 0, 1)).unwrap();
        queue.enqueue(&item(0, 0, 1)).unwrap();
        queue.enqueue(&item(0, 0, 1)).unwrap();
        assert_eq!(queue.size().unwrap(), 2);
    }

    #[test]
    fn degraded_after_close() {
        let env = Environment::open_in_memory(Config::default()).unwrap();
        let queue = frontier(&env, false);
        queue.enqueue(&item(0, 0, 1)).unwrap();
        env.close().unwrap();

        queue.enqueue(&item(0, 0, 2)).unwrap();
        assert!(queue.dequeue_batch(5).unwrap().is_empty());
        assert_eq!(queue.acknowledge(1).unwrap(), 0);
        assert_eq!(queue.size().unwrap(), 0);
    }

    #[test]
    fn fatal_after_close() {
        let env = Environment::open_in_memory(Config::default().resumable(true)).unwrap();
        let queue = frontier(&env, true);
        env.close().unwrap();

        assert!(queue.enqueue(&item(0, 0, 1)).is_err());
        assert!(queue.dequeue_batch(1).is_err());
        assert!(queue.size().is_err());
    }
}
