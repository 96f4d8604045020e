//! Table transactions.

use crate::error::CoreResult;
use crate::log::LogRecord;
use crate::store::database::Database;
use crate::types::TransactionId;
use parking_lot::MutexGuard;
use std::collections::BTreeMap;
use std::iter::Peekable;
use tracing::debug;

/// A write transaction on one [`Database`].
///
/// Writes are staged in memory and reads through the transaction see them.
/// [`Transaction::commit`] appends `Begin, writes..., Commit` to the log in a
/// single append and then publishes the writes. Dropping the transaction
/// without committing discards everything.
///
/// The table's writer lock is held for the transaction's lifetime.
pub struct Transaction<'a> {
    db: &'a Database,
    txid: TransactionId,
    _guard: MutexGuard<'a, ()>,
    records: Vec<LogRecord>,
    /// Staged row changes; `None` marks a delete.
    rows: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    counters: BTreeMap<String, i64>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(db: &'a Database, txid: TransactionId, guard: MutexGuard<'a, ()>) -> Self {
        Self {
            db,
            txid,
            _guard: guard,
            records: Vec::new(),
            rows: BTreeMap::new(),
            counters: BTreeMap::new(),
        }
    }

    /// Transaction id.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.txid
    }

    /// Number of staged writes.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.records.len()
    }

    /// Reads a row, staged writes first.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.rows.get(key) {
            Some(staged) => staged.clone(),
            None => self.db.state().rows.get(key).cloned(),
        }
    }

    /// Returns `true` if the row exists in this transaction's view.
    pub fn contains(&self, key: &[u8]) -> bool {
        match self.rows.get(key) {
            Some(staged) => staged.is_some(),
            None => self.db.state().rows.contains_key(key),
        }
    }

    /// Reads a counter in this transaction's view; absent reads as 0.
    pub fn counter(&self, name: &str) -> i64 {
        self.counters
            .get(name)
            .copied()
            .or_else(|| self.db.state().counters.get(name).copied())
            .unwrap_or(0)
    }

    /// Stages a row insert or overwrite.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.rows.insert(key.to_vec(), Some(value.to_vec()));
        self.records.push(LogRecord::Put {
            txid: self.txid,
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// Stages a row delete. Returns `true` if the row existed.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        if !self.contains(key) {
            return false;
        }
        self.stage_delete(key.to_vec());
        true
    }

    /// Stages deletes of the first `n` rows of this transaction's view.
    pub fn delete_first_n(&mut self, n: usize) -> usize {
        let keys = {
            let state = self.db.state();
            first_keys(&state.rows, &self.rows, n)
        };
        let removed = keys.len();
        for key in keys {
            self.stage_delete(key);
        }
        removed
    }

    /// Stages a counter upsert.
    pub fn set_counter(&mut self, name: &str, value: i64) {
        self.counters.insert(name.to_string(), value);
        self.records.push(LogRecord::Counter {
            txid: self.txid,
            name: name.to_string(),
            value,
        });
    }

    /// Writes and publishes the staged changes.
    ///
    /// # Errors
    ///
    /// On failure nothing is published and the log is left as it was.
    pub fn commit(mut self) -> CoreResult<()> {
        let records = std::mem::take(&mut self.records);
        self.db.commit_records(self.txid, records)
    }

    /// Discards the staged changes.
    pub fn rollback(self) {}

    fn stage_delete(&mut self, key: Vec<u8>) {
        self.records.push(LogRecord::Delete {
            txid: self.txid,
            key: key.clone(),
        });
        self.rows.insert(key, None);
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.records.is_empty() {
            debug!(
                database = self.db.name(),
                txid = %self.txid,
                discarded = self.records.len(),
                "transaction rolled back"
            );
        }
    }
}

/// The first `n` keys of `committed` overlaid with `staged`, in key order.
fn first_keys(
    committed: &BTreeMap<Vec<u8>, Vec<u8>>,
    staged: &BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    n: usize,
) -> Vec<Vec<u8>> {
    let mut base = committed.keys().peekable();
    let mut over = staged.iter().peekable();
    let mut keys = Vec::with_capacity(n.min(committed.len() + staged.len()));

    while keys.len() < n {
        match next_source(&mut base, &mut over) {
            Some(Source::Committed) => {
                if let Some(key) = base.next() {
                    keys.push(key.clone());
                }
            }
            Some(Source::Staged) => {
                if let Some((key, Some(_))) = over.next() {
                    keys.push(key.clone());
                }
            }
            Some(Source::Both) => {
                base.next();
                if let Some((key, Some(_))) = over.next() {
                    keys.push(key.clone());
                }
            }
            None => break,
        }
    }
    keys
}

enum Source {
    Committed,
    Staged,
    Both,
}

fn next_source<'k, B, S>(base: &mut Peekable<B>, over: &mut Peekable<S>) -> Option<Source>
where
    B: Iterator<Item = &'k Vec<u8>>,
    S: Iterator<Item = (&'k Vec<u8>, &'k Option<Vec<u8>>)>,
{
    match (base.peek(), over.peek()) {
        (None, None) => None,
        (Some(_), None) => Some(Source::Committed),
        (None, Some(_)) => Some(Source::Staged),
        (Some(b), Some((s, _))) => Some(match (*b).cmp(*s) {
            std::cmp::Ordering::Less => Source::Committed,
            std::cmp::Ordering::Greater => Source::Staged,
            std::cmp::Ordering::Equal => Source::Both,
        }),
    }
}
