//! Commit/rollback scope over one table.

use crate::error::{CoreError, CoreResult};
use crate::store::{Database, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeState {
    Active,
    Committed,
    RolledBack,
}

/// A unit of work on one table.
///
/// On a transactional table the scope wraps a [`Transaction`]: writes are
/// staged and published by [`commit`](Self::commit). On any other table it
/// carries no transaction and each write auto-commits as it is made, so
/// [`rollback`](Self::rollback) has nothing to undo.
///
/// Only the first of `commit` and `rollback` takes effect; later calls are
/// no-ops. Dropping an active scope rolls it back.
pub struct DurabilityScope<'a> {
    db: &'a Database,
    txn: Option<Transaction<'a>>,
    state: ScopeState,
}

impl<'a> DurabilityScope<'a> {
    /// Opens a scope, starting a transaction when the table supports them.
    pub fn begin(db: &'a Database) -> CoreResult<Self> {
        Ok(Self {
            db,
            txn: db.begin_transaction()?,
            state: ScopeState::Active,
        })
    }

    /// Runs `work` in a scope, committing on `Ok` and rolling back on `Err`.
    pub fn run<T, F>(db: &'a Database, work: F) -> CoreResult<T>
    where
        F: FnOnce(&mut DurabilityScope<'a>) -> CoreResult<T>,
    {
        let mut scope = Self::begin(db)?;
        match work(&mut scope) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                scope.rollback();
                Err(err)
            }
        }
    }

    /// Returns `true` if writes are staged in a transaction.
    #[must_use]
    pub fn is_transactional(&self) -> bool {
        self.txn.is_some()
    }

    /// Returns `true` until commit or rollback.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == ScopeState::Active
    }

    /// Reads a row as this scope sees it.
    pub fn get(&self, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
        match &self.txn {
            Some(txn) => Ok(txn.get(key)),
            None => self.db.get(key),
        }
    }

    /// Reads a counter as this scope sees it.
    pub fn counter(&self, name: &str) -> CoreResult<i64> {
        match &self.txn {
            Some(txn) => Ok(txn.counter(name)),
            None => self.db.counter(name),
        }
    }

    /// Inserts or overwrites a row.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        self.ensure_active()?;
        match &mut self.txn {
            Some(txn) => {
                txn.put(key, value);
                Ok(())
            }
            None => self.db.put(key, value),
        }
    }

    /// Removes a row. Returns `true` if it existed.
    pub fn delete(&mut self, key: &[u8]) -> CoreResult<bool> {
        self.ensure_active()?;
        match &mut self.txn {
            Some(txn) => Ok(txn.delete(key)),
            None => self.db.delete(key),
        }
    }

    /// Removes the first `n` rows in key order.
    pub fn delete_first_n(&mut self, n: usize) -> CoreResult<usize> {
        self.ensure_active()?;
        match &mut self.txn {
            Some(txn) => Ok(txn.delete_first_n(n)),
            None => self.db.delete_first_n(n),
        }
    }

    /// Upserts a counter.
    pub fn set_counter(&mut self, name: &str, value: i64) -> CoreResult<()> {
        self.ensure_active()?;
        match &mut self.txn {
            Some(txn) => {
                txn.set_counter(name, value);
                Ok(())
            }
            None => self.db.set_counter(name, value),
        }
    }

    /// Publishes the scope's writes.
    ///
    /// A failed commit leaves the scope rolled back.
    pub fn commit(&mut self) -> CoreResult<()> {
        if self.state != ScopeState::Active {
            return Ok(());
        }
        match self.txn.take() {
            Some(txn) => match txn.commit() {
                Ok(()) => self.state = ScopeState::Committed,
                Err(err) => {
                    self.state = ScopeState::RolledBack;
                    return Err(err);
                }
            },
            None => self.state = ScopeState::Committed,
        }
        Ok(())
    }

    /// Discards the scope's staged writes.
    pub fn rollback(&mut self) {
        if self.state != ScopeState::Active {
            return;
        }
        if let Some(txn) = self.txn.take() {
            txn.rollback();
        }
        self.state = ScopeState::RolledBack;
    }

    fn ensure_active(&self) -> CoreResult<()> {
        if self.state == ScopeState::Active {
            Ok(())
        } else {
            Err(CoreError::invalid_operation(format!(
                "scope on {} already finished",
                self.db.name()
            )))
        }
    }
}

impl Drop for DurabilityScope<'_> {
    fn drop(&mut self) {
        self.rollback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatabaseConfig};
    use frontier_storage::InMemoryBackend;

    fn open(transactional: bool) -> Database {
        Database::open(
            "t",
            Box::new(InMemoryBackend::new()),
            DatabaseConfig {
                transactional,
                deferred_write: !transactional,
            },
            &Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn commit_publishes() {
        let db = open(true);
        let mut scope = DurabilityScope::begin(&db).unwrap();
        assert!(scope.is_transactional());
        scope.put(b"k", b"v").unwrap();
        assert_eq!(scope.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(db.get(b"k").unwrap(), None);

        scope.commit().unwrap();
        assert!(!scope.is_active());
        assert_eq!(db.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn rollback_after_commit_is_noop() {
        let db = open(true);
        let mut scope = DurabilityScope::begin(&db).unwrap();
        scope.put(b"k", b"v").unwrap();
        scope.commit().unwrap();
        scope.rollback();
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn commit_after_rollback_is_noop() {
        let db = open(true);
        let mut scope = DurabilityScope::begin(&db).unwrap();
        scope.put(b"k", b"v").unwrap();
        scope.rollback();
        scope.commit().unwrap();
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn writes_after_finish_fail() {
        let db = open(true);
        let mut scope = DurabilityScope::begin(&db).unwrap();
        scope.commit().unwrap();
        assert!(matches!(
            scope.put(b"k", b"v"),
            Err(CoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn drop_rolls_back() {
        let db = open(true);
        {
            let mut scope = DurabilityScope::begin(&db).unwrap();
            scope.set_counter("c", 9).unwrap();
        }
        assert_eq!(db.counter("c").unwrap(), 0);
    }

    #[test]
    fn run_commits_on_ok_and_rolls_back_on_err() {
        let db = open(true);
        DurabilityScope::run(&db, |scope| scope.put(b"a", b"1")).unwrap();

        let result: CoreResult<()> = DurabilityScope::run(&db, |scope| {
            scope.put(b"b", b"2")?;
            Err(CoreError::invalid_operation("boom"))
        });
        assert!(result.is_err());
        assert!(db.contains(b"a").unwrap());
        assert!(!db.contains(b"b").unwrap());
    }

    #[test]
    fn non_transactional_writes_apply_immediately() {
        let db = open(false);
        let mut scope = DurabilityScope::begin(&db).unwrap();
        assert!(!scope.is_transactional());

        scope.put(b"k", b"v").unwrap();
        assert_eq!(db.get(b"k").unwrap(), Some(b"v".to_vec()));

        // nothing to undo
        scope.rollback();
        assert_eq!(db.get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}
