//! URL identities (the doc id server).

use crate::codec::{decode_doc_id, encode_doc_id};
use crate::error::{CoreError, CoreResult};
use crate::policy::ErrorPolicy;
use crate::scope::DurabilityScope;
use crate::store::Database;
use crate::types::DocId;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Counter holding the highest doc id ever issued.
pub const LAST_DOC_ID_COUNTER: &str = "last-doc-id";

/// Outcome of [`IdentityRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Identity of the URL.
    pub doc_id: DocId,
    /// `true` if this call created the identity.
    pub is_new: bool,
}

impl Registration {
    /// Returned when a degraded store could not register the URL.
    pub const FAILED: Self = Self {
        doc_id: DocId::NONE,
        is_new: false,
    };
}

/// Hands out one dense, increasing doc id per distinct URL.
///
/// The table maps URL bytes to a 4-byte big-endian id. The last id issued
/// is kept in memory and guarded by a mutex that covers the whole
/// "look up, then maybe allocate and persist" sequence, so concurrent
/// callers never allocate twice for one URL.
pub struct IdentityRegistry {
    db: Arc<Database>,
    policy: Arc<ErrorPolicy>,
    last: Mutex<DocId>,
}

impl IdentityRegistry {
    /// Opens the registry over the identity table.
    ///
    /// Resumable registries continue from the larger of the row count and
    /// the persisted last-id counter; the counter covers gaps left by
    /// [`pre_assign`](Self::pre_assign).
    ///
    /// # Errors
    ///
    /// Store errors while recovering are returned whatever the policy, since
    /// guessing the last id would reissue identities.
    pub fn open(db: Arc<Database>, policy: Arc<ErrorPolicy>, resumable: bool) -> CoreResult<Self> {
        let last = if resumable {
            let rows = i64::try_from(db.count()?).unwrap_or(i64::MAX);
            let persisted = db.counter(LAST_DOC_ID_COUNTER)?;
            let last = rows.max(persisted).clamp(0, i64::from(i32::MAX)) as i32;
            if last > 0 {
                info!(rows, persisted, last, "resuming doc id sequence");
            }
            DocId::new(last)
        } else {
            DocId::NONE
        };

        Ok(Self {
            db,
            policy,
            last: Mutex::new(last),
        })
    }

    /// Returns the identity of `url`, if it has one.
    ///
    /// Degraded: `None`.
    pub fn lookup(&self, url: &str) -> CoreResult<Option<DocId>> {
        self.policy.recover(self.read(url), None, "lookup")
    }

    /// Returns `true` if `url` has an identity. Degraded: `false`.
    pub fn is_seen(&self, url: &str) -> CoreResult<bool> {
        Ok(self.lookup(url)?.is_some())
    }

    /// Returns the identity of `url`, creating it if needed.
    ///
    /// Degraded: [`DocId::NONE`].
    pub fn assign(&self, url: &str) -> CoreResult<DocId> {
        Ok(self.register(url)?.doc_id)
    }

    /// Like [`assign`](Self::assign), also reporting whether the identity
    /// is new.
    ///
    /// Degraded: [`Registration::FAILED`].
    ///
    /// # Errors
    ///
    /// `DocIdSpaceExhausted` once `i32::MAX` ids exist, whatever the policy.
    pub fn register(&self, url: &str) -> CoreResult<Registration> {
        let mut last = self.last.lock();
        let current = *last;
        let mut landed = None;

        let result = DurabilityScope::run(&self.db, |scope| {
            if let Some(bytes) = scope.get(url.as_bytes())? {
                return Ok(Registration {
                    doc_id: decode_doc_id(&bytes)?,
                    is_new: false,
                });
            }

            let next = current
                .next()
                .ok_or(CoreError::DocIdSpaceExhausted { last: current })?;
            scope.put(url.as_bytes(), &encode_doc_id(next))?;
            if !scope.is_transactional() {
                landed = Some(next);
            }
            scope.set_counter(LAST_DOC_ID_COUNTER, i64::from(next.as_i32()))?;
            Ok(Registration {
                doc_id: next,
                is_new: true,
            })
        });

        match &result {
            Ok(registration) if registration.is_new => *last = registration.doc_id,
            // an auto-committed row outlives a failed counter write
            Err(_) => {
                if let Some(id) = landed {
                    *last = id;
                }
            }
            Ok(_) => {}
        }
        self.policy.recover(result, Registration::FAILED, "assign")
    }

    /// Records an externally known identity.
    ///
    /// A URL already mapped to `doc_id` is accepted as is.
    ///
    /// # Errors
    ///
    /// - `DocIdConflict` if `url` maps to another id
    /// - `DocIdNotIncreasing` if `doc_id` is not above the last id issued
    ///
    /// Both are returned whatever the policy. Degraded store failures make
    /// the call a no-op.
    pub fn pre_assign(&self, url: &str, doc_id: DocId) -> CoreResult<()> {
        let mut last = self.last.lock();
        let current = *last;
        let mut landed = false;

        let result = (|| -> CoreResult<bool> {
            if let Some(existing) = self.read(url)? {
                if existing == doc_id {
                    return Ok(false);
                }
                return Err(CoreError::DocIdConflict {
                    url: url.to_string(),
                    existing,
                    requested: doc_id,
                });
            }

            if doc_id <= current {
                return Err(CoreError::DocIdNotIncreasing {
                    requested: doc_id,
                    last: current,
                });
            }

            DurabilityScope::run(&self.db, |scope| {
                scope.put(url.as_bytes(), &encode_doc_id(doc_id))?;
                landed = !scope.is_transactional();
                scope.set_counter(LAST_DOC_ID_COUNTER, i64::from(doc_id.as_i32()))
            })?;
            Ok(true)
        })();

        if matches!(result, Ok(true)) || landed {
            *last = doc_id;
        }
        self.policy
            .recover(result, false, "pre_assign")
            .map(|_| ())
    }

    /// Identities issued so far: the last id handed out.
    ///
    /// Equal to the number of URLs unless [`pre_assign`](Self::pre_assign)
    /// skipped ids.
    #[must_use]
    pub fn count(&self) -> i64 {
        i64::from(self.last.lock().as_i32())
    }

    /// Rows in the identity table. Degraded: 0.
    pub fn stored_count(&self) -> CoreResult<u64> {
        self.policy.recover(self.db.count(), 0, "stored_count")
    }

    fn read(&self, url: &str) -> CoreResult<Option<DocId>> {
        match self.db.get(url.as_bytes())? {
            Some(bytes) => Ok(Some(decode_doc_id(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("table", &self.db.name())
            .field("last", &*self.last.lock())
            .finish()
    }
}
