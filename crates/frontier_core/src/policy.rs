//! Fatal vs. degraded handling of store failures.

use crate::error::{CoreError, CoreResult, ErrorKind};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::error;

/// Decides whether a store failure halts the crawl or is swallowed.
///
/// With `halt_on_error` set every error is returned to the caller. Without
/// it, store failures are logged and the operation returns its sentinel:
/// not-found for lookups, an empty batch for reads, a no-op for writes and
/// 0 for sizes. Rejected inputs and internal failures always propagate.
///
/// A degraded registry may treat an already-seen URL as new. That risk is
/// accepted, not corrected.
#[derive(Debug, Default)]
pub struct ErrorPolicy {
    halt_on_error: bool,
    degraded: AtomicU64,
}

impl ErrorPolicy {
    /// Creates a policy.
    #[must_use]
    pub fn new(halt_on_error: bool) -> Self {
        Self {
            halt_on_error,
            degraded: AtomicU64::new(0),
        }
    }

    /// Returns `true` if store failures halt the crawl.
    #[must_use]
    pub fn halts(&self) -> bool {
        self.halt_on_error
    }

    /// Classifies `err` under this policy.
    #[must_use]
    pub fn classify(&self, err: &CoreError) -> ErrorKind {
        if !self.halt_on_error && err.is_store_failure() {
            ErrorKind::Degraded
        } else {
            err.kind()
        }
    }

    /// Applies the policy to `result`.
    ///
    /// Degraded failures are logged under `context`, counted, and replaced
    /// by `fallback`.
    pub fn recover<T>(&self, result: CoreResult<T>, fallback: T, context: &str) -> CoreResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if self.classify(&err) == ErrorKind::Degraded => {
                self.degraded.fetch_add(1, Ordering::Relaxed);
                error!(operation = context, error = %err, "store failure ignored, continuing degraded");
                Ok(fallback)
            }
            Err(err) => Err(err),
        }
    }

    /// Number of failures swallowed so far.
    #[must_use]
    pub fn degraded_count(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }
}
