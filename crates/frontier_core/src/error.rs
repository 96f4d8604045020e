//! Error types for the crawl frontier.

use crate::codec::RecordError;
use crate::types::DocId;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// How a failure must be treated by the crawl loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A store failure that halts the crawl (`halt_on_error` set), or an
    /// internal failure that can never be papered over.
    Fatal,
    /// A store failure that was logged and replaced by a sentinel value
    /// because `halt_on_error` is unset.
    Degraded,
    /// A caller logic error. Always returned, whatever the policy.
    Rejected,
}

/// Errors raised by the frontier, the identity registry and the table store.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend error.
    #[error("storage error: {0}")]
    Storage(#[from] frontier_storage::StorageError),

    /// I/O error outside a backend (directory, lock file, rename).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A table log could not be parsed.
    #[error("log corruption in {database}: {message}")]
    LogCorruption {
        /// Table whose log is damaged.
        database: String,
        /// Description of the damage.
        message: String,
    },

    /// A log record failed its checksum.
    #[error("checksum mismatch in {database} at offset {offset}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Table whose log is damaged.
        database: String,
        /// Offset of the damaged record.
        offset: u64,
        /// Stored checksum.
        expected: u32,
        /// Computed checksum.
        actual: u32,
    },

    /// The writer lock of a table could not be acquired in time.
    #[error("lock wait timed out on {database} after {waited_ms} ms")]
    LockTimeout {
        /// Contended table.
        database: String,
        /// Configured wait in milliseconds.
        waited_ms: u64,
    },

    /// A stored work item or identity value is malformed, or a work item
    /// field cannot be encoded.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// The table has been closed.
    #[error("database {name} is closed")]
    DatabaseClosed {
        /// Closed table.
        name: String,
    },

    /// Another process holds the environment directory.
    #[error("environment locked: another process has exclusive access")]
    EnvironmentLocked,

    /// The environment directory is missing or unusable.
    #[error("invalid environment: {message}")]
    InvalidEnvironment {
        /// Description of the problem.
        message: String,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Why the operation is invalid.
        message: String,
    },

    /// Every positive 32-bit doc id has been issued.
    #[error("doc id space exhausted after {last}")]
    DocIdSpaceExhausted {
        /// The last id handed out.
        last: DocId,
    },

    /// A pre-assigned doc id does not advance the sequence.
    #[error("requested doc id {requested} is not larger than {last}")]
    DocIdNotIncreasing {
        /// Requested id.
        requested: DocId,
        /// Current last id.
        last: DocId,
    },

    /// A URL already carries a different doc id.
    #[error("doc id {existing} is already assigned to URL {url}, cannot assign {requested}")]
    DocIdConflict {
        /// The URL.
        url: String,
        /// Id already stored for the URL.
        existing: DocId,
        /// Id the caller asked for.
        requested: DocId,
    },

    /// A work item violates its field ranges.
    #[error("invalid work item for {url:?}: {reason}")]
    InvalidWorkItem {
        /// URL of the offending item.
        url: String,
        /// Which constraint failed.
        reason: String,
    },
}

impl CoreError {
    /// Creates a log corruption error.
    pub fn log_corruption(database: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LogCorruption {
            database: database.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid environment error.
    pub fn invalid_environment(message: impl Into<String>) -> Self {
        Self::InvalidEnvironment {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an invalid work item error.
    pub fn invalid_work_item(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidWorkItem {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Classifies the error independently of any policy.
    ///
    /// Only [`ErrorKind::Fatal`] and [`ErrorKind::Rejected`] come out of
    /// here; [`ErrorKind::Degraded`] is decided by
    /// [`crate::ErrorPolicy::classify`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DocIdNotIncreasing { .. }
            | Self::DocIdConflict { .. }
            | Self::InvalidWorkItem { .. }
            | Self::Record(RecordError::StringTooLong { .. }) => ErrorKind::Rejected,
            _ => ErrorKind::Fatal,
        }
    }

    /// Returns `true` for failures of the underlying store, the only ones
    /// a degraded crawl may swallow.
    #[must_use]
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::Io(_)
                | Self::LogCorruption { .. }
                | Self::ChecksumMismatch { .. }
                | Self::LockTimeout { .. }
                | Self::DatabaseClosed { .. }
        ) || matches!(self, Self::Record(err) if !matches!(err, RecordError::StringTooLong { .. }))
    }
}
