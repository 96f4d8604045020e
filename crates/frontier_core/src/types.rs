//! Core type definitions.

use std::fmt;

/// Dense identity of a URL.
///
/// Ids start at 1 and grow by one per newly seen URL. `0` is reserved for
/// "no document" (e.g. the parent of a seed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(pub i32);

impl DocId {
    /// The "no document" id.
    pub const NONE: Self = Self(0);

    /// Creates a doc id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Returns `true` for ids a registry can hand out (>= 1).
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 >= 1
    }

    /// Returns the following id, or `None` once `i32::MAX` is reached.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc:{}", self.0)
    }
}

/// Identifier of a committed table transaction.
///
/// `0` marks auto-commit records in the table log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Marker for writes made outside a transaction.
    pub const AUTO_COMMIT: Self = Self(0);

    /// Creates a transaction id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_next_stops_at_max() {
        assert_eq!(DocId::new(41).next(), Some(DocId::new(42)));
        assert_eq!(DocId::new(i32::MAX).next(), None);
    }

    #[test]
    fn none_is_not_assigned() {
        assert!(!DocId::NONE.is_assigned());
        assert!(DocId::new(1).is_assigned());
    }

    #[test]
    fn display() {
        assert_eq!(DocId::new(5).to_string(), "doc:5");
        assert_eq!(TransactionId::new(9).to_string(), "txn:9");
    }
}
