//! Work items: pending crawl targets.

use crate::codec::{encode_key, SortKey};
use crate::error::{CoreError, CoreResult};
use crate::types::DocId;

/// A URL waiting to be fetched.
///
/// Items are never changed in place once queued. Re-queueing the same doc
/// id with a different priority or depth makes a new record under a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    /// Target URL.
    pub url: String,
    /// Identity of `url`, at least 1.
    pub doc_id: DocId,
    /// Identity of the page that linked here, [`DocId::NONE`] for seeds.
    pub parent_doc_id: DocId,
    /// URL of the linking page, empty for seeds.
    pub parent_url: String,
    /// Link distance from the seeds.
    pub depth: i16,
    /// Scheduling class, 0 (first) to 127 (last).
    pub priority: i8,
    /// Anchor text of the discovering link.
    pub anchor: String,
}

impl WorkItem {
    /// Creates a seed item: depth 0, priority 0, no parent.
    pub fn new(url: impl Into<String>, doc_id: DocId) -> Self {
        Self {
            url: url.into(),
            doc_id,
            parent_doc_id: DocId::NONE,
            parent_url: String::new(),
            depth: 0,
            priority: 0,
            anchor: String::new(),
        }
    }

    /// Sets the linking page.
    #[must_use]
    pub fn with_parent(mut self, doc_id: DocId, url: impl Into<String>) -> Self {
        self.parent_doc_id = doc_id;
        self.parent_url = url.into();
        self
    }

    /// Sets the depth.
    #[must_use]
    pub fn with_depth(mut self, depth: i16) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the anchor text.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Queue key of this item.
    #[must_use]
    pub fn sort_key(&self) -> SortKey {
        encode_key(self.priority, self.depth, self.doc_id)
    }

    /// Checks field ranges.
    ///
    /// # Errors
    ///
    /// `InvalidWorkItem` for an empty URL, a doc id below 1, or a negative
    /// depth, priority or parent id.
    pub fn validate(&self) -> CoreResult<()> {
        let reason = if self.url.is_empty() {
            "url is empty"
        } else if !self.doc_id.is_assigned() {
            "doc id must be at least 1"
        } else if self.parent_doc_id.as_i32() < 0 {
            "parent doc id is negative"
        } else if self.depth < 0 {
            "depth is negative"
        } else if self.priority < 0 {
            "priority is negative"
        } else {
            return Ok(());
        };
        Err(CoreError::invalid_work_item(&self.url, reason))
    }
}

/// A URL found on a page, before it has an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Discovered URL, already normalized by the caller.
    pub url: String,
    /// Page the link was found on, [`DocId::NONE`] for seeds.
    pub parent_doc_id: DocId,
    /// URL of that page.
    pub parent_url: String,
    /// Depth the new item gets.
    pub depth: i16,
    /// Priority the new item gets.
    pub priority: i8,
    /// Anchor text.
    pub anchor: String,
}

impl Candidate {
    /// A seed URL.
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_doc_id: DocId::NONE,
            parent_url: String::new(),
            depth: 0,
            priority: 0,
            anchor: String::new(),
        }
    }

    /// A link found on `parent`, one level deeper.
    pub fn link(parent: &WorkItem, url: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_doc_id: parent.doc_id,
            parent_url: parent.url.clone(),
            depth: parent.depth.saturating_add(1),
            priority: parent.priority,
            anchor: anchor.into(),
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    /// The work item this candidate becomes once `doc_id` is assigned.
    #[must_use]
    pub fn into_item(self, doc_id: DocId) -> WorkItem {
        WorkItem {
            url: self.url,
            doc_id,
            parent_doc_id: self.parent_doc_id,
            parent_url: self.parent_url,
            depth: self.depth,
            priority: self.priority,
            anchor: self.anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders() {
        let item = WorkItem::new("http://a.com/x", DocId::new(4))
            .with_parent(DocId::new(1), "http://a.com/")
            .with_depth(2)
            .with_priority(9)
            .with_anchor("x");

        assert_eq!(item.parent_doc_id, DocId::new(1));
        assert_eq!(item.sort_key().as_bytes(), &[9, 2, 0, 0, 0, 4]);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn validation_rejects_out_of_range_fields() {
        let ok = WorkItem::new("http://a.com/", DocId::new(1));
        let cases = [
            WorkItem::new("", DocId::new(1)),
            WorkItem::new("http://a.com/", DocId::NONE),
            ok.clone().with_depth(-1),
            ok.clone().with_priority(-5),
            ok.clone().with_parent(DocId::new(-2), ""),
        ];
        for item in cases {
            assert!(matches!(
                item.validate(),
                Err(CoreError::InvalidWorkItem { .. })
            ));
        }
    }

    #[test]
    fn candidate_link_inherits_from_parent() {
        let parent = WorkItem::new("http://a.com/", DocId::new(3))
            .with_depth(4)
            .with_priority(2);
        let item = Candidate::link(&parent, "http://a.com/b", "b").into_item(DocId::new(8));

        assert_eq!(item.parent_doc_id, DocId::new(3));
        assert_eq!(item.parent_url, "http://a.com/");
        assert_eq!(item.depth, 5);
        assert_eq!(item.priority, 2);
        assert_eq!(item.anchor, "b");
    }

    #[test]
    fn link_depth_saturates() {
        let parent = WorkItem::new("http://a.com/", DocId::new(1)).with_depth(i16::MAX);
        assert_eq!(Candidate::link(&parent, "u", "").depth, i16::MAX);
    }
}
