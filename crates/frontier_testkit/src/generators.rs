//! Property-based test generators using proptest.

use frontier_core::{DocId, WorkItem};
use proptest::prelude::*;

/// Strategy for URLs, mostly ASCII with the occasional non-Latin path.
pub fn arb_url() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "http://[a-z]{1,12}\\.(com|org|test)/[a-z0-9/]{0,24}",
        1 => "https://[a-z]{1,8}\\.test/\\PC{0,12}",
    ]
}

/// Strategy for anchors, including NUL and astral characters.
pub fn arb_anchor() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "\\PC{0,16}",
        Just("nul\u{0}inside".to_string()),
        Just("emoji \u{1F600}".to_string()),
    ]
}

/// Strategy for assigned doc ids.
pub fn arb_doc_id() -> impl Strategy<Value = DocId> {
    (1..=i32::MAX).prop_map(DocId::new)
}

/// Strategy for queue priorities.
pub fn arb_priority() -> impl Strategy<Value = i8> {
    0..=i8::MAX
}

/// Strategy for crawl depths, crossing the key cap of 127.
pub fn arb_depth() -> impl Strategy<Value = i16> {
    prop_oneof![3 => 0..=130i16, 1 => 0..=i16::MAX]
}

/// Strategy for valid work items.
pub fn arb_work_item() -> impl Strategy<Value = WorkItem> {
    (
        arb_url(),
        arb_doc_id(),
        prop::option::of((arb_doc_id(), arb_url())),
        arb_depth(),
        arb_priority(),
        arb_anchor(),
    )
        .prop_map(|(url, doc_id, parent, depth, priority, anchor)| {
            let item = WorkItem::new(url, doc_id)
                .with_depth(depth)
                .with_priority(priority)
                .with_anchor(anchor);
            match parent {
                Some((parent_id, parent_url)) => item.with_parent(parent_id, parent_url),
                None => item,
            }
        })
}

/// Strategy for batches of work items with distinct doc ids.
pub fn arb_work_items(max: usize) -> impl Strategy<Value = Vec<WorkItem>> {
    prop::collection::vec(arb_work_item(), 0..max).prop_map(|mut items| {
        for (i, item) in items.iter_mut().enumerate() {
            item.doc_id = DocId::new(i as i32 + 1);
        }
        items
    })
}
