//! Byte-exact test vectors for the queue key and work item record.
//!
//! A store written by one build must be readable by the next, so these
//! layouts are frozen. The vectors serialize to JSON for tools that check
//! stores from outside Rust.

use frontier_core::{encode_key, encode_record, DocId, WorkItem};
use serde::{Deserialize, Serialize};

/// One encoding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Expected bytes, hex-encoded.
    pub expected_hex: String,
}

/// Queue key vectors: priority, depth and doc id.
pub fn key_vectors() -> Vec<(TestVector, (i8, i16, DocId))> {
    vec![
        (
            vector("key_zero", "smallest assigned key", "000000000001"),
            (0, 0, DocId::new(1)),
        ),
        (
            vector("key_layout", "priority 3, depth 2, id 0x01020304", "030201020304"),
            (3, 2, DocId::new(0x0102_0304)),
        ),
        (
            vector("key_depth_cap", "depth above 127 is clamped", "007f00000009"),
            (0, 500, DocId::new(9)),
        ),
        (
            vector("key_max", "largest priority and id", "7f7f7fffffff"),
            (i8::MAX, i16::MAX, DocId::new(i32::MAX)),
        ),
    ]
}

/// Work item record vectors.
pub fn record_vectors() -> Vec<(TestVector, WorkItem)> {
    vec![
        (
            vector(
                "record_seed",
                "seed with empty parent and anchor",
                "000161000000010000000000000000000000",
            ),
            WorkItem::new("a", DocId::new(1)),
        ),
        (
            vector(
                "record_link",
                "link with parent, depth, priority and anchor",
                "000162000000020000000100016100010200026869",
            ),
            WorkItem::new("b", DocId::new(2))
                .with_parent(DocId::new(1), "a")
                .with_depth(1)
                .with_priority(2)
                .with_anchor("hi"),
        ),
        (
            vector(
                "record_nul",
                "NUL is written as two bytes",
                "0002c080000000010000000000000000000000",
            ),
            WorkItem::new("\u{0}", DocId::new(1)),
        ),
        (
            vector(
                "record_astral",
                "characters outside the BMP are written as two 3-byte surrogates",
                "000178000000010000000000000000000006eda0bdedb880",
            ),
            WorkItem::new("x", DocId::new(1)).with_anchor("\u{1F600}"),
        ),
    ]
}

/// All vectors as JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    let vectors: Vec<TestVector> = key_vectors()
        .into_iter()
        .map(|(v, _)| v)
        .chain(record_vectors().into_iter().map(|(v, _)| v))
        .collect();
    serde_json::to_string_pretty(&vectors)
}

/// Checks every vector against the current encoders. Returns the ids of
/// the ones that no longer match.
pub fn verify_vectors() -> Vec<String> {
    let mut failures = Vec::new();
    for (vector, (priority, depth, doc_id)) in key_vectors() {
        if hex_encode(encode_key(priority, depth, doc_id).as_bytes()) != vector.expected_hex {
            failures.push(vector.id);
        }
    }
    for (vector, item) in record_vectors() {
        match encode_record(&item) {
            Ok(bytes) if hex_encode(&bytes) == vector.expected_hex => {}
            _ => failures.push(vector.id),
        }
    }
    failures
}

fn vector(id: &str, description: &str, expected_hex: &str) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        expected_hex: expected_hex.into(),
    }
}

/// Lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
