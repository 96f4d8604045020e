//! Fuzz testing harnesses.
//!
//! Each target takes arbitrary bytes and must never panic. They can be
//! driven by cargo-fuzz or, as below, by proptest.

use frontier_core::{decode_record, encode_record, Config, CrawlStore, Database, DatabaseConfig};
use frontier_core::{Candidate, DocId};
use frontier_storage::InMemoryBackend;

/// Arbitrary bytes either decode to a work item or fail with an error.
///
/// Overlong string encodings are accepted, so the bytes may differ after
/// re-encoding; the item may not.
pub fn fuzz_record_decode(data: &[u8]) {
    if let Ok(Some(item)) = decode_record(data) {
        let encoded = encode_record(&item).expect("decoded item must encode");
        assert_eq!(decode_record(&encoded), Ok(Some(item)), "re-encoded record differs");
    }
}

/// Arbitrary bytes as a table log: replay succeeds or reports corruption.
///
/// A successful replay must leave a log that replays to the same rows.
pub fn fuzz_log_replay(data: &[u8]) {
    let backend = InMemoryBackend::with_data(data.to_vec());
    let config = Config::default();
    let opened = Database::open(
        "fuzz",
        Box::new(backend.clone()),
        DatabaseConfig::default(),
        &config,
    );
    let Ok(db) = opened else {
        return;
    };
    let rows = db.scan_first_n(usize::MAX).expect("scan after replay");
    drop(db);

    let again = Database::open("fuzz", Box::new(backend), DatabaseConfig::default(), &config)
        .expect("replayed log must reopen");
    assert_eq!(again.scan_first_n(usize::MAX).expect("scan"), rows);
}

/// Arbitrary bytes as a script of crawl operations.
///
/// Checks that the queue never holds more than was scheduled and that
/// doc ids stay dense.
pub fn fuzz_crawl_operations(data: &[u8]) {
    let Ok(store) = CrawlStore::open_in_memory(Config::default().halt_on_error(true)) else {
        return;
    };
    let mut scheduled = 0i64;
    let mut completed = 0i64;

    for chunk in data.chunks(2) {
        let op = chunk[0];
        let arg = chunk.get(1).copied().unwrap_or(0);
        match op % 3 {
            0 => {
                let url = format!("http://fuzz.test/{}", arg % 64);
                let candidate = Candidate::seed(url).with_priority((arg % 4) as i8);
                if let Ok(Some(item)) = store.schedule(candidate) {
                    scheduled += 1;
                    assert_eq!(item.doc_id, DocId::new(scheduled as i32));
                }
            }
            1 => {
                let batch = store.next_batch(arg as usize % 8).expect("next_batch");
                assert!(batch.windows(2).all(|w| w[0].sort_key() < w[1].sort_key()));
            }
            _ => {
                completed += store.complete(arg as usize % 8).expect("complete") as i64;
            }
        }
    }

    assert_eq!(store.identities().count(), scheduled);
    assert_eq!(store.frontier().size().expect("size"), scheduled - completed);
}
