//! Benchmark workloads.

use frontier_core::{DocId, WorkItem};
use rand::Rng;

/// A random URL on one of `hosts` hosts.
pub fn random_url<R: Rng>(rng: &mut R, hosts: usize) -> String {
    let path: String = (0..rng.gen_range(4..40))
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect();
    format!("http://host{}.bench/{}", rng.gen_range(0..hosts.max(1)), path)
}

/// `count` distinct URLs.
pub fn generate_urls(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| format!("{}/{i}", random_url(&mut rng, 64)))
        .collect()
}

/// `count` work items with random priority, depth and anchor, doc ids
/// `1..=count`.
pub fn generate_items(count: usize) -> Vec<WorkItem> {
    let mut rng = rand::thread_rng();
    (1..=count)
        .map(|i| {
            let anchor: String = (0..rng.gen_range(0..24))
                .map(|_| char::from(rng.gen_range(b' '..=b'~')))
                .collect();
            WorkItem::new(random_url(&mut rng, 64), DocId::new(i as i32))
                .with_parent(DocId::new(rng.gen_range(1..=i as i32)), random_url(&mut rng, 64))
                .with_depth(rng.gen_range(0..200))
                .with_priority(rng.gen_range(0..4))
                .with_anchor(anchor)
        })
        .collect()
}

/// Random bytes of the given size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}
