//! Stress tests for the crawl store.
//!
//! These tests verify behavior under heavy load and concurrent access.

use frontier_core::{Candidate, CrawlStore};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Worker threads.
    pub threads: usize,
    /// URLs each worker discovers.
    pub urls_per_thread: usize,
    /// Distinct hosts the URLs are spread over. Workers share hosts, so
    /// they race on the same URLs.
    pub hosts: usize,
    /// Batch size for `next_batch`.
    pub batch_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            urls_per_thread: 500,
            hosts: 8,
            batch_size: 50,
        }
    }
}

fn url(config: &StressConfig, n: usize) -> String {
    format!("http://host{}.test/page/{}", n % config.hosts, n)
}

/// Every worker discovers the same URL range. Each URL must be scheduled
/// exactly once.
pub fn concurrent_discovery(store: Arc<CrawlStore>, config: &StressConfig) -> StressTestResult {
    let scheduled = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let store = Arc::clone(&store);
            let scheduled = Arc::clone(&scheduled);
            let failed = Arc::clone(&failed);
            let config = config.clone();
            thread::spawn(move || {
                for n in 0..config.urls_per_thread {
                    match store.schedule(Candidate::seed(url(&config, n))) {
                        Ok(Some(_)) => {
                            scheduled.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(None) => {}
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("discovery worker panicked");
    }

    StressTestResult::new(
        scheduled.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Producers schedule disjoint URL ranges, then consumers drain the queue.
///
/// Returns the result and the doc ids the consumers acknowledged. Batches
/// are taken and acknowledged under one lock, as a single crawl controller
/// would: `complete` removes whatever is smallest, so a batch read by one
/// consumer must not be acknowledged by another.
pub fn produce_and_consume(
    store: Arc<CrawlStore>,
    config: &StressConfig,
) -> (StressTestResult, BTreeSet<i32>) {
    let consumed = Arc::new(Mutex::new(BTreeSet::new()));
    let duplicates = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let producers: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let failed = Arc::clone(&failed);
            let config = config.clone();
            thread::spawn(move || {
                for n in 0..config.urls_per_thread {
                    let global = t * config.urls_per_thread + n;
                    if store.schedule(Candidate::seed(url(&config, global))).is_err() {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();
    for handle in producers {
        handle.join().expect("producer panicked");
    }

    let controller = Arc::new(Mutex::new(()));
    let consumers: Vec<_> = (0..config.threads)
        .map(|_| {
            let store = Arc::clone(&store);
            let consumed = Arc::clone(&consumed);
            let duplicates = Arc::clone(&duplicates);
            let failed = Arc::clone(&failed);
            let controller = Arc::clone(&controller);
            let batch_size = config.batch_size;
            thread::spawn(move || loop {
                let _turn = controller.lock();
                let batch = match store.next_batch(batch_size) {
                    Ok(batch) if !batch.is_empty() => batch,
                    Ok(_) => break,
                    Err(_) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                };
                if store.complete(batch.len()).is_err() {
                    failed.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                let mut seen = consumed.lock();
                for item in &batch {
                    if !seen.insert(item.doc_id.as_i32()) {
                        duplicates.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();
    for handle in consumers {
        handle.join().expect("consumer panicked");
    }

    let consumed = std::mem::take(&mut *consumed.lock());
    let result = StressTestResult::new(
        consumed.len(),
        failed.load(Ordering::Relaxed) + duplicates.load(Ordering::Relaxed),
        start.elapsed(),
    );
    (result, consumed)
}
