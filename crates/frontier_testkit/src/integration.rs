//! End-to-end crawl harness.
//!
//! Drives a [`CrawlStore`] the way a crawl controller would: take a batch,
//! "fetch" every page, schedule its outlinks, acknowledge the batch.

use frontier_core::{Candidate, CoreResult, CrawlStore, WorkItem};
use std::collections::BTreeMap;

/// A synthetic site: page `n` links to `2n` and `2n + 1` up to `pages`,
/// and back to the root.
#[derive(Debug, Clone)]
pub struct SyntheticSite {
    /// Host name.
    pub host: String,
    /// Number of pages.
    pub pages: usize,
    /// Pages deeper than this are not followed.
    pub max_depth: i16,
}

impl SyntheticSite {
    /// A site of `pages` pages on `host`.
    pub fn new(host: impl Into<String>, pages: usize) -> Self {
        Self {
            host: host.into(),
            pages,
            max_depth: i16::MAX,
        }
    }

    /// URL of page `n`.
    pub fn url(&self, n: usize) -> String {
        format!("http://{}/page/{}", self.host, n)
    }

    /// Root URL.
    pub fn root(&self) -> String {
        self.url(1)
    }

    fn page_number(&self, url: &str) -> Option<usize> {
        url.rsplit('/').next()?.parse().ok()
    }

    /// Outlinks of the page at `url`.
    pub fn outlinks(&self, url: &str) -> Vec<String> {
        let Some(n) = self.page_number(url) else {
            return Vec::new();
        };
        let mut links: Vec<String> = [2 * n, 2 * n + 1]
            .into_iter()
            .filter(|&m| m <= self.pages)
            .map(|m| self.url(m))
            .collect();
        links.push(self.root());
        links
    }
}

/// What a crawl run saw.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages fetched, in order, with their depth.
    pub fetched: Vec<(String, i16)>,
    /// Batches taken.
    pub batches: usize,
}

impl CrawlReport {
    /// Fetch count per URL.
    pub fn fetch_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for (url, _) in &self.fetched {
            *counts.entry(url.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Crawls `site` until the queue is empty or `page_limit` pages were
/// fetched. Seeds the root first; a known root is not queued again.
pub fn crawl(
    store: &CrawlStore,
    site: &SyntheticSite,
    batch_size: usize,
    page_limit: usize,
) -> CoreResult<CrawlReport> {
    let mut report = CrawlReport::default();
    store.schedule(Candidate::seed(site.root()))?;

    while report.fetched.len() < page_limit {
        let room = page_limit - report.fetched.len();
        let batch = store.next_batch(batch_size.min(room))?;
        if batch.is_empty() {
            break;
        }
        report.batches += 1;

        for page in &batch {
            report.fetched.push((page.url.clone(), page.depth));
            if page.depth < site.max_depth {
                store.schedule_all(links_of(site, page))?;
            }
        }
        store.complete(batch.len())?;
    }
    Ok(report)
}

fn links_of(site: &SyntheticSite, page: &WorkItem) -> Vec<Candidate> {
    site.outlinks(&page.url)
        .into_iter()
        .map(|url| Candidate::link(page, url, "next"))
        .collect()
}
