//! Dump command implementation.

use super::{open_store, OutputFormat};
use frontier_core::WorkItem;
use serde::Serialize;
use std::path::Path;

/// One pending item as printed.
#[derive(Debug, Serialize)]
pub struct DumpEntry {
    /// Queue priority, lower first.
    pub priority: i8,
    /// Crawl depth.
    pub depth: i16,
    /// Doc id.
    pub doc_id: i32,
    /// URL.
    pub url: String,
    /// Doc id of the linking page, 0 for seeds.
    pub parent_doc_id: i32,
    /// URL of the linking page.
    pub parent_url: String,
    /// Anchor text of the link.
    pub anchor: String,
}

impl From<WorkItem> for DumpEntry {
    fn from(item: WorkItem) -> Self {
        Self {
            priority: item.priority,
            depth: item.depth,
            doc_id: item.doc_id.as_i32(),
            url: item.url,
            parent_doc_id: item.parent_doc_id.as_i32(),
            parent_url: item.parent_url,
            anchor: item.anchor,
        }
    }
}

/// Pending items in crawl order, at most `limit` of them.
pub fn collect(path: &Path, limit: Option<usize>) -> Result<Vec<DumpEntry>, Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let items = store.next_batch(limit.unwrap_or(usize::MAX))?;
    store.close()?;
    Ok(items.into_iter().map(DumpEntry::from).collect())
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = collect(path, limit)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            println!("{:>4} {:>5} {:>10}  URL", "PRI", "DEPTH", "DOC_ID");
            for entry in &entries {
                println!(
                    "{:>4} {:>5} {:>10}  {}",
                    entry.priority, entry.depth, entry.doc_id, entry.url
                );
            }
            println!();
            println!("{} item(s)", entries.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::sample_frontier;

    #[test]
    fn dumps_in_crawl_order() {
        let temp = sample_frontier();
        let entries = collect(temp.path(), None).unwrap();
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, ["http://cli.test/a", "http://cli.test/b"]);
        assert_eq!(entries[1].priority, 1);
        assert_eq!(entries[0].parent_doc_id, 1);
    }

    #[test]
    fn limit_caps_output_and_keeps_the_queue() {
        let temp = sample_frontier();
        assert_eq!(collect(temp.path(), Some(1)).unwrap().len(), 1);
        assert_eq!(collect(temp.path(), None).unwrap().len(), 2);
    }
}
