//! Lookup command implementation.

use super::open_store;
use frontier_core::DocId;
use std::path::Path;

/// Returns the doc id of `url`, if it has been seen.
pub fn find(path: &Path, url: &str) -> Result<Option<DocId>, Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let doc_id = store.identities().lookup(url)?;
    store.close()?;
    Ok(doc_id)
}

/// Runs the lookup command.
pub fn run(path: &Path, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    match find(path, url)? {
        Some(doc_id) => println!("{url}\t{}", doc_id.as_i32()),
        None => println!("{url}\tnot seen"),
    }
    Ok(())
}
