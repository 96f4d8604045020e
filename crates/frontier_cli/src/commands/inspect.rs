//! Inspect command implementation.

use super::{open_store, OutputFormat};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Frontier inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Frontier directory.
    pub path: String,
    /// Last doc id handed out.
    pub known_urls: i64,
    /// Rows in the identity table.
    pub stored_identities: u64,
    /// Items waiting in the queue.
    pub pending: i64,
    /// Crawl statistics.
    pub counters: BTreeMap<String, i64>,
    /// Per-table log details.
    pub tables: Vec<TableStats>,
}

/// Statistics for one table log.
#[derive(Debug, Serialize)]
pub struct TableStats {
    /// Table name.
    pub name: String,
    /// Log size in bytes.
    pub log_bytes: u64,
    /// Live rows.
    pub rows: u64,
    /// Records replayed on open.
    pub replayed_records: u64,
    /// Torn or unfinished bytes cut off on open.
    pub truncated_bytes: u64,
}

/// Gathers the inspection result.
pub fn collect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let env = store.environment();

    let mut tables = Vec::new();
    for name in env.database_names()? {
        let db = env.open_database(&name)?;
        let recovery = db.recovery();
        tables.push(TableStats {
            log_bytes: db.log_size()?,
            rows: db.count()?,
            replayed_records: recovery.records,
            truncated_bytes: recovery.truncated_bytes,
            name,
        });
    }

    let result = InspectResult {
        path: path.display().to_string(),
        known_urls: store.identities().count(),
        stored_identities: store.identities().stored_count()?,
        pending: store.frontier().size()?,
        counters: store.counters().snapshot(),
        tables,
    };
    store.close()?;
    Ok(result)
}

/// Runs the inspect command.
pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result = collect(path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Crawl Frontier Inspection");
    println!("=========================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Identities:");
    println!("  Last doc id:  {}", result.known_urls);
    println!("  Stored URLs:  {}", result.stored_identities);
    println!();
    println!("Queue:");
    println!("  Pending:      {}", result.pending);
    println!();
    println!("Counters:");
    for (name, value) in &result.counters {
        println!("  {:<16} {}", format!("{name}:"), value);
    }
    println!();
    println!("Tables:");
    for table in &result.tables {
        println!(
            "  {:<16} {:>10} bytes  {:>8} rows  {:>8} records replayed",
            table.name, table.log_bytes, table.rows, table.replayed_records
        );
        if table.truncated_bytes > 0 {
            println!("    ({} bytes cut off on open)", table.truncated_bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::sample_frontier;
    use frontier_core::{PROCESSED_PAGES, SCHEDULED_PAGES};

    #[test]
    fn reports_identities_queue_and_counters() {
        let temp = sample_frontier();
        let result = collect(temp.path()).unwrap();

        assert_eq!(result.known_urls, 3);
        assert_eq!(result.stored_identities, 3);
        assert_eq!(result.pending, 2);
        assert_eq!(result.counters[SCHEDULED_PAGES], 3);
        assert_eq!(result.counters[PROCESSED_PAGES], 1);

        let names: Vec<&str> = result.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["DocIDs", "PendingURLsDB", "Statistics"]);
        assert!(result.tables.iter().all(|t| t.log_bytes > 0));
    }

    #[test]
    fn serializes_to_json() {
        let temp = sample_frontier();
        let json = serde_json::to_value(collect(temp.path()).unwrap()).unwrap();
        assert_eq!(json["pending"], 2);
        assert_eq!(json["tables"][0]["name"], "DocIDs");
    }
}
