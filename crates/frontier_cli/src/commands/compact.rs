//! Compact command implementation.

use super::open_store;
use std::path::Path;
use tracing::info;

/// Compaction result for one table.
#[derive(Debug)]
pub struct CompactStats {
    /// Table name.
    pub table: String,
    /// Log size before.
    pub bytes_before: u64,
    /// Log size after.
    pub bytes_after: u64,
}

/// Rewrites every table log as a snapshot of its live state.
pub fn compact_all(path: &Path) -> Result<Vec<CompactStats>, Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let env = store.environment();

    let mut stats = Vec::new();
    for table in env.database_names()? {
        let (bytes_before, bytes_after) = env.compact(&table)?;
        info!(table = %table, bytes_before, bytes_after, "compacted");
        stats.push(CompactStats {
            table,
            bytes_before,
            bytes_after,
        });
    }
    store.close()?;
    Ok(stats)
}

/// Runs the compact command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Compacting frontier at {:?}", path);
    println!();

    let stats = compact_all(path)?;
    let mut before = 0;
    let mut after = 0;
    for table in &stats {
        println!(
            "  {:<16} {:>10} -> {:>10} bytes",
            table.table, table.bytes_before, table.bytes_after
        );
        before += table.bytes_before;
        after += table.bytes_after;
    }

    println!();
    println!(
        "  Space saved: {} bytes ({:.1}%)",
        before.saturating_sub(after),
        if before > 0 {
            (before.saturating_sub(after) as f64 / before as f64) * 100.0
        } else {
            0.0
        }
    );
    Ok(())
}
