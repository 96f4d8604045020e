//! FrontierDB CLI
//!
//! Operator tools for a crawl frontier directory.
//!
//! # Commands
//!
//! - `inspect` - Identity count, queue size, counters and table logs
//! - `dump` - Pending items in crawl order
//! - `lookup` - Doc id of a URL
//! - `compact` - Rewrite every table log as a snapshot

mod commands;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl frontier tools.
#[derive(Parser)]
#[command(name = "frontier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the frontier directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display identity, queue and table statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List pending items in crawl order
    Dump {
        /// Maximum number of items to list
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the doc id of a URL
    Lookup {
        /// URL to look up
        url: String,
    },

    /// Rewrite every table log as a snapshot of its live state
    Compact,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Frontier path required for inspect")?;
            commands::inspect::run(&path, format.parse::<OutputFormat>()?)?;
        }
        Commands::Dump { limit, format } => {
            let path = cli.path.ok_or("Frontier path required for dump")?;
            commands::dump::run(&path, limit, format.parse::<OutputFormat>()?)?;
        }
        Commands::Lookup { url } => {
            let path = cli.path.ok_or("Frontier path required for lookup")?;
            commands::lookup::run(&path, &url)?;
        }
        Commands::Compact => {
            let path = cli.path.ok_or("Frontier path required for compact")?;
            commands::compact::run(&path)?;
        }
        Commands::Version => {
            println!("frontier CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
