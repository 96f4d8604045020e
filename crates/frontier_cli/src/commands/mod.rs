//! CLI command implementations.

pub mod compact;
pub mod dump;
pub mod inspect;
pub mod lookup;

use frontier_core::{Config, CrawlStore};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by the CLI itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// `--format` was neither `text` nor `json`.
    #[error("unknown output format '{0}' (expected text or json)")]
    UnknownFormat(String),
}

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// Opens an existing frontier directory without discarding its contents.
///
/// Opening replays every table log, which also cuts off a torn tail.
pub fn open_store(path: &Path) -> Result<CrawlStore, Box<dyn std::error::Error>> {
    let config = Config::default()
        .resumable(true)
        .halt_on_error(true)
        .create_if_missing(false);
    Ok(CrawlStore::open(path, config)?)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!(
            "yaml".parse::<OutputFormat>(),
            Err(CliError::UnknownFormat(f)) if f == "yaml"
        ));
    }

    #[test]
    fn missing_directory_is_not_created() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(open_store(&missing).is_err());
        assert!(!missing.exists());
    }
}
