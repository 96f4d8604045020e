//! # Frontier Core
//!
//! Persistent crawl frontier.
//!
//! This crate provides:
//! - An embedded ordered key-value store with per-table logs and
//!   transactions ([`Environment`], [`Database`])
//! - The work item codec and 6-byte queue key ([`codec`])
//! - URL identities ([`IdentityRegistry`])
//! - The priority-ordered work queue ([`Frontier`])
//! - Crawl statistics ([`CrawlCounters`])
//! - A facade wiring all of it for one crawl ([`CrawlStore`])
//!
//! Store failures are fatal or degraded depending on
//! [`Config::halt_on_error`]; see [`ErrorPolicy`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod config;
mod counters;
mod crawl;
mod dir;
mod error;
mod frontier;
mod identity;
mod item;
pub mod log;
mod policy;
mod scope;
pub mod store;
mod types;

pub use codec::{decode_record, encode_key, encode_record, RecordError, SortKey};
pub use config::{Config, DatabaseConfig};
pub use counters::{CrawlCounters, PROCESSED_PAGES, SCHEDULED_PAGES};
pub use crawl::{CrawlStore, DOC_IDS_TABLE, QUEUE_TABLE, STATISTICS_TABLE};
pub use dir::EnvironmentDir;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use frontier::Frontier;
pub use identity::{IdentityRegistry, Registration, LAST_DOC_ID_COUNTER};
pub use item::{Candidate, WorkItem};
pub use policy::ErrorPolicy;
pub use scope::DurabilityScope;
pub use store::{BackendFactory, Database, Environment, RecoveryStats, Transaction};
pub use types::{DocId, TransactionId};
