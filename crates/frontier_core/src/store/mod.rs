//! The embedded key-value store under the frontier.
//!
//! An [`Environment`] owns named [`Database`] tables. Each table keeps its
//! rows in an ordered in-memory map and persists every mutation to its own
//! checksummed log (see [`crate::log`]).

mod database;
mod env;
mod transaction;

pub use database::{Database, RecoveryStats};
pub use env::{BackendFactory, Environment};
pub use transaction::Transaction;
