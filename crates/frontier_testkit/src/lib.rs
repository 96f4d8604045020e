//! # FrontierDB Testkit
//!
//! Test utilities for the crawl frontier.
//!
//! This crate provides:
//! - Test fixtures and store helpers, including in-memory logs that survive
//!   a restart
//! - Property-based test generators using proptest
//! - Byte-exact vectors for the queue key and work item record
//! - A fault-injecting backend for crash recovery tests
//! - Fuzz testing harnesses
//! - Stress testing utilities
//! - An end-to-end crawl harness
//!
//! ## Usage
//!
//! ```rust,ignore
//! use frontier_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_memory_store(|store| {
//!         store.schedule_all(seeds(10)).unwrap();
//!         // ... test operations
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use crash::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
pub use vectors::*;
