//! # FrontierDB Storage
//!
//! Byte backends that hold the table logs of a crawl frontier.
//!
//! A backend is an **opaque, append-only byte store**. It knows nothing about
//! log records, sort keys or work items; `frontier_core` owns every byte it
//! writes and is responsible for framing, checksums and replay.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - Ephemeral crawls and tests. Clones share one buffer,
//!   which lets a test "restart" a crawl over the same bytes.
//! - [`FileBackend`] - Persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use frontier_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"pending url").unwrap();
//! assert_eq!(backend.read_at(offset, 7).unwrap(), b"pending");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
