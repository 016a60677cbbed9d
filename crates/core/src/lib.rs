//! # recordsdb-core
//!
//! Embeddable persistent record store. Documents are addressed by
//! `(collection, resource)` and stored as one tab-indented JSON file each
//! under a root directory:
//!
//! ```text
//! <root>/
//!   <collection>/
//!     <resource>.json
//!     <resource>.json.tmp   (only while a write is in flight)
//! ```
//!
//! Writes are atomic (temp file + rename) and serialized per collection.
//! Only in-process concurrency is guarded; two processes sharing a root can
//! still interleave. Logging goes through `tracing`; install a subscriber in
//! the embedding application to see it.
//!
//! ```no_run
//! use recordsdb_core::{Store, StoreOptions};
//! use serde_json::json;
//!
//! let store = Store::open("./data", StoreOptions::default())?;
//! store.write("users", "alice", &json!({"Name": "Alice", "Age": "30"}))?;
//! let alice: serde_json::Value = store.read("users", "alice")?;
//! assert_eq!(alice["Name"], "Alice");
//! store.delete("users", "alice")?;
//! # Ok::<(), recordsdb_core::StoreError>(())
//! ```

/// On-disk layout constants and runtime [`StoreOptions`].
pub mod config;
/// Error taxonomy: [`StoreError`] and [`StoreResult`].
pub mod error;
/// Storage layer: path resolution, lock registry, persistence, and the store façade.
pub mod storage;

pub use config::{ReadConsistency, StoreOptions};
pub use error::{StoreError, StoreResult};
pub use storage::Store;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
