//! Storage layer: path resolution, per-collection locking, and atomic
//! document persistence.
//!
//! Each collection is a directory under the store root and each resource a
//! `<name>.json` file inside it. Writes are atomic (temp file + rename) and
//! serialized per collection by the [`LockRegistry`].

/// Per-collection lock registry.
pub mod locks;
/// Path derivation and the extension-fallback existence lookup.
pub mod paths;
/// Document encoding and atomic file writes.
pub mod persistence;
/// The `Store` façade.
pub mod store;

pub use locks::{CollectionLock, LockRegistry};
pub use paths::RecordPaths;
pub use store::Store;
