//! Global configuration for recordsdb.
//!
//! On-disk layout constants are compile-time values shared by every store.
//! Per-store behaviour is configured at runtime through [`StoreOptions`].

/// Extension carried by every stored resource file (without the dot).
pub const RECORD_EXTENSION: &str = "json";

/// Suffix appended to a resource's final path while a write is in flight.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Mode for the store root and collection directories (unix only).
pub const DIR_MODE: u32 = 0o755;

/// Mode for resource files (unix only).
pub const FILE_MODE: u32 = 0o644;

/// Default root directory used by the command-line front end.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Environment variable consulted for the data directory by the front end.
pub const DATA_DIR_ENV: &str = "RECORDSDB_DATA_DIR";

/// Indentation unit for serialized documents.
pub const JSON_INDENT: &[u8] = b"\t";

/// How reads synchronize with writes to the same collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadConsistency {
    /// Reads take no lock. A read racing a delete may report `NotFound`.
    #[default]
    Relaxed,
    /// Reads hold the collection lock in shared mode; writes and deletes
    /// hold it exclusively.
    Locked,
}

/// Runtime options for [`Store::open`](crate::storage::Store::open).
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Remove orphaned `*.json.tmp` files left by failed writes when the store opens.
    pub sweep_temp_on_open: bool,
    /// `fsync` the temp file before renaming it over the final path.
    pub sync_writes: bool,
    /// Synchronization level for `read` / `read_all`.
    pub read_consistency: ReadConsistency,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sweep_temp_on_open: true,
            sync_writes: false,
            read_consistency: ReadConsistency::Relaxed,
        }
    }
}

impl StoreOptions {
    /// Sets [`StoreOptions::sweep_temp_on_open`].
    pub fn with_sweep_temp_on_open(mut self, sweep: bool) -> Self {
        self.sweep_temp_on_open = sweep;
        self
    }

    /// Sets [`StoreOptions::sync_writes`].
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Sets [`StoreOptions::read_consistency`].
    pub fn with_read_consistency(mut self, consistency: ReadConsistency) -> Self {
        self.read_consistency = consistency;
        self
    }
}
