//! The record store: collections of JSON resources under one root directory.
//!
//! A [`Store`] maps `(collection, resource)` to `<root>/<collection>/<resource>.json`.
//! Writes and deletes within a collection are serialized by that collection's
//! lock; different collections never contend. Reads take no lock unless the
//! store was opened with [`ReadConsistency::Locked`].

use crate::config::{ReadConsistency, StoreOptions};
use crate::error::{StoreError, StoreResult};
use crate::storage::locks::{CollectionLock, LockRegistry};
use crate::storage::paths::{self, is_temp_file, normalize_root, RecordPaths};
use crate::storage::persistence;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    locks: LockRegistry,
    options: StoreOptions,
}

impl Store {
    /// Open the store rooted at `root`, creating the root directory if needed.
    ///
    /// The root is made absolute and normalized. An existing root is used
    /// unchanged; a missing one is created with a single-level create, so its
    /// parent must already exist. When [`StoreOptions::sweep_temp_on_open`]
    /// is set, temp files orphaned by earlier failed writes are removed.
    pub fn open(root: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let root = normalize_root(root.as_ref())?;

        let root_is_dir = match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!("Using '{}' (database already exists)", root.display());
                true
            }
            Ok(_) => {
                tracing::warn!("Store root '{}' exists but is not a directory", root.display());
                false
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Creating the database at '{}'", root.display());
                persistence::create_dir(&root)?;
                true
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self {
            root,
            locks: LockRegistry::new(),
            options,
        };

        if root_is_dir && store.options.sweep_temp_on_open {
            store.sweep_temp_files()?;
        }
        Ok(store)
    }

    /// Absolute, normalized root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options the store was opened with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Per-collection lock registry backing this store.
    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Persist `document` as `<collection>/<resource>.json`, replacing any
    /// previous version atomically.
    ///
    /// A failed write may leave `<resource>.json.tmp` behind; the final file
    /// is never partially written.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        document: &T,
    ) -> StoreResult<()> {
        require_collection(collection)?;
        require_resource(resource)?;

        let lock = self.locks.acquire(collection);
        let _guard = lock.write();

        let record = RecordPaths::new(&self.root, collection, resource);
        persistence::create_dir_all(&record.collection_dir)?;
        let bytes = persistence::encode_document(document)?;
        persistence::write_atomic(&record, &bytes, self.options.sync_writes)?;

        tracing::debug!(
            "Wrote '{}/{}' ({} bytes)",
            collection,
            resource,
            bytes.len()
        );
        Ok(())
    }

    /// Load and deserialize `<collection>/<resource>`.
    ///
    /// `resource` may be given with or without the `.json` extension.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> StoreResult<T> {
        require_collection(collection)?;
        require_resource(resource)?;

        let lock = self.shared_lock(collection);
        let _guard = lock.as_ref().map(|l| l.read());

        let target = self.root.join(collection).join(resource);
        let located = paths::resolve_record(&target)?
            .ok_or_else(|| resource_not_found(collection, resource))?;
        let file = if located.is_file() {
            located.path
        } else {
            paths::with_extension(&target)
        };

        let bytes = fs::read(&file)
            .map_err(|e| StoreError::from_io(e, || resource_label(collection, resource)))?;
        serde_json::from_slice(&bytes).map_err(StoreError::Deserialization)
    }

    /// Raw text of every stored document in `collection`, in directory order.
    ///
    /// Subdirectories and in-flight temp files are skipped. A failure reading
    /// any single file fails the whole call.
    pub fn read_all(&self, collection: &str) -> StoreResult<Vec<String>> {
        require_collection(collection)?;

        let lock = self.shared_lock(collection);
        let _guard = lock.as_ref().map(|l| l.read());

        let dir = self.root.join(collection);
        let entries = fs::read_dir(&dir)
            .map_err(|e| StoreError::from_io(e, || collection_label(collection)))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            if is_temp_file(&path) {
                continue;
            }
            records.push(fs::read_to_string(&path)?);
        }
        Ok(records)
    }

    /// [`read_all`](Store::read_all), with every entry deserialized as `T`.
    pub fn read_all_records<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        self.read_all(collection)?
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::Deserialization))
            .collect()
    }

    /// Remove `<collection>/<resource>`.
    ///
    /// A regular `<resource>.json` file is removed in preference to anything
    /// else. Otherwise, if the resolved path is a directory it is removed
    /// recursively, and special files are left alone. An empty `resource`
    /// drops the whole collection, see [`drop_collection`](Store::drop_collection).
    pub fn delete(&self, collection: &str, resource: &str) -> StoreResult<()> {
        require_collection(collection)?;
        if resource.is_empty() {
            return self.drop_collection(collection);
        }
        require_resource(resource)?;

        let lock = self.locks.acquire(collection);
        let _guard = lock.write();

        let target = self.root.join(collection).join(resource);
        let located = paths::resolve_record(&target)?
            .ok_or_else(|| resource_not_found(collection, resource))?;

        if located.is_dir() {
            fs::remove_dir_all(&located.path)?;
        } else if located.is_file() {
            fs::remove_file(&located.path)?;
        } else {
            tracing::debug!("Leaving special file {:?} in place", located.path);
            return Ok(());
        }

        tracing::debug!("Deleted '{}/{}'", collection, resource);
        Ok(())
    }

    /// Remove a collection directory and everything in it.
    pub fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        require_collection(collection)?;

        let lock = self.locks.acquire(collection);
        let _guard = lock.write();

        let dir = self.root.join(collection);
        let meta = fs::metadata(&dir)
            .map_err(|e| StoreError::from_io(e, || collection_label(collection)))?;
        if !meta.is_dir() {
            return Err(StoreError::NotFound(collection_label(collection)));
        }
        fs::remove_dir_all(&dir)?;

        tracing::info!("Dropped collection '{}'", collection);
        Ok(())
    }

    /// Names of all collections, sorted.
    pub fn collections(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(
                    "Skipping collection directory with non UTF-8 name {:?}",
                    raw
                ),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove temp files orphaned by failed writes in every collection.
    ///
    /// Each collection is swept under its lock, so the temp file of a write
    /// in progress is never touched. Returns the number of files removed.
    pub fn sweep_temp_files(&self) -> StoreResult<usize> {
        let mut removed = 0;
        for collection in self.collections()? {
            let lock = self.locks.acquire(&collection);
            let _guard = lock.write();
            match persistence::sweep_temp_files(&self.root.join(&collection)) {
                Ok(n) => removed += n,
                // Dropped between listing and locking.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if removed > 0 {
            tracing::info!(
                "Removed {} stale temp file(s) under '{}'",
                removed,
                self.root.display()
            );
        }
        Ok(removed)
    }

    fn shared_lock(&self, collection: &str) -> Option<Arc<CollectionLock>> {
        match self.options.read_consistency {
            ReadConsistency::Relaxed => None,
            ReadConsistency::Locked => Some(self.locks.acquire(collection)),
        }
    }
}

fn require_collection(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidArgument("collection cannot be empty".into()));
    }
    if !paths::is_single_segment(name) {
        return Err(StoreError::InvalidArgument(format!(
            "collection must be a single path segment: '{}'",
            name
        )));
    }
    Ok(())
}

fn require_resource(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidArgument("resource cannot be empty".into()));
    }
    if !paths::is_plain_relative(name) {
        return Err(StoreError::InvalidArgument(format!(
            "resource must be a relative path without '.' or '..': '{}'",
            name
        )));
    }
    Ok(())
}

fn resource_label(collection: &str, resource: &str) -> String {
    format!("resource '{}/{}'", collection, resource)
}

fn collection_label(collection: &str) -> String {
    format!("collection '{}'", collection)
}

fn resource_not_found(collection: &str, resource: &str) -> StoreError {
    StoreError::NotFound(resource_label(collection, resource))
}
