//! Disk persistence for resource documents.
//!
//! Documents are serialized as tab-indented JSON followed by a single newline.
//! Writes go to `<resource>.json.tmp` and are renamed over the final path, so
//! a reader sees either the previous or the new document, never a mix.

use crate::config::{DIR_MODE, FILE_MODE, JSON_INDENT};
use crate::error::{StoreError, StoreResult};
use crate::storage::paths::{is_temp_file, RecordPaths};
use serde::Serialize;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Serialize `document` into the on-disk representation.
pub fn encode_document<T: Serialize + ?Sized>(document: &T) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document
        .serialize(&mut ser)
        .map_err(StoreError::Serialization)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Create `dir` and any missing parents with [`DIR_MODE`].
pub fn create_dir_all(dir: &Path) -> io::Result<()> {
    dir_builder(true).create(dir)
}

/// Create `dir` only; fails if its parent is missing.
pub fn create_dir(dir: &Path) -> io::Result<()> {
    dir_builder(false).create(dir)
}

fn dir_builder(recursive: bool) -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
}

/// Atomically replace `paths.final_path` with `bytes`.
///
/// On failure the temp file is left where it is.
pub fn write_atomic(paths: &RecordPaths, bytes: &[u8], sync: bool) -> io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(FILE_MODE);
    }

    let mut file = opts.open(&paths.temp_path)?;
    file.write_all(bytes)?;
    if sync {
        file.sync_all()?;
    }
    drop(file);

    fs::rename(&paths.temp_path, &paths.final_path)
}

/// Remove orphaned temp files directly inside `collection_dir`.
///
/// Returns how many were removed. Files that cannot be removed are logged and
/// skipped.
pub fn sweep_temp_files(collection_dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(collection_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_temp_file(&path) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed stale temp file {:?}", path);
                removed += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to remove stale temp file {:?}: {}", path, e);
            }
        }
    }
    Ok(removed)
}
