//! Path resolution for collections and resources.
//!
//! Stored files always carry [`RECORD_EXTENSION`]; callers address resources
//! without it. Lookups accept either form through [`lookup`].

use crate::config::{RECORD_EXTENSION, TEMP_SUFFIX};
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Paths involved in writing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPaths {
    /// `<root>/<collection>`
    pub collection_dir: PathBuf,
    /// `<root>/<collection>/<resource>.json`
    pub final_path: PathBuf,
    /// `<root>/<collection>/<resource>.json.tmp`
    pub temp_path: PathBuf,
}

impl RecordPaths {
    pub fn new(root: &Path, collection: &str, resource: &str) -> Self {
        let collection_dir = root.join(collection);
        let final_path = with_extension(&collection_dir.join(resource));
        let temp_path = append_suffix(&final_path, TEMP_SUFFIX);
        Self {
            collection_dir,
            final_path,
            temp_path,
        }
    }
}

/// A path that exists on disk, as matched by [`lookup`].
#[derive(Debug)]
pub struct Located {
    pub path: PathBuf,
    pub metadata: Metadata,
}

impl Located {
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }
}

/// Appends `.json` to `path` without touching any existing extension.
pub fn with_extension(path: &Path) -> PathBuf {
    append_suffix(path, &format!(".{}", RECORD_EXTENSION))
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Stats `path`, retrying with the record extension appended when the bare
/// path does not exist.
///
/// Returns `Ok(None)` when neither form exists. The fallback is a naming
/// convention: a resource whose own name ends in `.json` is indistinguishable
/// from the extension-qualified form of its prefix.
pub fn lookup(path: &Path) -> io::Result<Option<Located>> {
    match fs::metadata(path) {
        Ok(metadata) => {
            return Ok(Some(Located {
                path: path.to_path_buf(),
                metadata,
            }))
        }
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {}
    }

    let extended = with_extension(path);
    match fs::metadata(&extended) {
        Ok(metadata) => Ok(Some(Located {
            path: extended,
            metadata,
        })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolves a resource path for Read and Delete.
///
/// A regular `<path>.json` file always wins, so resource `a.json` is never
/// shadowed by resource `a`. Otherwise falls back to [`lookup`], which lets
/// callers address `alice` as `alice.json` and reach nested directories.
pub fn resolve_record(path: &Path) -> io::Result<Option<Located>> {
    let extended = with_extension(path);
    match fs::metadata(&extended) {
        Ok(metadata) if metadata.is_file() => {
            return Ok(Some(Located {
                path: extended,
                metadata,
            }))
        }
        Ok(_) => {}
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {}
    }
    lookup(path)
}

/// Returns `true` if every component of `name` is a plain path segment.
///
/// Rejects `.`, `..`, absolute paths and drive prefixes.
pub fn is_plain_relative(name: &str) -> bool {
    let mut components = Path::new(name).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// Returns `true` if `name` is exactly one plain path segment.
pub fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Returns `true` if `path` names an in-flight or orphaned temp file.
pub fn is_temp_file(path: &Path) -> bool {
    path.to_str()
        .map(|s| s.ends_with(&format!(".{}{}", RECORD_EXTENSION, TEMP_SUFFIX)))
        .unwrap_or(false)
}

/// Makes `root` absolute against the current directory and folds `.` and
/// `..` components lexically. Symlinks are not resolved.
pub fn normalize_root(root: &Path) -> io::Result<PathBuf> {
    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()?.join(root)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_paths_layout() {
        let paths = RecordPaths::new(Path::new("/data"), "users", "alice");
        assert_eq!(paths.collection_dir, PathBuf::from("/data/users"));
        assert_eq!(paths.final_path, PathBuf::from("/data/users/alice.json"));
        assert_eq!(paths.temp_path, PathBuf::from("/data/users/alice.json.tmp"));
    }

    #[test]
    fn test_record_paths_keep_dots_in_names() {
        let paths = RecordPaths::new(Path::new("/data"), "users", "John Doe v1.2");
        assert_eq!(
            paths.final_path,
            PathBuf::from("/data/users/John Doe v1.2.json")
        );
    }

    #[test]
    fn test_normalize_root_folds_components() {
        let root = normalize_root(Path::new("/var/./lib/../db/")).unwrap();
        assert_eq!(root, PathBuf::from("/var/db"));
    }

    #[test]
    fn test_normalize_root_makes_relative_absolute() {
        let root = normalize_root(Path::new("data")).unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("data"));
    }

    #[test]
    fn test_lookup_falls_back_to_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("alice.json"), "{}\n").unwrap();

        let found = lookup(&tmp.path().join("alice")).unwrap().unwrap();
        assert_eq!(found.path, tmp.path().join("alice.json"));
        assert!(found.is_file());

        let direct = lookup(&tmp.path().join("alice.json")).unwrap().unwrap();
        assert_eq!(direct.path, tmp.path().join("alice.json"));
    }

    #[test]
    fn test_lookup_prefers_bare_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("users")).unwrap();
        let found = lookup(&tmp.path().join("users")).unwrap().unwrap();
        assert!(found.is_dir());
        assert_eq!(found.path, tmp.path().join("users"));
    }

    #[test]
    fn test_resolve_record_prefers_extended_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.json"), "\"a\"\n").unwrap();
        fs::write(tmp.path().join("a.json.json"), "\"a.json\"\n").unwrap();

        let found = resolve_record(&tmp.path().join("a.json")).unwrap().unwrap();
        assert_eq!(found.path, tmp.path().join("a.json.json"));

        let found = resolve_record(&tmp.path().join("a")).unwrap().unwrap();
        assert_eq!(found.path, tmp.path().join("a.json"));
    }

    #[test]
    fn test_resolve_record_falls_back_to_bare_match() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("alice.json"), "{}\n").unwrap();
        fs::create_dir(tmp.path().join("archive")).unwrap();

        let found = resolve_record(&tmp.path().join("alice.json")).unwrap().unwrap();
        assert_eq!(found.path, tmp.path().join("alice.json"));

        let found = resolve_record(&tmp.path().join("archive")).unwrap().unwrap();
        assert!(found.is_dir());
        assert!(resolve_record(&tmp.path().join("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_name_segments() {
        assert!(is_single_segment("users"));
        assert!(is_single_segment("John Doe v1.2"));
        assert!(!is_single_segment(".."));
        assert!(!is_single_segment("."));
        assert!(!is_single_segment("a/b"));
        assert!(!is_single_segment("/abs"));
        assert!(!is_single_segment(""));

        assert!(is_plain_relative("alice"));
        assert!(is_plain_relative("archive/old"));
        assert!(!is_plain_relative(".."));
        assert!(!is_plain_relative("a/../../orders"));
        assert!(!is_plain_relative("/etc/passwd"));
        assert!(!is_plain_relative(""));
    }

    #[test]
    fn test_lookup_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(lookup(&tmp.path().join("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/d/users/alice.json.tmp")));
        assert!(!is_temp_file(Path::new("/d/users/alice.json")));
        assert!(!is_temp_file(Path::new("/d/users/notes.tmp")));
    }
}
