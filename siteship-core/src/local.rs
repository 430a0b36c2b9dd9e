//! Content-root scan.
//!
//! Walks the root recursively, drops directory entries and keys every other
//! entry by its root-relative, `/`-joined path. No exclusion patterns and no
//! symlink-loop protection: every non-directory entry participates.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::error::CoreError;
use crate::types::{LocalFile, RelativeKey};

/// Fail unless `root` exists and is a directory.
pub fn ensure_root(root: &Path) -> Result<(), CoreError> {
    if !root.exists() {
        return Err(CoreError::MissingRoot {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(CoreError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Derive the object key for `path` under `root`.
pub fn relative_key(root: &Path, path: &Path) -> Result<RelativeKey, CoreError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| CoreError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| CoreError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(RelativeKey(parts.join("/")))
}

/// Enumerate every non-directory file under `root`.
pub fn scan(root: &Path) -> Result<BTreeMap<RelativeKey, LocalFile>, CoreError> {
    ensure_root(root)?;

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        // `Path::is_dir` follows symlinks, so a link to a directory is skipped too.
        if entry.path().is_dir() {
            continue;
        }
        let key = relative_key(root, entry.path())?;
        files.insert(key.clone(), LocalFile::new(key, entry.path()));
    }
    Ok(files)
}
