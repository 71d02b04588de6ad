//! Containment checks for destructive filesystem operations.
//!
//! Every directory removal and file deletion performed by the tool goes
//! through this module. A target is accepted only if its resolved location
//! lies strictly below the working root; symlinks are resolved first so a
//! link inside the root cannot redirect a deletion outside it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

/// A path that resolved outside the working root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutsideRoot {
    /// Rejected path.
    pub path: PathBuf,
    /// Working root it was checked against.
    pub root: PathBuf,
}

impl fmt::Display for OutsideRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is outside of working root {}",
            self.path.display(),
            self.root.display()
        )
    }
}

impl std::error::Error for OutsideRoot {}

/// Failure of a checked removal.
#[derive(Debug)]
pub enum RemoveError {
    /// The target failed the containment check.
    Outside(OutsideRoot),
    /// The filesystem refused the removal.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RemoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outside(e) => write!(f, "{}", e),
            Self::Io { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RemoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Outside(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Resolve `target` and verify it lies strictly below `root`.
///
/// Returns the resolved path on success.
pub fn ensure_within_root(root: &Path, target: &Path) -> Result<PathBuf, OutsideRoot> {
    let outside = || OutsideRoot {
        path: target.to_path_buf(),
        root: root.to_path_buf(),
    };

    let resolved_root = resolve(root);
    let absolute = if target.is_absolute() {
        target.to_path_buf()
    } else {
        root.join(target)
    };
    let resolved = resolve(&absolute);

    if resolved != resolved_root && resolved.starts_with(&resolved_root) {
        Ok(resolved)
    } else {
        Err(outside())
    }
}

/// Recursively remove a directory after a containment check.
///
/// A missing directory is not an error.
pub fn remove_dir_checked(root: &Path, dir: &Path) -> Result<(), RemoveError> {
    let resolved = ensure_within_root(root, dir).map_err(RemoveError::Outside)?;
    if !resolved.exists() {
        return Ok(());
    }
    debug!(path = %resolved.display(), "Removing directory");
    fs::remove_dir_all(&resolved).map_err(|source| RemoveError::Io {
        path: resolved,
        source,
    })
}

/// Remove a single file after a containment check.
pub fn remove_file_checked(root: &Path, file: &Path) -> Result<(), RemoveError> {
    let resolved = ensure_within_root(root, file).map_err(RemoveError::Outside)?;
    debug!(path = %resolved.display(), "Removing file");
    fs::remove_file(&resolved).map_err(|source| RemoveError::Io {
        path: resolved,
        source,
    })
}

/// Remove empty parent directories of `path`, stopping at `root`.
///
/// Used after uninstalling so no empty unit folders are left behind.
pub fn remove_empty_ancestors(root: &Path, path: &Path) {
    let resolved_root = resolve(root);
    let mut current = path.parent().map(Path::to_path_buf);

    while let Some(dir) = current {
        let resolved = resolve(&dir);
        if resolved == resolved_root || !resolved.starts_with(&resolved_root) {
            break;
        }
        let is_empty = fs::read_dir(&resolved)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            break;
        }
        if let Err(e) = fs::remove_dir(&resolved) {
            warn!(path = %resolved.display(), error = %e, "Failed to remove empty directory");
            break;
        }
        current = dir.parent().map(Path::to_path_buf);
    }
}

/// Canonicalize as much of a path as exists, normalizing the rest lexically.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve(parent).join(name)
        }
        _ => lexical_normalize(path),
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
