//! Error types for the livery install pipeline.

use std::io;
use std::path::PathBuf;

use crate::registry::RegistryError;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur while installing a livery.
///
/// Every variant is fatal for the item being processed only; batch
/// operations report it and continue with the next item.
#[derive(Debug)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write or copy a file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a file or directory.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Archive extraction failed.
    ExtractionFailed { path: PathBuf, reason: String },

    /// Archive format is not recognized.
    UnsupportedArchive(PathBuf),

    /// Failed to download the archive.
    DownloadFailed { url: String, reason: String },

    /// Network timeout.
    Timeout { url: String, timeout_secs: u64 },

    /// Failed to resolve remote metadata.
    MetadataFailed { source_id: String, reason: String },

    /// The extracted archive holds no livery folders.
    NoSkinFolders { archive: PathBuf },

    /// A requested unit is not in the catalog.
    UnitNotFound(String),

    /// No target units were given.
    NoTargetUnits,

    /// The livery is already registered.
    AlreadyInstalled { id: u64 },

    /// Another operation holds the livery.
    ItemBusy { id: u64 },

    /// An install target already exists and is not owned by the livery.
    DestinationExists { path: PathBuf },

    /// The operation was cancelled by the user.
    Cancelled,

    /// A destructive operation targeted a path outside the working root.
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// Invalid path provided.
    InvalidPath(String),

    /// Persisting the install failed.
    Registry(RegistryError),
}

impl std::fmt::Display for ManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
            Self::ExtractionFailed { path, reason } => {
                write!(f, "failed to extract {}: {}", path.display(), reason)
            }
            Self::UnsupportedArchive(path) => {
                write!(f, "unsupported archive format: {}", path.display())
            }
            Self::DownloadFailed { url, reason } => {
                write!(f, "failed to download {}: {}", url, reason)
            }
            Self::Timeout { url, timeout_secs } => {
                write!(f, "request to {} timed out after {}s", url, timeout_secs)
            }
            Self::MetadataFailed { source_id, reason } => {
                write!(f, "failed to resolve metadata for {}: {}", source_id, reason)
            }
            Self::NoSkinFolders { archive } => {
                write!(f, "no livery folders found in {}", archive.display())
            }
            Self::UnitNotFound(name) => write!(f, "unknown unit: {}", name),
            Self::NoTargetUnits => write!(f, "no target units selected"),
            Self::AlreadyInstalled { id } => write!(f, "livery {} is already installed", id),
            Self::ItemBusy { id } => {
                write!(f, "livery {} is being modified by another operation", id)
            }
            Self::DestinationExists { path } => {
                write!(f, "destination already exists: {}", path.display())
            }
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::PathOutsideRoot { path, root } => {
                write!(
                    f,
                    "refusing to modify {}: outside of working root {}",
                    path.display(),
                    root.display()
                )
            }
            Self::InvalidPath(msg) => write!(f, "invalid path: {}", msg),
            Self::Registry(e) => write!(f, "registry error: {}", e),
        }
    }
}

impl std::error::Error for ManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::RemoveFailed { source, .. } => Some(source),
            Self::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for ManagerError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::PathOutsideRoot { path, root } => Self::PathOutsideRoot { path, root },
            other => Self::Registry(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManagerError::UnitNotFound("f-99".to_string());
        assert_eq!(err.to_string(), "unknown unit: f-99");
    }

    #[test]
    fn test_path_outside_root_display() {
        let err = ManagerError::PathOutsideRoot {
            path: PathBuf::from("/etc"),
            root: PathBuf::from("/games/dcs"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc"));
        assert!(msg.contains("/games/dcs"));
    }

    #[test]
    fn test_destination_exists_display() {
        let err = ManagerError::DestinationExists {
            path: PathBuf::from("Liveries/f-16c/Skin"),
        };
        assert_eq!(err.to_string(), "destination already exists: Liveries/f-16c/Skin");
    }

    #[test]
    fn test_io_source_is_exposed() {
        use std::error::Error;

        let err = ManagerError::ReadFailed {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(ManagerError::Cancelled.source().is_none());
    }
}
