//! Registry error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised by the livery registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No livery with this id is registered.
    #[error("no livery with id {0} is installed")]
    NotFound(u64),

    /// The index file exists but cannot be parsed.
    #[error("index file {} is corrupt: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    /// Filesystem failure while reading or writing registry files.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A livery could not be serialized.
    #[error("failed to serialize livery {id}: {source}")]
    Serialize {
        id: u64,
        #[source]
        source: serde_json::Error,
    },

    /// A deletion target resolved outside the working root.
    #[error("refusing to touch {}: outside of working root {}", path.display(), root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
