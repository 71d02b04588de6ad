//! Optimization error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::registry::RegistryError;

/// Result type for optimization.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that abort the optimization of one livery.
///
/// Missing texture references are not errors; they are listed in the report.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// No livery with this id is registered.
    #[error("no livery with id {0} is installed")]
    NotFound(u64),

    /// Another operation holds the livery.
    #[error("livery {0} is being modified by another operation")]
    ItemBusy(u64),

    /// Reading or writing a livery file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rewritten configuration holds a character its file encoding
    /// cannot store.
    #[error("cannot encode {character:?} in {}", path.display())]
    Unencodable { path: PathBuf, character: char },

    /// A write or delete target resolved outside the working root.
    #[error("refusing to modify {}: outside of working root {}", path.display(), root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// Persisting the result failed.
    #[error(transparent)]
    Registry(RegistryError),
}

impl OptimizeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<RegistryError> for OptimizeError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(id) => Self::NotFound(id),
            RegistryError::PathOutsideRoot { path, root } => Self::PathOutsideRoot { path, root },
            other => Self::Registry(other),
        }
    }
}
