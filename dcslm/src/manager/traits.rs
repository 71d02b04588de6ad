//! Trait seams of the install pipeline.
//!
//! External collaborators (remote metadata, downloads, archive backends) are
//! reached through these traits so the pipeline can be tested with local
//! fixtures.

use std::path::Path;

use crate::livery::Metadata;

use super::cancel::CancelFlag;
use super::error::ManagerResult;

/// Progress callback for downloads.
///
/// Arguments: (bytes_downloaded, total_bytes). Total is 0 when unknown.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Resolves livery metadata from a remote identifier or URL.
pub trait MetadataProvider: Send + Sync {
    /// Fetch the metadata record for an id or URL.
    fn resolve(&self, id_or_url: &str) -> ManagerResult<Metadata>;
}

/// Downloads archives to local storage.
pub trait ArchiveDownloader: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// Implementations remove a partial `dest` before returning an error.
    fn download(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancelFlag,
        progress: Option<&ProgressCallback>,
    ) -> ManagerResult<u64>;
}

/// Extracts one archive into a directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Whether this extractor handles the given archive.
    fn supports(&self, archive_path: &Path) -> bool;

    /// Extract the archive into `dest_dir`, returning the number of files written.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize>;
}
