//! Livery installer.
//!
//! This module orchestrates the full installation workflow:
//! 1. Resolve metadata (remote) or name the local archive
//! 2. Download the archive if needed
//! 3. Extract it, expanding nested archives
//! 4. Detect skin and data folders
//! 5. Plan install paths and copy payload files
//! 6. Write sidecars, register and persist
//! 7. Clean up temporary files
//!
//! Any failure after work on disk started rolls back the item's partial
//! state before the error is returned.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::livery::{destination_root, id_from_url, sanitize_title, Livery, Metadata};
use crate::registry::Registry;
use crate::safety::{ensure_within_root, remove_dir_checked, remove_empty_ancestors};
use crate::units::{resolve_install_folders, UnitCatalog};

use super::cancel::CancelFlag;
use super::config::ManagerConfig;
use super::detector::{detect, group_files_by_folder, FolderCandidate};
use super::download::archive_file_name;
use super::error::{ManagerError, ManagerResult};
use super::extractor::RecursiveExtractor;
use super::planner::{candidate_for, plan_paths};
use super::traits::{ArchiveDownloader, MetadataProvider};

/// OS-incidental file names never copied into an install.
const DENY_LIST: &[&str] = &["thumbs.db", "desktop.ini", ".ds_store", "ehthumbs.db"];

/// Progress callback for installation operations.
///
/// # Arguments
///
/// * `stage` - Current installation stage
/// * `message` - Human-readable message
pub type InstallProgressCallback = Box<dyn Fn(InstallStage, &str) + Send + Sync>;

/// Installation stages for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Resolving remote metadata.
    FetchingMetadata,
    /// Downloading the archive.
    Downloading,
    /// Extracting archive contents.
    Extracting,
    /// Classifying extracted folders.
    Detecting,
    /// Copying files to their install paths.
    Installing,
    /// Removing temporary files.
    Cleanup,
    /// Installation complete.
    Complete,
}

impl InstallStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchingMetadata => "Fetching metadata",
            Self::Downloading => "Downloading",
            Self::Extracting => "Extracting",
            Self::Detecting => "Detecting",
            Self::Installing => "Installing",
            Self::Cleanup => "Cleaning up",
            Self::Complete => "Complete",
        }
    }
}

/// Where the archive of a livery comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Archive already on disk.
    Archive(PathBuf),
    /// Remote identifier or URL, resolved through the metadata provider.
    Remote(String),
}

/// One livery to install.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub source: InstallSource,
    /// Generic unit names to install for.
    pub units: Vec<String>,
    /// Title override.
    pub title: Option<String>,
}

impl InstallRequest {
    /// Install from a local archive.
    pub fn archive(path: impl Into<PathBuf>, units: Vec<String>) -> Self {
        Self {
            source: InstallSource::Archive(path.into()),
            units,
            title: None,
        }
    }

    /// Install from a remote identifier or URL.
    pub fn remote(id_or_url: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            source: InstallSource::Remote(id_or_url.into()),
            units,
            title: None,
        }
    }

    /// Override the livery title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Text identifying the request in logs and reports.
    pub fn label(&self) -> String {
        match &self.source {
            InstallSource::Archive(path) => path.display().to_string(),
            InstallSource::Remote(id) => id.clone(),
        }
    }
}

/// Result of a livery installation.
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// The registered livery.
    pub livery: Livery,
    /// Total bytes downloaded (0 for local archives).
    pub bytes_downloaded: u64,
    /// Number of files copied across all install paths.
    pub files_copied: usize,
}

/// Whether a file name belongs in an install.
///
/// Rejects OS-incidental files and names without an extension.
pub fn is_payload_file(name: &str) -> bool {
    if DENY_LIST.contains(&name.to_ascii_lowercase().as_str()) {
        return false;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty(),
        None => false,
    }
}

/// Copies a detected folder's files into an install path.
#[derive(Debug, Default)]
pub struct FileInstaller;

impl FileInstaller {
    /// Copy every payload file of `candidate` into `dest`.
    ///
    /// `dest` is created if absent. Cancellation is checked between files.
    /// Returns the number of files copied.
    pub fn copy(
        &self,
        candidate: &FolderCandidate,
        dest: &Path,
        cancel: &CancelFlag,
    ) -> ManagerResult<usize> {
        fs::create_dir_all(dest).map_err(|e| ManagerError::CreateDirFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        let mut copied = 0;
        for file in &candidate.files {
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_payload_file(name) {
                debug!(file = name, "Skipping non-payload file");
                continue;
            }
            cancel.check()?;

            let target = dest.join(name);
            fs::copy(file, &target).map_err(|e| ManagerError::WriteFailed {
                path: target.clone(),
                source: e,
            })?;
            copied += 1;
        }
        Ok(copied)
    }
}

/// On-disk state created by an install, removed again on failure.
#[derive(Debug, Default)]
struct PartialInstall {
    extract_dir: Option<PathBuf>,
    downloaded_archive: Option<PathBuf>,
    created_dirs: Vec<PathBuf>,
}

/// Livery installer.
///
/// Handles the complete installation workflow including downloading,
/// extraction, detection, copying and registration.
pub struct LiveryInstaller<'a> {
    config: &'a ManagerConfig,
    catalog: &'a dyn UnitCatalog,
    extractor: RecursiveExtractor,
    files: FileInstaller,
    downloader: Option<Box<dyn ArchiveDownloader>>,
    metadata: Option<Box<dyn MetadataProvider>>,
    cancel: CancelFlag,
    on_progress: Option<InstallProgressCallback>,
}

impl<'a> LiveryInstaller<'a> {
    /// Create a new livery installer.
    ///
    /// # Arguments
    ///
    /// * `config` - Manager configuration (root, work directory, archive policy)
    /// * `catalog` - Unit catalog used to resolve target units
    pub fn new(config: &'a ManagerConfig, catalog: &'a dyn UnitCatalog) -> Self {
        Self {
            config,
            catalog,
            extractor: RecursiveExtractor::new(),
            files: FileInstaller,
            downloader: None,
            metadata: None,
            cancel: CancelFlag::new(),
            on_progress: None,
        }
    }

    /// Set the downloader for remote archives.
    pub fn with_downloader(mut self, downloader: Box<dyn ArchiveDownloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// Set the metadata provider for remote identifiers.
    pub fn with_metadata_provider(mut self, provider: Box<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    /// Replace the archive extractor.
    pub fn with_extractor(mut self, extractor: RecursiveExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Set a progress callback.
    pub fn with_progress(mut self, callback: InstallProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    fn report(&self, stage: InstallStage, message: &str) {
        if let Some(ref cb) = self.on_progress {
            cb(stage, message);
        }
    }

    /// Install one livery, register it and save the index.
    pub fn install(
        &self,
        registry: &mut Registry,
        request: &InstallRequest,
    ) -> ManagerResult<InstallResult> {
        let units = resolve_install_folders(self.catalog, &request.units)
            .map_err(ManagerError::UnitNotFound)?;
        if units.is_empty() {
            return Err(ManagerError::NoTargetUnits);
        }

        let (id, metadata) = self.resolve(registry, request)?;
        if registry.contains(id) {
            return Err(ManagerError::AlreadyInstalled { id });
        }
        let locks = registry.locks().clone();
        let _guard = locks.try_acquire(id).ok_or(ManagerError::ItemBusy { id })?;

        let mut livery = Livery::new(id, metadata);
        livery.destination_root = destination_root(livery.title(), registry.mod_manager_mode());

        let mut partial = PartialInstall::default();
        match self.run(registry, &mut livery, request, &units, &mut partial) {
            Ok(result) => {
                self.report(InstallStage::Complete, "Installation complete");
                info!(
                    id = id,
                    title = %result.livery.title(),
                    folders = result.livery.installs.len(),
                    units = result.livery.target_units.len(),
                    "Installed livery"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(id = id, error = %e, "Install failed, rolling back");
                self.rollback(&partial);
                Err(e)
            }
        }
    }

    /// Install several liveries.
    ///
    /// A failed item does not stop the batch; cancellation does.
    pub fn install_many(
        &self,
        registry: &mut Registry,
        requests: &[InstallRequest],
    ) -> Vec<(String, ManagerResult<InstallResult>)> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self.install(registry, request);
            let cancelled = matches!(result, Err(ManagerError::Cancelled));
            results.push((request.label(), result));
            if cancelled {
                break;
            }
        }
        results
    }

    fn resolve(&self, registry: &Registry, request: &InstallRequest) -> ManagerResult<(u64, Metadata)> {
        match &request.source {
            InstallSource::Archive(path) => {
                if !path.is_file() {
                    return Err(ManagerError::InvalidPath(format!(
                        "archive not found: {}",
                        path.display()
                    )));
                }
                let title = match &request.title {
                    Some(title) => title.clone(),
                    None => path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or_default()
                        .to_string(),
                };
                let title = sanitize_title(&title);
                if title.is_empty() {
                    return Err(ManagerError::InvalidPath(format!(
                        "cannot derive a title from {}",
                        path.display()
                    )));
                }
                Ok((registry.next_local_id(), Metadata::titled(title)))
            }
            InstallSource::Remote(id_or_url) => {
                self.report(InstallStage::FetchingMetadata, id_or_url);
                let provider = self.metadata.as_ref().ok_or_else(|| ManagerError::MetadataFailed {
                    source_id: id_or_url.clone(),
                    reason: "no metadata provider configured".to_string(),
                })?;
                let mut metadata = provider.resolve(id_or_url)?;
                if let Some(title) = &request.title {
                    metadata.title = title.clone();
                }
                metadata.title = sanitize_title(&metadata.title);
                if metadata.title.is_empty() || !metadata.is_remote() {
                    return Err(ManagerError::MetadataFailed {
                        source_id: id_or_url.clone(),
                        reason: "metadata has no title or download link".to_string(),
                    });
                }
                let id = id_from_url(id_or_url).unwrap_or_else(|| registry.next_local_id());
                Ok((id, metadata))
            }
        }
    }

    fn run(
        &self,
        registry: &mut Registry,
        livery: &mut Livery,
        request: &InstallRequest,
        units: &[String],
        partial: &mut PartialInstall,
    ) -> ManagerResult<InstallResult> {
        let root = &self.config.root_dir;

        // Archive
        let mut bytes_downloaded = 0;
        let archive = match &request.source {
            InstallSource::Archive(path) => path.clone(),
            InstallSource::Remote(_) => {
                let downloader = self.downloader.as_ref().ok_or_else(|| ManagerError::DownloadFailed {
                    url: livery.metadata.download.clone(),
                    reason: "no downloader configured".to_string(),
                })?;
                let file_name = archive_file_name(&livery.metadata.download)
                    .unwrap_or_else(|| format!("{}.zip", livery.id));
                let dest = self.config.archive_dir().join(file_name);
                self.report(InstallStage::Downloading, &livery.metadata.download);
                partial.downloaded_archive = Some(dest.clone());
                bytes_downloaded =
                    downloader.download(&livery.metadata.download, &dest, &self.cancel, None)?;
                dest
            }
        };
        livery.archive = archive.display().to_string();

        // Extract
        self.cancel.check()?;
        self.report(InstallStage::Extracting, &livery.archive);
        let extract_dir = self.config.extract_dir(livery.id);
        partial.extract_dir = Some(extract_dir.clone());
        let extracted = self.extractor.extract(&archive, &extract_dir, &self.cancel)?;

        // Detect
        self.report(InstallStage::Detecting, livery.title());
        let groups = group_files_by_folder(&extracted.path)?;
        let folders = detect(&groups, livery.title())?;
        if !folders.iter().any(|f| !f.is_data_folder) {
            return Err(ManagerError::NoSkinFolders { archive });
        }

        // Plan and copy
        let planned = plan_paths(livery, &folders, units);
        let mut copies = Vec::with_capacity(planned.len());
        for path in &planned {
            let Some(candidate) = candidate_for(path, &folders) else {
                continue;
            };
            let dest = root.join(&path.relative);
            ensure_within_root(root, &dest).map_err(|e| ManagerError::PathOutsideRoot {
                path: e.path,
                root: e.root,
            })?;
            let exists = dest.exists();
            if exists && registry.sidecar_owner(&dest) != Some(livery.id) {
                return Err(ManagerError::DestinationExists { path: dest });
            }
            copies.push((candidate, dest, exists));
        }

        self.report(InstallStage::Installing, livery.title());
        let mut files_copied = 0;
        for (candidate, dest, exists) in copies {
            self.cancel.check()?;
            if !exists {
                partial.created_dirs.push(dest.clone());
            }
            files_copied += self.files.copy(candidate, &dest, &self.cancel)?;
        }

        // Cleanup of temporary state; failures here are reported only.
        self.report(InstallStage::Cleanup, livery.title());
        remove_temp(root, &extract_dir);
        partial.extract_dir = None;
        if let Some(downloaded) = partial.downloaded_archive.take() {
            if !self.config.keep_archives {
                remove_temp(root, &downloaded);
                livery.archive.clear();
            }
        }

        registry.write_sidecars(livery)?;
        registry.register(livery.clone());
        registry.save()?;

        Ok(InstallResult {
            livery: livery.clone(),
            bytes_downloaded,
            files_copied,
        })
    }

    fn rollback(&self, partial: &PartialInstall) {
        let root = &self.config.root_dir;
        for dir in &partial.created_dirs {
            remove_temp(root, dir);
            remove_empty_ancestors(root, dir);
        }
        if let Some(dir) = &partial.extract_dir {
            remove_temp(root, dir);
        }
        if let Some(archive) = &partial.downloaded_archive {
            if !self.config.keep_archives {
                remove_temp(root, archive);
            }
        }
    }
}

/// Best-effort removal of a file or directory the installer created.
fn remove_temp(root: &Path, path: &Path) {
    if !path.exists() {
        return;
    }
    let result = if path.is_dir() {
        remove_dir_checked(root, path)
    } else {
        crate::safety::remove_file_checked(root, path)
    };
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Cleanup failed");
    }
}
