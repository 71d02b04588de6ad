//! Livery install pipeline.
//!
//! This module takes a skin pack from archive to installed livery.
//!
//! # Overview
//!
//! The install workflow:
//! 1. Resolve metadata through a [`MetadataProvider`] (remote packs only)
//! 2. Download the archive with an [`ArchiveDownloader`]
//! 3. Extract it with the [`RecursiveExtractor`] into `<work>/tmp/<id>`
//! 4. Classify folders ([`detect`]) as skin, data or irrelevant
//! 5. Plan one install path per folder and unit ([`plan_paths`])
//! 6. Copy payload files ([`FileInstaller`]), write sidecars, register
//!
//! [`LiveryInstaller`] runs the whole sequence and rolls back partial state
//! when a step fails or the [`CancelFlag`] is set.
//!
//! # Example
//!
//! ```ignore
//! use dcslm::manager::{InstallRequest, LiveryInstaller, ManagerConfig};
//! use dcslm::registry::Registry;
//! use dcslm::units::MemoryUnitCatalog;
//!
//! let config = ManagerConfig::new("/home/me/Saved Games/DCS");
//! let catalog = MemoryUnitCatalog::with_defaults();
//! let mut registry = Registry::from_config(&config)?;
//!
//! let installer = LiveryInstaller::new(&config, &catalog);
//! let request = InstallRequest::archive("Viper Demo.zip", vec!["f-16c".into()]);
//! let result = installer.install(&mut registry, &request)?;
//! println!("Installed {} as {}", result.livery.title(), result.livery.id);
//! ```

mod cancel;
mod config;
mod detector;
mod download;
mod error;
mod extractor;
mod installer;
mod planner;
mod traits;

pub use cancel::CancelFlag;
pub use config::{ManagerConfig, DEFAULT_WORK_DIR, INDEX_FILENAME};
pub use detector::{
    classify, detect, group_files_by_folder, FilesByFolder, FolderCandidate, FolderKind,
};
pub use download::{archive_file_name, DirectLinkProvider, HttpDownloader};
pub use error::{ManagerError, ManagerResult};
pub use extractor::{
    is_archive, ArchiveFormat, ExtractedRoot, RecursiveExtractor, SevenZipExtractor,
    ShellExtractor, ZipExtractor,
};
pub use installer::{
    is_payload_file, FileInstaller, InstallProgressCallback, InstallRequest, InstallResult,
    InstallSource, InstallStage, LiveryInstaller,
};
pub use planner::{candidate_for, plan_paths, InstallPath};
pub use traits::{ArchiveDownloader, ArchiveExtractor, MetadataProvider, ProgressCallback};
