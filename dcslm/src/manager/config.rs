//! Configuration for the livery manager.

use std::path::PathBuf;
use std::time::Duration;

/// Default name of the tool's own folder under the game root.
pub const DEFAULT_WORK_DIR: &str = "DCSLM";

/// Name of the central index file inside the work directory.
pub const INDEX_FILENAME: &str = "dcslm.json";

/// Configuration for the livery manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// The game's saved-games folder.
    ///
    /// Install paths are relative to it, and every destructive operation is
    /// checked against it.
    pub root_dir: PathBuf,

    /// Folder holding the index, downloads and extraction output, relative to
    /// `root_dir`.
    pub work_dir: PathBuf,

    /// Whether to keep downloaded archives after installation.
    pub keep_archives: bool,

    /// HTTP request timeout for downloads.
    pub download_timeout: Duration,

    /// Mod-manager mode for a newly created index.
    ///
    /// An existing index keeps the setting stored in its `config` object.
    pub mod_manager_mode: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            root_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            keep_archives: false,
            download_timeout: Duration::from_secs(300),
            mod_manager_mode: false,
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration rooted at the given game folder.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    /// Set the work directory (relative to the root).
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Enable or disable keeping downloaded archives.
    pub fn with_keep_archives(mut self, keep: bool) -> Self {
        self.keep_archives = keep;
        self
    }

    /// Set the download timeout.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Enable or disable mod-manager mode.
    pub fn with_mod_manager_mode(mut self, enabled: bool) -> Self {
        self.mod_manager_mode = enabled;
        self
    }

    /// Absolute work directory.
    pub fn work_path(&self) -> PathBuf {
        self.root_dir.join(&self.work_dir)
    }

    /// Root of all temporary extraction output.
    pub fn temp_dir(&self) -> PathBuf {
        self.work_path().join("tmp")
    }

    /// Extraction directory for one item.
    pub fn extract_dir(&self, id: u64) -> PathBuf {
        self.temp_dir().join(id.to_string())
    }

    /// Directory for downloaded archives.
    pub fn archive_dir(&self) -> PathBuf {
        self.work_path().join("archives")
    }

    /// Path of the central index file.
    pub fn index_path(&self) -> PathBuf {
        self.work_path().join(INDEX_FILENAME)
    }

    /// Directory with user unit definitions.
    pub fn units_dir(&self) -> PathBuf {
        self.work_path().join("units")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.work_dir, PathBuf::from("DCSLM"));
        assert!(!config.keep_archives);
        assert!(!config.mod_manager_mode);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ManagerConfig::new("/games/dcs")
            .with_work_dir("tools")
            .with_keep_archives(true)
            .with_download_timeout(Duration::from_secs(60))
            .with_mod_manager_mode(true);

        assert_eq!(config.root_dir, PathBuf::from("/games/dcs"));
        assert!(config.keep_archives);
        assert_eq!(config.download_timeout, Duration::from_secs(60));
        assert!(config.mod_manager_mode);
    }

    #[test]
    fn test_derived_paths_are_keyed_by_id() {
        let config = ManagerConfig::new("/games/dcs");
        assert_eq!(config.index_path(), PathBuf::from("/games/dcs/DCSLM/dcslm.json"));
        assert_eq!(config.extract_dir(7), PathBuf::from("/games/dcs/DCSLM/tmp/7"));
        assert_ne!(config.extract_dir(7), config.extract_dir(8));
        assert_eq!(config.archive_dir(), PathBuf::from("/games/dcs/DCSLM/archives"));
    }
}
