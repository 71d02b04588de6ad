//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::manager::{ManagerConfig, DEFAULT_WORK_DIR};
use crate::optimizer::OptimizeOptions;

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be parsed.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value does not fit its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known `section.key`.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    /// Game saved-games folder; the current directory when unset.
    pub root_dir: Option<PathBuf>,
    pub work_dir: PathBuf,
}

/// `[install]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    pub keep_archives: bool,
    pub download_timeout_secs: u64,
}

/// `[optimize]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeSettings {
    pub keep_unused: bool,
    pub backup_config: bool,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive (`RUST_LOG` overrides it).
    pub level: String,
    /// Log file name inside the work directory; no file logging when unset.
    pub file: Option<String>,
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub paths: PathSettings,
    pub install: InstallSettings,
    pub optimize: OptimizeSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            paths: PathSettings {
                root_dir: None,
                work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            },
            install: InstallSettings {
                keep_archives: false,
                download_timeout_secs: 300,
            },
            optimize: OptimizeSettings {
                keep_unused: false,
                backup_config: true,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                file: Some("dcslm.log".to_string()),
            },
        }
    }
}

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dcslm")
        .join("config.ini")
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in super::ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_failed = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut ini = Ini::new();
        // Unset values are written empty so they load back as unset.
        for key in super::ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        ini.write_to_file(path).map_err(write_failed)
    }

    /// Manager configuration for this file's settings.
    ///
    /// `root_override` (e.g. from the command line) wins over `paths.root_dir`.
    pub fn manager_config(&self, root_override: Option<PathBuf>) -> ManagerConfig {
        let base = match root_override.or_else(|| self.paths.root_dir.clone()) {
            Some(root) => ManagerConfig::new(root),
            None => ManagerConfig::default(),
        };
        base.with_work_dir(&self.paths.work_dir)
            .with_keep_archives(self.install.keep_archives)
            .with_download_timeout(Duration::from_secs(self.install.download_timeout_secs))
    }

    /// Default optimization options from the `[optimize]` section.
    pub fn optimize_options(&self) -> OptimizeOptions {
        OptimizeOptions::new()
            .with_keep_unused(self.optimize.keep_unused)
            .with_backup_config(self.optimize.backup_config)
    }
}
