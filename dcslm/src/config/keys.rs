//! Addressable configuration keys.

use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigError, ConfigFile};

/// One setting of the configuration file, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    PathsRootDir,
    PathsWorkDir,
    InstallKeepArchives,
    InstallDownloadTimeoutSecs,
    OptimizeKeepUnused,
    OptimizeBackupConfig,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// Every key in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::PathsRootDir,
            Self::PathsWorkDir,
            Self::InstallKeepArchives,
            Self::InstallDownloadTimeoutSecs,
            Self::OptimizeKeepUnused,
            Self::OptimizeBackupConfig,
            Self::LoggingLevel,
            Self::LoggingFile,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            Self::PathsRootDir | Self::PathsWorkDir => "paths",
            Self::InstallKeepArchives | Self::InstallDownloadTimeoutSecs => "install",
            Self::OptimizeKeepUnused | Self::OptimizeBackupConfig => "optimize",
            Self::LoggingLevel | Self::LoggingFile => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            Self::PathsRootDir => "root_dir",
            Self::PathsWorkDir => "work_dir",
            Self::InstallKeepArchives => "keep_archives",
            Self::InstallDownloadTimeoutSecs => "download_timeout_secs",
            Self::OptimizeKeepUnused => "keep_unused",
            Self::OptimizeBackupConfig => "backup_config",
            Self::LoggingLevel => "level",
            Self::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::PathsRootDir => config
                .paths
                .root_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            Self::PathsWorkDir => config.paths.work_dir.display().to_string(),
            Self::InstallKeepArchives => config.install.keep_archives.to_string(),
            Self::InstallDownloadTimeoutSecs => config.install.download_timeout_secs.to_string(),
            Self::OptimizeKeepUnused => config.optimize.keep_unused.to_string(),
            Self::OptimizeBackupConfig => config.optimize.backup_config.to_string(),
            Self::LoggingLevel => config.logging.level.clone(),
            Self::LoggingFile => config.logging.file.clone().unwrap_or_default(),
        }
    }

    /// Parse and store a value. An empty value clears optional settings.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            Self::PathsRootDir => {
                config.paths.root_dir = non_empty(value).map(PathBuf::from);
            }
            Self::PathsWorkDir => {
                let dir = non_empty(value).ok_or_else(|| self.invalid(value, "must not be empty"))?;
                config.paths.work_dir = PathBuf::from(dir);
            }
            Self::InstallKeepArchives => config.install.keep_archives = self.parse_bool(value)?,
            Self::InstallDownloadTimeoutSecs => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a number of seconds"))?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                config.install.download_timeout_secs = secs;
            }
            Self::OptimizeKeepUnused => config.optimize.keep_unused = self.parse_bool(value)?,
            Self::OptimizeBackupConfig => config.optimize.backup_config = self.parse_bool(value)?,
            Self::LoggingLevel => {
                let level = non_empty(value).ok_or_else(|| self.invalid(value, "must not be empty"))?;
                config.logging.level = level.to_string();
            }
            Self::LoggingFile => config.logging.file = non_empty(value).map(str::to_string),
        }
        Ok(())
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let key: ConfigKey = "install.keep_archives".parse().unwrap();
        assert_eq!(key, ConfigKey::InstallKeepArchives);
        assert!("install.nope".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_get_set() {
        let mut config = ConfigFile::default();
        ConfigKey::OptimizeKeepUnused.set(&mut config, "yes").unwrap();
        assert_eq!(ConfigKey::OptimizeKeepUnused.get(&config), "true");

        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert_eq!(ConfigKey::LoggingFile.get(&config), "");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::InstallDownloadTimeoutSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::InstallDownloadTimeoutSecs.set(&mut config, "soon").is_err());
        assert!(ConfigKey::PathsWorkDir.set(&mut config, " ").is_err());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ConfigKey::all().iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
    }
}
