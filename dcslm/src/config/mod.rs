//! Persistent user configuration.
//!
//! Settings live in an INI file at `<config dir>/dcslm/config.ini`:
//!
//! ```ini
//! [paths]
//! root_dir = C:\Users\me\Saved Games\DCS
//! work_dir = DCSLM
//!
//! [install]
//! keep_archives = false
//! download_timeout_secs = 300
//!
//! [optimize]
//! keep_unused = false
//! backup_config = true
//!
//! [logging]
//! level = info
//! file = dcslm.log
//! ```
//!
//! A missing file yields the defaults. [`ConfigKey`] addresses single
//! settings as `section.key` for the `config` command.

mod file;
mod keys;

pub use file::{config_file_path, ConfigError, ConfigFile, InstallSettings, LoggingSettings,
    OptimizeSettings, PathSettings};
pub use keys::ConfigKey;
