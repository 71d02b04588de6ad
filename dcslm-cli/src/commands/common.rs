//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use dcslm::config::ConfigFile;
use dcslm::manager::{CancelFlag, ManagerConfig};
use dcslm::registry::Registry;
use dcslm::units::MemoryUnitCatalog;

use crate::error::CliError;

/// Everything a command needs to work on the game folder.
pub struct Session {
    pub config: ConfigFile,
    pub manager: ManagerConfig,
    pub registry: Registry,
    pub catalog: MemoryUnitCatalog,
}

impl Session {
    /// Open the registry and unit catalog for the configured game folder.
    ///
    /// `root` from the command line overrides the configured root.
    pub fn open(config: ConfigFile, root: Option<PathBuf>) -> Result<Self, CliError> {
        let manager = config.manager_config(root);
        if !manager.root_dir.is_dir() {
            return Err(CliError::Config(format!(
                "Game folder {} does not exist. Use --root or set paths.root_dir.",
                manager.root_dir.display()
            )));
        }

        let registry = Registry::from_config(&manager)?;
        let manager = manager.with_mod_manager_mode(registry.mod_manager_mode());
        let catalog = load_catalog(&manager);
        debug!(
            root = %manager.root_dir.display(),
            liveries = registry.len(),
            "Opened session"
        );

        Ok(Self {
            config,
            manager,
            registry,
            catalog,
        })
    }
}

/// Built-in units plus user definitions from the work directory.
pub fn load_catalog(manager: &ManagerConfig) -> MemoryUnitCatalog {
    let mut catalog = MemoryUnitCatalog::with_defaults();
    let units_dir = manager.units_dir();
    if units_dir.is_dir() {
        let loaded = catalog.load_overrides(&units_dir);
        debug!(dir = %units_dir.display(), units = loaded, "Loaded unit definitions");
    }
    catalog
}

/// Set the cancel flag on Ctrl-C.
pub fn cancel_on_interrupt() -> CancelFlag {
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nCancelling after the current file...");
        handler_flag.cancel();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }
    cancel
}

/// Ids to operate on: every registered livery with `all`, else the given ids.
pub fn select_ids(registry: &Registry, ids: &[u64], all: bool) -> Result<Vec<u64>, CliError> {
    if all {
        return Ok(registry.list().iter().map(|l| l.id).collect());
    }
    if ids.is_empty() {
        return Err(CliError::Config(
            "No liveries selected. Pass one or more ids or --all.".to_string(),
        ));
    }
    Ok(ids.to_vec())
}

/// A spinner for long single-line operations.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Format a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
