//! Durable record of installed liveries.
//!
//! Two persistence surfaces are kept in sync:
//!
//! - the central index (`<work>/dcslm.json`), loaded wholesale and rewritten
//!   wholesale by [`Registry::save`]
//! - one sidecar file (`.dcslm.json`) per install path holding the full
//!   livery record, used to verify installs and to rebuild a lost index
//!
//! Mutating methods only change the in-memory index; callers persist with
//! [`Registry::save`] once their command has finished.

mod error;
mod index;
mod lock;

pub use error::{RegistryError, RegistryResult};
pub use index::{IndexConfig, IndexFile};
pub use lock::{ItemGuard, ItemLocks};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::livery::{Livery, LOCAL_ID_BASE};
use crate::manager::ManagerConfig;
use crate::safety::{ensure_within_root, remove_dir_checked, remove_empty_ancestors, RemoveError};

/// Name of the per-install sidecar file.
pub const SIDECAR_FILENAME: &str = ".dcslm.json";

/// Deepest level a sidecar can sit at below the root
/// (`DCSLM/<title>/Liveries/<unit>/<folder>/.dcslm.json`).
const SIDECAR_SCAN_DEPTH: usize = 6;

/// Registry of installed liveries.
#[derive(Debug)]
pub struct Registry {
    root: PathBuf,
    index_path: PathBuf,
    index: IndexFile,
    locks: ItemLocks,
}

impl Registry {
    /// Load the index at `index_path`, or start an empty one if it is missing.
    ///
    /// # Arguments
    ///
    /// * `root` - Game root that install paths are relative to
    /// * `index_path` - Location of the central index file
    /// * `mod_manager_mode` - Setting for a newly created index
    ///
    /// # Errors
    ///
    /// Returns `CorruptIndex` if the file exists but is not a valid index.
    pub fn open(
        root: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        mod_manager_mode: bool,
    ) -> RegistryResult<Self> {
        let root = root.into();
        let index_path = index_path.into();

        let index = if index_path.exists() {
            let text = fs::read_to_string(&index_path)
                .map_err(|e| RegistryError::io(&index_path, e))?;
            let index: IndexFile =
                serde_json::from_str(&text).map_err(|e| RegistryError::CorruptIndex {
                    path: index_path.clone(),
                    reason: e.to_string(),
                })?;
            debug!(
                path = %index_path.display(),
                liveries = index.liveries.len(),
                "Loaded index"
            );
            index
        } else {
            debug!(path = %index_path.display(), "No index found, starting empty");
            IndexFile::new(mod_manager_mode)
        };

        Ok(Self {
            root,
            index_path,
            index,
            locks: ItemLocks::new(),
        })
    }

    /// Open the registry described by a manager configuration.
    pub fn from_config(config: &ManagerConfig) -> RegistryResult<Self> {
        Self::open(
            &config.root_dir,
            config.index_path(),
            config.mod_manager_mode,
        )
    }

    /// Write the whole index back to disk.
    ///
    /// The file is written next to the target and renamed into place.
    pub fn save(&mut self) -> RegistryResult<()> {
        self.index.last_update_timestamp = chrono::Utc::now().timestamp();

        let json = serde_json::to_string_pretty(&self.index).map_err(|e| {
            RegistryError::Serialize { id: 0, source: e }
        })?;
        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        let tmp = self.index_path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| RegistryError::io(&tmp, e))?;
        fs::rename(&tmp, &self.index_path).map_err(|e| RegistryError::io(&self.index_path, e))?;

        debug!(path = %self.index_path.display(), "Saved index");
        Ok(())
    }

    /// Game root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-id locks shared by install and optimization.
    pub fn locks(&self) -> &ItemLocks {
        &self.locks
    }

    /// Whether new liveries go below a mod-manager root.
    pub fn mod_manager_mode(&self) -> bool {
        self.index.config.mod_manager_mode
    }

    /// Change the mod-manager setting for future installs.
    pub fn set_mod_manager_mode(&mut self, enabled: bool) {
        self.index.config.mod_manager_mode = enabled;
    }

    pub fn get(&self, id: u64) -> Option<&Livery> {
        self.index.liveries.get(&id)
    }

    /// Like [`get`](Self::get) but returns `NotFound` for unknown ids.
    pub fn require(&self, id: u64) -> RegistryResult<&Livery> {
        self.get(id).ok_or(RegistryError::NotFound(id))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.liveries.contains_key(&id)
    }

    /// Add a livery. Registering an id twice is a no-op returning `false`.
    pub fn register(&mut self, livery: Livery) -> bool {
        if self.contains(livery.id) {
            debug!(id = livery.id, "Livery already registered");
            return false;
        }
        self.index.liveries.insert(livery.id, livery);
        true
    }

    /// Replace the record of an already registered livery.
    pub fn update(&mut self, livery: Livery) -> RegistryResult<()> {
        match self.index.liveries.get_mut(&livery.id) {
            Some(existing) => {
                *existing = livery;
                Ok(())
            }
            None => Err(RegistryError::NotFound(livery.id)),
        }
    }

    /// Remove a livery from the index without touching its files.
    pub fn unregister(&mut self, id: u64) -> Option<Livery> {
        self.index.liveries.remove(&id)
    }

    /// All registered liveries ordered by id.
    pub fn list(&self) -> Vec<&Livery> {
        self.index.liveries.values().collect()
    }

    pub fn len(&self) -> usize {
        self.index.liveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.liveries.is_empty()
    }

    /// Next free id in the locally generated range.
    pub fn next_local_id(&self) -> u64 {
        let highest = self
            .index
            .liveries
            .keys()
            .copied()
            .filter(|&id| id > LOCAL_ID_BASE)
            .max()
            .unwrap_or(LOCAL_ID_BASE);
        highest + 1
    }

    /// Write the full livery record into every install path.
    pub fn write_sidecars(&self, livery: &Livery) -> RegistryResult<()> {
        let json = serde_json::to_string_pretty(livery).map_err(|e| RegistryError::Serialize {
            id: livery.id,
            source: e,
        })?;
        for path in livery.install_paths() {
            let sidecar = self.root.join(path).join(SIDECAR_FILENAME);
            fs::write(&sidecar, &json).map_err(|e| RegistryError::io(&sidecar, e))?;
        }
        Ok(())
    }

    /// Remove the sidecar from every install path.
    ///
    /// Missing sidecars are ignored. Sidecars naming another livery are left
    /// in place.
    pub fn remove_sidecars(&self, livery: &Livery) -> RegistryResult<()> {
        for path in livery.install_paths() {
            let dir = self.root.join(path);
            let sidecar = dir.join(SIDECAR_FILENAME);
            if !sidecar.exists() {
                continue;
            }
            if !self.owned_by(&dir, livery.id) {
                continue;
            }
            let resolved = ensure_within_root(&self.root, &sidecar).map_err(|e| {
                RegistryError::PathOutsideRoot {
                    path: e.path,
                    root: e.root,
                }
            })?;
            fs::remove_file(&resolved).map_err(|e| RegistryError::io(&resolved, e))?;
        }
        Ok(())
    }

    /// Whether every install path exists and holds a sidecar.
    pub fn is_installed(&self, livery: &Livery) -> bool {
        let mut paths = livery.install_paths().peekable();
        if paths.peek().is_none() {
            return false;
        }
        paths.all(|p| {
            let dir = self.root.join(p);
            dir.is_dir() && dir.join(SIDECAR_FILENAME).is_file()
        })
    }

    /// Id recorded in the sidecar of an install directory.
    ///
    /// `None` if the directory has no readable sidecar.
    pub fn sidecar_owner(&self, dir: &Path) -> Option<u64> {
        read_sidecar(&dir.join(SIDECAR_FILENAME))
            .ok()
            .map(|livery| livery.id)
    }

    fn owned_by(&self, dir: &Path, id: u64) -> bool {
        let owner = self.sidecar_owner(dir);
        if owner != Some(id) {
            warn!(
                id = id,
                owner = ?owner,
                path = %dir.display(),
                "Leaving directory not owned by livery"
            );
        }
        owner == Some(id)
    }

    /// Uninstall a livery and drop it from the index.
    ///
    /// With `keep_files` only the sidecars are removed. Otherwise every install
    /// directory whose sidecar names this livery is deleted, followed by any
    /// parent folders left empty. Directories without such a sidecar belong to
    /// someone else and are kept. All paths are checked against the root
    /// before anything is deleted.
    pub fn uninstall(&mut self, id: u64, keep_files: bool) -> RegistryResult<Livery> {
        let livery = self.require(id)?.clone();

        if keep_files {
            self.remove_sidecars(&livery)?;
        } else {
            let dirs: Vec<PathBuf> = livery
                .install_paths()
                .map(|p| self.root.join(p))
                .collect();
            for dir in &dirs {
                ensure_within_root(&self.root, dir).map_err(|e| {
                    RegistryError::PathOutsideRoot {
                        path: e.path,
                        root: e.root,
                    }
                })?;
            }
            for dir in &dirs {
                if !dir.exists() || !self.owned_by(dir, id) {
                    continue;
                }
                remove_dir_checked(&self.root, dir).map_err(|e| match e {
                    RemoveError::Outside(o) => RegistryError::PathOutsideRoot {
                        path: o.path,
                        root: o.root,
                    },
                    RemoveError::Io { path, source } => RegistryError::Io { path, source },
                })?;
                remove_empty_ancestors(&self.root, dir);
            }
        }

        self.unregister(id);
        info!(id = id, title = %livery.title(), keep_files = keep_files, "Uninstalled livery");
        Ok(livery)
    }

    /// Rebuild missing index entries from sidecar files.
    ///
    /// Returns the number of liveries added. Unreadable sidecars are skipped.
    pub fn recover(&mut self) -> RegistryResult<usize> {
        let mut recovered = 0;

        let sidecars: Vec<PathBuf> = WalkDir::new(&self.root)
            .max_depth(SIDECAR_SCAN_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && e.file_name() == SIDECAR_FILENAME)
            .map(|e| e.into_path())
            .collect();

        for sidecar in sidecars {
            let livery = match read_sidecar(&sidecar) {
                Ok(livery) => livery,
                Err(reason) => {
                    warn!(path = %sidecar.display(), reason = %reason, "Skipping unreadable sidecar");
                    continue;
                }
            };

            let id = livery.id;
            if self.register(livery) {
                info!(id = id, path = %sidecar.display(), "Recovered livery from sidecar");
                recovered += 1;
            }
        }

        Ok(recovered)
    }
}

fn read_sidecar(path: &Path) -> Result<Livery, String> {
    fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
}
