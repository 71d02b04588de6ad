//! In-memory unit catalog.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::defaults::default_units;
use super::{UnitCatalog, UnitInfo};

/// Unit catalog held in memory.
///
/// Built from the built-in defaults and optionally extended with JSON unit
/// files. Once constructed it is only read.
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitCatalog {
    units: Vec<UnitInfo>,
}

impl MemoryUnitCatalog {
    /// Create a catalog from an explicit list of units.
    pub fn from_units(units: Vec<UnitInfo>) -> Self {
        Self { units }
    }

    /// Create a catalog containing the built-in units.
    pub fn with_defaults() -> Self {
        Self::from_units(default_units())
    }

    /// Load `*.json` unit files from a directory.
    ///
    /// The generic name is taken from the file stem. A file whose generic name
    /// matches an existing unit replaces it; other files add new units. Files
    /// that fail to parse or validate are skipped with a warning. A missing
    /// directory loads nothing.
    ///
    /// Returns the number of units loaded.
    pub fn load_overrides(&mut self, dir: &Path) -> usize {
        let Ok(entries) = fs::read_dir(dir) else {
            debug!(dir = %dir.display(), "No unit override directory");
            return 0;
        };

        let mut files: Vec<_> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut loaded = 0;
        for path in files {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    serde_json::from_str::<UnitInfo>(&text).map_err(|e| e.to_string())
                });

            let mut unit = match parsed {
                Ok(unit) => unit,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load unit file");
                    continue;
                }
            };
            unit.generic_name = stem.to_lowercase();
            unit.tags = unit.tags.iter().map(|t| t.to_lowercase()).collect();

            let problems = unit.validate();
            if !problems.is_empty() {
                warn!(
                    path = %path.display(),
                    problems = %problems.join(", "),
                    "Unit validation failed"
                );
                continue;
            }

            match self
                .units
                .iter_mut()
                .find(|u| u.generic_name == unit.generic_name)
            {
                Some(existing) => {
                    debug!(unit = %unit.generic_name, "Unit modified by override");
                    *existing = unit;
                }
                None => {
                    debug!(unit = %unit.generic_name, "Custom unit added");
                    self.units.push(unit);
                }
            }
            loaded += 1;
        }

        loaded
    }
}

impl UnitCatalog for MemoryUnitCatalog {
    fn lookup(&self, generic_name: &str) -> Option<&UnitInfo> {
        let generic_name = generic_name.to_lowercase();
        self.units.iter().find(|u| u.generic_name == generic_name)
    }

    fn lookup_friendly(&self, friendly_name: &str) -> Option<&UnitInfo> {
        self.units
            .iter()
            .find(|u| u.friendly_name.eq_ignore_ascii_case(friendly_name))
    }

    fn units_for_tags(&self, tags: &[String]) -> Vec<&UnitInfo> {
        self.units
            .iter()
            .filter(|u| tags.iter().any(|t| u.has_tag(t)))
            .collect()
    }

    fn units(&self) -> Vec<&UnitInfo> {
        self.units.iter().collect()
    }
}

/// Flatten the install folders of the chosen units.
///
/// Folders are de-duplicated while keeping first-seen order, so the result can
/// be stored directly as a livery's target units. Returns the generic name of
/// the first unknown unit as the error.
pub fn resolve_install_folders(
    catalog: &dyn UnitCatalog,
    generic_names: &[String],
) -> Result<Vec<String>, String> {
    let mut folders: Vec<String> = Vec::new();
    for name in generic_names {
        let unit = catalog.lookup(name).ok_or_else(|| name.clone())?;
        for folder in &unit.install_folders {
            if !folders.contains(folder) {
                folders.push(folder.clone());
            }
        }
    }
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_lookup() {
        let catalog = MemoryUnitCatalog::with_defaults();
        let viper = catalog.lookup("F-16C").unwrap();
        assert_eq!(viper.install_folders, vec!["F-16C_50"]);
        assert!(catalog.lookup_friendly("f-16c viper").is_some());
        assert!(catalog.lookup("not-a-unit").is_none());
    }

    #[test]
    fn test_units_for_tags() {
        let catalog = MemoryUnitCatalog::with_defaults();
        let found = catalog.units_for_tags(&["Hornet".to_string(), "huey".to_string()]);
        let names: Vec<_> = found.iter().map(|u| u.generic_name.as_str()).collect();
        assert_eq!(names, vec!["fa-18c", "uh-1h"]);
    }

    #[test]
    fn test_resolve_install_folders_dedups() {
        let catalog = MemoryUnitCatalog::with_defaults();
        let folders =
            resolve_install_folders(&catalog, &["a-10a".to_string(), "a-10c".to_string()])
                .unwrap();
        assert_eq!(folders, vec!["A-10A", "A-10C", "A-10CII"]);
    }

    #[test]
    fn test_resolve_install_folders_unknown() {
        let catalog = MemoryUnitCatalog::with_defaults();
        let err = resolve_install_folders(&catalog, &["nope".to_string()]).unwrap_err();
        assert_eq!(err, "nope");
    }

    #[test]
    fn test_load_overrides_modifies_and_adds() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("f-16c.json"),
            r#"{"friendlyName": "Viper", "installFolders": ["F-16C_50", "F-16C_bl50"], "tags": ["F-16C"]}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("custom-jet.json"),
            r#"{"friendlyName": "Custom", "installFolders": ["Custom"], "tags": ["custom"]}"#,
        )
        .unwrap();
        fs::write(temp.path().join("broken.json"), "{ not json").unwrap();
        fs::write(
            temp.path().join("invalid.json"),
            r#"{"friendlyName": "", "installFolders": [], "tags": []}"#,
        )
        .unwrap();

        let mut catalog = MemoryUnitCatalog::with_defaults();
        let before = catalog.units().len();
        assert_eq!(catalog.load_overrides(temp.path()), 2);

        assert_eq!(catalog.units().len(), before + 1);
        assert_eq!(
            catalog.lookup("f-16c").unwrap().install_folders,
            vec!["F-16C_50", "F-16C_bl50"]
        );
        assert_eq!(catalog.lookup("custom-jet").unwrap().friendly_name, "Custom");
    }

    #[test]
    fn test_load_overrides_missing_dir() {
        let mut catalog = MemoryUnitCatalog::with_defaults();
        assert_eq!(catalog.load_overrides(Path::new("/nonexistent/units")), 0);
    }
}
