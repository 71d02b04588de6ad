//! Core managed-item types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use super::naming::is_local_id;

/// Where one detected folder of a livery was installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRecord {
    /// Size in bytes of a single copy of the folder.
    pub size: u64,

    /// Install paths relative to the game root, one per target unit, in the
    /// same order as [`Livery::target_units`].
    #[serde(default)]
    pub paths: Vec<String>,

    /// Shared-asset folder referenced by skin folders rather than a skin itself.
    #[serde(default)]
    pub is_data_folder: bool,
}

impl InstallRecord {
    /// Create a record for a folder of the given size, with no paths yet.
    pub fn new(size: u64, is_data_folder: bool) -> Self {
        Self {
            size,
            paths: Vec::new(),
            is_data_folder,
        }
    }

    /// Bytes occupied by all copies of this folder.
    pub fn installed_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }
}

/// A tracked skin installation.
///
/// One livery may span several skin folders (variants inside the pack) and
/// several units (airframes sharing the same livery layout).
///
/// # Example
///
/// ```
/// use dcslm::livery::{Livery, Metadata};
///
/// let livery = Livery::new(3312345, Metadata::titled("Viper Demo Team"));
/// assert_eq!(livery.title(), "Viper Demo Team");
/// assert!(!livery.is_local());
/// assert!(!livery.optimized);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Livery {
    /// Unique identifier; immutable once assigned.
    pub id: u64,

    /// Externally sourced description.
    pub metadata: Metadata,

    /// Local path to the source archive; empty once the archive was purged.
    #[serde(default)]
    pub archive: String,

    /// Root under which unit install folders live, relative to the game root.
    #[serde(default)]
    pub destination_root: String,

    /// Install records keyed by skin folder name.
    #[serde(default)]
    pub installs: BTreeMap<String, InstallRecord>,

    /// Install folder names chosen at install time.
    #[serde(default)]
    pub target_units: Vec<String>,

    /// Whether a full optimization pass completed.
    #[serde(default)]
    pub optimized: bool,
}

impl Livery {
    /// Create an empty, not yet installed livery.
    pub fn new(id: u64, metadata: Metadata) -> Self {
        Self {
            id,
            metadata,
            archive: String::new(),
            destination_root: String::new(),
            installs: BTreeMap::new(),
            target_units: Vec::new(),
            optimized: false,
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Whether the id was generated locally rather than taken from a remote source.
    pub fn is_local(&self) -> bool {
        is_local_id(self.id)
    }

    /// Skin folders (non data folders) in processing order.
    pub fn skin_folders(&self) -> impl Iterator<Item = (&String, &InstallRecord)> {
        self.installs.iter().filter(|(_, r)| !r.is_data_folder)
    }

    /// Every install path of every folder.
    pub fn install_paths(&self) -> impl Iterator<Item = &String> {
        self.installs.values().flat_map(|r| r.paths.iter())
    }

    /// Total bytes occupied by all installed copies.
    pub fn installed_size(&self) -> u64 {
        self.installs.values().map(InstallRecord::installed_size).sum()
    }

    /// Check that every record has exactly one path per target unit.
    pub fn paths_match_units(&self) -> bool {
        self.installs
            .values()
            .all(|r| r.paths.len() == self.target_units.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Livery {
        let mut livery = Livery::new(42, Metadata::titled("Test"));
        livery.target_units = vec!["F-16C_50".to_string(), "F-16C_bl50".to_string()];
        livery.destination_root = "Liveries".to_string();

        let mut skin = InstallRecord::new(100, false);
        skin.paths = vec![
            "Liveries/F-16C_50/Test".to_string(),
            "Liveries/F-16C_bl50/Test".to_string(),
        ];
        livery.installs.insert("Test".to_string(), skin);

        let mut data = InstallRecord::new(30, true);
        data.paths = vec![
            "Liveries/F-16C_50/Shared".to_string(),
            "Liveries/F-16C_bl50/Shared".to_string(),
        ];
        livery.installs.insert("Shared".to_string(), data);
        livery
    }

    #[test]
    fn test_installed_size_counts_every_copy() {
        assert_eq!(sample().installed_size(), 260);
    }

    #[test]
    fn test_skin_folders_excludes_data() {
        let livery = sample();
        let names: Vec<_> = livery.skin_folders().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Test"]);
    }

    #[test]
    fn test_paths_match_units() {
        let mut livery = sample();
        assert!(livery.paths_match_units());

        livery.target_units.pop();
        assert!(!livery.paths_match_units());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["destinationRoot"], "Liveries");
        assert_eq!(json["installs"]["Shared"]["isDataFolder"], true);
        assert_eq!(json["installs"]["Test"]["size"], 100);
        assert_eq!(json["targetUnits"][1], "F-16C_bl50");
        assert_eq!(json["optimized"], false);
        assert!(json.get("archive").is_some());
    }

    #[test]
    fn test_round_trip_through_json() {
        let livery = sample();
        let json = serde_json::to_string(&livery).unwrap();
        let back: Livery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, livery);
    }
}
