//! Install path planning.

use crate::livery::{InstallRecord, Livery};

use super::detector::FolderCandidate;

/// One planned destination for one detected folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPath {
    /// Detected folder name (final segment of `relative`).
    pub folder: String,
    /// Unit install folder.
    pub unit: String,
    /// Path relative to the game root, `/`-separated.
    pub relative: String,
}

impl InstallPath {
    /// Final path segment, used to match the path back to its folder.
    pub fn final_segment(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

/// Plan every install path of a livery.
///
/// Produces the cross product of folders and units rooted at the livery's
/// destination root, and fills `livery.installs` and `livery.target_units`
/// accordingly. Paths of each record follow the order of `units`.
pub fn plan_paths(
    livery: &mut Livery,
    folders: &[FolderCandidate],
    units: &[String],
) -> Vec<InstallPath> {
    let mut planned = Vec::with_capacity(folders.len() * units.len());
    livery.target_units = units.to_vec();
    livery.installs.clear();

    for folder in folders {
        let mut record = InstallRecord::new(folder.size, folder.is_data_folder);
        for unit in units {
            let relative = join_relative(&livery.destination_root, unit, &folder.name);
            record.paths.push(relative.clone());
            planned.push(InstallPath {
                folder: folder.name.clone(),
                unit: unit.clone(),
                relative,
            });
        }
        livery.installs.insert(folder.name.clone(), record);
    }

    planned
}

/// Find the detected folder an install path belongs to.
///
/// Matching is by final path segment, case-sensitively.
pub fn candidate_for<'a>(
    path: &InstallPath,
    folders: &'a [FolderCandidate],
) -> Option<&'a FolderCandidate> {
    let segment = path.final_segment();
    folders.iter().find(|f| f.name == segment)
}

fn join_relative(root: &str, unit: &str, folder: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        format!("{}/{}", unit, folder)
    } else {
        format!("{}/{}/{}", root, unit, folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::livery::Metadata;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn candidate(name: &str, is_data_folder: bool) -> FolderCandidate {
        FolderCandidate {
            relative: PathBuf::from(name),
            name: name.to_string(),
            size: 10,
            is_data_folder,
            files: Vec::new(),
        }
    }

    fn livery() -> Livery {
        let mut livery = Livery::new(1, Metadata::titled("Pack"));
        livery.destination_root = "Liveries".to_string();
        livery
    }

    #[test]
    fn test_cross_product() {
        let mut livery = livery();
        let folders = vec![candidate("A", false), candidate("B", false)];
        let units = vec!["U1".to_string(), "U2".to_string()];

        let planned = plan_paths(&mut livery, &folders, &units);

        let paths: Vec<_> = planned.iter().map(|p| p.relative.as_str()).collect();
        assert_eq!(
            paths,
            vec!["Liveries/U1/A", "Liveries/U2/A", "Liveries/U1/B", "Liveries/U2/B"]
        );
        assert_eq!(livery.installs["B"].paths, vec!["Liveries/U1/B", "Liveries/U2/B"]);
        assert_eq!(livery.target_units, units);
        assert!(livery.paths_match_units());
    }

    #[test]
    fn test_mod_manager_root() {
        let mut livery = livery();
        livery.destination_root = "DCSLM/Pack/Liveries".to_string();
        let planned = plan_paths(&mut livery, &[candidate("A", true)], &["U1".to_string()]);

        assert_eq!(planned[0].relative, "DCSLM/Pack/Liveries/U1/A");
        assert!(livery.installs["A"].is_data_folder);
    }

    #[test]
    fn test_candidate_matched_by_final_segment() {
        let folders = vec![candidate("Skin", false), candidate("skin", false)];
        let path = InstallPath {
            folder: "skin".to_string(),
            unit: "U1".to_string(),
            relative: "Liveries/U1/skin".to_string(),
        };
        let found = candidate_for(&path, &folders).unwrap();
        assert_eq!(found.name, "skin");
    }

    proptest! {
        #[test]
        fn prop_path_count(folders in 0usize..6, units in 0usize..6) {
            let mut livery = livery();
            let folders: Vec<_> = (0..folders).map(|i| candidate(&format!("F{}", i), false)).collect();
            let units: Vec<_> = (0..units).map(|i| format!("U{}", i)).collect();

            let planned = plan_paths(&mut livery, &folders, &units);

            prop_assert_eq!(planned.len(), folders.len() * units.len());
            let unique: HashSet<_> = planned.iter().map(|p| p.relative.clone()).collect();
            prop_assert_eq!(unique.len(), planned.len());
            prop_assert!(livery.paths_match_units());
        }
    }
}
