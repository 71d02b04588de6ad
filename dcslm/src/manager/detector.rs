//! Classification of extracted folders.
//!
//! Every file of the extracted tree is grouped under its immediate parent
//! folder. A folder holding the marker configuration file is a skin folder;
//! a folder without it but with texture files is a data folder whose assets
//! other skins reference; everything else is ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::livery::sanitize_title;
use crate::parser::CONFIG_FILENAME;

use super::error::{ManagerError, ManagerResult};
use super::installer::is_payload_file;

/// Extensions treated as texture payload when classifying data folders.
const TEXTURE_EXTENSIONS: &[&str] = &["dds", "tga", "bmp", "png", "jpg", "jpeg"];

/// Files of an extracted tree grouped by their parent folder.
///
/// Keys are folder paths relative to the extraction root; the root itself is
/// the empty path. Values are absolute file paths in name order.
pub type FilesByFolder = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Classification of one extracted folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderKind {
    /// Installable skin payload (holds the marker file).
    SkinFolder { name: String, size: u64 },
    /// Shared assets referenced by skin folders.
    DataFolder { name: String, size: u64 },
    /// Nothing to install.
    Irrelevant,
}

/// A folder selected for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderCandidate {
    /// Folder path relative to the extraction root (empty for the root).
    pub relative: PathBuf,
    /// Install name. For the root folder this is the sanitized item title.
    pub name: String,
    /// Sum of the sizes of the folder's payload files (not recursive).
    pub size: u64,
    /// Whether this is a data folder rather than a skin folder.
    pub is_data_folder: bool,
    /// Absolute paths of the folder's files.
    pub files: Vec<PathBuf>,
}

impl FolderCandidate {
    /// Turn the candidate back into its tagged classification.
    pub fn kind(&self) -> FolderKind {
        if self.is_data_folder {
            FolderKind::DataFolder {
                name: self.name.clone(),
                size: self.size,
            }
        } else {
            FolderKind::SkinFolder {
                name: self.name.clone(),
                size: self.size,
            }
        }
    }
}

/// Group every file below `root` by its immediate parent folder.
pub fn group_files_by_folder(root: &Path) -> ManagerResult<FilesByFolder> {
    let mut groups: FilesByFolder = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ManagerError::ReadFailed {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        groups.entry(relative).or_default().push(entry.into_path());
    }

    Ok(groups)
}

/// Classify one folder from its file list.
///
/// `title` names the folder when `relative` is the extraction root.
pub fn classify(relative: &Path, files: &[PathBuf], title: &str) -> ManagerResult<FolderKind> {
    let has_marker = files
        .iter()
        .any(|f| f.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILENAME));
    let has_textures = files.iter().any(|f| is_texture(f));

    if !has_marker && !has_textures {
        return Ok(FolderKind::Irrelevant);
    }

    let name = folder_name(relative, title);
    if name.is_empty() {
        return Ok(FolderKind::Irrelevant);
    }
    let size = payload_size(files)?;

    Ok(if has_marker {
        FolderKind::SkinFolder { name, size }
    } else {
        FolderKind::DataFolder { name, size }
    })
}

/// Detect the skin and data folders of an extracted tree.
///
/// Candidates come out in folder path order. When two folders share a final
/// path segment, only the first is kept.
pub fn detect(files_by_folder: &FilesByFolder, title: &str) -> ManagerResult<Vec<FolderCandidate>> {
    let mut candidates: Vec<FolderCandidate> = Vec::new();

    for (relative, files) in files_by_folder {
        let (name, size, is_data_folder) = match classify(relative, files, title)? {
            FolderKind::SkinFolder { name, size } => (name, size, false),
            FolderKind::DataFolder { name, size } => (name, size, true),
            FolderKind::Irrelevant => {
                trace!(folder = %relative.display(), "Ignoring folder");
                continue;
            }
        };

        if candidates.iter().any(|c| c.name == name) {
            warn!(
                folder = %relative.display(),
                name = %name,
                "Skipping folder with duplicate name"
            );
            continue;
        }

        debug!(
            folder = %relative.display(),
            name = %name,
            size = size,
            data = is_data_folder,
            "Detected livery folder"
        );
        candidates.push(FolderCandidate {
            relative: relative.clone(),
            name,
            size,
            is_data_folder,
            files: files.clone(),
        });
    }

    Ok(candidates)
}

fn folder_name(relative: &Path, title: &str) -> String {
    match relative.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => sanitize_title(title),
    }
}

fn is_texture(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXTURE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn payload_size(files: &[PathBuf]) -> ManagerResult<u64> {
    let mut total = 0;
    for file in files {
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !is_payload_file(name) {
            continue;
        }
        let meta = fs::metadata(file).map_err(|e| ManagerError::ReadFailed {
            path: file.clone(),
            source: e,
        })?;
        total += meta.len();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, bytes: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_classifies_skin_data_and_irrelevant() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Pack/Skin A/description.lua", b"12345");
        write(root, "Pack/Skin A/f16_bl50_main_1.dds", b"0123456789");
        write(root, "Pack/Shared/pilot.dds", b"abc");
        write(root, "Pack/Docs/readme.txt", b"read me");

        let groups = group_files_by_folder(root).unwrap();
        let candidates = detect(&groups, "Pack").unwrap();

        assert_eq!(candidates.len(), 2);
        let shared = candidates.iter().find(|c| c.name == "Shared").unwrap();
        assert_eq!(
            shared.kind(),
            FolderKind::DataFolder {
                name: "Shared".to_string(),
                size: 3
            }
        );
        let skin = candidates.iter().find(|c| c.name == "Skin A").unwrap();
        assert_eq!(
            skin.kind(),
            FolderKind::SkinFolder {
                name: "Skin A".to_string(),
                size: 15
            }
        );
    }

    #[test]
    fn test_size_is_not_recursive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Skin/description.lua", b"aa");
        write(root, "Skin/nested/deep.dds", b"bbbbbbbb");

        let groups = group_files_by_folder(root).unwrap();
        let candidates = detect(&groups, "t").unwrap();
        let skin = candidates.iter().find(|c| c.name == "Skin").unwrap();
        assert_eq!(skin.size, 2);
        assert_eq!(skin.files.len(), 1);
    }

    #[test]
    fn test_root_folder_named_after_title() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "description.lua", b"x");
        write(root, "tex.dds", b"y");

        let groups = group_files_by_folder(root).unwrap();
        let candidates = detect(&groups, "My / Livery?").unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "My Livery");
        assert_eq!(candidates[0].relative, PathBuf::new());
    }

    #[test]
    fn test_junk_files_do_not_count_towards_size() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Skin/description.lua", b"aa");
        write(root, "Skin/Thumbs.db", b"junkjunk");

        let groups = group_files_by_folder(root).unwrap();
        let candidates = detect(&groups, "t").unwrap();
        assert_eq!(candidates[0].size, 2);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a/Skin/description.lua", b"first");
        write(root, "b/Skin/description.lua", b"second!");

        let groups = group_files_by_folder(root).unwrap();
        let candidates = detect(&groups, "t").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].relative, PathBuf::from("a/Skin"));
    }

    #[test]
    fn test_marker_name_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Skin/Description.LUA", b"x");

        let groups = group_files_by_folder(root).unwrap();
        assert!(detect(&groups, "t").unwrap().is_empty());
    }
}
