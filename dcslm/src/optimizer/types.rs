//! Data passed between the optimization phases.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use super::hasher::ContentHash;

/// A file declared by the statements of one skin folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    /// Declared path, normalized.
    pub relative_path: String,
    /// Part labels that use the file.
    pub referencing_parts: BTreeSet<String>,
    /// File found on disk for the declared path.
    pub resolved: Option<PathBuf>,
    /// Content digest; `None` while unhashed or when the file is missing.
    pub content_hash: Option<ContentHash>,
}

impl FileReference {
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            referencing_parts: BTreeSet::new(),
            resolved: None,
            content_hash: None,
        }
    }
}

/// References of one skin folder keyed by normalized declared path.
pub type FolderRefs = BTreeMap<String, FileReference>;

/// References of every skin folder of a livery, in folder processing order.
pub type FileRefs = BTreeMap<String, FolderRefs>;

/// One holder of a hashed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEntry {
    /// Skin folder whose statement declares the file.
    pub folder: String,
    /// Normalized declared path.
    pub declared: String,
    /// File on disk.
    pub file: PathBuf,
    /// Whether the file sits in the declaring folder itself.
    pub local: bool,
}

/// Content hash to the folders declaring a file with that content.
///
/// Entries of each hash keep folder processing order.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    entries: BTreeMap<ContentHash, Vec<HashEntry>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the list of `hash`.
    pub fn insert(&mut self, hash: ContentHash, entry: HashEntry) {
        self.entries.entry(hash).or_default().push(entry);
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&[HashEntry]> {
        self.entries.get(hash).map(Vec::as_slice)
    }

    /// Number of distinct hashes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hashes declared by more than one skin folder.
    ///
    /// The canonical holder is the first folder, in processing order, that
    /// keeps the file locally. A hash whose file lives in no declaring folder
    /// (e.g. a shared data folder) has nothing to collapse and is skipped.
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        let mut groups = Vec::new();
        for (hash, entries) in &self.entries {
            let mut folders: Vec<String> = Vec::new();
            for entry in entries {
                if !folders.contains(&entry.folder) {
                    folders.push(entry.folder.clone());
                }
            }
            if folders.len() < 2 {
                continue;
            }
            let Some(canonical) = entries.iter().find(|e| e.local) else {
                continue;
            };
            groups.push(DuplicateGroup {
                hash: *hash,
                canonical: canonical.folder.clone(),
                canonical_file: canonical.declared.clone(),
                folders,
            });
        }
        groups
    }
}

/// Byte-identical files declared by several skin folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub hash: ContentHash,
    /// Folder that keeps its copy.
    pub canonical: String,
    /// Declared file name of the kept copy.
    pub canonical_file: String,
    /// Every contributing folder, canonical first.
    pub folders: Vec<String>,
}

impl DuplicateGroup {
    /// Path a statement in `folder` should declare for this group's file.
    pub fn target_for(&self, folder: &str) -> String {
        if folder == self.canonical {
            self.canonical_file.clone()
        } else {
            format!("../{}/{}", self.canonical, self.canonical_file)
        }
    }
}

/// A statement pointing at a file that is not on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingReference {
    pub folder: String,
    pub path: String,
    pub parts: Vec<String>,
}

/// Options for an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Analyze and report only; never modify files.
    pub check_only: bool,
    /// Run even if the livery is already optimized.
    pub force: bool,
    /// Report unused files instead of deleting them.
    pub keep_unused: bool,
    /// Keep the original configuration as `description.lua.orig`.
    pub backup_config: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            check_only: false,
            force: false,
            keep_unused: false,
            backup_config: true,
        }
    }
}

impl OptimizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze only (builder pattern).
    pub fn with_check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    /// Re-run on optimized liveries (builder pattern).
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Keep unused files (builder pattern).
    pub fn with_keep_unused(mut self, keep: bool) -> Self {
        self.keep_unused = keep;
        self
    }

    /// Back up configuration files before rewriting (builder pattern).
    pub fn with_backup_config(mut self, backup: bool) -> Self {
        self.backup_config = backup;
        self
    }
}
