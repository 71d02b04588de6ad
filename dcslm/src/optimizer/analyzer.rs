//! Reference collection and content hashing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::livery::Livery;
use crate::parser::{
    has_extension, is_local, normalize_path, ConfigText, StatementParser, CONFIG_FILENAME,
};

use super::error::{OptimizeError, OptimizeResult};
use super::hasher::{hash_file, ContentHash};
use super::types::{FileReference, FileRefs, FolderRefs, HashEntry, HashIndex, MissingReference};

/// Collect the package-provided files declared by every skin folder.
///
/// The configuration of each skin folder is read from its first install
/// path; all unit copies are identical after install. Statements flagged as
/// external are skipped. A folder without a configuration file contributes
/// no references.
pub fn build_file_refs(
    root: &Path,
    livery: &Livery,
    parser: &StatementParser,
) -> OptimizeResult<FileRefs> {
    let mut refs = FileRefs::new();

    for (folder, record) in livery.skin_folders() {
        let Some(first) = record.paths.first() else {
            continue;
        };
        let base = root.join(first);
        let config = base.join(CONFIG_FILENAME);

        let text = match ConfigText::read(&config) {
            Ok(decoded) => decoded.text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(folder = %folder, path = %config.display(), "Configuration file missing");
                refs.insert(folder.clone(), FolderRefs::new());
                continue;
            }
            Err(e) => return Err(OptimizeError::io(&config, e)),
        };

        let mut folder_refs = FolderRefs::new();
        for stmt in parser.statements(&text) {
            if stmt.external {
                continue;
            }
            let key = normalize_path(&stmt.path);
            if key.is_empty() {
                continue;
            }
            let reference = folder_refs
                .entry(key.clone())
                .or_insert_with(|| FileReference::new(key.clone()));
            reference.referencing_parts.insert(stmt.part);
        }

        for reference in folder_refs.values_mut() {
            reference.resolved = resolve_reference(&base, &reference.relative_path);
        }

        debug!(folder = %folder, references = folder_refs.len(), "Collected file references");
        refs.insert(folder.clone(), folder_refs);
    }

    Ok(refs)
}

/// Find the file a declared path refers to.
///
/// Paths without an extension are matched against files in the target
/// directory sharing the stem. Other paths fall back to a case-insensitive
/// name match, since the game resolves names case-insensitively.
pub fn resolve_reference(base: &Path, declared: &str) -> Option<PathBuf> {
    let candidate = base.join(declared);
    let dir = candidate.parent()?;
    let name = candidate.file_name()?.to_str()?.to_lowercase();

    if has_extension(declared) {
        if candidate.is_file() {
            return Some(candidate);
        }
        return sorted_files(dir)
            .into_iter()
            .find(|f| file_name_lower(f).as_deref() == Some(name.as_str()));
    }

    sorted_files(dir).into_iter().find(|f| {
        f.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase() == name)
            .unwrap_or(false)
            && f.extension().is_some()
    })
}

/// Hash every resolved reference.
///
/// Files are hashed in parallel; results are folded back in folder and path
/// order so that entry order in the index is deterministic. References whose
/// file is missing or unreadable are returned as missing.
pub fn compute_hashes(refs: &mut FileRefs) -> (HashIndex, Vec<MissingReference>) {
    let jobs: Vec<(String, String, PathBuf)> = refs
        .iter()
        .flat_map(|(folder, folder_refs)| {
            folder_refs.values().filter_map(move |r| {
                r.resolved
                    .clone()
                    .map(|file| (folder.clone(), r.relative_path.clone(), file))
            })
        })
        .collect();

    let hashed: Vec<((String, String), Option<ContentHash>)> = jobs
        .par_iter()
        .map(|(folder, key, file)| {
            let hash = match hash_file(file) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Failed to hash file");
                    None
                }
            };
            ((folder.clone(), key.clone()), hash)
        })
        .collect();

    for ((folder, key), hash) in hashed {
        if let Some(reference) = refs.get_mut(&folder).and_then(|f| f.get_mut(&key)) {
            reference.content_hash = hash;
        }
    }

    let mut index = HashIndex::new();
    let mut missing = Vec::new();
    for (folder, folder_refs) in refs.iter() {
        for reference in folder_refs.values() {
            match (&reference.resolved, reference.content_hash) {
                (Some(file), Some(hash)) => index.insert(
                    hash,
                    HashEntry {
                        folder: folder.clone(),
                        declared: reference.relative_path.clone(),
                        file: file.clone(),
                        local: is_local(&reference.relative_path),
                    },
                ),
                _ => missing.push(MissingReference {
                    folder: folder.clone(),
                    path: reference.relative_path.clone(),
                    parts: reference.referencing_parts.iter().cloned().collect(),
                }),
            }
        }
    }

    debug!(hashes = index.len(), missing = missing.len(), "Computed content hashes");
    (index, missing)
}

fn sorted_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

fn file_name_lower(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_lowercase)
}
