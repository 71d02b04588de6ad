//! Canonicalizing configuration rewrites.
//!
//! Planning is pure: [`plan_rewrites`] reads configuration files and returns
//! the new texts. [`apply_rewrites`] is the only step that writes.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::livery::Livery;
use crate::parser::{normalize_path, render, ConfigText, StatementParser, CONFIG_FILENAME};
use crate::safety::ensure_within_root;

use super::error::{OptimizeError, OptimizeResult};
use super::hasher::ContentHash;
use super::types::{DuplicateGroup, FileRefs};

/// Suffix of the configuration backup written before the first rewrite.
pub const BACKUP_SUFFIX: &str = ".orig";

/// New content for one configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRewrite {
    /// Skin folder the file belongs to.
    pub folder: String,
    /// Configuration file to overwrite.
    pub config: PathBuf,
    /// Full new text.
    pub text: String,
    /// New file content, in the encoding the file was read with.
    pub content: Vec<u8>,
    /// Number of statements that changed.
    pub changes: usize,
}

/// Whether the rewrite phase runs for a livery.
///
/// Liveries for a single unit without duplicates are left untouched.
pub fn should_rewrite(livery: &Livery, groups: &[DuplicateGroup]) -> bool {
    !groups.is_empty() || livery.target_units.len() > 1
}

/// Compute the rewritten configuration of every install path.
///
/// Every statement whose file belongs to a duplicate group is pointed at the
/// group's canonical copy: a bare file name inside the canonical folder,
/// `../<canonical>/<file>` everywhere else. Files that would not change are
/// omitted from the plan.
pub fn plan_rewrites(
    root: &Path,
    livery: &Livery,
    refs: &FileRefs,
    groups: &[DuplicateGroup],
    parser: &StatementParser,
) -> OptimizeResult<Vec<ConfigRewrite>> {
    let by_hash: HashMap<ContentHash, &DuplicateGroup> =
        groups.iter().map(|g| (g.hash, g)).collect();
    let mut plan = Vec::new();

    for (folder, record) in livery.skin_folders() {
        let Some(folder_refs) = refs.get(folder) else {
            continue;
        };

        for install_path in &record.paths {
            let config = root.join(install_path).join(CONFIG_FILENAME);
            let decoded = match ConfigText::read(&config) {
                Ok(decoded) => decoded,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(OptimizeError::io(&config, e)),
            };

            let lines = parser.parse_text(&decoded.text);
            let mut changes = 0;
            let rewritten = render(&lines, |stmt| {
                if stmt.external {
                    return None;
                }
                let key = normalize_path(&stmt.path);
                let hash = folder_refs.get(&key)?.content_hash?;
                let group = by_hash.get(&hash)?;
                let target = group.target_for(folder);
                if normalize_path(&target) == key {
                    return None;
                }
                changes += 1;
                Some(stmt.with_path(target))
            });

            if changes > 0 {
                let content = decoded.encoding.encode(&rewritten).map_err(|character| {
                    OptimizeError::Unencodable {
                        path: config.clone(),
                        character,
                    }
                })?;
                debug!(
                    config = %config.display(),
                    changes = changes,
                    encoding = ?decoded.encoding,
                    "Planned rewrite"
                );
                plan.push(ConfigRewrite {
                    folder: folder.clone(),
                    config,
                    text: rewritten,
                    content,
                    changes,
                });
            }
        }
    }

    Ok(plan)
}

/// Write the planned configuration texts.
///
/// With `backup`, the current file is copied to `description.lua.orig` first
/// unless a backup already exists, so the backup always holds the text as
/// installed. Returns the files written.
pub fn apply_rewrites(
    root: &Path,
    plan: &[ConfigRewrite],
    backup: bool,
) -> OptimizeResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(plan.len());

    for rewrite in plan {
        let config = ensure_within_root(root, &rewrite.config).map_err(|e| {
            OptimizeError::PathOutsideRoot {
                path: e.path,
                root: e.root,
            }
        })?;

        if backup {
            let orig = backup_path(&config);
            if !orig.exists() {
                fs::copy(&config, &orig).map_err(|e| OptimizeError::io(&orig, e))?;
            }
        }
        fs::write(&config, &rewrite.content).map_err(|e| OptimizeError::io(&config, e))?;
        written.push(rewrite.config.clone());
    }

    if !written.is_empty() {
        info!(files = written.len(), "Rewrote configuration files");
    }
    Ok(written)
}

/// Backup location of a configuration file.
pub fn backup_path(config: &Path) -> PathBuf {
    let mut name = config
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    config.with_file_name(name)
}
