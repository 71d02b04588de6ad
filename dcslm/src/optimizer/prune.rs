//! Unused-file detection.
//!
//! A file is referenced when some statement of the livery, in any of its
//! install paths, names the same path stem (directory plus file name without
//! extension, compared lowercase). The configuration is re-read from disk
//! after rewriting so the referenced set reflects the final statements.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::livery::Livery;
use crate::parser::{has_extension, normalize_path, ConfigText, StatementParser, CONFIG_FILENAME};
use crate::registry::SIDECAR_FILENAME;

use super::error::{OptimizeError, OptimizeResult};
use super::rewrite::BACKUP_SUFFIX;

/// Files never considered unused.
pub fn is_skipped(name: &str) -> bool {
    name == CONFIG_FILENAME
        || name == SIDECAR_FILENAME
        || name.strip_suffix(BACKUP_SUFFIX) == Some(CONFIG_FILENAME)
}

/// Lowercase path stem of a `/`-separated path relative to the root.
pub fn stem_key(path: &str) -> String {
    let normalized = normalize_path(path);
    let without_ext = if has_extension(&normalized) {
        match normalized.rfind('.') {
            Some(pos) => &normalized[..pos],
            None => normalized.as_str(),
        }
    } else {
        normalized.as_str()
    };
    without_ext.to_lowercase()
}

/// Stems referenced by every statement in every install path of a livery.
///
/// Statements count whatever their external flag.
pub fn referenced_stems(
    root: &Path,
    livery: &Livery,
    parser: &StatementParser,
) -> OptimizeResult<HashSet<String>> {
    let mut stems = HashSet::new();

    for (_, record) in livery.skin_folders() {
        for install_path in &record.paths {
            let config = root.join(install_path).join(CONFIG_FILENAME);
            let text = match ConfigText::read(&config) {
                Ok(decoded) => decoded.text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(OptimizeError::io(&config, e)),
            };
            for stmt in parser.statements(&text) {
                stems.insert(stem_key(&format!("{}/{}", install_path, stmt.path)));
            }
        }
    }

    Ok(stems)
}

/// Files of the livery's skin folders that no statement references.
///
/// Only files directly inside skin folder install paths are considered; data
/// folders are left alone. The result is sorted.
pub fn find_unused(
    root: &Path,
    livery: &Livery,
    parser: &StatementParser,
) -> OptimizeResult<Vec<PathBuf>> {
    let referenced = referenced_stems(root, livery, parser)?;
    let mut unused = Vec::new();

    for (_, record) in livery.skin_folders() {
        for install_path in &record.paths {
            let dir = root.join(install_path);
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(OptimizeError::io(&dir, e)),
            };
            for entry in entries {
                let entry = entry.map_err(|e| OptimizeError::io(&dir, e))?;
                if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if is_skipped(&name) {
                    continue;
                }
                let key = stem_key(&format!("{}/{}", install_path, name));
                if !referenced.contains(&key) {
                    unused.push(entry.path());
                }
            }
        }
    }

    unused.sort();
    debug!(
        referenced = referenced.len(),
        unused = unused.len(),
        "Computed unused files"
    );
    Ok(unused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::livery::{InstallRecord, Metadata};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, bytes: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn livery(folders: &[&str]) -> Livery {
        let mut livery = Livery::new(1, Metadata::titled("Pack"));
        livery.target_units = vec!["U1".to_string()];
        for folder in folders {
            let mut record = InstallRecord::new(0, false);
            record.paths.push(format!("Liveries/U1/{}", folder));
            livery.installs.insert(folder.to_string(), record);
        }
        livery
    }

    #[test]
    fn test_stem_key() {
        assert_eq!(stem_key("Liveries/U1/B/../A/Tex"), "liveries/u1/a/tex");
        assert_eq!(stem_key("Liveries/U1/A/tex.DDS"), "liveries/u1/a/tex");
    }

    #[test]
    fn test_skip_list() {
        assert!(is_skipped("description.lua"));
        assert!(is_skipped("description.lua.orig"));
        assert!(is_skipped(".dcslm.json"));
        assert!(!is_skipped("tex.dds"));
    }

    #[test]
    fn test_unused_after_redirect() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Liveries/U1/A/description.lua", b"{\"main\", 0, \"tex\", false};");
        write(root, "Liveries/U1/A/tex.dds", b"same");
        write(root, "Liveries/U1/B/description.lua", b"{\"main\", 0, \"../A/tex\", false};");
        write(root, "Liveries/U1/B/tex.dds", b"same");
        write(root, "Liveries/U1/B/description.lua.orig", b"old");
        write(root, "Liveries/U1/B/.dcslm.json", b"{}");

        let unused = find_unused(root, &livery(&["A", "B"]), &StatementParser::new()).unwrap();
        assert_eq!(unused, vec![root.join("Liveries/U1/B/tex.dds")]);
    }

    #[test]
    fn test_case_insensitive_stems() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Liveries/U1/A/description.lua", b"{\"main\", 0, \"MAIN_TEX\", false};\n{\"glass\", 0, \"glass.tga\", true};");
        write(root, "Liveries/U1/A/main_tex.dds", b"x");
        write(root, "Liveries/U1/A/Glass.TGA", b"y");
        write(root, "Liveries/U1/A/preview.png", b"z");

        let unused = find_unused(root, &livery(&["A"]), &StatementParser::new()).unwrap();
        assert_eq!(unused, vec![root.join("Liveries/U1/A/preview.png")]);
    }

    #[test]
    fn test_commented_reference_does_not_count() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "Liveries/U1/A/description.lua",
            b"--[[\n{\"main\", 0, \"old\", false};\n]]\n{\"main\", 0, \"tex\", false};\n",
        );
        write(root, "Liveries/U1/A/tex.dds", b"x");
        write(root, "Liveries/U1/A/old.dds", b"y");

        let unused = find_unused(root, &livery(&["A"]), &StatementParser::new()).unwrap();
        assert_eq!(unused, vec![root.join("Liveries/U1/A/old.dds")]);
    }
}
