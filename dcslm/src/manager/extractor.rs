//! Archive extraction for livery installation.
//!
//! This module handles:
//! - Recognizing archive formats by extension
//! - Extracting `.zip` (pure Rust), `.7z` (pure Rust) and `.rar` (system `7z`)
//! - Expanding archives nested inside the extracted tree

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::cancel::CancelFlag;
use super::error::{ManagerError, ManagerResult};
use super::traits::ArchiveExtractor;

/// Maximum number of passes looking for nested archives.
const MAX_NESTED_PASSES: usize = 4;

/// Archive formats livery packs are distributed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    SevenZip,
    Rar,
}

impl ArchiveFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "zip" => Some(Self::Zip),
            "7z" => Some(Self::SevenZip),
            "rar" => Some(Self::Rar),
            _ => None,
        }
    }
}

/// Whether a path names a supported archive.
pub fn is_archive(path: &Path) -> bool {
    ArchiveFormat::from_path(path).is_some()
}

/// ZIP extractor using the `zip` crate.
///
/// Entries whose names would escape the destination are rejected.
#[derive(Debug, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn supports(&self, archive_path: &Path) -> bool {
        ArchiveFormat::from_path(archive_path) == Some(ArchiveFormat::Zip)
    }

    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        let extraction_failed = |reason: String| ManagerError::ExtractionFailed {
            path: archive_path.to_path_buf(),
            reason,
        };

        let file = File::open(archive_path).map_err(|e| ManagerError::ReadFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        let mut archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| extraction_failed(e.to_string()))?;

        let mut count = 0;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| extraction_failed(e.to_string()))?;
            let relative = entry.enclosed_name().ok_or_else(|| {
                extraction_failed(format!("entry escapes destination: {}", entry.name()))
            })?;
            let out_path = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| ManagerError::CreateDirFailed {
                    path: out_path.clone(),
                    source: e,
                })?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            let mut out = File::create(&out_path).map_err(|e| ManagerError::WriteFailed {
                path: out_path.clone(),
                source: e,
            })?;
            io::copy(&mut entry, &mut out).map_err(|e| ManagerError::WriteFailed {
                path: out_path.clone(),
                source: e,
            })?;
            count += 1;
        }

        Ok(count)
    }
}

/// 7-Zip extractor using the `sevenz-rust` crate.
#[derive(Debug, Default)]
pub struct SevenZipExtractor;

impl ArchiveExtractor for SevenZipExtractor {
    fn supports(&self, archive_path: &Path) -> bool {
        ArchiveFormat::from_path(archive_path) == Some(ArchiveFormat::SevenZip)
    }

    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        create_dir(dest_dir)?;
        sevenz_rust::decompress_file(archive_path, dest_dir).map_err(|e| {
            ManagerError::ExtractionFailed {
                path: archive_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(count_files(dest_dir))
    }
}

/// Shell-based extractor for RAR archives.
///
/// Uses the system `7z` tool, which handles every RAR revision.
#[derive(Debug)]
pub struct ShellExtractor {
    program: String,
}

impl Default for ShellExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellExtractor {
    /// Create a shell extractor using `7z` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("7z")
    }

    /// Create a shell extractor using a specific 7-Zip compatible binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ArchiveExtractor for ShellExtractor {
    fn supports(&self, archive_path: &Path) -> bool {
        ArchiveFormat::from_path(archive_path) == Some(ArchiveFormat::Rar)
    }

    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        create_dir(dest_dir)?;

        let output = Command::new(&self.program)
            .arg("x")
            .arg("-y")
            .arg(format!("-o{}", dest_dir.display()))
            .arg(archive_path)
            .output()
            .map_err(|e| ManagerError::ExtractionFailed {
                path: archive_path.to_path_buf(),
                reason: format!("Failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ManagerError::ExtractionFailed {
                path: archive_path.to_path_buf(),
                reason: format!("{} extraction failed: {}", self.program, stderr.trim()),
            });
        }

        Ok(count_files(dest_dir))
    }
}

/// Result of extracting an item's archive.
#[derive(Debug, Clone)]
pub struct ExtractedRoot {
    /// Directory holding the extracted tree.
    pub path: PathBuf,
    /// Number of files in the tree after all nested archives were expanded.
    pub files: usize,
    /// Nested archives that were expanded in place.
    pub nested: Vec<PathBuf>,
}

/// Extractor that dispatches on format and expands nested archives.
pub struct RecursiveExtractor {
    backends: Vec<Box<dyn ArchiveExtractor>>,
}

impl Default for RecursiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecursiveExtractor {
    /// Create an extractor with the ZIP, 7z and RAR backends.
    pub fn new() -> Self {
        Self::with_backends(vec![
            Box::new(ZipExtractor),
            Box::new(SevenZipExtractor),
            Box::new(ShellExtractor::new()),
        ])
    }

    /// Create an extractor with explicit backends.
    pub fn with_backends(backends: Vec<Box<dyn ArchiveExtractor>>) -> Self {
        Self { backends }
    }

    /// Extract `archive_path` into `dest_dir`, replacing any previous output.
    ///
    /// After the first pass the tree is scanned for archives, which are
    /// extracted next to themselves. Each archive is expanded at most once and
    /// the number of passes is bounded. A nested archive that fails to extract
    /// is left in place with a warning.
    ///
    /// `dest_dir` must be the item's own directory under the tool's temp root;
    /// the caller removes it on failure.
    pub fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        cancel: &CancelFlag,
    ) -> ManagerResult<ExtractedRoot> {
        if dest_dir.exists() {
            debug!(path = %dest_dir.display(), "Removing stale extraction output");
            fs::remove_dir_all(dest_dir).map_err(|e| ManagerError::RemoveFailed {
                path: dest_dir.to_path_buf(),
                source: e,
            })?;
        }
        create_dir(dest_dir)?;

        let backend = self.backend_for(archive_path)?;
        let files = backend.extract(archive_path, dest_dir)?;
        info!(
            archive = %archive_path.display(),
            files = files,
            "Extracted archive"
        );

        cancel.check()?;

        let mut expanded: HashSet<PathBuf> = HashSet::new();
        let mut nested = Vec::new();

        for pass in 0..MAX_NESTED_PASSES {
            let mut pending: Vec<PathBuf> = WalkDir::new(dest_dir)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file() && is_archive(e.path()))
                .map(|e| e.into_path())
                .filter(|p| !expanded.contains(p))
                .collect();
            if pending.is_empty() {
                break;
            }
            pending.sort();

            debug!(pass = pass, archives = pending.len(), "Expanding nested archives");
            for inner in pending {
                cancel.check()?;
                expanded.insert(inner.clone());
                let target = inner.parent().unwrap_or(dest_dir).to_path_buf();
                let result = self
                    .backend_for(&inner)
                    .and_then(|b| b.extract(&inner, &target));
                match result {
                    Ok(count) => {
                        debug!(archive = %inner.display(), files = count, "Expanded nested archive");
                        nested.push(inner);
                    }
                    Err(e) => {
                        warn!(archive = %inner.display(), error = %e, "Failed to expand nested archive");
                    }
                }
            }
        }

        Ok(ExtractedRoot {
            path: dest_dir.to_path_buf(),
            files: count_files(dest_dir),
            nested,
        })
    }

    fn backend_for(&self, archive_path: &Path) -> ManagerResult<&dyn ArchiveExtractor> {
        self.backends
            .iter()
            .find(|b| b.supports(archive_path))
            .map(|b| b.as_ref())
            .ok_or_else(|| ManagerError::UnsupportedArchive(archive_path.to_path_buf()))
    }
}

fn create_dir(dir: &Path) -> ManagerResult<()> {
    fs::create_dir_all(dir).map_err(|e| ManagerError::CreateDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Count files recursively in a directory.
fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ArchiveFormat::from_path(Path::new("a.ZIP")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.7z")), Some(ArchiveFormat::SevenZip));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.rar")), Some(ArchiveFormat::Rar));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.tar.gz")), None);
        assert!(!is_archive(Path::new("description.lua")));
    }

    #[test]
    fn test_zip_extraction() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("pack.zip");
        write_zip(
            &archive,
            &[("Skin/description.lua", b"x"), ("Skin/tex.dds", b"yy")],
        );

        let dest = temp.path().join("out");
        let count = ZipExtractor.extract(&archive, &dest).unwrap();
        assert_eq!(count, 2);
        assert_eq!(fs::read(dest.join("Skin/tex.dds")).unwrap(), b"yy");
    }

    #[test]
    fn test_zip_rejects_escaping_entry() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../evil.txt", b"x")]);

        let result = ZipExtractor.extract(&archive, &temp.path().join("out"));
        assert!(matches!(result, Err(ManagerError::ExtractionFailed { .. })));
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[test]
    fn test_nested_archive_expanded_once() {
        let temp = TempDir::new().unwrap();
        let inner = temp.path().join("inner.zip");
        write_zip(&inner, &[("Skin/description.lua", b"lua")]);
        let inner_bytes = fs::read(&inner).unwrap();

        let outer = temp.path().join("outer.zip");
        write_zip(&outer, &[("pack/inner.zip", &inner_bytes)]);

        let dest = temp.path().join("tmp/1");
        let extractor = RecursiveExtractor::new();
        let root = extractor.extract(&outer, &dest, &CancelFlag::new()).unwrap();

        assert_eq!(root.nested.len(), 1);
        assert!(dest.join("pack/Skin/description.lua").exists());
        // inner.zip + description.lua
        assert_eq!(root.files, 2);
    }

    #[test]
    fn test_stale_output_is_replaced() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("pack.zip");
        write_zip(&archive, &[("a.txt", b"a")]);

        let dest = temp.path().join("tmp/5");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.txt"), b"old").unwrap();

        RecursiveExtractor::new()
            .extract(&archive, &dest, &CancelFlag::new())
            .unwrap();
        assert!(!dest.join("stale.txt").exists());
        assert!(dest.join("a.txt").exists());
    }

    #[test]
    fn test_cancelled_before_nested_scan() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("pack.zip");
        write_zip(&archive, &[("a.txt", b"a")]);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = RecursiveExtractor::new().extract(&archive, &temp.path().join("out"), &cancel);
        assert!(matches!(result, Err(ManagerError::Cancelled)));
    }

    #[test]
    fn test_unsupported_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("pack.tar.gz");
        fs::write(&archive, b"x").unwrap();

        let result = RecursiveExtractor::new().extract(
            &archive,
            &temp.path().join("out"),
            &CancelFlag::new(),
        );
        assert!(matches!(result, Err(ManagerError::UnsupportedArchive(_))));
    }

    #[test]
    fn test_corrupt_zip_fails() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bad.zip");
        fs::write(&archive, b"not a zip").unwrap();

        let result = RecursiveExtractor::new().extract(
            &archive,
            &temp.path().join("out"),
            &CancelFlag::new(),
        );
        assert!(matches!(result, Err(ManagerError::ExtractionFailed { .. })));
    }
}
