//! Sequencing of one optimization run.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::livery::Livery;
use crate::parser::StatementParser;
use crate::registry::{Registry, SIDECAR_FILENAME};
use crate::safety::{remove_file_checked, RemoveError};

use super::analyzer::{build_file_refs, compute_hashes};
use super::error::{OptimizeError, OptimizeResult};
use super::prune::find_unused;
use super::report::{OptimizeReport, OptimizeState};
use super::rewrite::{apply_rewrites, plan_rewrites, should_rewrite, BACKUP_SUFFIX};
use super::types::OptimizeOptions;

/// Deduplicates the textures of installed liveries.
///
/// A run moves through `NotOptimized -> Analyzing -> Rewriting -> Pruning ->
/// Optimized`. Check-only runs stop after analysis and never touch files.
pub struct Optimizer {
    parser: StatementParser,
    options: OptimizeOptions,
}

impl Optimizer {
    pub fn new(options: OptimizeOptions) -> Self {
        Self {
            parser: StatementParser::new(),
            options,
        }
    }

    pub fn options(&self) -> &OptimizeOptions {
        &self.options
    }

    /// Optimize one registered livery and persist the result.
    ///
    /// # Errors
    ///
    /// A failure while rewriting aborts this livery only and leaves it marked
    /// as not optimized.
    pub fn optimize(&self, registry: &mut Registry, id: u64) -> OptimizeResult<OptimizeReport> {
        let mut livery = registry.require(id)?.clone();
        let mut report = OptimizeReport::new(id, livery.title());
        report.check_only = self.options.check_only;

        if livery.optimized && !self.options.force && !self.options.check_only {
            debug!(id = id, "Livery already optimized, skipping");
            report.skipped = true;
            report.state = OptimizeState::Optimized;
            return Ok(report);
        }

        let locks = registry.locks().clone();
        let _guard = locks.try_acquire(id).ok_or(OptimizeError::ItemBusy(id))?;
        let root = registry.root().to_path_buf();

        // Analyze
        transition(&mut report, OptimizeState::Analyzing);
        report.bytes_before = measure(&root, &livery);
        let mut refs = build_file_refs(&root, &livery, &self.parser)?;
        let (index, missing) = compute_hashes(&mut refs);
        let groups = index.duplicate_groups();
        for m in &missing {
            warn!(id = id, folder = %m.folder, path = %m.path, "Missing texture reference");
        }
        report.duplicate_groups = groups.clone();
        report.missing = missing;

        if self.options.check_only {
            report.bytes_after = report.bytes_before;
            report.state = if livery.optimized {
                OptimizeState::Optimized
            } else {
                OptimizeState::NotOptimized
            };
            return Ok(report);
        }

        // Rewrite
        if should_rewrite(&livery, &groups) {
            transition(&mut report, OptimizeState::Rewriting);
            let plan = plan_rewrites(&root, &livery, &refs, &groups, &self.parser)?;
            report.rewritten = apply_rewrites(&root, &plan, self.options.backup_config)?;
        }

        // Prune against the configuration as it is on disk now.
        transition(&mut report, OptimizeState::Pruning);
        let unused = find_unused(&root, &livery, &self.parser)?;
        if self.options.keep_unused {
            report.unused_kept = unused;
        } else {
            for file in unused {
                match remove_file_checked(&root, &file) {
                    Ok(()) => report.removed.push(file),
                    Err(RemoveError::Outside(e)) => {
                        warn!(path = %file.display(), error = %e, "Refusing to delete file");
                        report.refused.push(file);
                    }
                    Err(RemoveError::Io { path, source }) => {
                        return Err(OptimizeError::Io { path, source });
                    }
                }
            }
        }

        // Record
        report.bytes_after = measure(&root, &livery);
        update_sizes(&root, &mut livery);
        livery.optimized = true;
        registry.write_sidecars(&livery)?;
        registry.update(livery)?;
        registry.save()?;
        transition(&mut report, OptimizeState::Optimized);

        info!(
            id = id,
            duplicates = report.duplicate_groups.len(),
            rewritten = report.rewritten.len(),
            removed = report.removed.len(),
            saved = report.bytes_saved(),
            "Optimized livery"
        );
        Ok(report)
    }

    /// Optimize several liveries; a failure does not stop the batch.
    pub fn optimize_many(
        &self,
        registry: &mut Registry,
        ids: &[u64],
    ) -> Vec<(u64, OptimizeResult<OptimizeReport>)> {
        ids.iter()
            .map(|&id| {
                let result = self.optimize(registry, id);
                if let Err(ref e) = result {
                    warn!(id = id, error = %e, "Optimization failed");
                }
                (id, result)
            })
            .collect()
    }
}

fn transition(report: &mut OptimizeReport, next: OptimizeState) {
    debug!(id = report.id, from = report.state.name(), to = next.name(), "Optimizer state");
    report.state = next;
}

/// Whether a file counts towards installed size.
fn counts_towards_size(name: &str) -> bool {
    name != SIDECAR_FILENAME && !name.ends_with(BACKUP_SUFFIX)
}

/// Bytes of one install directory (recursive).
fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| counts_towards_size(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Bytes of every install path of a livery.
fn measure(root: &Path, livery: &Livery) -> u64 {
    livery.install_paths().map(|p| dir_size(&root.join(p))).sum()
}

/// Refresh each record's size from its first install path.
fn update_sizes(root: &Path, livery: &mut Livery) {
    for record in livery.installs.values_mut() {
        if let Some(first) = record.paths.first() {
            record.size = dir_size(&root.join(first));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::livery::{InstallRecord, Metadata};
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = "livery = {\n\t{\"main\", 0, \"tex\", false};\n}\n";

    fn setup(registry_root: &Path, units: &[&str]) -> Registry {
        let mut livery = Livery::new(5, Metadata::titled("Pack"));
        livery.destination_root = "Liveries".to_string();
        livery.target_units = units.iter().map(|u| u.to_string()).collect();
        for folder in ["A", "B"] {
            let mut record = InstallRecord::new(0, false);
            for unit in units {
                let rel = format!("Liveries/{}/{}", unit, folder);
                let dir = registry_root.join(&rel);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join("description.lua"), CONFIG).unwrap();
                fs::write(dir.join("tex.dds"), vec![7u8; 2048]).unwrap();
                record.paths.push(rel);
            }
            livery.installs.insert(folder.to_string(), record);
        }

        let mut registry =
            Registry::open(registry_root, registry_root.join("DCSLM/dcslm.json"), false).unwrap();
        registry.write_sidecars(&livery).unwrap();
        registry.register(livery);
        registry
    }

    #[test]
    fn test_check_only_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup(temp.path(), &["U1"]);
        let optimizer = Optimizer::new(OptimizeOptions::new().with_check_only(true));

        let report = optimizer.optimize(&mut registry, 5).unwrap();

        assert_eq!(report.duplicate_groups.len(), 1);
        assert_eq!(report.state, OptimizeState::NotOptimized);
        assert!(report.rewritten.is_empty());
        assert!(temp.path().join("Liveries/U1/B/tex.dds").exists());
        assert!(!registry.get(5).unwrap().optimized);
    }

    #[test]
    fn test_optimize_marks_and_persists() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup(temp.path(), &["U1"]);
        let optimizer = Optimizer::new(OptimizeOptions::new());

        let report = optimizer.optimize(&mut registry, 5).unwrap();

        assert_eq!(report.state, OptimizeState::Optimized);
        assert_eq!(report.removed, vec![temp.path().join("Liveries/U1/B/tex.dds")]);
        assert!(report.bytes_after < report.bytes_before);
        let livery = registry.get(5).unwrap();
        assert!(livery.optimized);
        assert!(livery.installs["B"].size < 2048);

        let reloaded =
            Registry::open(temp.path(), temp.path().join("DCSLM/dcslm.json"), false).unwrap();
        assert!(reloaded.get(5).unwrap().optimized);
    }

    #[test]
    fn test_keep_unused() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup(temp.path(), &["U1"]);
        let optimizer = Optimizer::new(OptimizeOptions::new().with_keep_unused(true));

        let report = optimizer.optimize(&mut registry, 5).unwrap();

        assert!(report.removed.is_empty());
        assert_eq!(report.unused_kept.len(), 1);
        assert!(temp.path().join("Liveries/U1/B/tex.dds").exists());
    }

    #[test]
    fn test_busy_livery() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup(temp.path(), &["U1"]);
        let _guard = registry.locks().try_acquire(5).unwrap();

        let result = Optimizer::new(OptimizeOptions::new()).optimize(&mut registry, 5);
        assert!(matches!(result, Err(OptimizeError::ItemBusy(5))));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let mut registry = setup(temp.path(), &["U1"]);

        let results = Optimizer::new(OptimizeOptions::new()).optimize_many(&mut registry, &[99, 5]);

        assert!(matches!(results[0].1, Err(OptimizeError::NotFound(99))));
        assert!(results[1].1.is_ok());
    }
}
