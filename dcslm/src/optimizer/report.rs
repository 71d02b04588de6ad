//! Optimization report.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::types::{DuplicateGroup, MissingReference};

/// Phase an optimization run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OptimizeState {
    NotOptimized,
    Analyzing,
    Rewriting,
    Pruning,
    Optimized,
}

impl OptimizeState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotOptimized => "not optimized",
            Self::Analyzing => "analyzing",
            Self::Rewriting => "rewriting",
            Self::Pruning => "pruning",
            Self::Optimized => "optimized",
        }
    }
}

/// Outcome of optimizing one livery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeReport {
    pub id: u64,
    pub title: String,
    /// Final state of the run.
    pub state: OptimizeState,
    /// The livery was already optimized and nothing was done.
    pub skipped: bool,
    /// Analysis only; no file was modified.
    pub check_only: bool,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub missing: Vec<MissingReference>,
    /// Configuration files written.
    pub rewritten: Vec<PathBuf>,
    /// Unused files deleted.
    pub removed: Vec<PathBuf>,
    /// Unused files left in place on request.
    pub unused_kept: Vec<PathBuf>,
    /// Unused files whose deletion failed the containment check.
    pub refused: Vec<PathBuf>,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl OptimizeReport {
    pub(crate) fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            state: OptimizeState::NotOptimized,
            skipped: false,
            check_only: false,
            duplicate_groups: Vec::new(),
            missing: Vec::new(),
            rewritten: Vec::new(),
            removed: Vec::new(),
            unused_kept: Vec::new(),
            refused: Vec::new(),
            bytes_before: 0,
            bytes_after: 0,
        }
    }

    /// Bytes freed by the run.
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

impl fmt::Display for OptimizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}): {}", self.title, self.id, self.state.name())?;
        if self.skipped {
            return writeln!(f, "  already optimized, use --force to run again");
        }

        for group in &self.duplicate_groups {
            writeln!(
                f,
                "  duplicate {} [{}] -> {}/{}",
                group.hash.short(),
                group.folders.join(", "),
                group.canonical,
                group.canonical_file
            )?;
        }
        for missing in &self.missing {
            writeln!(f, "  missing {}/{}", missing.folder, missing.path)?;
        }
        for path in &self.refused {
            writeln!(f, "  refused to delete {}", path.display())?;
        }
        for path in &self.unused_kept {
            writeln!(f, "  unused {}", path.display())?;
        }

        if self.check_only {
            writeln!(
                f,
                "  {} duplicate group(s), {} missing reference(s)",
                self.duplicate_groups.len(),
                self.missing.len()
            )
        } else {
            writeln!(
                f,
                "  rewrote {} file(s), removed {} file(s), {} -> {} bytes",
                self.rewritten.len(),
                self.removed.len(),
                self.bytes_before,
                self.bytes_after
            )
        }
    }
}
