//! Texture deduplication for installed liveries.
//!
//! Skin packs often ship the same texture in several variant folders. The
//! optimizer finds byte-identical files, points every duplicate statement
//! at one canonical copy and deletes files no statement references anymore.
//!
//! # Overview
//!
//! 1. [`build_file_refs`] parses each skin folder's configuration
//! 2. [`compute_hashes`] hashes the referenced files into a [`HashIndex`]
//! 3. [`plan_rewrites`] / [`apply_rewrites`] canonicalize duplicate references
//! 4. [`find_unused`] re-reads the configuration and lists unreferenced files
//! 5. [`Optimizer`] sequences the phases and records the result
//!
//! Rewriting always finishes before pruning starts, so the referenced set is
//! never stale.

mod analyzer;
mod error;
mod hasher;
mod orchestrator;
mod prune;
mod report;
mod rewrite;
mod types;

pub use analyzer::{build_file_refs, compute_hashes, resolve_reference};
pub use error::{OptimizeError, OptimizeResult};
pub use hasher::{hash_file, ContentHash};
pub use orchestrator::Optimizer;
pub use prune::{find_unused, is_skipped, referenced_stems, stem_key};
pub use report::{OptimizeReport, OptimizeState};
pub use rewrite::{
    apply_rewrites, backup_path, plan_rewrites, should_rewrite, ConfigRewrite, BACKUP_SUFFIX,
};
pub use types::{
    DuplicateGroup, FileReference, FileRefs, FolderRefs, HashEntry, HashIndex, MissingReference,
    OptimizeOptions,
};
