//! Livery data model.
//!
//! This module provides the records tracked for every installed skin pack:
//!
//! - **Livery**: the managed item (id, metadata, install records, target units)
//! - **InstallRecord**: where one detected skin folder was copied to, per unit
//! - **Metadata**: the externally sourced description of the pack
//!
//! # Type Hierarchy
//!
//! ```text
//! Livery
//! ├── id: u64
//! ├── metadata: Metadata
//! ├── archive: String
//! ├── destination_root: String
//! ├── installs: BTreeMap<folder name, InstallRecord>
//! │                         ├── size: u64
//! │                         ├── paths: Vec<String>   (one per target unit)
//! │                         └── is_data_folder: bool
//! ├── target_units: Vec<String>
//! └── optimized: bool
//! ```
//!
//! The serialized form of [`Livery`] is shared by the central index file and
//! the per-install sidecar files.

mod metadata;
mod model;
mod naming;

pub use metadata::Metadata;
pub use model::{InstallRecord, Livery};
pub use naming::{
    canonical_user_files_url, destination_root, id_from_url, is_local_id, sanitize_title,
    LOCAL_ID_BASE, MOD_MANAGER_FOLDER, USER_FILES_URL_ROOT,
};
