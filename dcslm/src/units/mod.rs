//! Unit catalog: which airframes exist and where their liveries live.
//!
//! The catalog is an immutable lookup service built once at startup and
//! passed by reference to the components that need it:
//!
//! - [`UnitInfo`] - one unit (generic name, friendly name, install folders, tags)
//! - [`UnitCatalog`] - the lookup interface
//! - [`MemoryUnitCatalog`] - built-in defaults plus optional JSON overrides

mod catalog;
mod defaults;

pub use catalog::{resolve_install_folders, MemoryUnitCatalog};

use serde::{Deserialize, Serialize};

/// A unit that liveries can be installed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInfo {
    /// Lowercase generic identifier (e.g. `f-16c`).
    #[serde(default)]
    pub generic_name: String,

    /// Human-friendly name (e.g. `F-16C Viper`).
    pub friendly_name: String,

    /// Folder names under `Liveries/` the unit reads skins from.
    pub install_folders: Vec<String>,

    /// Lowercase tags that identify the unit in remote metadata.
    pub tags: Vec<String>,
}

impl UnitInfo {
    /// Create a unit description.
    pub fn new<F, T>(generic_name: &str, friendly_name: &str, install_folders: F, tags: T) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            generic_name: generic_name.to_lowercase(),
            friendly_name: friendly_name.to_string(),
            install_folders: install_folders.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(|t| t.into().to_lowercase()).collect(),
        }
    }

    /// Check a unit loaded from user data for missing fields.
    ///
    /// Returns the list of problems; empty means valid.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.generic_name.is_empty() {
            errors.push("missing generic name");
        }
        if self.friendly_name.is_empty() {
            errors.push("missing friendly name");
        }
        if self.tags.is_empty() {
            errors.push("missing tag(s)");
        }
        if self.install_folders.is_empty() {
            errors.push("missing install folder name(s)");
        }
        errors
    }

    /// Whether the unit answers to the given tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }
}

/// Lookup interface over the known units.
pub trait UnitCatalog: Send + Sync {
    /// Find a unit by its generic name.
    fn lookup(&self, generic_name: &str) -> Option<&UnitInfo>;

    /// Find a unit by its friendly name (case-insensitive).
    fn lookup_friendly(&self, friendly_name: &str) -> Option<&UnitInfo>;

    /// Units matching any of the given tags, in catalog order.
    fn units_for_tags(&self, tags: &[String]) -> Vec<&UnitInfo>;

    /// All units in catalog order.
    fn units(&self) -> Vec<&UnitInfo>;
}
