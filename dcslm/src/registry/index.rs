//! On-disk shape of the central index file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::livery::Livery;

/// Global settings stored in the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// Install new liveries below a per-livery mod-manager root.
    #[serde(default)]
    pub mod_manager_mode: bool,
}

/// The central index: every registered livery keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    #[serde(default)]
    pub config: IndexConfig,

    /// Liveries keyed by id (serialized as string keys).
    #[serde(default)]
    pub liveries: BTreeMap<u64, Livery>,

    /// Unix timestamp of the last write.
    #[serde(default)]
    pub last_update_timestamp: i64,
}

impl IndexFile {
    /// Create an empty index.
    pub fn new(mod_manager_mode: bool) -> Self {
        Self {
            config: IndexConfig { mod_manager_mode },
            liveries: BTreeMap::new(),
            last_update_timestamp: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::livery::Metadata;

    #[test]
    fn test_json_shape() {
        let mut index = IndexFile::new(true);
        index
            .liveries
            .insert(7, Livery::new(7, Metadata::titled("Seven")));
        index.last_update_timestamp = 1_700_000_000;

        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["config"]["modManagerMode"], true);
        assert_eq!(json["liveries"]["7"]["metadata"]["title"], "Seven");
        assert_eq!(json["lastUpdateTimestamp"], 1_700_000_000);
    }

    #[test]
    fn test_missing_fields_default() {
        let index: IndexFile = serde_json::from_str(r#"{"liveries": {}}"#).unwrap();
        assert!(!index.config.mod_manager_mode);
        assert_eq!(index.last_update_timestamp, 0);
    }
}
