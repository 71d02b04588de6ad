//! Externally sourced livery metadata.

use serde::{Deserialize, Serialize};

/// Description of a skin pack as published by its source.
///
/// The package manager treats this record as opaque: it is filled by a
/// [`MetadataProvider`](crate::manager::MetadataProvider) or from command line
/// arguments for local archives, and persisted unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// Display title, already stripped of characters invalid in folder names.
    pub title: String,

    /// Author name.
    pub author: String,

    /// Upload date as shown by the source (free-form text).
    pub date: String,

    /// Upload timestamp in seconds since the Unix epoch, if known.
    pub timestamp: Option<i64>,

    /// Declared archive size as shown by the source (e.g. "12.4 Mb").
    pub size: String,

    /// Download URL of the archive; empty for local archives.
    pub download: String,

    /// Unit tags the source associates with the pack.
    pub unit_tags: Vec<String>,
}

impl Metadata {
    /// Create metadata with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the download URL (builder pattern).
    pub fn with_download(mut self, url: impl Into<String>) -> Self {
        self.download = url.into();
        self
    }

    /// Set the author (builder pattern).
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the unit tags (builder pattern).
    pub fn with_unit_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unit_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the archive must be fetched over the network.
    pub fn is_remote(&self) -> bool {
        !self.download.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = Metadata::titled("Viper Demo Team")
            .with_author("someone")
            .with_download("https://example.com/a.zip")
            .with_unit_tags(["f-16c"]);

        assert_eq!(meta.title, "Viper Demo Team");
        assert_eq!(meta.author, "someone");
        assert!(meta.is_remote());
        assert_eq!(meta.unit_tags, vec!["f-16c".to_string()]);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = Metadata::titled("x").with_unit_tags(["a"]);
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"unitTags\""));

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_metadata_tolerates_missing_fields() {
        let meta: Metadata = serde_json::from_str(r#"{"title": "only"}"#).unwrap();
        assert_eq!(meta.title, "only");
        assert!(!meta.is_remote());
    }
}
