//! Whole-file content digests.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a file's content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Digest of an in-memory buffer.
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First 12 hex digits, enough to tell groups apart in reports.
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Hash the whole content of a file.
///
/// Livery textures are at most a few tens of megabytes, so the file is read
/// in one go.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
    let data = fs::read(path)?;
    Ok(ContentHash::of_bytes(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_identical_files_hash_equal() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.dds");
        let b = temp.path().join("b.dds");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(hash_file(&temp.path().join("nope.dds")).is_err());
    }

    #[test]
    fn test_hex_form() {
        let hash = ContentHash::of_bytes(b"");
        assert_eq!(
            hash.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash.short(), "e3b0c44298fc");
    }

    proptest! {
        #[test]
        fn prop_equal_content_equal_hash(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(ContentHash::of_bytes(&data), ContentHash::of_bytes(&data.clone()));
        }

        #[test]
        fn prop_one_byte_difference_changes_hash(
            data in proptest::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let mut other = data.clone();
            let i = index.index(other.len());
            other[i] ^= flip;
            prop_assert_ne!(ContentHash::of_bytes(&data), ContentHash::of_bytes(&other));
        }
    }
}
