//! Centralized livery naming conventions.
//!
//! This module is the single source of truth for:
//! - Identifier ranges (remote vs. locally generated ids)
//! - Remote file URLs derived from identifiers
//! - Folder-safe titles
//! - Destination roots for normal and mod-manager installs

/// First id reserved for locally generated items.
///
/// Remote identifiers are far below this value, so local archives can never
/// collide with a pack fetched from the user files site.
pub const LOCAL_ID_BASE: u64 = 10_000_000;

/// Root of the user files site that remote identifiers refer to.
pub const USER_FILES_URL_ROOT: &str = "https://www.digitalcombatsimulator.com/en/files/";

/// Folder that holds per-livery roots in mod-manager mode.
pub const MOD_MANAGER_FOLDER: &str = "DCSLM";

/// Folder under which the game looks for liveries.
const LIVERIES_FOLDER: &str = "Liveries";

/// Characters that are not allowed in folder names.
const BAD_FILENAME_CHARS: &[char] = &['/', '\\', '?', '|', '*', '"', '<', '>'];

/// Check whether an id belongs to the locally generated range.
///
/// # Examples
///
/// ```
/// use dcslm::livery::{is_local_id, LOCAL_ID_BASE};
///
/// assert!(!is_local_id(3_312_345));
/// assert!(is_local_id(LOCAL_ID_BASE + 1));
/// ```
pub fn is_local_id(id: u64) -> bool {
    id > LOCAL_ID_BASE
}

/// Make a title safe to use as a folder name.
///
/// Removes characters that are invalid in Windows paths and collapses runs of
/// whitespace into a single space.
///
/// # Examples
///
/// ```
/// use dcslm::livery::sanitize_title;
///
/// assert_eq!(sanitize_title("  F-16C  \"Viper\" / 2021 "), "F-16C Viper 2021");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !BAD_FILENAME_CHARS.contains(c))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract a numeric identifier from a user files URL or a bare id.
///
/// A trailing slash is ignored. Returns `None` if the last path segment is not
/// numeric, or if its value is zero or reaches into the locally generated
/// range, so such ids never collide with [`is_local_id`] ids.
///
/// # Examples
///
/// ```
/// use dcslm::livery::id_from_url;
///
/// assert_eq!(id_from_url("https://www.digitalcombatsimulator.com/en/files/3312345/"), Some(3312345));
/// assert_eq!(id_from_url("3312345"), Some(3312345));
/// assert_eq!(id_from_url("https://example.com/files/latest"), None);
/// ```
pub fn id_from_url(url: &str) -> Option<u64> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit('/').next()?;
    if last.is_empty() || !last.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    last.parse().ok().filter(|&id| id != 0 && id < LOCAL_ID_BASE)
}

/// Build the canonical user files URL for an id or URL.
///
/// # Examples
///
/// ```
/// use dcslm::livery::canonical_user_files_url;
///
/// assert_eq!(
///     canonical_user_files_url("3312345").as_deref(),
///     Some("https://www.digitalcombatsimulator.com/en/files/3312345/")
/// );
/// assert_eq!(canonical_user_files_url("not-an-id"), None);
/// ```
pub fn canonical_user_files_url(id_or_url: &str) -> Option<String> {
    id_from_url(id_or_url).map(|id| format!("{}{}/", USER_FILES_URL_ROOT, id))
}

/// Destination root for a livery, relative to the game's saved-games folder.
///
/// In mod-manager mode every livery gets its own self-contained tree that a
/// mod manager can enable or disable as a unit.
///
/// # Examples
///
/// ```
/// use dcslm::livery::destination_root;
///
/// assert_eq!(destination_root("Viper Demo", false), "Liveries");
/// assert_eq!(destination_root("Viper Demo", true), "DCSLM/Viper Demo/Liveries");
/// ```
pub fn destination_root(title: &str, mod_manager_mode: bool) -> String {
    if mod_manager_mode {
        format!(
            "{}/{}/{}",
            MOD_MANAGER_FOLDER,
            sanitize_title(title),
            LIVERIES_FOLDER
        )
    } else {
        LIVERIES_FOLDER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title_removes_bad_chars() {
        assert_eq!(sanitize_title("a<b>c|d*e?f"), "abcdef");
        assert_eq!(sanitize_title("tabs\tand\nnewlines"), "tabs and newlines");
    }

    #[test]
    fn test_sanitize_title_empty() {
        assert_eq!(sanitize_title("  ///  "), "");
    }

    #[test]
    fn test_id_from_url_variants() {
        assert_eq!(id_from_url("https://x/en/files/42"), Some(42));
        assert_eq!(id_from_url("https://x/en/files/42/"), Some(42));
        assert_eq!(id_from_url(""), None);
        assert_eq!(id_from_url("/"), None);
        assert_eq!(id_from_url("12a"), None);
    }

    #[test]
    fn test_id_from_url_rejects_reserved_values() {
        assert_eq!(id_from_url("https://x/en/files/0/"), None);
        assert_eq!(id_from_url("000"), None);
        assert_eq!(id_from_url(&LOCAL_ID_BASE.to_string()), None);
        assert_eq!(id_from_url(&(LOCAL_ID_BASE + 7).to_string()), None);
        assert_eq!(id_from_url("99999999999999999999999"), None);
        assert_eq!(id_from_url(&(LOCAL_ID_BASE - 1).to_string()), Some(LOCAL_ID_BASE - 1));
    }

    #[test]
    fn test_local_id_boundary() {
        assert!(!is_local_id(LOCAL_ID_BASE));
        assert!(is_local_id(LOCAL_ID_BASE + 1));
    }

    #[test]
    fn test_destination_root_sanitizes_title() {
        assert_eq!(destination_root("a/b", true), "DCSLM/ab/Liveries");
    }
}
