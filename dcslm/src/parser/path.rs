//! Normalization of paths declared inside configuration statements.
//!
//! Declared paths are relative to the folder holding the configuration file
//! and may climb out of it with `..`. Both `/` and `\` are accepted as
//! separators; normalized output always uses `/`.

/// Collapse `.` and `name/..` components of a declared relative path.
///
/// Leading `..` components that cannot be collapsed are kept, so the result
/// still points outside the configuration folder when the input did.
///
/// # Examples
///
/// ```
/// use dcslm::parser::normalize_path;
///
/// assert_eq!(normalize_path("../A/./sub/../tex"), "../A/tex");
/// assert_eq!(normalize_path("..\\B\\tex.dds"), "../B/tex.dds");
/// assert_eq!(normalize_path("a/../../b"), "../b");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            name => parts.push(name),
        }
    }
    parts.join("/")
}

/// Last component of a normalized path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether the last component of a path carries a file extension.
pub fn has_extension(path: &str) -> bool {
    let name = file_name(path);
    match name.rfind('.') {
        Some(pos) => pos > 0 && pos + 1 < name.len(),
        None => false,
    }
}

/// Whether a normalized path stays inside the configuration folder.
pub fn is_local(path: &str) -> bool {
    !path.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_keeps_simple_names() {
        assert_eq!(normalize_path("texture"), "texture");
        assert_eq!(normalize_path("./texture.dds"), "texture.dds");
    }

    #[test]
    fn test_equivalent_forms_match() {
        assert_eq!(
            normalize_path("../A/x/../tex"),
            normalize_path("../A/tex")
        );
        assert_eq!(normalize_path("B/../tex"), "tex");
    }

    #[test]
    fn test_file_name_and_extension() {
        assert_eq!(file_name("../A/tex.dds"), "tex.dds");
        assert_eq!(file_name("tex"), "tex");
        assert!(has_extension("../A/tex.dds"));
        assert!(!has_extension("../A/tex"));
        assert!(!has_extension(".hidden"));
        assert!(!has_extension("trailing."));
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("tex.dds"));
        assert!(!is_local("../A/tex.dds"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(parts in proptest::collection::vec(
            prop_oneof![Just("..".to_string()), Just(".".to_string()), "[a-z]{1,4}"],
            0..8,
        )) {
            let path = parts.join("/");
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
            prop_assert!(!once.contains("/./"));
        }
    }
}
