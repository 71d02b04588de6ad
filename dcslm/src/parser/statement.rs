//! Statement records and the tuple-matching phase.
//!
//! A statement binds a model part to a texture file:
//!
//! ```text
//! {"f16_bl50_main_1", DIFFUSE, "f16_bl50_main_1", false};
//!   part label         index    file path          external
//! ```
//!
//! The external flag is `true` for files provided by the game itself and
//! `false` for files shipped inside the livery.

use std::fmt;
use std::ops::Range;

use regex::Regex;

/// Pattern matching one brace-delimited 4-tuple.
const STATEMENT_PATTERN: &str =
    r#"\{\s*"([^"]*)"\s*,\s*([^,{}"]+?)\s*,\s*"([^"]*)"\s*,\s*(true|false)\s*\}"#;

/// One statement record extracted from a configuration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Model part label.
    pub part: String,

    /// Index expression, carried through unchanged.
    pub index: String,

    /// File path as declared.
    pub path: String,

    /// Whether the file is provided by the game rather than the livery.
    pub external: bool,

    /// Byte range of the tuple (braces included) within its source line.
    pub span: Range<usize>,
}

impl Statement {
    /// Copy of this statement pointing at another file.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Serialize back to the brace-tuple textual form.
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"{}\", {}, \"{}\", {}}}",
            self.part, self.index, self.path, self.external
        )
    }
}

/// Matcher for statement tuples within live text.
#[derive(Debug, Clone)]
pub(super) struct StatementMatcher {
    pattern: Regex,
}

impl StatementMatcher {
    pub(super) fn new() -> Self {
        Self {
            pattern: Regex::new(STATEMENT_PATTERN).expect("statement pattern is valid"),
        }
    }

    /// Extract every well-formed tuple inside `line[span]`.
    ///
    /// Returned spans are relative to the whole line. Text that looks like a
    /// tuple but does not have the 4-field shape is skipped.
    pub(super) fn find_in(&self, line: &str, span: Range<usize>) -> Vec<Statement> {
        let offset = span.start;
        self.pattern
            .captures_iter(&line[span])
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Statement {
                    part: caps.get(1)?.as_str().to_string(),
                    index: caps.get(2)?.as_str().trim().to_string(),
                    path: caps.get(3)?.as_str().to_string(),
                    external: caps.get(4)?.as_str() == "true",
                    span: offset + whole.start()..offset + whole.end(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(line: &str) -> Vec<Statement> {
        StatementMatcher::new().find_in(line, 0..line.len())
    }

    #[test]
    fn test_single_statement() {
        let line = r#"	{"f16_main_1", 0 ,"f16_main_1",false};"#;
        let found = find(line);
        assert_eq!(found.len(), 1);
        let s = &found[0];
        assert_eq!(s.part, "f16_main_1");
        assert_eq!(s.index, "0");
        assert_eq!(s.path, "f16_main_1");
        assert!(!s.external);
        assert_eq!(&line[s.span.clone()], r#"{"f16_main_1", 0 ,"f16_main_1",false}"#);
    }

    #[test]
    fn test_multiple_statements_per_line() {
        let line = r#"{"a", DIFFUSE, "x.dds", false}, {"b", ROUGHNESS_METALLIC, "y", true};"#;
        let found = find(line);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].index, "ROUGHNESS_METALLIC");
        assert!(found[1].external);
    }

    #[test]
    fn test_malformed_statement_is_dropped() {
        assert!(find(r#"{"a", 0, "x.dds"};"#).is_empty());
        assert!(find(r#"{"a", 0, "x.dds", maybe};"#).is_empty());
        assert!(find(r#"{a, 0, "x.dds", false};"#).is_empty());
    }

    #[test]
    fn test_to_source_round_trip() {
        let line = r#"{"part",  1 , "../A/tex" ,true};"#;
        let stmt = &find(line)[0];
        assert_eq!(stmt.to_source(), r#"{"part", 1, "../A/tex", true}"#);

        let reparsed = find(&stmt.to_source());
        assert_eq!(reparsed[0].path, "../A/tex");
        assert_eq!(reparsed[0].index, "1");
    }

    #[test]
    fn test_with_path_keeps_other_fields() {
        let stmt = &find(r#"{"p", 2, "tex", false};"#)[0];
        let moved = stmt.with_path("../A/tex");
        assert_eq!(moved.part, "p");
        assert_eq!(moved.index, "2");
        assert_eq!(moved.path, "../A/tex");
        assert_eq!(moved.span, stmt.span);
    }

    #[test]
    fn test_span_offset_applied() {
        let line = r#"xx {"p", 0, "t", false}"#;
        let found = StatementMatcher::new().find_in(line, 3..line.len());
        assert_eq!(found[0].span.start, 3);
    }
}
