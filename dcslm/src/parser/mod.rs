//! Parser for the statements embedded in livery configuration files.
//!
//! Extraction runs in two phases that can be tested on their own:
//!
//! 1. [`live_spans`] strips line and block comments, producing the byte
//!    ranges of each line that hold live code.
//! 2. The tuple matcher finds `{"part", index, "path", flag}` records inside
//!    those ranges.
//!
//! Parsing is best-effort. Malformed tuples are skipped and their line is
//! treated as plain text, so rendering a [`ParsedLine`] without replacements
//! always reproduces the input exactly.
//!
//! # Example
//!
//! ```
//! use dcslm::parser::StatementParser;
//!
//! let parser = StatementParser::new();
//! let lines = parser.parse_text("livery = {\n\t{\"main\", 0, \"main_tex\", false};\n}\n");
//!
//! let statements: Vec<_> = lines.iter().flat_map(|l| l.statements.iter()).collect();
//! assert_eq!(statements.len(), 1);
//! assert_eq!(statements[0].path, "main_tex");
//! ```

mod comments;
mod path;
mod statement;
mod text;

pub use comments::{live_spans, CommentState};
pub use path::{file_name, has_extension, is_local, normalize_path};
pub use statement::Statement;
pub use text::{ConfigText, TextEncoding};

use tracing::trace;

use statement::StatementMatcher;

/// File name marking a folder as a livery and holding its statements.
pub const CONFIG_FILENAME: &str = "description.lua";

/// One source line with the statements found on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Line content without its terminator.
    pub text: String,

    /// Line terminator (`"\n"`, `"\r\n"` or empty for the last line).
    pub ending: String,

    /// Statements in source order.
    pub statements: Vec<Statement>,
}

impl ParsedLine {
    /// Render the line, letting `replace` substitute individual statements.
    ///
    /// Text between and around statements (indentation, separators,
    /// comments) is kept byte for byte.
    pub fn render_with<F>(&self, mut replace: F) -> String
    where
        F: FnMut(&Statement) -> Option<Statement>,
    {
        let mut out = String::with_capacity(self.text.len() + self.ending.len());
        let mut cursor = 0;
        for stmt in &self.statements {
            out.push_str(&self.text[cursor..stmt.span.start]);
            match replace(stmt) {
                Some(new_stmt) => out.push_str(&new_stmt.to_source()),
                None => out.push_str(&self.text[stmt.span.clone()]),
            }
            cursor = stmt.span.end;
        }
        out.push_str(&self.text[cursor..]);
        out.push_str(&self.ending);
        out
    }
}

/// Statement parser.
///
/// Holds the compiled tuple pattern; build it once and share it by reference.
#[derive(Debug, Clone)]
pub struct StatementParser {
    matcher: StatementMatcher,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self {
            matcher: StatementMatcher::new(),
        }
    }

    /// Extract the statements of one line, updating the comment state.
    pub fn parse_line(&self, line: &str, state: &mut CommentState) -> Vec<Statement> {
        live_spans(line, state)
            .into_iter()
            .flat_map(|span| self.matcher.find_in(line, span))
            .collect()
    }

    /// Parse a whole configuration text into lines.
    ///
    /// A leading byte order mark stays at the start of the first line's text,
    /// so rendering reproduces it.
    pub fn parse_text(&self, text: &str) -> Vec<ParsedLine> {
        let mut state = CommentState::default();
        let lines: Vec<ParsedLine> = text
            .split_inclusive('\n')
            .map(|raw| {
                let (content, ending) = split_ending(raw);
                ParsedLine {
                    statements: self.parse_line(content, &mut state),
                    text: content.to_string(),
                    ending: ending.to_string(),
                }
            })
            .collect();

        trace!(
            lines = lines.len(),
            statements = lines.iter().map(|l| l.statements.len()).sum::<usize>(),
            unclosed_block = state.in_block(),
            "Parsed configuration text"
        );
        lines
    }

    /// All statements of a text in source order.
    pub fn statements(&self, text: &str) -> Vec<Statement> {
        self.parse_text(text)
            .into_iter()
            .flat_map(|l| l.statements)
            .collect()
    }
}

/// Render parsed lines back into a full text.
pub fn render<F>(lines: &[ParsedLine], mut replace: F) -> String
where
    F: FnMut(&Statement) -> Option<Statement>,
{
    lines.iter().map(|l| l.render_with(&mut replace)).collect()
}

fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "livery = {\r\n\
        \t{\"main\", 0, \"main_tex\", false}; -- diffuse\r\n\
        \t{\"main\", ROUGHNESS_METALLIC, \"main_rm\", false};\r\n\
        --[[\r\n\
        \t{\"old\", 0, \"old_tex\", false};\r\n\
        ]]\r\n\
        \t{\"pilot\", 0, \"pilot_default\", true}; -- {\"x\", 0, \"commented\", false};\r\n\
        }\r\n\
        name = \"Sample\"";

    #[test]
    fn test_block_comment_statement_not_extracted() {
        let parser = StatementParser::new();
        let paths: Vec<_> = parser
            .statements(SAMPLE)
            .into_iter()
            .map(|s| s.path)
            .collect();
        assert_eq!(paths, vec!["main_tex", "main_rm", "pilot_default"]);
    }

    #[test]
    fn test_render_without_changes_is_identity() {
        let parser = StatementParser::new();
        let lines = parser.parse_text(SAMPLE);
        assert_eq!(render(&lines, |_| None), SAMPLE);
    }

    #[test]
    fn test_render_replaces_only_statement_text() {
        let parser = StatementParser::new();
        let lines = parser.parse_text("\t{\"main\", 0, \"tex\", false}; -- keep me\n");
        let out = render(&lines, |s| Some(s.with_path("../A/tex")));
        assert_eq!(out, "\t{\"main\", 0, \"../A/tex\", false}; -- keep me\n");
    }

    #[test]
    fn test_statement_partly_in_trailing_comment() {
        let parser = StatementParser::new();
        let found = parser.statements("{\"a\", 0, \"tex\" -- , false};\n");
        assert!(found.is_empty());
    }

    #[test]
    fn test_block_comment_state_carries_across_lines() {
        let parser = StatementParser::new();
        let text = "--[[ {\"a\", 0, \"x\", false};\n{\"b\", 0, \"y\", false};\n]] {\"c\", 0, \"z\", false};\n";
        let paths: Vec<_> = parser.statements(text).into_iter().map(|s| s.path).collect();
        assert_eq!(paths, vec!["z"]);
    }

    #[test]
    fn test_byte_order_mark_is_kept() {
        let parser = StatementParser::new();
        let text = "\u{FEFF}livery = {\n{\"main\", 0, \"tex\", false};\n}\n";
        let lines = parser.parse_text(text);

        let paths: Vec<_> = lines
            .iter()
            .flat_map(|l| l.statements.iter().map(|s| s.path.as_str()))
            .collect();
        assert_eq!(paths, vec!["tex"]);
        assert!(lines[0].text.starts_with('\u{FEFF}'));
        assert_eq!(render(&lines, |_| None), text);
    }

    #[test]
    fn test_non_ascii_text_around_statements() {
        let parser = StatementParser::new();
        let text = "-- Überarbeitet\n\t{\"main\", 0, \"tex\", false}; -- Grün\nname = \"Grün\"\n";
        let lines = parser.parse_text(text);
        assert_eq!(parser.statements(text).len(), 1);

        let out = render(&lines, |s| Some(s.with_path("../Ä/tex")));
        assert_eq!(
            out,
            "-- Überarbeitet\n\t{\"main\", 0, \"../Ä/tex\", false}; -- Grün\nname = \"Grün\"\n"
        );
    }

    #[test]
    fn test_empty_text() {
        let parser = StatementParser::new();
        assert!(parser.parse_text("").is_empty());
    }
}
