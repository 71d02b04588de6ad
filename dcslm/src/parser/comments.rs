//! Comment stripping for livery configuration text.
//!
//! First phase of statement extraction: turns a source line into the byte
//! ranges that hold live code. Line comments (`--`) end the live part of a
//! line; block comments (`--[[ ... ]]`) may span several lines, so the open
//! state is carried between calls in [`CommentState`].
//!
//! Nested block comments and leveled long brackets (`--[==[`) are not
//! supported: inside a block comment the first `]]` closes it.

use std::ops::Range;

const LINE_COMMENT: &[u8] = b"--";
const BLOCK_OPEN: &[u8] = b"--[[";
const BLOCK_CLOSE: &[u8] = b"]]";

/// Comment state carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentState {
    in_block: bool,
}

impl CommentState {
    /// Whether a block comment is open at the end of the last line.
    pub fn in_block(&self) -> bool {
        self.in_block
    }
}

/// Compute the live (non-comment) byte ranges of a line.
///
/// Comment markers inside quoted strings are ignored. Quoted strings do not
/// continue past the end of a line.
///
/// Scanning works on bytes. All markers are ASCII, so every returned range
/// starts and ends on a character boundary of `line`.
pub fn live_spans(line: &str, state: &mut CommentState) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut span_start = 0;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        if state.in_block {
            match find_bytes(&bytes[i..], BLOCK_CLOSE) {
                Some(offset) => {
                    i += offset + BLOCK_CLOSE.len();
                    span_start = i;
                    state.in_block = false;
                    continue;
                }
                None => return spans,
            }
        }

        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if b == b'"' || b == b'\'' {
            quote = Some(b);
            i += 1;
            continue;
        }

        if bytes[i..].starts_with(LINE_COMMENT) {
            if i > span_start {
                spans.push(span_start..i);
            }
            if bytes[i..].starts_with(BLOCK_OPEN) {
                state.in_block = true;
                i += BLOCK_OPEN.len();
                span_start = i;
                continue;
            }
            return spans;
        }

        i += 1;
    }

    if !state.in_block && span_start < bytes.len() {
        spans.push(span_start..bytes.len());
    }
    spans
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
