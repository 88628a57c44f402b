//! Source position types and line helpers.
//!
//! Positions are line/column pairs, both 1-based. The column counts
//! characters (not bytes) since the most recent newline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line/column location in source text.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Compute the position of byte offset `pos` in `text`.
///
/// `pos` is clamped to the text length and snapped back to a char boundary.
pub fn position_of(text: &str, pos: usize) -> Position {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    let before = &text[..pos];
    let line = before.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = text[line_start..pos].chars().count() as u32 + 1;
    Position { line, column }
}

/// Return the full line of `text` containing byte offset `pos`, without the
/// trailing newline.
pub fn line_at(text: &str, pos: usize) -> &str {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    let start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
    text[start..end].trim_end_matches('\r')
}
