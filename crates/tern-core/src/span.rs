//! Source locations.

use std::fmt;

/// Where a node starts in its unit, and how many bytes it covers.
///
/// Spans come from the parser (or `AstBuilder`) and are only carried through
/// to IR values and diagnostics; nothing in the semantic core compares them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed byte column.
    pub col: u32,
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Smallest span covering both. Across lines the first start is kept
    /// and the lengths add up.
    pub fn merge(self, other: Span) -> Span {
        if self.line != other.line {
            return Span::new(self.line, self.col, self.len + other.len);
        }
        let start = self.col.min(other.col);
        let end = (self.col + self.len).max(other.col + other.len);
        Span::new(self.line, start, end - start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
