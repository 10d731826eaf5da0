//! Source positions.
//!
//! AST nodes carry a `TextRange`; diagnostics carry a `TextSpan` and resolve it
//! to a line and column through a `LineMap` when they are printed.

use std::fmt;

/// A byte offset from the start of a source file.
pub type TextPos = u32;

/// A span in source text, given as start and length.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end - start,
        }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

impl From<TextSpan> for miette::SourceSpan {
    fn from(span: TextSpan) -> Self {
        miette::SourceSpan::from((span.start as usize, span.length as usize))
    }
}

/// A half-open `[pos, end)` range attached to every AST node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextRange {
    pub pos: TextPos,
    pub end: TextPos,
}

impl TextRange {
    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        Self { pos, end }
    }

    #[inline]
    pub fn to_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end)
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.end)
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        range.to_span()
    }
}

/// 0-based line and column.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    pub line: u32,
    pub column: u32,
}

/// Byte offsets of every line start in a source file.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| (i + 1) as u32));
        Self { line_starts }
    }

    /// 0-based line containing `pos`.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => (line - 1) as u32,
        }
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize];
        LineAndColumn {
            line,
            column: pos - line_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span() {
        let span = TextSpan::new(4, 3);
        assert_eq!(span.end(), 7);
        assert_eq!(TextSpan::from_bounds(4, 7), span);
    }

    #[test]
    fn test_range_to_span() {
        let span: TextSpan = TextRange::new(10, 15).into();
        assert_eq!(span, TextSpan::new(10, 5));
    }

    #[test]
    fn test_line_map() {
        let map = LineMap::new("int a;\nint b;\n\nint main() {}");
        assert_eq!(map.line_of(15), 3);
        assert_eq!(map.line_of(0), 0);
        assert_eq!(map.line_of(6), 0);
        assert_eq!(map.line_of(7), 1);
        assert_eq!(map.line_of(14), 2);

        let lc = map.line_and_column_of(11);
        assert_eq!(lc, LineAndColumn { line: 1, column: 4 });
    }
}
