//! Source positions and spans.
//!
//! A [`Position`] identifies one point in one source file: a byte index plus
//! the line/column it falls on, together with the file name and the full
//! source text it was taken from. Carrying the source text on the position
//! itself (rather than indirecting through a source map keyed by a file id)
//! keeps error construction a pure function of two positions, matching how
//! the language this crate implements builds its own error messages.

use std::sync::Arc;

/// A single point in a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Byte offset into `source`.
    pub index: usize,
    /// 1-based line number.
    pub line: u32,
    /// 0-based column number (matches the original interpreter's counting).
    pub column: u32,
    pub file_name: Arc<str>,
    pub source: Arc<str>,
}

impl Position {
    pub fn new(index: usize, line: u32, column: u32, file_name: Arc<str>, source: Arc<str>) -> Self {
        Self { index, line, column, file_name, source }
    }

    /// Advances past `current_char`, tracking line/column the way the
    /// lexer's cursor does: a newline resets the column and bumps the line.
    pub fn advance(&mut self, current_char: Option<char>) -> &mut Self {
        self.index += 1;
        self.column += 1;
        if current_char == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
        self
    }

    pub fn copy(&self) -> Position {
        self.clone()
    }
}

/// A half-open range between two [`Position`]s, used to mark the extent of
/// every token and AST node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// True when `other` falls entirely within `self`, byte-index-wise.
    pub fn contains(&self, other: &Span) -> bool {
        self.start.index <= other.start.index && other.end.index <= self.end.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(index: usize, line: u32, column: u32) -> Position {
        Position::new(index, line, column, Arc::from("<test>"), Arc::from(""))
    }

    #[test]
    fn advance_tracks_line_and_column() {
        let mut p = pos(0, 1, 0);
        p.advance(Some('a'));
        assert_eq!((p.index, p.line, p.column), (1, 1, 1));
        p.advance(Some('\n'));
        assert_eq!((p.index, p.line, p.column), (2, 2, 0));
    }

    #[test]
    fn span_containment() {
        let outer = Span::new(pos(0, 1, 0), pos(10, 1, 10));
        let inner = Span::new(pos(2, 1, 2), pos(5, 1, 5));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }
}
