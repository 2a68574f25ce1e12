//! Byte spans into query text.

use std::fmt;
use std::ops::Range;

/// A byte range `start..end` in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span at `offset`, used for end of input.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The text under this span, or `None` when it does not fall on
    /// character boundaries of `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }

    /// Line and column of the span start.
    pub fn location(&self, source: &str) -> Location {
        let before = source.get(..self.start).unwrap_or(source);
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Location {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// 1-based line and column (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An AST value tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        assert_eq!(Span::new(5, 10).merge(Span::new(8, 15)), Span::new(5, 15));
        assert_eq!(Span::new(8, 15).merge(Span::new(5, 10)), Span::new(5, 15));
    }

    #[test]
    fn test_slice() {
        let source = "title ILIKE 'a*'";
        assert_eq!(Span::new(0, 5).slice(source), Some("title"));
        assert_eq!(Span::new(12, 16).slice(source), Some("'a*'"));
        assert_eq!(Span::new(12, 40).slice(source), None);
    }

    #[test]
    fn test_location() {
        let source = "title = 'a'\nAND\nsize > 3";

        assert_eq!(Span::at(0).location(source), Location { line: 1, column: 1 });
        assert_eq!(Span::at(8).location(source).to_string(), "1:9");
        assert_eq!(Span::at(12).location(source).to_string(), "2:1");
        assert_eq!(Span::at(16).location(source).to_string(), "3:1");
        assert_eq!(Span::at(source.len()).location(source).to_string(), "3:9");
    }

    #[test]
    fn test_location_counts_characters() {
        let source = "titre = 'été' AND x";
        // "été" is 5 bytes but 3 characters
        let and = source.find("AND").unwrap();
        assert_eq!(Span::at(and).location(source).column, 15);
    }
}
