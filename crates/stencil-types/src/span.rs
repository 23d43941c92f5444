use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location within a template string.
///
/// All line/column values are 1-based. Lines are physical lines of the
/// template as written (before indentation stripping — stripping preserves
/// the line count, so the numbers are valid against both forms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Create a zero-width span at a single position.
    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        let (line, column) = if (self.line, self.column) <= (other.line, other.column) {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        let (end_line, end_column) =
            if (self.end_line, self.end_column) >= (other.end_line, other.end_column) {
                (self.end_line, self.end_column)
            } else {
                (other.end_line, other.end_column)
            };
        Span::new(line, column, end_line, end_column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_span() {
        let s = Span::point(7, 3);
        assert_eq!(s.line, 7);
        assert_eq!(s.column, 3);
        assert_eq!(s.end_line, 7);
        assert_eq!(s.end_column, 3);
    }

    #[test]
    fn merge_spans_across_lines() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(2, 3, 2, 8);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(1, 5, 2, 8));
    }

    #[test]
    fn merge_spans_same_line() {
        let a = Span::new(1, 5, 1, 10);
        let b = Span::new(1, 3, 1, 8);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(1, 3, 1, 10));
    }

    #[test]
    fn display_shows_line_and_column() {
        assert_eq!(format!("{}", Span::point(12, 4)), "12:4");
    }
}
