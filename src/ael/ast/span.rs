//! Source positions and spans attached to tokens and nodes
//!
//! Lines and columns are 1-based. The end of a span is inclusive: it names the
//! last character of the construct, which is what diagnostics print as the
//! closing column of a `Cols: a-b` range.

use serde::Serialize;
use std::fmt;

/// A line/column position in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// First and last position covered by a token or node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Build a span from four raw coordinates.
    pub fn from_coords(first_line: usize, first_col: usize, last_line: usize, last_col: usize) -> Self {
        Self::new(
            Position::new(first_line, first_col),
            Position::new(last_line, last_col),
        )
    }

    /// A span starting where `first` starts and ending where `last` ends.
    pub fn between(first: &Span, last: &Span) -> Self {
        Self::new(first.start, last.end)
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Move the end of this span to the end of `other`, never backwards.
    pub fn extend_to(&mut self, other: &Span) {
        if other.end > self.end {
            self.end = other.end;
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_takes_outer_bounds() {
        let first = Span::from_coords(1, 1, 1, 7);
        let last = Span::from_coords(3, 1, 3, 1);
        let span = Span::between(&first, &last);
        assert_eq!(span.start, Position::new(1, 1));
        assert_eq!(span.end, Position::new(3, 1));
        assert!(!span.is_single_line());
    }

    #[test]
    fn test_extend_to_never_shrinks() {
        let mut span = Span::from_coords(2, 4, 5, 1);
        span.extend_to(&Span::from_coords(2, 4, 2, 9));
        assert_eq!(span.end, Position::new(5, 1));
        span.extend_to(&Span::from_coords(6, 1, 6, 3));
        assert_eq!(span.end, Position::new(6, 3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::from_coords(1, 2, 3, 4).to_string(), "1:2-3:4");
    }
}
