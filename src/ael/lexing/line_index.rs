//! Byte offsets to 1-based line/column positions
//!
//! Tabs advance the column to the next tab stop, so columns match what an
//! editor with the same tab width shows.

use crate::ael::ast::span::{Position, Span};
use std::ops::Range;

pub struct LineIndex {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
    tab_width: usize,
}

impl LineIndex {
    pub fn new(source: &str, tab_width: usize) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self {
            line_starts,
            tab_width: tab_width.max(1),
        }
    }

    pub fn position(&self, source: &str, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        let start = self.line_starts[line];
        let end = byte_offset.min(source.len());

        let mut column = 1;
        for ch in source[start..end].chars() {
            if ch == '\t' {
                column += self.tab_width - ((column - 1) % self.tab_width);
            } else {
                column += 1;
            }
        }
        Position::new(line + 1, column)
    }

    /// Span of a non-empty byte range, ending on its last character.
    /// An empty range collapses onto its start.
    pub fn span(&self, source: &str, range: Range<usize>) -> Span {
        let start = self.position(source, range.start);
        let last = source
            .get(range.start..range.end)
            .and_then(|text| text.char_indices().last())
            .map(|(i, _)| range.start + i);
        match last {
            Some(offset) => Span::new(start, self.position(source, offset)),
            None => Span::new(start, start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        let src = "ab\ncd";
        let index = LineIndex::new(src, 8);
        assert_eq!(index.position(src, 0), Position::new(1, 1));
        assert_eq!(index.position(src, 1), Position::new(1, 2));
        assert_eq!(index.position(src, 3), Position::new(2, 1));
    }

    #[test]
    fn test_tabs_jump_to_tab_stops() {
        let src = "\tx\n a\tb";
        let index = LineIndex::new(src, 8);
        assert_eq!(index.position(src, 1), Position::new(1, 9));
        assert_eq!(index.position(src, 6), Position::new(2, 9));
        // one past the end still advances past the last character
        assert_eq!(index.position(src, 7), Position::new(2, 10));
    }

    #[test]
    fn test_span_end_is_inclusive() {
        let src = "context foo";
        let index = LineIndex::new(src, 8);
        let span = index.span(src, 0..7);
        assert_eq!(span.start, Position::new(1, 1));
        assert_eq!(span.end, Position::new(1, 7));
    }

    #[test]
    fn test_empty_span_collapses() {
        let src = "x";
        let index = LineIndex::new(src, 8);
        let span = index.span(src, 1..1);
        assert_eq!(span.start, span.end);
    }
}
