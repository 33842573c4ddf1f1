//! Source location tracking shared by every pipeline stage.

use rowan::TextRange;
use serde::{Deserialize, Serialize};

/// A byte-offset range into a source file, plus the 1-based line/column of its start.
///
/// Attached to every AST node and every diagnostic so downstream consumers never
/// need to re-derive location information from a `NodeId` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl SourceSpan {
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Builds a span from a CST [`TextRange`] plus the source text needed to compute
    /// the starting line/column.
    pub fn from_range(range: TextRange, source: &str) -> Self {
        let start = u32::from(range.start());
        let end = u32::from(range.end());
        let (line, column) = line_column_at(source, start);
        Self::new(start, end, line, column)
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start.into(), self.end.into())
    }

    /// A span covering both `self` and `other`, in source order.
    pub fn to(&self, other: SourceSpan) -> SourceSpan {
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        if self.start <= other.start {
            SourceSpan::new(start, end, self.line, self.column)
        } else {
            SourceSpan::new(start, end, other.line, other.column)
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// 1-based (line, column) of this span's end offset, for diagnostic
    /// consumers that want a full start/end range (e.g. the analysis
    /// service's `AnalysisError.location`) rather than just the start this
    /// struct stores inline.
    pub fn end_line_column(&self, source: &str) -> (u32, u32) {
        line_column_at(source, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Computes 1-based line and column for a byte offset into `source`.
fn line_column_at(source: &str, offset: u32) -> (u32, u32) {
    let offset = offset as usize;
    let mut line = 1u32;
    let mut column = 1u32;
    for ch in source[..offset.min(source.len())].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_starts_at_one_one() {
        let span = SourceSpan::from_range(TextRange::new(0.into(), 3.into()), "abc\ndef");
        assert_eq!(span.line, 1);
        assert_eq!(span.column, 1);
    }

    #[test]
    fn second_line_column_resets() {
        let span = SourceSpan::from_range(TextRange::new(4.into(), 5.into()), "abc\ndef");
        assert_eq!(span.line, 2);
        assert_eq!(span.column, 1);
    }

    #[test]
    fn to_spans_both_ranges() {
        let a = SourceSpan::new(0, 3, 1, 1);
        let b = SourceSpan::new(10, 15, 2, 3);
        let merged = a.to(b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 15);
    }
}
