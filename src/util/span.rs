//! Source location tracking
//!
//! Positions are measured in source lines/columns (1-indexed) and carry the
//! index of the lexeme they were taken from, so a span can be mapped back onto
//! the lexeme stream without re-tokenizing.

use std::fmt;

use serde::Serialize;

/// Source position (line, column, and lexeme index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Index of the lexeme this position belongs to
    pub lexeme: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            line,
            column,
            lexeme: 0,
        }
    }

    /// Create a new position bound to a lexeme index
    #[inline]
    pub fn at_lexeme(
        line: usize,
        column: usize,
        lexeme: usize,
    ) -> Self {
        Self {
            line,
            column,
            lexeme,
        }
    }

    /// Create a dummy position
    #[inline]
    pub fn dummy() -> Self {
        Self {
            line: 0,
            column: 0,
            lexeme: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source span (start position to end position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (inclusive, the last lexeme covered)
    pub end: Position,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(
        start: Position,
        end: Position,
    ) -> Self {
        Self { start, end }
    }

    /// Span covering a single position
    #[inline]
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Create a dummy span
    #[inline]
    pub fn dummy() -> Self {
        Self {
            start: Position::dummy(),
            end: Position::dummy(),
        }
    }

    /// Check if this is a dummy span
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(
        self,
        other: Span,
    ) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        let start = if other.start.lexeme < self.start.lexeme {
            other.start
        } else {
            self.start
        };
        let end = if other.end.lexeme > self.end.lexeme {
            other.end
        } else {
            self.end
        };
        Span { start, end }
    }

    /// Number of lexemes covered
    #[inline]
    pub fn lexeme_count(&self) -> usize {
        self.end.lexeme.saturating_sub(self.start.lexeme) + 1
    }
}

impl fmt::Display for Span {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_orders_by_lexeme() {
        let a = Span::point(Position::at_lexeme(1, 5, 2));
        let b = Span::point(Position::at_lexeme(2, 1, 7));
        let merged = b.merge(a);
        assert_eq!(merged.start.lexeme, 2);
        assert_eq!(merged.end.lexeme, 7);
        assert_eq!(merged.lexeme_count(), 6);
    }

    #[test]
    fn test_merge_with_dummy() {
        let a = Span::point(Position::at_lexeme(3, 4, 9));
        assert_eq!(Span::dummy().merge(a), a);
        assert_eq!(a.merge(Span::dummy()), a);
    }
}
