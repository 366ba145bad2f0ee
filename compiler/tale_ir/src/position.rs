//! Line/character positions and source locations.
//!
//! Lines and characters are zero-based. Characters count Unicode scalar
//! values from the start of the line.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A zero-based line/character position.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// A half-open range between two positions.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    /// Range on a single line.
    #[inline]
    pub const fn on_line(line: u32, start: u32, end: u32) -> Self {
        Range {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }

    /// Shift both ends down by `lines`.
    #[inline]
    #[must_use]
    pub const fn offset_lines(self, lines: u32) -> Self {
        Range {
            start: Position::new(self.start.line + lines, self.start.character),
            end: Position::new(self.end.line + lines, self.end.character),
        }
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Where a runtime object came from: `(script, start, end)`.
///
/// Serialized as `[script_index, start_line, start_col, end_line, end_col]`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(into = "[u32; 5]", from = "[u32; 5]")]
pub struct SourceLocation {
    pub script_index: u32,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceLocation {
    pub const fn new(script_index: u32, range: Range) -> Self {
        SourceLocation {
            script_index,
            start_line: range.start.line,
            start_col: range.start.character,
            end_line: range.end.line,
            end_col: range.end.character,
        }
    }

    pub const fn start(&self) -> Position {
        Position::new(self.start_line, self.start_col)
    }

    pub const fn end(&self) -> Position {
        Position::new(self.end_line, self.end_col)
    }

    pub const fn range(&self) -> Range {
        Range::new(self.start(), self.end())
    }

    /// Grow this location to also cover `other`. Never shrinks.
    ///
    /// Locations in different scripts cannot be unioned; the existing one
    /// wins.
    pub fn expand(&mut self, other: &SourceLocation) {
        if self.script_index != other.script_index {
            return;
        }
        if other.start() < self.start() {
            self.start_line = other.start_line;
            self.start_col = other.start_col;
        }
        if other.end() > self.end() {
            self.end_line = other.end_line;
            self.end_col = other.end_col;
        }
    }

    /// Sort key used for deterministic location maps.
    pub fn sort_key(&self) -> (u32, u32, u32) {
        (self.script_index, self.start_line, self.start_col)
    }

    pub fn cmp_by_start(&self, other: &SourceLocation) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl From<SourceLocation> for [u32; 5] {
    fn from(loc: SourceLocation) -> Self {
        [
            loc.script_index,
            loc.start_line,
            loc.start_col,
            loc.end_line,
            loc.end_col,
        ]
    }
}

impl From<[u32; 5]> for SourceLocation {
    fn from(parts: [u32; 5]) -> Self {
        SourceLocation {
            script_index: parts[0],
            start_line: parts[1],
            start_col: parts[2],
            end_line: parts[3],
            end_col: parts[4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_only_grows() {
        let mut loc = SourceLocation::new(0, Range::on_line(3, 2, 8));
        loc.expand(&SourceLocation::new(0, Range::on_line(3, 4, 6)));
        assert_eq!(loc.range(), Range::on_line(3, 2, 8));

        loc.expand(&SourceLocation::new(
            0,
            Range::new(Position::new(1, 0), Position::new(5, 1)),
        ));
        assert_eq!(loc.start(), Position::new(1, 0));
        assert_eq!(loc.end(), Position::new(5, 1));
    }

    #[test]
    fn test_expand_ignores_other_scripts() {
        let mut loc = SourceLocation::new(0, Range::on_line(3, 2, 8));
        loc.expand(&SourceLocation::new(1, Range::on_line(0, 0, 80)));
        assert_eq!(loc.range(), Range::on_line(3, 2, 8));
    }

    #[test]
    fn test_serializes_as_tuple() {
        let loc = SourceLocation::new(2, Range::on_line(4, 1, 9));
        let json = serde_json::to_string(&loc).unwrap_or_default();
        assert_eq!(json, "[2,4,1,4,9]");
    }
}
