//! Cursor and position types for text navigation.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` wraps line/column coordinates instead of passing a bare
//! `(usize, usize)`, so line and column can't be swapped by accident.

use serde::{Deserialize, Serialize};

/// A position in the text buffer.
///
/// Both line and column are 0-indexed. `Display` and [`Position::one_based`]
/// give the 1-indexed form shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, column: 0 };

    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &Position) -> bool {
        other.is_before(self)
    }

    /// `(line, column)` counted from 1.
    pub fn one_based(&self) -> (usize, usize) {
        (self.line + 1, self.column + 1)
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.column.cmp(&other.column),
            other => other,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (line, column) = self.one_based();
        write!(f, "{line}:{column}")
    }
}

/// A cursor with an optional selection anchor.
///
/// When `anchor` is set, the text between the anchor and `position` is
/// selected. The anchor may sit on either side of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Current cursor position
    pub position: Position,
    /// Selection anchor (if selecting text)
    pub anchor: Option<Position>,
}

impl Cursor {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            anchor: None,
        }
    }

    /// Creates a cursor that selects `start..end`, with the caret at `end`.
    pub fn selecting(start: Position, end: Position) -> Self {
        Self {
            position: end,
            anchor: Some(start),
        }
    }

    /// Moves the cursor to a new position, clearing selection.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
        self.anchor = None;
    }

    /// Moves the cursor, extending selection from the current position.
    pub fn select_to(&mut self, position: Position) {
        if self.anchor.is_none() {
            self.anchor = Some(self.position);
        }
        self.position = position;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn has_selection(&self) -> bool {
        self.anchor.is_some() && self.anchor != Some(self.position)
    }

    /// Returns the selection as `(start, end)` with start before end.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        self.anchor
            .filter(|anchor| *anchor != self.position)
            .map(|anchor| {
                if anchor.is_before(&self.position) {
                    (anchor, self.position)
                } else {
                    (self.position, anchor)
                }
            })
    }

    /// End of the selection, or the caret when nothing is selected.
    pub fn selection_end(&self) -> Position {
        self.selection_range()
            .map_or(self.position, |(_, end)| end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let p1 = Position::new(1, 5);
        let p2 = Position::new(2, 3);
        let p3 = Position::new(1, 10);

        assert!(p1.is_before(&p2));
        assert!(p1.is_before(&p3));
        assert!(p2.is_after(&p1));
        assert!(p2.is_after(&p3));
    }

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(Position::new(4, 2).one_based(), (5, 3));
    }

    #[test]
    fn test_cursor_selection() {
        let mut cursor = Cursor::new(Position::new(1, 5));
        assert!(!cursor.has_selection());

        cursor.select_to(Position::new(2, 3));
        assert!(cursor.has_selection());

        let (start, end) = cursor.selection_range().unwrap();
        assert_eq!(start, Position::new(1, 5));
        assert_eq!(end, Position::new(2, 3));
    }

    #[test]
    fn test_backward_selection_is_normalized() {
        let cursor = Cursor {
            position: Position::new(0, 1),
            anchor: Some(Position::new(0, 4)),
        };
        assert_eq!(
            cursor.selection_range(),
            Some((Position::new(0, 1), Position::new(0, 4)))
        );
        assert_eq!(cursor.selection_end(), Position::new(0, 4));
    }

    #[test]
    fn test_empty_anchor_is_no_selection() {
        let mut cursor = Cursor::new(Position::new(3, 3));
        cursor.select_to(Position::new(3, 3));
        assert!(cursor.selection_range().is_none());
        assert_eq!(cursor.selection_end(), Position::new(3, 3));
    }
}
