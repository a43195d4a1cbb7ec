//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! Ropes keep insertions and deletions at O(log n) regardless of where in
//! the document they happen, and line lookups are cheap because every
//! chunk knows how many line breaks it holds. That is what the gutter
//! needs: a line count after every keystroke.
//!
//! ## Learning: Ownership in Action
//!
//! ```rust,ignore
//! let mut buffer = TextBuffer::new();  // buffer OWNS the rope
//! let text = buffer.text();            // text BORROWS from buffer
//! // buffer.insert(0, "x");            // ERROR! Can't mutate while borrowed
//! drop(text);                          // Release borrow
//! buffer.insert(0, "x");               // Now OK!
//! ```

use ropey::Rope;
use std::borrow::Cow;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::history::{Edit, EditKind, History};
use crate::search::pattern;
use crate::{BufferError, BufferResult, Position};

/// A text buffer backed by a rope, with grouped undo history.
///
/// The buffer does not know where it lives on disk; callers hand it a
/// path when loading or saving. The modified flag is derived from the
/// history, so undoing back to the last save makes the buffer clean again.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    history: History,
    /// History head at the last load or save
    saved_head: u64,
    config: BufferConfig,
}

/// Configuration for buffer behavior
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Maximum undo steps to keep
    pub max_history: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { max_history: 1000 }
    }
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use textedit_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// assert!(!buffer.is_modified());
    /// ```
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            rope: Rope::new(),
            history: History::new(config.max_history),
            saved_head: 0,
            config,
        }
    }

    /// Replaces the whole content without recording history.
    ///
    /// The buffer is clean afterwards and the undo stack is empty.
    pub fn load(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.history.clear();
        self.saved_head = self.history.head();
    }

    /// Writes the buffer to `path` and marks it saved.
    ///
    /// The text goes to a uniquely named temporary file in the same folder,
    /// which then replaces the target, so a failed write never truncates the
    /// original. A symlinked target is resolved first so the link survives,
    /// and an existing file keeps its permissions.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let target = std::fs::canonicalize(path.as_ref()).unwrap_or_else(|_| path.as_ref().to_path_buf());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(self.text().as_bytes())?;
        if let Ok(metadata) = std::fs::metadata(&target) {
            temp.as_file().set_permissions(metadata.permissions())?;
        }
        temp.persist(&target).map_err(|err| err.error)?;

        self.mark_saved();
        Ok(())
    }

    /// Records the current state as the clean state.
    pub fn mark_saved(&mut self) {
        self.history.seal();
        self.saved_head = self.history.head();
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    ///
    /// # Learning: Cow (Clone-on-Write)
    ///
    /// A rope that fits in one chunk is handed out borrowed; larger ropes
    /// are stitched together into an owned `String`.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a specific line (0-indexed), including its line break.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(self.rope.slice(range).into())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of Unicode scalar values in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of a line in characters, excluding its line break.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        let line = self.line(line_idx)?;
        Ok(line.trim_end_matches(['\n', '\r']).chars().count())
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    ///
    /// # Learning: `&mut self`
    ///
    /// The borrow checker guarantees nobody holds a `text()` borrow while
    /// the rope changes underneath it.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        if text.is_empty() {
            return Ok(());
        }

        self.history.push(Edit::insert(char_idx, text));
        self.rope.insert(char_idx, text);
        Ok(())
    }

    /// Deletes text in a character range, returning what was removed.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        if range.is_empty() {
            return Ok(String::new());
        }

        let deleted: String = self.rope.slice(range.clone()).into();
        self.history.push(Edit::delete(range.start, deleted.clone()));
        self.rope.remove(range);
        Ok(deleted)
    }

    /// Replaces text in a range; undone as a single step.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<String> {
        let compound = !range.is_empty() && !text.is_empty();
        if compound {
            self.history.begin_group();
        }
        let result = self
            .delete(range.clone())
            .and_then(|deleted| self.insert(range.start, text).map(|_| deleted));
        if compound {
            self.history.end_group();
        }
        result
    }

    /// Brings the buffer to `new_text` with the smallest single replacement.
    ///
    /// Widgets that own their own editing state hand over the full text
    /// after every change; diffing it against the rope keeps the undo
    /// history made of real edits. Returns false when nothing changed.
    pub fn apply_text(&mut self, new_text: &str) -> BufferResult<bool> {
        let old_text = self.text();
        if old_text == new_text {
            return Ok(false);
        }

        let prefix = old_text
            .chars()
            .zip(new_text.chars())
            .take_while(|(a, b)| a == b)
            .count();
        let old_len = old_text.chars().count();
        let new_len = new_text.chars().count();
        let max_suffix = old_len.min(new_len) - prefix;
        let suffix = old_text
            .chars()
            .rev()
            .zip(new_text.chars().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let inserted: String = new_text
            .chars()
            .skip(prefix)
            .take(new_len - prefix - suffix)
            .collect();
        drop(old_text);

        self.replace(prefix..old_len - suffix, &inserted)?;
        Ok(true)
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last step.
    ///
    /// Returns the character index where the caret belongs afterwards.
    ///
    /// # Learning: State Management
    ///
    /// The history hands back a whole group; its edits are reversed in
    /// reverse order so positions recorded later stay valid.
    pub fn undo(&mut self) -> BufferResult<usize> {
        let group = self.history.undo().ok_or(BufferError::NothingToUndo)?;

        let mut caret = 0;
        for edit in group.edits.iter().rev() {
            caret = apply(&mut self.rope, &edit.inverse());
        }
        Ok(caret)
    }

    /// Redoes the last undone step.
    pub fn redo(&mut self) -> BufferResult<usize> {
        let group = self.history.redo().ok_or(BufferError::NothingToRedo)?;

        let mut caret = 0;
        for edit in &group.edits {
            caret = apply(&mut self.rope, edit);
        }
        Ok(caret)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a character index.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        let line_start = self.rope.line_to_char(pos.line);
        let line_len = self.rope.line(pos.line).len_chars();

        // Column may sit at the end of the line (for insertion)
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(line_start + pos.column)
    }

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);
        Ok(Position { line, column })
    }

    /// Clamps a position into the buffer.
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.len_lines().saturating_sub(1));
        let column = pos.column.min(self.line_len(line).unwrap_or(0));
        Position { line, column }
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer differs from its last load or save.
    pub fn is_modified(&self) -> bool {
        self.history.head() != self.saved_head
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    // ==================== Search ====================

    /// Character ranges of every case-insensitive match of `needle`.
    pub fn find_all(&self, needle: &str) -> BufferResult<Vec<Range<usize>>> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let regex = pattern(needle)?;
        let text = self.text();
        Ok(regex
            .find_iter(&text)
            .map(|m| self.rope.byte_to_char(m.start())..self.rope.byte_to_char(m.end()))
            .collect())
    }

    /// Finds the next case-insensitive match at or after `from`.
    ///
    /// Wraps around to the start of the buffer when nothing follows `from`.
    pub fn find_next(&self, needle: &str, from: usize) -> BufferResult<Option<Range<usize>>> {
        if needle.is_empty() {
            return Ok(None);
        }
        let regex = pattern(needle)?;
        let text = self.text();
        let byte_from = self.rope.char_to_byte(from.min(self.len_chars()));

        let found = regex
            .find_at(&text, byte_from)
            .or_else(|| regex.find(&text));
        Ok(found.map(|m| self.rope.byte_to_char(m.start())..self.rope.byte_to_char(m.end())))
    }

    /// Replaces every case-insensitive match; one undo step.
    ///
    /// The replacement is taken literally. Returns the number of matches.
    pub fn replace_all(&mut self, needle: &str, replacement: &str) -> BufferResult<usize> {
        if needle.is_empty() {
            return Ok(0);
        }
        let regex = pattern(needle)?;
        let text = self.text().into_owned();
        let count = regex.find_iter(&text).count();
        if count == 0 {
            return Ok(0);
        }

        let replaced = regex.replace_all(&text, regex::NoExpand(replacement));
        self.history.begin_group();
        let result = self.apply_text(&replaced);
        self.history.end_group();
        result.map(|_| count)
    }
}

/// Applies one edit to the rope without touching history.
///
/// Returns the caret position just after the affected text.
fn apply(rope: &mut Rope, edit: &Edit) -> usize {
    match edit.kind {
        EditKind::Insert => {
            rope.insert(edit.position, &edit.content);
            edit.end()
        }
        EditKind::Delete => {
            rope.remove(edit.position..edit.end());
            edit.position
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        let mut buffer = Self::new();
        buffer.load(s);
        buffer
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
