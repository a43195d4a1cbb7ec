//! The line-numbered editor viewport.
//!
//! A viewport wraps one [`TextBuffer`] together with everything the view
//! needs to draw it: cursor, font metrics, scroll position, the gutter
//! width and the current-line highlight.
//!
//! ## Repaint contract
//!
//! Nothing here draws. Mutations mark the viewport dirty and, when the
//! content or caret changed from this side rather than from the widget,
//! bump [`EditorViewport::revision`]. The view redraws on the next frame
//! and reloads its widget state when the revision moved.

use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;

use textedit_buffer::{BufferConfig, BufferResult, Cursor, Position, TextBuffer};

use crate::config::Config;
use crate::CoreResult;

/// Glyph measurements the gutter is laid out with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Nominal size in points
    pub point_size: f32,
    /// Rendered size in pixels
    pub pixel_size: f32,
    /// Height of one text row in pixels
    pub line_height: f32,
    /// Advance of the widest digit in pixels
    pub digit_advance: f32,
}

impl FontMetrics {
    /// Points to pixels at 96 DPI.
    pub const PIXELS_PER_POINT: f32 = 96.0 / 72.0;

    /// Metrics of a monospace face at `point_size`.
    ///
    /// Digits in a monospace face are 0.6 em wide and rows are 1.3 em tall,
    /// which matches how the text widgets lay out lines by default.
    pub fn monospace(point_size: f32) -> Self {
        let pixel_size = point_size * Self::PIXELS_PER_POINT;
        Self {
            point_size,
            pixel_size,
            line_height: (pixel_size * 1.3).round(),
            digit_advance: pixel_size * 0.6,
        }
    }
}

/// Per-viewport settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    pub font_size: f32,
    pub gutter_margin: f32,
    pub read_only: bool,
    pub highlight_current_line: bool,
    pub undo_limit: usize,
    /// Visible height until the view reports its own
    pub initial_height: f32,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ViewportOptions {
    fn from(config: &Config) -> Self {
        Self {
            font_size: config.editor.font_size,
            gutter_margin: config.editor.gutter_margin,
            read_only: config.editor.read_only,
            highlight_current_line: config.ui.highlight_current_line,
            undo_limit: config.editor.undo_limit,
            initial_height: config.ui.window_height,
        }
    }
}

/// Full-width band behind the line holding the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHighlight {
    /// 0-based line index
    pub line: usize,
    /// Offset from the top of the document, in pixels
    pub top: f32,
    pub height: f32,
}

/// One painted line number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterLabel {
    /// 1-based line number
    pub number: usize,
    /// Offset from the top of the document, in pixels
    pub top: f32,
}

/// An editor pane over one document.
#[derive(Debug, Clone)]
pub struct EditorViewport {
    buffer: TextBuffer,
    cursor: Cursor,
    read_only: bool,
    highlight_enabled: bool,
    metrics: FontMetrics,
    gutter_margin: f32,

    scroll_top: f32,
    view_height: f32,

    /// Gutter width and the line count it was computed for
    gutter_width: f32,
    gutter_lines: usize,
    highlight: Option<LineHighlight>,

    revision: u64,
    needs_redraw: bool,
}

impl EditorViewport {
    pub fn new(options: ViewportOptions) -> Self {
        let mut viewport = Self {
            buffer: TextBuffer::with_config(BufferConfig {
                max_history: options.undo_limit,
            }),
            cursor: Cursor::default(),
            read_only: options.read_only,
            highlight_enabled: options.highlight_current_line,
            metrics: FontMetrics::monospace(options.font_size),
            gutter_margin: options.gutter_margin,
            scroll_top: 0.0,
            view_height: options.initial_height.max(0.0),
            gutter_width: 0.0,
            gutter_lines: 0,
            highlight: None,
            revision: 0,
            needs_redraw: true,
        };
        viewport.relayout_gutter();
        viewport.update_highlight();
        viewport
    }

    // ==================== Document ====================

    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Cursor position as `(line, column)`, both counted from 1.
    pub fn cursor_position(&self) -> (usize, usize) {
        self.cursor.position.one_based()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Replaces the content as a load: history is reset and the
    /// viewport is clean afterwards.
    pub fn set_content(&mut self, text: &str) {
        self.buffer.load(text);
        self.cursor = Cursor::default();
        self.scroll_top = 0.0;
        self.after_programmatic_change();
    }

    pub fn content(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Writes the content to `path` and marks the viewport clean.
    pub fn save_to(&mut self, path: &Path) -> BufferResult<()> {
        self.buffer.save_as(path)?;
        self.needs_redraw = true;
        Ok(())
    }

    // ==================== Widget sync ====================

    /// Takes the text as the widget now shows it.
    ///
    /// Returns true if the content changed. The revision is left alone:
    /// the widget already displays this state.
    pub fn sync_text(&mut self, text: &str) -> CoreResult<bool> {
        if self.read_only {
            return Ok(false);
        }
        let changed = self.buffer.apply_text(text)?;
        if changed {
            self.cursor.position = self.buffer.clamp_position(self.cursor.position);
            self.relayout_gutter();
            self.update_highlight();
            self.needs_redraw = true;
        }
        Ok(changed)
    }

    /// Takes the caret as the widget now shows it.
    pub fn sync_cursor(&mut self, position: Position) {
        let position = self.buffer.clamp_position(position);
        if self.cursor.position != position || self.cursor.anchor.is_some() {
            self.cursor = Cursor::new(position);
            self.update_highlight();
            self.needs_redraw = true;
        }
    }

    /// Records the scrolled offset and visible height of the view.
    pub fn set_scroll(&mut self, top: f32, height: f32) {
        let top = top.max(0.0);
        let height = height.max(0.0);
        if top != self.scroll_top || height != self.view_height {
            self.scroll_top = top;
            self.view_height = height;
            self.needs_redraw = true;
        }
    }

    pub fn set_view_height(&mut self, height: f32) {
        self.set_scroll(self.scroll_top, height);
    }

    /// Scrolled offset in pixels.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    // ==================== Editing ====================

    /// Undoes one step. Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        match self.buffer.undo() {
            Ok(caret) => {
                self.place_caret(caret);
                true
            }
            Err(_) => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        match self.buffer.redo() {
            Ok(caret) => {
                self.place_caret(caret);
                true
            }
            Err(_) => false,
        }
    }

    /// Selects the next match after the selection, wrapping to the top.
    pub fn find_next(&mut self, needle: &str) -> CoreResult<Option<Range<usize>>> {
        let from = self
            .buffer
            .position_to_char_idx(self.cursor.selection_end())?;
        let found = self.buffer.find_next(needle, from)?;
        if let Some(range) = &found {
            self.select(range.clone())?;
        }
        Ok(found)
    }

    /// Replaces the current selection, then moves on to the next match.
    pub fn replace(&mut self, needle: &str, replacement: &str) -> CoreResult<Option<Range<usize>>> {
        if self.read_only {
            return Ok(None);
        }
        if let Some((start, end)) = self.cursor.selection_range() {
            let start = self.buffer.position_to_char_idx(start)?;
            let end = self.buffer.position_to_char_idx(end)?;
            self.buffer.replace(start..end, replacement)?;
            self.place_caret(start + replacement.chars().count());
        }
        self.find_next(needle)
    }

    /// Replaces every match, ignoring case. Returns the match count.
    pub fn replace_all(&mut self, needle: &str, replacement: &str) -> CoreResult<usize> {
        if self.read_only {
            return Ok(0);
        }
        let count = self.buffer.replace_all(needle, replacement)?;
        if count > 0 {
            self.cursor = Cursor::new(self.buffer.clamp_position(self.cursor.position));
            self.after_programmatic_change();
        }
        Ok(count)
    }

    /// Selects a character range, caret at its end.
    pub fn select(&mut self, range: Range<usize>) -> CoreResult<()> {
        let start = self.buffer.char_idx_to_position(range.start)?;
        let end = self.buffer.char_idx_to_position(range.end)?;
        self.cursor = Cursor::selecting(start, end);
        self.after_programmatic_change();
        Ok(())
    }

    // ==================== Presentation ====================

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        self.update_highlight();
        self.needs_redraw = true;
    }

    pub fn font_metrics(&self) -> FontMetrics {
        self.metrics
    }

    pub fn set_font_size(&mut self, point_size: f32) {
        self.metrics = FontMetrics::monospace(point_size);
        self.gutter_lines = 0;
        self.relayout_gutter();
        self.update_highlight();
        self.needs_redraw = true;
    }

    /// Width of the line-number margin in pixels.
    ///
    /// `margin + digit_advance * digits(max(1, line_count))`.
    pub fn gutter_width(&self) -> f32 {
        self.gutter_width
    }

    /// Band behind the cursor line; `None` when read-only.
    pub fn current_line_highlight(&self) -> Option<LineHighlight> {
        self.highlight
    }

    /// Lines whose rows intersect the visible rectangle.
    pub fn visible_lines(&self) -> Range<usize> {
        let line_height = self.metrics.line_height.max(1.0);
        let total = self.line_count();
        let first = ((self.scroll_top / line_height).floor() as usize).min(total);
        let last = (((self.scroll_top + self.view_height) / line_height).ceil() as usize)
            .clamp(first, total);
        first..last
    }

    /// Line numbers to paint for the visible rows only.
    pub fn gutter_labels(&self) -> impl Iterator<Item = GutterLabel> + '_ {
        let line_height = self.metrics.line_height;
        self.visible_lines().map(move |line| GutterLabel {
            number: line + 1,
            top: line as f32 * line_height,
        })
    }

    /// Height of the whole document in pixels.
    pub fn content_height(&self) -> f32 {
        self.line_count() as f32 * self.metrics.line_height
    }

    /// Bumped whenever content or caret changed from outside the widget.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether a redraw is pending and clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // ==================== Internals ====================

    fn place_caret(&mut self, char_idx: usize) {
        let position = self
            .buffer
            .char_idx_to_position(char_idx.min(self.buffer.len_chars()))
            .unwrap_or_default();
        self.cursor = Cursor::new(position);
        self.after_programmatic_change();
    }

    fn after_programmatic_change(&mut self) {
        self.relayout_gutter();
        self.update_highlight();
        self.revision += 1;
        self.needs_redraw = true;
    }

    /// Recomputes the gutter width when the line count moved.
    fn relayout_gutter(&mut self) {
        let lines = self.line_count();
        if lines == self.gutter_lines {
            return;
        }
        self.gutter_lines = lines;
        self.gutter_width =
            self.gutter_margin + self.metrics.digit_advance * digit_count(lines.max(1)) as f32;
    }

    fn update_highlight(&mut self) {
        self.highlight = (self.highlight_enabled && !self.read_only).then(|| {
            let line = self.cursor.position.line;
            LineHighlight {
                line,
                top: line as f32 * self.metrics.line_height,
                height: self.metrics.line_height,
            }
        });
    }
}

impl Default for EditorViewport {
    fn default() -> Self {
        Self::new(ViewportOptions::default())
    }
}

fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport_with(text: &str) -> EditorViewport {
        let mut viewport = EditorViewport::default();
        viewport.set_content(text);
        viewport
    }

    fn numbered_lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(1), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(999), 3);
        assert_eq!(digit_count(1000), 4);
    }

    #[test]
    fn test_gutter_width_follows_digits() {
        let mut viewport = viewport_with("");
        let advance = viewport.font_metrics().digit_advance;
        assert_eq!(viewport.gutter_width(), 20.0 + advance);

        viewport.set_content(&numbered_lines(9));
        assert_eq!(viewport.gutter_width(), 20.0 + advance);

        viewport.set_content(&numbered_lines(10));
        assert_eq!(viewport.gutter_width(), 20.0 + advance * 2.0);

        viewport.sync_text(&numbered_lines(100)).unwrap();
        assert_eq!(viewport.gutter_width(), 20.0 + advance * 3.0);
    }

    #[test]
    fn test_gutter_width_tracks_zoom() {
        let mut viewport = viewport_with(&numbered_lines(12));
        viewport.set_font_size(22.0);
        let advance = FontMetrics::monospace(22.0).digit_advance;
        assert_eq!(viewport.gutter_width(), 20.0 + advance * 2.0);
    }

    #[test]
    fn test_cursor_position_is_one_based() {
        let mut viewport = viewport_with("ab\ncd");
        assert_eq!(viewport.cursor_position(), (1, 1));

        viewport.sync_cursor(Position::new(1, 2));
        assert_eq!(viewport.cursor_position(), (2, 3));
    }

    #[test]
    fn test_highlight_follows_cursor() {
        let mut viewport = viewport_with("a\nb\nc");
        let line_height = viewport.font_metrics().line_height;

        viewport.sync_cursor(Position::new(2, 0));
        let highlight = viewport.current_line_highlight().unwrap();
        assert_eq!(highlight.line, 2);
        assert_eq!(highlight.top, 2.0 * line_height);
        assert_eq!(highlight.height, line_height);
    }

    #[test]
    fn test_no_highlight_when_read_only() {
        let mut viewport = viewport_with("a\nb");
        assert!(viewport.current_line_highlight().is_some());

        viewport.set_read_only(true);
        assert!(viewport.current_line_highlight().is_none());

        viewport.sync_cursor(Position::new(1, 0));
        assert!(viewport.current_line_highlight().is_none());
    }

    #[test]
    fn test_read_only_ignores_edits() {
        let mut viewport = viewport_with("keep");
        viewport.set_read_only(true);
        assert!(!viewport.sync_text("changed").unwrap());
        assert_eq!(viewport.content(), "keep");
        assert_eq!(viewport.replace_all("keep", "x").unwrap(), 0);
    }

    #[test]
    fn test_gutter_paints_only_visible_lines() {
        let mut viewport = viewport_with(&numbered_lines(10_000));
        let line_height = viewport.font_metrics().line_height;

        viewport.set_scroll(line_height * 500.0, line_height * 20.0);
        let labels: Vec<_> = viewport.gutter_labels().collect();

        assert_eq!(labels.len(), 20);
        assert_eq!(labels[0].number, 501);
        assert_eq!(labels[0].top, 500.0 * line_height);
        assert_eq!(labels[19].number, 520);
    }

    #[test]
    fn test_partial_rows_are_painted() {
        let mut viewport = viewport_with(&numbered_lines(100));
        let line_height = viewport.font_metrics().line_height;

        viewport.set_scroll(line_height * 2.5, line_height * 3.0);
        assert_eq!(viewport.visible_lines(), 2..6);
    }

    #[test]
    fn test_visible_lines_clamp_to_document() {
        let mut viewport = viewport_with("one\ntwo");
        viewport.set_scroll(0.0, 10_000.0);
        assert_eq!(viewport.visible_lines(), 0..2);

        viewport.set_scroll(10_000.0, 100.0);
        assert!(viewport.visible_lines().is_empty());
    }

    #[test]
    fn test_sync_marks_modified_without_revision() {
        let mut viewport = viewport_with("x");
        let revision = viewport.revision();

        assert!(viewport.sync_text("xy").unwrap());
        assert!(viewport.is_modified());
        assert_eq!(viewport.revision(), revision);
        assert!(viewport.take_redraw());
        assert!(!viewport.take_redraw());
    }

    #[test]
    fn test_undo_moves_caret_and_bumps_revision() {
        let mut viewport = viewport_with("hello");
        viewport.sync_text("hello world").unwrap();
        let revision = viewport.revision();

        assert!(viewport.undo());
        assert_eq!(viewport.content(), "hello");
        assert_eq!(viewport.cursor().position, Position::new(0, 5));
        assert!(viewport.revision() > revision);
        assert!(!viewport.is_modified());

        assert!(viewport.redo());
        assert_eq!(viewport.content(), "hello world");
        assert!(!viewport.redo());
    }

    #[test]
    fn test_find_next_selects_and_wraps() {
        let mut viewport = viewport_with("cat\nCat\ndog");

        assert_eq!(viewport.find_next("cat").unwrap(), Some(0..3));
        assert_eq!(
            viewport.cursor().selection_range(),
            Some((Position::new(0, 0), Position::new(0, 3)))
        );
        assert_eq!(viewport.find_next("cat").unwrap(), Some(4..7));
        assert_eq!(viewport.find_next("cat").unwrap(), Some(0..3));
        assert_eq!(viewport.find_next("bird").unwrap(), None);
    }

    #[test]
    fn test_replace_then_find_next() {
        let mut viewport = viewport_with("a1 a2 a3");
        viewport.find_next("a").unwrap();

        let next = viewport.replace("a", "b").unwrap();
        assert_eq!(viewport.content(), "b1 a2 a3");
        assert_eq!(next, Some(3..4));
        assert!(viewport.is_modified());
    }

    #[test]
    fn test_replace_without_selection_only_finds() {
        let mut viewport = viewport_with("xx a");
        assert_eq!(viewport.replace("a", "b").unwrap(), Some(3..4));
        assert_eq!(viewport.content(), "xx a");
    }

    #[test]
    fn test_replace_all_single_undo() {
        let mut viewport = viewport_with("Tea tea TEA");
        assert_eq!(viewport.replace_all("tea", "coffee").unwrap(), 3);
        assert_eq!(viewport.content(), "coffee coffee coffee");

        viewport.undo();
        assert_eq!(viewport.content(), "Tea tea TEA");
    }

    #[test]
    fn test_save_to_clears_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut viewport = viewport_with("");
        viewport.sync_text("typed").unwrap();

        viewport.save_to(&path).unwrap();
        assert!(!viewport.is_modified());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "typed");
    }
}
