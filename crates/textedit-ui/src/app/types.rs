use std::path::PathBuf;

use iced::Point;
use iced::widget::text_editor::{self, Action, Motion};
use textedit_buffer::{Position, TextBuffer};
use textedit_core::{Config, EditorViewport};
use unicode_segmentation::UnicodeSegmentation;

use crate::theme::Theme;

/// Startup options, resolved by the binary.
#[derive(Debug, Default)]
pub struct Flags {
    /// File to open on launch
    pub file: Option<PathBuf>,
    /// Folder shown in the sidebar
    pub folder: Option<PathBuf>,
    pub config: Config,
    pub theme: Theme,
}

/// Widget state for one tab.
///
/// The widget owns the text while the user types; the tab's viewport is
/// told about every edit. When the viewport changes on its own (undo,
/// replace, load) its revision moves and the widget is rebuilt from it.
pub struct EditorView {
    pub content: text_editor::Content,
    pub revision: u64,
}

impl EditorView {
    pub fn new(viewport: &EditorViewport) -> Self {
        let mut view = Self {
            content: text_editor::Content::new(),
            revision: 0,
        };
        view.reload(viewport);
        view
    }

    /// Rebuilds the widget content from `viewport` if it moved on.
    pub fn sync(&mut self, viewport: &EditorViewport) -> bool {
        if viewport.revision() == self.revision {
            return false;
        }
        self.reload(viewport);
        true
    }

    fn reload(&mut self, viewport: &EditorViewport) {
        self.content = text_editor::Content::with_text(&viewport.content());
        self.revision = viewport.revision();
        self.restore_cursor(viewport);
    }

    /// Walks the fresh widget cursor to where the viewport has it.
    ///
    /// The widget steps by grapheme, so columns are counted that way. A
    /// selection over several lines steps down whole lines first.
    fn restore_cursor(&mut self, viewport: &EditorViewport) {
        let cursor = viewport.cursor();
        let buffer = viewport.buffer();
        let (start, end) = cursor
            .selection_range()
            .unwrap_or((cursor.position, cursor.position));
        let start_column = grapheme_column(buffer, start);

        self.content.perform(Action::Move(Motion::DocumentStart));
        for _ in 0..start.line {
            self.content.perform(Action::Move(Motion::Down));
        }
        self.content.perform(Action::Move(Motion::Home));
        for _ in 0..start_column {
            self.content.perform(Action::Move(Motion::Right));
        }

        if end == start {
            return;
        }
        let end_column = grapheme_column(buffer, end);
        let steps = if end.line == start.line {
            end_column.saturating_sub(start_column)
        } else {
            for _ in start.line..end.line {
                self.content.perform(Action::Select(Motion::Down));
            }
            self.content.perform(Action::Select(Motion::Home));
            end_column
        };
        for _ in 0..steps {
            self.content.perform(Action::Select(Motion::Right));
        }
    }

    /// Full text as the widget shows it.
    ///
    /// Lines are joined by hand: `Content::text` always appends a final
    /// newline, which would make every loaded file look edited.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for index in 0..self.content.line_count() {
            if index > 0 {
                text.push('\n');
            }
            if let Some(line) = self.content.line(index) {
                let line: &str = &line;
                text.push_str(line);
            }
        }
        text
    }
}

/// Graphemes before `position` on its line.
fn grapheme_column(buffer: &TextBuffer, position: Position) -> usize {
    buffer.line(position.line).map_or(0, |line| {
        let end = line
            .char_indices()
            .nth(position.column)
            .map_or(line.len(), |(index, _)| index);
        line[..end].graphemes(true).count()
    })
}

/// Right-click menu on a file tree row.
#[derive(Debug, Clone, Copy)]
pub struct TreeMenu {
    pub row: usize,
    pub position: Point,
}

/// Find and replace bar.
#[derive(Debug, Clone, Default)]
pub struct FindBar {
    pub visible: bool,
    pub query: String,
    pub replacement: String,
    /// Feedback such as "No matches"
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_column_counts_combined_marks_once() {
        let buffer = TextBuffer::from("e\u{301}x\nab");
        assert_eq!(grapheme_column(&buffer, Position::new(0, 2)), 1);
        assert_eq!(grapheme_column(&buffer, Position::new(0, 3)), 2);
        assert_eq!(grapheme_column(&buffer, Position::new(1, 1)), 1);
        assert_eq!(grapheme_column(&buffer, Position::new(9, 0)), 0);
    }
}
