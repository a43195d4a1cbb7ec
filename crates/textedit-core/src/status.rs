//! Window title and status bar text.

use std::path::Path;

use crate::tabs::UNTITLED;

/// Application name used in the window title.
pub const APP_NAME: &str = "TextEdit";

/// Text of the About dialog.
pub const ABOUT: &str = "TextEdit\n\n\
A simple text editor.\n\n\
Features:\n\
- Multiple tabs with unsaved-change tracking\n\
- Line numbers and current line highlighting\n\
- File explorer sidebar\n\
- Find and replace\n\
- Zoom in and out\n\
- Undo and redo";

/// `TextEdit - {path}`, or `TextEdit - Untitled` for a new document.
pub fn window_title(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("{APP_NAME} - {}", path.display()),
        None => format!("{APP_NAME} - {UNTITLED}"),
    }
}

/// Human name of a file's type, from its extension.
pub fn file_type_label(path: Option<&Path>) -> &'static str {
    let extension = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("py") => "Python",
        Some("js") => "JavaScript",
        Some("ts") => "TypeScript",
        Some("html") => "HTML",
        Some("css") => "CSS",
        Some("json") => "JSON",
        Some("md") => "Markdown",
        _ => "Plain Text",
    }
}

/// Everything the status bar shows for the active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub encoding: &'static str,
    pub file_type: &'static str,
}

impl StatusInfo {
    pub fn new(cursor: (usize, usize), path: Option<&Path>) -> Self {
        Self {
            line: cursor.0,
            column: cursor.1,
            encoding: "UTF-8",
            file_type: file_type_label(path),
        }
    }

    /// `Ln 3, Col 7`
    pub fn position_label(&self) -> String {
        format!("Ln {}, Col {}", self.line, self.column)
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self::new((1, 1), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_title() {
        assert_eq!(window_title(None), "TextEdit - Untitled");
        assert_eq!(
            window_title(Some(Path::new("/tmp/a.txt"))),
            "TextEdit - /tmp/a.txt"
        );
    }

    #[test]
    fn test_file_type_label() {
        assert_eq!(file_type_label(Some(Path::new("main.py"))), "Python");
        assert_eq!(file_type_label(Some(Path::new("README.MD"))), "Markdown");
        assert_eq!(file_type_label(Some(Path::new("notes.txt"))), "Plain Text");
        assert_eq!(file_type_label(Some(Path::new("Makefile"))), "Plain Text");
        assert_eq!(file_type_label(None), "Plain Text");
    }

    #[test]
    fn test_position_label() {
        let status = StatusInfo::new((3, 7), Some(Path::new("app.ts")));
        assert_eq!(status.position_label(), "Ln 3, Col 7");
        assert_eq!(status.encoding, "UTF-8");
        assert_eq!(status.file_type, "TypeScript");
    }
}
