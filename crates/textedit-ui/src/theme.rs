//! Theme system for the editor.
//!
//! A [`Theme`] is plain data and can be loaded from a JSON file. The views
//! never read it directly; they use the [`Palette`] derived from it, which
//! is `Copy` and can be moved into style closures.
//!
//! ```json
//! { "name": "Midnight", "accent": { "r": 0.9, "g": 0.4, "b": 0.1, "a": 1.0 } }
//! ```
//!
//! Missing fields fall back to the built-in dark theme.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Color representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From a `0xRRGGBB` value.
    pub const fn hex(value: u32) -> Self {
        Self::rgb(
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        )
    }

    /// Converts to iced Color.
    pub fn to_iced(&self) -> iced::Color {
        iced::Color::from_rgba(self.r, self.g, self.b, self.a)
    }
}

/// Editor theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,

    /// Editor and gutter background
    pub background: Color,
    /// Menu bar, tab strip and status bar
    pub chrome: Color,
    pub sidebar: Color,
    pub hover: Color,
    pub active: Color,
    pub current_line: Color,
    pub selection: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub gutter_text: Color,
    pub accent: Color,
    pub border: Color,
    pub error: Color,
}

impl Theme {
    /// The built-in dark theme.
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            background: Color::hex(0x1e1e1e),
            chrome: Color::hex(0x2d2d30),
            sidebar: Color::hex(0x252526),
            hover: Color::hex(0x2a2d2e),
            active: Color::hex(0x37373d),
            current_line: Color::hex(0x2d2d30),
            selection: Color::rgba(0.15, 0.31, 0.47, 0.8),
            text: Color::hex(0xd4d4d4),
            text_secondary: Color::hex(0xcccccc),
            text_muted: Color::hex(0x858585),
            gutter_text: Color::hex(0x858585),
            accent: Color::hex(0x007acc),
            border: Color::hex(0x3e3e42),
            error: Color::hex(0xf14c4c),
        }
    }

    /// Reads a theme from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn palette(&self) -> Palette {
        Palette {
            background: self.background.to_iced(),
            chrome: self.chrome.to_iced(),
            sidebar: self.sidebar.to_iced(),
            hover: self.hover.to_iced(),
            active: self.active.to_iced(),
            current_line: self.current_line.to_iced(),
            selection: self.selection.to_iced(),
            text: self.text.to_iced(),
            text_secondary: self.text_secondary.to_iced(),
            text_muted: self.text_muted.to_iced(),
            gutter_text: self.gutter_text.to_iced(),
            accent: self.accent.to_iced(),
            border: self.border.to_iced(),
            error: self.error.to_iced(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Theme loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Failed to read theme: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse theme: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolved iced colors of a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: iced::Color,
    pub chrome: iced::Color,
    pub sidebar: iced::Color,
    pub hover: iced::Color,
    pub active: iced::Color,
    pub current_line: iced::Color,
    pub selection: iced::Color,
    pub text: iced::Color,
    pub text_secondary: iced::Color,
    pub text_muted: iced::Color,
    pub gutter_text: iced::Color,
    pub accent: iced::Color,
    pub border: iced::Color,
    pub error: iced::Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        let color = Color::hex(0x007acc);
        assert_eq!(color.r, 0.0);
        assert!((color.g - 122.0 / 255.0).abs() < f32::EPSILON);
        assert!((color.b - 204.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_partial_theme_falls_back_to_dark() {
        let theme: Theme =
            serde_json::from_str(r#"{ "name": "Custom", "accent": { "r": 1.0, "g": 0.0, "b": 0.0 } }"#)
                .unwrap();
        assert_eq!(theme.name, "Custom");
        assert_eq!(theme.accent, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(theme.background, Theme::dark().background);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Theme::load(&path), Err(ThemeError::Parse(_))));
        assert!(matches!(
            Theme::load(dir.path().join("missing.json")),
            Err(ThemeError::Io(_))
        ));
    }
}
