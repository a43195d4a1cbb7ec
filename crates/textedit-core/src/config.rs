//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[derive(Serialize, Deserialize)]` generates the code that turns these
//! structs into TOML and back. `#[serde(default)]` fills missing fields
//! from `Default::default()`, so a config file only needs the keys it
//! actually changes.
//!
//! Nothing is read implicitly: the editor runs on defaults unless a file
//! is passed on the command line.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor behavior settings
    pub editor: EditorConfig,

    /// UI appearance settings
    pub ui: UiConfig,

    /// File handling settings
    pub files: FileConfig,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Loads config from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.editor.min_font_size <= 0.0 {
            return Err(ConfigError::Invalid(
                "editor.min_font_size must be positive".into(),
            ));
        }
        if self.editor.font_size < self.editor.min_font_size {
            return Err(ConfigError::Invalid(format!(
                "editor.font_size {} is below editor.min_font_size {}",
                self.editor.font_size, self.editor.min_font_size
            )));
        }
        Ok(())
    }

    /// Directory the file tree starts in when none is given.
    ///
    /// Falls back to the home directory when the working directory is gone.
    pub fn default_root() -> PathBuf {
        std::env::current_dir()
            .ok()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Editor behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in points that zoom resets to
    pub font_size: f32,

    /// Zoom out stops here
    pub min_font_size: f32,

    /// Fixed part of the gutter width, in pixels
    pub gutter_margin: f32,

    /// Open every tab read-only
    pub read_only: bool,

    /// Undo history limit
    pub undo_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            min_font_size: 6.0,
            gutter_margin: 20.0,
            read_only: false,
            undo_limit: 1000,
        }
    }
}

/// UI appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme file (JSON); the built-in dark theme when unset
    pub theme: Option<PathBuf>,

    /// Highlight the line holding the cursor
    pub highlight_current_line: bool,

    /// Show the file tree on startup
    pub sidebar_visible: bool,

    /// File tree width in pixels
    pub sidebar_width: f32,

    /// How long the zoom percentage stays up (ms)
    pub zoom_indicator_ms: u64,

    pub window_width: f32,

    pub window_height: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: None,
            highlight_current_line: true,
            sidebar_visible: true,
            sidebar_width: 250.0,
            zoom_indicator_ms: 1000,
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

/// File handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Watch the tree root for external changes
    pub watch_files: bool,

    /// List dot-files in the file tree
    pub show_hidden: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            watch_files: true,
            show_hidden: false,
        }
    }
}

/// Keyboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Extra bindings, key string to command id (`"ctrl+shift+f" = "find"`)
    pub bindings: HashMap<String, String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.font_size, 11.0);
        assert_eq!(config.editor.min_font_size, 6.0);
        assert_eq!(config.editor.gutter_margin, 20.0);
        assert_eq!(config.ui.zoom_indicator_ms, 1000);
        assert!(config.ui.sidebar_visible);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[editor]\nfont_size = 14.0\n\n[keyboard.bindings]\n\"ctrl+shift+f\" = \"find\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.editor.font_size, 14.0);
        assert_eq!(config.editor.min_font_size, 6.0);
        assert_eq!(config.keyboard.bindings["ctrl+shift+f"], "find");
    }

    #[test]
    fn test_rejects_font_below_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\nfont_size = 4.0\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
