//! # TextEdit Core
//!
//! Editor state that does not depend on any GUI toolkit: open tabs,
//! viewport geometry, the file tree and the commands that tie them
//! together. Everything here runs headless, which is how the tests drive it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    WindowController                       │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────┐ │
//! │  │ FileTree │ │   Zoom   │ │  Keymap  │ │ Prompter (P) │ │
//! │  └──────────┘ └──────────┘ └──────────┘ └──────────────┘ │
//! │  ┌────────────────────────────────────────────┐          │
//! │  │               TabRegistry                   │          │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐  │          │
//! │  │  │ Viewport  │ │ Viewport  │ │ Viewport  │  │          │
//! │  │  │ (buffer)  │ │ (buffer)  │ │ (buffer)  │  │          │
//! │  │  └───────────┘ └───────────┘ └───────────┘  │          │
//! │  └────────────────────────────────────────────┘          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod command;
pub mod config;
pub mod controller;
pub mod event;
pub mod file_tree;
pub mod keymap;
pub mod prompt;
pub mod status;
pub mod tabs;
pub mod viewport;
pub mod zoom;

use std::path::PathBuf;

pub use command::{Command, Menu, MenuEntry};
pub use config::{Config, ConfigError};
pub use controller::{Dispatch, WidgetAction, WindowController};
pub use event::{EditorEvent, EventBus, ListenerId, TabEvent, TabListeners};
pub use file_tree::{FileChange, FileNode, FileTree, FileWatcher, normalize_path};
pub use keymap::{Key, KeyBinding, KeyPress, Keymap, Modifiers};
pub use prompt::{Answer, HeadlessPrompter, PromptError, Prompter, SaveChoice};
pub use status::{StatusInfo, file_type_label, window_title};
pub use tabs::{CloseOutcome, MODIFIED_MARKER, TabEntry, TabId, TabRegistry, UNTITLED};
pub use viewport::{EditorViewport, FontMetrics, GutterLabel, LineHighlight, ViewportOptions};
pub use zoom::{Zoom, ZoomIndicator};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
///
/// The first group is what users see in an error dialog; the rest are
/// plumbing failures that also end up there when they reach a command.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Could not open '{}': {source}", .path.display())]
    FileNotReadable {
        path: PathBuf,
        source: textedit_buffer::BufferError,
    },

    #[error("Could not save '{}': {source}", .path.display())]
    FileNotWritable {
        path: PathBuf,
        source: textedit_buffer::BufferError,
    },

    #[error("Folder '{0}' already exists.")]
    FolderAlreadyExists(String),

    #[error("Could not create folder '{}': {source}", .path.display())]
    FolderNotCreated {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not delete '{}': {source}", .path.display())]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{0}' is not a valid folder name")]
    InvalidName(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Buffer error: {0}")]
    Buffer(#[from] textedit_buffer::BufferError),
}

impl CoreError {
    /// Dialog title for this error.
    pub fn title(&self) -> &'static str {
        match self {
            Self::FolderAlreadyExists(_) | Self::InvalidName(_) => "Warning",
            _ => "Error",
        }
    }
}
