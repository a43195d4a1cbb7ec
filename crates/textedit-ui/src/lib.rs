//! # TextEdit UI
//!
//! The editor window, built on iced.
//!
//! ## Architecture
//!
//! The UI follows the Elm architecture (TEA):
//! - **Model**: [`App`], which wraps the core `WindowController`
//! - **Message**: Events that can occur
//! - **Update**: (state, message) -> new state, plus follow-up tasks
//! - **View**: state -> UI elements
//!
//! Editor state lives in `textedit-core`; this crate only owns what iced
//! needs on top of it: widget content, overlays, native dialogs.

pub mod app;
pub mod prompter;
pub mod theme;

pub use app::{App, Flags, run};
pub use theme::Theme;
