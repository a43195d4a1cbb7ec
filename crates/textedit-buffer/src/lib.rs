//! # TextEdit Buffer
//!
//! Text storage for one open document: a rope, a grouped undo history
//! and literal search.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Ownership & Borrowing
//! - `TextBuffer` owns the rope data structure
//! - Methods like `text()` return borrowed data (`Cow<str>`)
//! - Mutations require `&mut self` (exclusive access)
//!
//! ### Memory Safety
//! - Positions are validated before they reach the rope, so bad input
//!   becomes a `BufferError` instead of a panic

mod buffer;
mod cursor;
mod history;
mod search;

pub use buffer::{BufferConfig, TextBuffer};
pub use cursor::{Cursor, Position};
pub use history::{Edit, EditGroup, EditKind, History};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Search pattern rejected: {0}")]
    Search(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
