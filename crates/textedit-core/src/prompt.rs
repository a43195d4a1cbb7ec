//! Blocking user prompts.
//!
//! The controller never talks to a dialog toolkit directly. It asks a
//! [`Prompter`], which the GUI implements with native dialogs and tests
//! implement with [`HeadlessPrompter`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::CoreError;

/// Answer to "save your changes?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Save,
    Discard,
    Cancel,
}

/// A prompt that could not be put on screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("no dialog could be displayed")]
    Unavailable,
}

/// Synchronous dialogs the controller needs.
pub trait Prompter {
    /// Save / Discard / Cancel.
    fn ask_save(&mut self, title: &str, message: &str) -> Result<SaveChoice, PromptError>;

    /// Yes / No.
    fn ask_yes_no(&mut self, title: &str, message: &str) -> Result<bool, PromptError>;

    fn pick_open_file(&mut self, start: &Path) -> Option<PathBuf>;

    fn pick_save_path(&mut self, start: &Path, suggested_name: &str) -> Option<PathBuf>;

    fn pick_folder(&mut self, start: &Path) -> Option<PathBuf>;

    /// Shows a blocking error dialog.
    fn show_error(&mut self, error: &CoreError);
}

/// One scripted answer for [`HeadlessPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Save(SaveChoice),
    YesNo(bool),
    Path(Option<PathBuf>),
}

/// A prompter for running without a display.
///
/// Answers are consumed in order. When the queue runs dry, dialogs report
/// [`PromptError::Unavailable`] and pickers return `None`, which is what a
/// session without a display looks like. Every prompt and error is
/// recorded so tests can assert on what the user would have seen.
#[derive(Debug, Default)]
pub struct HeadlessPrompter {
    answers: VecDeque<Answer>,
    /// Messages of every dialog shown, in order
    pub prompts: Vec<String>,
    /// Every error shown
    pub errors: Vec<String>,
}

impl HeadlessPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answers in order.
    pub fn with_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, answer: Answer) {
        self.answers.push_back(answer);
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self) -> Option<Answer> {
        self.answers.pop_front()
    }
}

impl Prompter for HeadlessPrompter {
    fn ask_save(&mut self, _title: &str, message: &str) -> Result<SaveChoice, PromptError> {
        self.prompts.push(message.to_string());
        match self.next_answer() {
            Some(Answer::Save(choice)) => Ok(choice),
            Some(other) => {
                tracing::warn!(?other, "Scripted answer does not fit a save prompt");
                Err(PromptError::Unavailable)
            }
            None => Err(PromptError::Unavailable),
        }
    }

    fn ask_yes_no(&mut self, _title: &str, message: &str) -> Result<bool, PromptError> {
        self.prompts.push(message.to_string());
        match self.next_answer() {
            Some(Answer::YesNo(yes)) => Ok(yes),
            Some(other) => {
                tracing::warn!(?other, "Scripted answer does not fit a yes/no prompt");
                Err(PromptError::Unavailable)
            }
            None => Err(PromptError::Unavailable),
        }
    }

    fn pick_open_file(&mut self, _start: &Path) -> Option<PathBuf> {
        self.next_path()
    }

    fn pick_save_path(&mut self, _start: &Path, _suggested_name: &str) -> Option<PathBuf> {
        self.next_path()
    }

    fn pick_folder(&mut self, _start: &Path) -> Option<PathBuf> {
        self.next_path()
    }

    fn show_error(&mut self, error: &CoreError) {
        self.errors.push(error.to_string());
    }
}

impl HeadlessPrompter {
    fn next_path(&mut self) -> Option<PathBuf> {
        match self.next_answer() {
            Some(Answer::Path(path)) => path,
            Some(other) => {
                tracing::warn!(?other, "Scripted answer does not fit a file picker");
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_are_consumed_in_order() {
        let mut prompter = HeadlessPrompter::with_answers([
            Answer::Save(SaveChoice::Discard),
            Answer::YesNo(true),
            Answer::Path(Some(PathBuf::from("/tmp/a.txt"))),
        ]);

        assert_eq!(prompter.ask_save("t", "first"), Ok(SaveChoice::Discard));
        assert_eq!(prompter.ask_yes_no("t", "second"), Ok(true));
        assert_eq!(
            prompter.pick_save_path(Path::new("/tmp"), "x"),
            Some(PathBuf::from("/tmp/a.txt"))
        );
        assert_eq!(prompter.prompts, vec!["first", "second"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_empty_queue_is_unavailable() {
        let mut prompter = HeadlessPrompter::new();
        assert_eq!(prompter.ask_save("t", "m"), Err(PromptError::Unavailable));
        assert_eq!(prompter.ask_yes_no("t", "m"), Err(PromptError::Unavailable));
        assert_eq!(prompter.pick_folder(Path::new("/")), None);
    }

    #[test]
    fn test_mismatched_answer_is_unavailable() {
        let mut prompter = HeadlessPrompter::with_answers([Answer::YesNo(true)]);
        assert_eq!(prompter.ask_save("t", "m"), Err(PromptError::Unavailable));
    }

    #[test]
    fn test_errors_are_recorded() {
        let mut prompter = HeadlessPrompter::new();
        prompter.show_error(&CoreError::FolderAlreadyExists("docs".into()));
        assert_eq!(prompter.errors, vec!["Folder 'docs' already exists."]);
    }
}
