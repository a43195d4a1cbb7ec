//! Native dialogs behind the controller's [`Prompter`] trait.
//!
//! rfd's synchronous dialogs block the UI thread until answered, which is
//! exactly the modal behavior the close and delete prompts need.

use std::path::{Path, PathBuf};

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use textedit_core::{CoreError, PromptError, Prompter, SaveChoice};

const SAVE: &str = "Save";
const DISCARD: &str = "Discard";
const CANCEL: &str = "Cancel";

/// Prompts with the platform's native dialogs.
#[derive(Debug, Default)]
pub struct RfdPrompter;

impl RfdPrompter {
    pub fn new() -> Self {
        Self
    }
}

/// Whether a dialog can be put on screen at all.
#[cfg(all(unix, not(target_os = "macos")))]
fn display_available() -> bool {
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn display_available() -> bool {
    true
}

fn save_choice(result: MessageDialogResult) -> SaveChoice {
    match result {
        MessageDialogResult::Custom(label) if label == SAVE => SaveChoice::Save,
        MessageDialogResult::Custom(label) if label == DISCARD => SaveChoice::Discard,
        MessageDialogResult::Yes => SaveChoice::Save,
        MessageDialogResult::No => SaveChoice::Discard,
        _ => SaveChoice::Cancel,
    }
}

impl Prompter for RfdPrompter {
    fn ask_save(&mut self, title: &str, message: &str) -> Result<SaveChoice, PromptError> {
        if !display_available() {
            return Err(PromptError::Unavailable);
        }
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNoCancelCustom(
                SAVE.to_string(),
                DISCARD.to_string(),
                CANCEL.to_string(),
            ))
            .show();
        Ok(save_choice(result))
    }

    fn ask_yes_no(&mut self, title: &str, message: &str) -> Result<bool, PromptError> {
        if !display_available() {
            return Err(PromptError::Unavailable);
        }
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();
        Ok(matches!(result, MessageDialogResult::Yes))
    }

    fn pick_open_file(&mut self, start: &Path) -> Option<PathBuf> {
        FileDialog::new()
            .set_directory(start)
            .add_filter("All Files", &["*"])
            .add_filter("Text", &["txt", "md"])
            .add_filter("Web", &["html", "css", "js", "ts", "json"])
            .add_filter("Python", &["py"])
            .pick_file()
    }

    fn pick_save_path(&mut self, start: &Path, suggested_name: &str) -> Option<PathBuf> {
        FileDialog::new()
            .set_directory(start)
            .set_file_name(suggested_name)
            .save_file()
    }

    fn pick_folder(&mut self, start: &Path) -> Option<PathBuf> {
        FileDialog::new().set_directory(start).pick_folder()
    }

    fn show_error(&mut self, error: &CoreError) {
        if !display_available() {
            tracing::warn!(%error, "No display for error dialog");
            return;
        }
        let level = match error.title() {
            "Warning" => MessageLevel::Warning,
            _ => MessageLevel::Error,
        };
        MessageDialog::new()
            .set_level(level)
            .set_title(error.title())
            .set_description(error.to_string())
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
