use std::sync::Arc;
use std::time::Instant;

use iced::widget::{scrollable, text_editor, text_input};
use iced::{Task, keyboard};
use textedit_buffer::Position;
use textedit_core::{Command, Dispatch, Key, KeyPress, Modifiers, WidgetAction};

use super::view::editor::editor_scroll_id;
use super::{App, CHROME_HEIGHT, Message, TreeMenu};

/// Height the find bar takes from the editor while open.
pub const FIND_BAR_HEIGHT: f32 = 40.0;

pub fn find_input_id() -> text_input::Id {
    text_input::Id::new("find-input")
}

pub fn folder_input_id() -> text_input::Id {
    text_input::Id::new("folder-name-input")
}

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        let before = self.active_id();
        let task = self.handle(message);
        self.sync_views();

        // The editor scrollable is shared by all tabs.
        match self.active_id() {
            Some(id) if Some(id) != before => Task::batch([task, self.restore_scroll()]),
            _ => task,
        }
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Command(command) => {
                self.active_menu = None;
                self.tree_menu = None;
                return self.run_command(command);
            }

            Message::ToggleMenu(menu) => {
                self.tree_menu = None;
                self.active_menu = if self.active_menu == Some(menu) {
                    None
                } else {
                    Some(menu)
                };
            }

            Message::CloseMenu => {
                self.active_menu = None;
            }

            // The outer scrollable moves the text; the widget never scrolls itself.
            Message::EditorAction(text_editor::Action::Scroll { lines }) => {
                let line_height = self
                    .controller
                    .tabs()
                    .current_editor()
                    .map_or(0.0, |viewport| viewport.font_metrics().line_height);
                return scrollable::scroll_by(
                    editor_scroll_id(),
                    scrollable::AbsoluteOffset {
                        x: 0.0,
                        y: lines as f32 * line_height,
                    },
                );
            }

            Message::EditorAction(action) => {
                self.active_menu = None;
                self.perform(action);
            }

            Message::EditorScrolled(viewport) => {
                if let Some(id) = self.active_id() {
                    self.controller.set_scroll(
                        id,
                        viewport.absolute_offset().y,
                        viewport.bounds().height,
                    );
                }
            }

            Message::TabSelected(ordinal) => {
                self.controller.activate(ordinal);
            }

            Message::CloseTab(ordinal) => {
                self.controller.close_tab(ordinal);
            }

            Message::TreeRowClicked(row) => {
                self.tree_menu = None;
                let _ = self.controller.open_from_tree(row);
            }

            Message::ShowTreeMenu(row) => {
                self.active_menu = None;
                self.tree_menu = Some(TreeMenu {
                    row,
                    position: self.last_cursor_position,
                });
            }

            Message::HideTreeMenu => {
                self.tree_menu = None;
            }

            Message::OpenTreeRow => {
                if let Some(menu) = self.tree_menu.take() {
                    let _ = self.controller.open_from_tree(menu.row);
                }
            }

            Message::DeleteTreeRow => {
                if let Some(menu) = self.tree_menu.take() {
                    let _ = self.controller.delete_row(menu.row);
                }
            }

            Message::MouseMoved(point) => {
                self.last_cursor_position = point;
            }

            Message::FindChanged(query) => {
                self.find.query = query;
                self.find.status = None;
            }

            Message::ReplaceChanged(replacement) => {
                self.find.replacement = replacement;
            }

            Message::FindNext => {
                self.find.status = match self.controller.find_next(&self.find.query) {
                    Ok(true) => None,
                    Ok(false) => Some("No matches".to_string()),
                    Err(_) => None,
                };
            }

            Message::ReplaceOne => {
                let result = self
                    .controller
                    .replace(&self.find.query, &self.find.replacement);
                self.find.status = match result {
                    Ok(true) => None,
                    Ok(false) => Some("No matches".to_string()),
                    Err(_) => None,
                };
            }

            Message::ReplaceAll => {
                let result = self
                    .controller
                    .replace_all(&self.find.query, &self.find.replacement);
                self.find.status = match result {
                    Ok(0) => Some("No matches".to_string()),
                    Ok(count) => Some(format!("Replaced {} occurrence(s)", count)),
                    Err(_) => None,
                };
            }

            Message::CloseFind => {
                self.find.visible = false;
                self.find.status = None;
                self.resize_views();
            }

            Message::FolderNameChanged(name) => {
                self.new_folder = Some(name);
            }

            Message::CreateFolderConfirm => {
                if let Some(name) = self.new_folder.take() {
                    // Failures were already shown; keep the dialog for a retry.
                    if self.controller.create_folder(&name).is_err() {
                        self.new_folder = Some(name);
                    }
                }
            }

            Message::CreateFolderCancel => {
                self.new_folder = None;
            }

            Message::HideAbout => {
                self.about_visible = false;
            }

            Message::KeyPressed(key, modifiers) => {
                return self.handle_key_pressed(key, modifiers);
            }

            Message::Tick => {
                self.controller.tick(Instant::now());
            }

            Message::WindowResized(size) => {
                self.window_height = size.height;
                self.resize_views();
            }

            Message::CloseRequested(_id) => {
                if self.controller.request_exit() {
                    return iced::exit();
                }
            }
        }
        Task::none()
    }

    fn run_command(&mut self, command: Command) -> Task<Message> {
        match self.controller.execute(command, Instant::now()) {
            Dispatch::Handled => Task::none(),
            Dispatch::Exit => iced::exit(),
            Dispatch::Widget(action) => self.widget_action(action),
        }
    }

    /// Finishes the commands that need the editor widget or an overlay.
    fn widget_action(&mut self, action: WidgetAction) -> Task<Message> {
        match action {
            WidgetAction::Cut => {
                if let Some(selected) = self.selection() {
                    if !self.read_only() {
                        copy_to_clipboard(&selected);
                        self.perform(text_editor::Action::Edit(text_editor::Edit::Delete));
                    }
                }
            }

            WidgetAction::Copy => {
                if let Some(selected) = self.selection() {
                    copy_to_clipboard(&selected);
                }
            }

            WidgetAction::Paste => {
                let clip_text = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
                match clip_text {
                    Ok(clip_text) => self.perform(text_editor::Action::Edit(
                        text_editor::Edit::Paste(Arc::new(clip_text)),
                    )),
                    Err(err) => tracing::warn!(%err, "Clipboard read failed"),
                }
            }

            WidgetAction::SelectAll => {
                self.perform(text_editor::Action::SelectAll);
            }

            WidgetAction::ShowFindReplace => {
                if let Some(selected) = self.selection().filter(|s| !s.contains('\n')) {
                    self.find.query = selected;
                }
                self.find.visible = true;
                self.find.status = None;
                self.resize_views();
                return text_input::focus(find_input_id());
            }

            WidgetAction::AskFolderName => {
                self.new_folder = Some(String::new());
                return text_input::focus(folder_input_id());
            }

            WidgetAction::ShowAbout => {
                self.about_visible = true;
            }
        }
        Task::none()
    }

    /// Applies a widget action to the active tab and reports the result to
    /// the controller. Edits are dropped while the tab is read-only.
    fn perform(&mut self, action: text_editor::Action) {
        let Some(id) = self.active_id() else {
            return;
        };
        let is_edit = action.is_edit();
        if is_edit && self.read_only() {
            return;
        }
        let Some(view) = self.views.get_mut(&id) else {
            return;
        };

        view.content.perform(action);
        if is_edit {
            if let Err(err) = self.controller.sync_editor(id, &view.text()) {
                tracing::error!(%err, "Failed to apply edit");
            }
        }
        let (line, column) = view.content.cursor_position();
        self.controller.sync_cursor(id, Position::new(line, column));
    }

    fn restore_scroll(&self) -> Task<Message> {
        let top = self
            .controller
            .tabs()
            .current_editor()
            .map_or(0.0, |viewport| viewport.scroll_top());
        scrollable::scroll_to(editor_scroll_id(), scrollable::AbsoluteOffset { x: 0.0, y: top })
    }

    fn selection(&self) -> Option<String> {
        self.active_id()
            .and_then(|id| self.views.get(&id))
            .and_then(|view| view.content.selection())
    }

    fn read_only(&self) -> bool {
        self.controller
            .tabs()
            .current_editor()
            .is_some_and(|viewport| viewport.is_read_only())
    }

    /// Visible editor height for the current window and find bar.
    pub fn editor_height(&self) -> f32 {
        let find = if self.find.visible { FIND_BAR_HEIGHT } else { 0.0 };
        (self.window_height - CHROME_HEIGHT - find).max(0.0)
    }

    fn resize_views(&mut self) {
        self.controller.set_view_height(self.editor_height());
    }

    pub fn handle_key_pressed(
        &mut self,
        key: keyboard::Key,
        modifiers: keyboard::Modifiers,
    ) -> Task<Message> {
        if matches!(key, keyboard::Key::Named(keyboard::key::Named::Escape)) && self.dismiss_overlay() {
            return Task::none();
        }

        // Shortcuts do nothing while a modal is up.
        if self.about_visible || self.new_folder.is_some() {
            return Task::none();
        }

        match to_key_press(&key, modifiers).and_then(|press| self.controller.command_for(&press)) {
            Some(command) => self.update(Message::Command(command)),
            None => Task::none(),
        }
    }

    /// Closes the topmost overlay; false if none was open.
    fn dismiss_overlay(&mut self) -> bool {
        if self.about_visible {
            self.about_visible = false;
        } else if self.new_folder.is_some() {
            self.new_folder = None;
        } else if self.tree_menu.is_some() {
            self.tree_menu = None;
        } else if self.active_menu.is_some() {
            self.active_menu = None;
        } else if self.find.visible {
            self.find.visible = false;
            self.resize_views();
        } else {
            return false;
        }
        true
    }
}

fn copy_to_clipboard(selected: &str) {
    let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(selected));
    if let Err(err) = result {
        tracing::warn!(%err, "Clipboard write failed");
    }
}

/// Converts an iced key event into the keymap's chord type.
///
/// `command()` is Ctrl everywhere but macOS, where it is Cmd; both map to
/// the keymap's `ctrl` so one set of bindings serves every platform.
pub fn to_key_press(key: &keyboard::Key, modifiers: keyboard::Modifiers) -> Option<KeyPress> {
    use keyboard::key::Named;

    let key = match key.as_ref() {
        keyboard::Key::Character(c) => Key::Char(c.chars().next()?),
        keyboard::Key::Named(Named::Enter) => Key::Enter,
        keyboard::Key::Named(Named::Tab) => Key::Tab,
        keyboard::Key::Named(Named::Escape) => Key::Escape,
        keyboard::Key::Named(named) => Key::F(function_key(named)?),
        keyboard::Key::Unidentified => return None,
    };

    Some(KeyPress::new(
        key,
        Modifiers {
            ctrl: modifiers.command(),
            alt: modifiers.alt(),
            shift: modifiers.shift(),
            meta: !cfg!(target_os = "macos") && modifiers.logo(),
        },
    ))
}

fn function_key(named: keyboard::key::Named) -> Option<u8> {
    use keyboard::key::Named;

    let n = match named {
        Named::F1 => 1,
        Named::F2 => 2,
        Named::F3 => 3,
        Named::F4 => 4,
        Named::F5 => 5,
        Named::F6 => 6,
        Named::F7 => 7,
        Named::F8 => 8,
        Named::F9 => 9,
        Named::F10 => 10,
        Named::F11 => 11,
        Named::F12 => 12,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> keyboard::Modifiers {
        keyboard::Modifiers::COMMAND
    }

    #[test]
    fn test_character_keys_keep_modifiers() {
        let press = to_key_press(&keyboard::Key::Character("S".into()), ctrl() | keyboard::Modifiers::SHIFT)
            .unwrap();
        assert_eq!(press.key, Key::Char('s'));
        assert!(press.modifiers.ctrl);
        assert!(press.modifiers.shift);
        assert!(!press.modifiers.alt);
    }

    #[test]
    fn test_named_keys() {
        let tab = to_key_press(&keyboard::Key::Named(keyboard::key::Named::Tab), ctrl()).unwrap();
        assert_eq!(tab.key, Key::Tab);

        let f1 = to_key_press(
            &keyboard::Key::Named(keyboard::key::Named::F1),
            keyboard::Modifiers::empty(),
        )
        .unwrap();
        assert_eq!(f1, KeyPress::new(Key::F(1), Modifiers::NONE));

        assert!(to_key_press(
            &keyboard::Key::Named(keyboard::key::Named::ArrowUp),
            keyboard::Modifiers::empty()
        )
        .is_none());
    }

    #[test]
    fn test_default_bindings_resolve() {
        let keymap = textedit_core::Keymap::new();
        let press = to_key_press(&keyboard::Key::Character("=".into()), ctrl()).unwrap();
        assert_eq!(keymap.lookup(&press), Some(Command::ZoomIn));

        let press = to_key_press(&keyboard::Key::Character("w".into()), ctrl()).unwrap();
        assert_eq!(keymap.lookup(&press), Some(Command::CloseTab));
    }
}
