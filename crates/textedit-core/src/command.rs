//! Command system for editor actions.
//!
//! ## Learning: The Command Pattern
//!
//! Every menu item and shortcut resolves to one [`Command`] value. The
//! menus, the keymap and the controller's dispatcher all speak this one
//! enum, so adding a command means adding a variant and letting the
//! compiler point at every `match` that needs a new arm.

/// Built-in editor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // File
    NewFile,
    NewFolder,
    Open,
    OpenFolder,
    Save,
    SaveAs,
    CloseTab,
    Exit,

    // Edit
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    FindReplace,

    // View
    ToggleSidebar,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    NextTab,
    PreviousTab,

    // Help
    About,
}

impl Command {
    /// Every command, in menu order.
    pub const ALL: [Command; 22] = [
        Command::NewFile,
        Command::NewFolder,
        Command::Open,
        Command::OpenFolder,
        Command::Save,
        Command::SaveAs,
        Command::CloseTab,
        Command::Exit,
        Command::Undo,
        Command::Redo,
        Command::Cut,
        Command::Copy,
        Command::Paste,
        Command::SelectAll,
        Command::FindReplace,
        Command::ToggleSidebar,
        Command::ZoomIn,
        Command::ZoomOut,
        Command::ZoomReset,
        Command::NextTab,
        Command::PreviousTab,
        Command::About,
    ];

    /// Returns the command's menu label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::NewFile => "New",
            Command::NewFolder => "New Folder",
            Command::Open => "Open...",
            Command::OpenFolder => "Open Folder...",
            Command::Save => "Save",
            Command::SaveAs => "Save As...",
            Command::CloseTab => "Close Tab",
            Command::Exit => "Exit",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Cut => "Cut",
            Command::Copy => "Copy",
            Command::Paste => "Paste",
            Command::SelectAll => "Select All",
            Command::FindReplace => "Find and Replace",
            Command::ToggleSidebar => "Toggle Sidebar",
            Command::ZoomIn => "Zoom In",
            Command::ZoomOut => "Zoom Out",
            Command::ZoomReset => "Reset Zoom",
            Command::NextTab => "Next Tab",
            Command::PreviousTab => "Previous Tab",
            Command::About => "About",
        }
    }

    /// Stable identifier used in config files.
    pub fn id(&self) -> &'static str {
        match self {
            Command::NewFile => "new_file",
            Command::NewFolder => "new_folder",
            Command::Open => "open",
            Command::OpenFolder => "open_folder",
            Command::Save => "save",
            Command::SaveAs => "save_as",
            Command::CloseTab => "close_tab",
            Command::Exit => "exit",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Cut => "cut",
            Command::Copy => "copy",
            Command::Paste => "paste",
            Command::SelectAll => "select_all",
            Command::FindReplace => "find",
            Command::ToggleSidebar => "toggle_sidebar",
            Command::ZoomIn => "zoom_in",
            Command::ZoomOut => "zoom_out",
            Command::ZoomReset => "zoom_reset",
            Command::NextTab => "next_tab",
            Command::PreviousTab => "previous_tab",
            Command::About => "about",
        }
    }

    pub fn from_id(id: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|command| command.id() == id)
    }
}

/// Top-level menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    File,
    Edit,
    View,
    Help,
}

/// One row of a dropdown menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Item(Command),
    Separator,
}

impl Menu {
    pub const ALL: [Menu; 4] = [Menu::File, Menu::Edit, Menu::View, Menu::Help];

    pub fn label(&self) -> &'static str {
        match self {
            Menu::File => "File",
            Menu::Edit => "Edit",
            Menu::View => "View",
            Menu::Help => "Help",
        }
    }

    pub fn entries(&self) -> &'static [MenuEntry] {
        use MenuEntry::{Item, Separator};
        match self {
            Menu::File => &[
                Item(Command::NewFile),
                Item(Command::NewFolder),
                Separator,
                Item(Command::Open),
                Item(Command::OpenFolder),
                Separator,
                Item(Command::Save),
                Item(Command::SaveAs),
                Separator,
                Item(Command::CloseTab),
                Item(Command::Exit),
            ],
            Menu::Edit => &[
                Item(Command::Undo),
                Item(Command::Redo),
                Separator,
                Item(Command::Cut),
                Item(Command::Copy),
                Item(Command::Paste),
                Separator,
                Item(Command::SelectAll),
                Separator,
                Item(Command::FindReplace),
            ],
            Menu::View => &[
                Item(Command::ToggleSidebar),
                Separator,
                Item(Command::ZoomIn),
                Item(Command::ZoomOut),
                Item(Command::ZoomReset),
                Separator,
                Item(Command::NextTab),
                Item(Command::PreviousTab),
            ],
            Menu::Help => &[Item(Command::About)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_command_display_name() {
        assert_eq!(Command::Save.display_name(), "Save");
        assert_eq!(Command::FindReplace.display_name(), "Find and Replace");
    }

    #[test]
    fn test_ids_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_id(command.id()), Some(command));
        }
        assert_eq!(Command::from_id("frobnicate"), None);
    }

    #[test]
    fn test_every_command_is_in_a_menu() {
        let in_menus: HashSet<Command> = Menu::ALL
            .iter()
            .flat_map(|menu| menu.entries())
            .filter_map(|entry| match entry {
                MenuEntry::Item(command) => Some(*command),
                MenuEntry::Separator => None,
            })
            .collect();
        assert_eq!(in_menus.len(), Command::ALL.len());
    }
}
