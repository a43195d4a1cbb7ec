use iced::widget::{scrollable, text_editor};
use iced::{Point, Size, keyboard, window};
use textedit_core::{Command, Menu};

#[derive(Debug, Clone)]
pub enum Message {
    /// Menu item or shortcut
    Command(Command),

    // Top menu bar
    ToggleMenu(Menu),
    CloseMenu,

    // Editor
    EditorAction(text_editor::Action),
    EditorScrolled(scrollable::Viewport),

    // Tabs
    TabSelected(usize),
    CloseTab(usize),

    // File tree
    TreeRowClicked(usize),
    ShowTreeMenu(usize),
    HideTreeMenu,
    OpenTreeRow,
    DeleteTreeRow,

    // Mouse tracking
    MouseMoved(Point),

    // Find and replace
    FindChanged(String),
    ReplaceChanged(String),
    FindNext,
    ReplaceOne,
    ReplaceAll,
    CloseFind,

    // New folder
    FolderNameChanged(String),
    CreateFolderConfirm,
    CreateFolderCancel,

    // Help
    HideAbout,

    // Window
    KeyPressed(keyboard::Key, keyboard::Modifiers),
    Tick,
    WindowResized(Size),
    CloseRequested(window::Id),
}
