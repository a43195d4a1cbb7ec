use std::collections::HashMap;
use std::time::Duration;

use iced::{Point, Size, Subscription, Task, keyboard, window};
use textedit_core::{TabId, WindowController};

use crate::prompter::RfdPrompter;
use crate::theme::Palette;

pub mod messages;
pub mod types;
pub mod update;
pub mod view;

pub use messages::*;
pub use types::*;

/// Height of the menu bar, tab strip and status bar together.
pub const CHROME_HEIGHT: f32 = 32.0 + 36.0 + 28.0;

/// How often the zoom popup and the file watcher are checked.
const TICK: Duration = Duration::from_millis(100);

pub struct App {
    pub controller: WindowController<RfdPrompter>,
    pub views: HashMap<TabId, EditorView>,
    pub palette: Palette,
    pub sidebar_width: f32,
    pub window_height: f32,
    pub active_menu: Option<textedit_core::Menu>,
    pub tree_menu: Option<TreeMenu>,
    pub last_cursor_position: Point,
    pub find: FindBar,
    /// Name being typed in the New Folder dialog
    pub new_folder: Option<String>,
    pub about_visible: bool,
}

impl App {
    pub fn new(flags: Flags) -> (Self, Task<Message>) {
        let Flags {
            file,
            folder,
            config,
            theme,
        } = flags;

        let root = folder.unwrap_or_else(textedit_core::Config::default_root);
        let sidebar_width = config.ui.sidebar_width;
        let window_height = config.ui.window_height;
        let mut controller = WindowController::new(config, root, RfdPrompter::new());

        if let Some(file) = file {
            // Replace the blank startup tab with the requested file.
            if controller.open_path(&file).is_ok() {
                controller.close_tab(0);
            }
        }

        let mut app = Self {
            controller,
            views: HashMap::new(),
            palette: theme.palette(),
            sidebar_width,
            window_height,
            active_menu: None,
            tree_menu: None,
            last_cursor_position: Point::ORIGIN,
            find: FindBar::default(),
            new_folder: None,
            about_visible: false,
        };
        app.sync_views();

        tracing::info!(theme = %theme.name, "Window ready");
        (app, Task::none())
    }

    pub fn title(&self) -> String {
        self.controller.window_title()
    }

    /// The active tab's id.
    pub fn active_id(&self) -> Option<TabId> {
        self.controller.tabs().current().map(|entry| entry.id())
    }

    /// Brings widget state in line with the controller: new tabs get a
    /// widget, closed tabs lose theirs, programmatic edits are reloaded.
    pub fn sync_views(&mut self) {
        let tabs = self.controller.tabs();
        self.views
            .retain(|id, _| tabs.ordinal_of(*id).is_some());

        let mut fresh = Vec::new();
        for entry in tabs.iter() {
            match self.views.get_mut(&entry.id()) {
                Some(view) => {
                    view.sync(entry.viewport());
                }
                None => {
                    self.views.insert(entry.id(), EditorView::new(entry.viewport()));
                    fresh.push(entry.id());
                }
            }
        }

        let height = self.editor_height();
        for id in fresh {
            self.controller.set_scroll(id, 0.0, height);
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            keyboard::on_key_press(|key, modifiers| Some(Message::KeyPressed(key, modifiers))),
            iced::time::every(TICK).map(|_| Message::Tick),
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
            window::close_requests().map(Message::CloseRequested),
        ])
    }
}

pub fn run(flags: Flags) -> iced::Result {
    let size = Size::new(flags.config.ui.window_width, flags.config.ui.window_height);

    iced::application(App::title, App::update, App::view)
        .subscription(App::subscription)
        .window_size(size)
        .exit_on_close_request(false)
        .theme(|_| iced::Theme::Dark)
        .antialiasing(true)
        .run_with(move || App::new(flags))
}
