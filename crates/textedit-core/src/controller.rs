//! The main window controller.
//!
//! Owns every piece of window state and implements the commands. The GUI
//! forwards user input here and renders whatever state results; anything
//! that needs the widget layer (clipboard, selection, modals) is handed
//! back as a [`Dispatch::Widget`].
//!
//! ## Learning: Generic Collaborators
//!
//! `WindowController<P: Prompter>` is generic over its dialog provider.
//! The GUI plugs in native dialogs, tests plug in a scripted
//! [`HeadlessPrompter`](crate::HeadlessPrompter), and the compiler
//! monomorphizes each one with no dynamic dispatch.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use textedit_buffer::Position;

use crate::command::Command;
use crate::config::Config;
use crate::event::{EditorEvent, EventBus, ListenerId, TabEvent, TabListeners};
use crate::file_tree::{normalize_link_path, normalize_path, FileChange, FileTree, FileWatcher};
use crate::keymap::{KeyPress, Keymap};
use crate::prompt::{PromptError, Prompter, SaveChoice};
use crate::status::{self, StatusInfo};
use crate::tabs::{title_for, CloseOutcome, TabEntry, TabId, TabRegistry, MODIFIED_MARKER, UNTITLED};
use crate::viewport::ViewportOptions;
use crate::zoom::{Zoom, ZoomIndicator};
use crate::{CoreError, CoreResult};

/// Work a command leaves for the GUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    Cut,
    Copy,
    Paste,
    SelectAll,
    ShowFindReplace,
    AskFolderName,
    ShowAbout,
}

/// Result of [`WindowController::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Fully handled; just redraw
    Handled,
    /// The window should close now
    Exit,
    /// The GUI has to finish this one
    Widget(WidgetAction),
}

/// State and commands of the editor window.
pub struct WindowController<P: Prompter> {
    config: Config,
    tabs: TabRegistry,
    tree: FileTree,
    watcher: Option<FileWatcher>,
    keymap: Keymap,
    zoom: Zoom,
    indicator: ZoomIndicator,
    sidebar_visible: bool,
    bus: EventBus,
    listeners: TabListeners,
    prompter: P,
}

impl<P: Prompter> WindowController<P> {
    /// Opens the window state with one empty tab and the tree at `root`.
    pub fn new(config: Config, root: impl AsRef<Path>, prompter: P) -> Self {
        let tree = FileTree::new(root, config.files.show_hidden);
        let watcher = if config.files.watch_files {
            start_watcher(&tree)
        } else {
            None
        };

        let mut controller = Self {
            tabs: TabRegistry::new(ViewportOptions::from(&config)),
            tree,
            watcher,
            keymap: Keymap::from_config(&config),
            zoom: Zoom::new(config.editor.font_size, config.editor.min_font_size),
            indicator: ZoomIndicator::new(Duration::from_millis(config.ui.zoom_indicator_ms)),
            sidebar_visible: config.ui.sidebar_visible,
            bus: EventBus::new(),
            listeners: TabListeners::new(),
            prompter,
            config,
        };
        controller.new_file();
        controller
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn command_for(&self, press: &KeyPress) -> Option<Command> {
        self.keymap.lookup(press)
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    /// Text of the zoom popup while it is up.
    pub fn zoom_label(&self) -> Option<&str> {
        self.indicator.visible_label()
    }

    pub fn window_title(&self) -> String {
        status::window_title(self.tabs.current_path())
    }

    pub fn status(&self) -> StatusInfo {
        match self.tabs.current() {
            Some(entry) => StatusInfo::new(entry.viewport().cursor_position(), entry.path()),
            None => StatusInfo::default(),
        }
    }

    // ==================== Listeners ====================

    /// Registers a callback for events of one tab.
    ///
    /// The callback is dropped when the tab closes.
    pub fn on_tab_event<F>(&mut self, tab: TabId, callback: F) -> ListenerId
    where
        F: FnMut(&TabEvent) + 'static,
    {
        self.listeners.subscribe(tab, callback)
    }

    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        self.listeners.unsubscribe(listener)
    }

    // ==================== Dispatch ====================

    /// Runs a menu or shortcut command.
    ///
    /// Failures have already been shown to the user when this returns.
    pub fn execute(&mut self, command: Command, now: Instant) -> Dispatch {
        tracing::debug!(command = command.id(), "Executing command");

        // Results are dropped below: errors were reported where they happened.
        match command {
            Command::NewFile => {
                self.new_file();
            }
            Command::NewFolder => return Dispatch::Widget(WidgetAction::AskFolderName),
            Command::Open => {
                let _ = self.open_file();
            }
            Command::OpenFolder => {
                self.open_folder();
            }
            Command::Save => {
                let _ = self.save();
            }
            Command::SaveAs => {
                let _ = self.save_as();
            }
            Command::CloseTab => {
                self.close_current_tab();
            }
            Command::Exit => {
                if self.request_exit() {
                    return Dispatch::Exit;
                }
            }
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Cut => return Dispatch::Widget(WidgetAction::Cut),
            Command::Copy => return Dispatch::Widget(WidgetAction::Copy),
            Command::Paste => return Dispatch::Widget(WidgetAction::Paste),
            Command::SelectAll => return Dispatch::Widget(WidgetAction::SelectAll),
            Command::FindReplace => return Dispatch::Widget(WidgetAction::ShowFindReplace),
            Command::ToggleSidebar => self.toggle_sidebar(),
            Command::ZoomIn => self.zoom_in(now),
            Command::ZoomOut => self.zoom_out(now),
            Command::ZoomReset => self.zoom_reset(now),
            Command::NextTab => self.next_tab(),
            Command::PreviousTab => self.previous_tab(),
            Command::About => return Dispatch::Widget(WidgetAction::ShowAbout),
        }
        Dispatch::Handled
    }

    // ==================== Files ====================

    /// Opens an empty "Untitled" tab.
    pub fn new_file(&mut self) -> TabId {
        let (id, _) = self.tabs.add_tab(None, "", UNTITLED);
        self.bus.emit(EditorEvent::TabOpened(id));
        id
    }

    /// Asks for a file and opens it.
    pub fn open_file(&mut self) -> CoreResult<Option<TabId>> {
        let start = self.dialog_dir();
        match self.prompter.pick_open_file(&start) {
            Some(path) => self.open_path(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Opens `path` in a new tab, or focuses the tab already showing it.
    pub fn open_path(&mut self, path: &Path) -> CoreResult<TabId> {
        let path = normalize_path(path);

        if let Some(ordinal) = self.tabs.position_of_path(&path) {
            self.activate(ordinal);
            if let Some(entry) = self.tabs.get(ordinal) {
                return Ok(entry.id());
            }
        }

        let content = std::fs::read_to_string(&path).map_err(|source| CoreError::FileNotReadable {
            path: path.clone(),
            source: source.into(),
        });
        let content = self.reported(content)?;

        let title = title_for(&path);
        let (id, _) = self.tabs.add_tab(Some(path.clone()), &content, &title);
        tracing::info!(path = %path.display(), "Opened file");
        self.bus.emit(EditorEvent::TabOpened(id));
        Ok(id)
    }

    /// Asks for a folder and shows it in the tree.
    pub fn open_folder(&mut self) -> bool {
        let start = self.tree.root().to_path_buf();
        match self.prompter.pick_folder(&start) {
            Some(folder) => {
                self.set_root(&folder);
                true
            }
            None => false,
        }
    }

    /// Re-roots the file tree and its watcher.
    pub fn set_root(&mut self, folder: &Path) {
        self.tree.set_root(folder);
        if self.config.files.watch_files {
            self.watcher = start_watcher(&self.tree);
        }
        tracing::info!(root = %self.tree.root().display(), "Opened folder");
        self.bus.emit(EditorEvent::RootChanged(self.tree.root().to_path_buf()));
    }

    /// Activation of a tree row: files open, folders expand or collapse.
    pub fn open_from_tree(&mut self, row: usize) -> CoreResult<()> {
        let Some(path) = self.tree.path_at(row).map(Path::to_path_buf) else {
            return Ok(());
        };
        if self.tree.is_dir(row) {
            self.tree.toggle(&path);
            Ok(())
        } else {
            self.open_path(&path).map(|_| ())
        }
    }

    /// Creates `name` directly under the tree root.
    pub fn create_folder(&mut self, name: &str) -> CoreResult<PathBuf> {
        let result = self.create_folder_inner(name.trim());
        self.reported(result)
    }

    fn create_folder_inner(&mut self, name: &str) -> CoreResult<PathBuf> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\']);
        if invalid {
            return Err(CoreError::InvalidName(name.to_string()));
        }

        let target = self.tree.root().join(name);
        if target.exists() {
            return Err(CoreError::FolderAlreadyExists(name.to_string()));
        }
        std::fs::create_dir(&target).map_err(|source| CoreError::FolderNotCreated {
            path: target.clone(),
            source,
        })?;

        tracing::info!(path = %target.display(), "Created folder");
        self.refresh_tree();
        Ok(target)
    }

    // ==================== Saving ====================

    /// Saves the active tab, asking for a path when it has none.
    ///
    /// `Ok(false)` means the user cancelled the file picker.
    pub fn save(&mut self) -> CoreResult<bool> {
        match self.tabs.active() {
            Some(ordinal) => self.save_tab(ordinal, false),
            None => Ok(false),
        }
    }

    /// Saves the active tab under a newly picked path.
    pub fn save_as(&mut self) -> CoreResult<bool> {
        match self.tabs.active() {
            Some(ordinal) => self.save_tab(ordinal, true),
            None => Ok(false),
        }
    }

    fn save_tab(&mut self, ordinal: usize, pick_path: bool) -> CoreResult<bool> {
        let start = self.dialog_dir();
        let Some(entry) = self.tabs.get_mut(ordinal) else {
            return Ok(false);
        };
        let id = entry.id();
        let was_modified = entry.is_modified();

        let result = persist(entry, &mut self.prompter, &start, pick_path);
        match self.reported(result)? {
            Some(path) => {
                self.after_save(id, path, was_modified);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn after_save(&mut self, id: TabId, path: PathBuf, was_modified: bool) {
        self.listeners.notify(id, &TabEvent::Saved(path.clone()));
        if was_modified {
            self.listeners.notify(id, &TabEvent::Modified(false));
        }
        let in_tree = path.starts_with(self.tree.root());
        self.bus.emit(EditorEvent::TabSaved { id, path });
        if in_tree {
            self.refresh_tree();
        }
    }

    // ==================== Closing ====================

    /// Closes the tab at `ordinal`, asking first if it has unsaved changes.
    ///
    /// Returns true if the tab is gone. A fresh "Untitled" tab replaces the
    /// last one.
    pub fn close_tab(&mut self, ordinal: usize) -> bool {
        let start = self.dialog_dir();
        let mut saved = None;

        let Self {
            tabs, prompter, ..
        } = self;
        let outcome = tabs.close_tab(ordinal, |entry| {
            confirm_close(entry, prompter, &start, &mut saved)
        });

        if let Some((id, path)) = saved {
            self.after_save(id, path, true);
        }
        match outcome {
            CloseOutcome::Closed(entry) => {
                self.after_close(entry);
                self.ensure_tab();
                true
            }
            CloseOutcome::Cancelled => {
                tracing::debug!(ordinal, "Close cancelled");
                false
            }
            CloseOutcome::NotFound => false,
        }
    }

    pub fn close_current_tab(&mut self) -> bool {
        match self.tabs.active() {
            Some(ordinal) => self.close_tab(ordinal),
            None => false,
        }
    }

    /// Asks once about every modified tab before the window closes.
    ///
    /// Returns true when the window may close. Save writes every modified
    /// tab and any failure or cancelled picker keeps the window open.
    pub fn request_exit(&mut self) -> bool {
        let modified: Vec<TabId> = self
            .tabs
            .iter()
            .filter(|entry| entry.is_modified())
            .map(TabEntry::id)
            .collect();

        if !modified.is_empty() {
            let message = format!(
                "You have {} file(s) with unsaved changes.\nDo you want to save them before exiting?",
                modified.len()
            );
            match self.prompter.ask_save("Unsaved Changes", &message) {
                Ok(SaveChoice::Save) => {
                    for id in modified {
                        let Some(ordinal) = self.tabs.ordinal_of(id) else {
                            continue;
                        };
                        self.activate(ordinal);
                        if !matches!(self.save_tab(ordinal, false), Ok(true)) {
                            tracing::info!("Exit aborted, a file was not saved");
                            return false;
                        }
                    }
                }
                Ok(SaveChoice::Discard) => {}
                Ok(SaveChoice::Cancel) => return false,
                Err(PromptError::Unavailable) => {
                    tracing::warn!("No dialog available, closing without saving");
                }
            }
        }

        tracing::info!("Closing window");
        self.bus.emit(EditorEvent::Quit);
        true
    }

    fn after_close(&mut self, entry: TabEntry) {
        let id = entry.id();
        self.listeners.remove_tab(id);
        self.bus.emit(EditorEvent::TabClosed(id));
        tracing::info!(%id, title = entry.base_title(), "Closed tab");
    }

    /// Keeps at least one tab open.
    fn ensure_tab(&mut self) {
        if self.tabs.is_empty() {
            self.new_file();
        }
    }

    // ==================== Deleting ====================

    /// Deletes the file or folder behind a tree row.
    pub fn delete_row(&mut self, row: usize) -> CoreResult<bool> {
        match self.tree.path_at(row).map(Path::to_path_buf) {
            Some(path) => self.delete_path(&path),
            None => Ok(false),
        }
    }

    /// Deletes `path` after a Yes/No confirmation.
    ///
    /// Tabs showing the path, or anything under it, close without asking.
    pub fn delete_path(&mut self, path: &Path) -> CoreResult<bool> {
        // A link is removed itself; its target is never touched.
        let is_link = std::fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink());
        let is_dir = !is_link && path.is_dir();
        let message = format!(
            "Are you sure you want to delete this {}?\n\n{}",
            if is_dir { "folder" } else { "file" },
            title_for(path)
        );
        match self.prompter.ask_yes_no("Confirm Delete", &message) {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(PromptError::Unavailable) => {
                tracing::warn!("No dialog available, not deleting");
                return Ok(false);
            }
        }

        let target = if is_link {
            normalize_link_path(path)
        } else {
            normalize_path(path)
        };
        let removed = if is_dir {
            std::fs::remove_dir_all(&target)
        } else {
            std::fs::remove_file(&target)
        };
        let removed = removed.map_err(|source| CoreError::DeleteFailed {
            path: target.clone(),
            source,
        });
        self.reported(removed)?;
        tracing::info!(path = %target.display(), "Deleted");

        self.close_tabs_under(&target, true);
        self.ensure_tab();
        self.refresh_tree();
        Ok(true)
    }

    /// Closes every tab at or below `target` without asking.
    ///
    /// With `include_modified` false, tabs with unsaved changes stay open.
    fn close_tabs_under(&mut self, target: &Path, include_modified: bool) {
        let doomed: Vec<TabId> = self
            .tabs
            .iter()
            .filter(|entry| entry.path().is_some_and(|p| p.starts_with(target)))
            .filter(|entry| include_modified || !entry.is_modified())
            .map(TabEntry::id)
            .collect();

        for id in doomed {
            let Some(ordinal) = self.tabs.ordinal_of(id) else {
                continue;
            };
            if let CloseOutcome::Closed(entry) = self.tabs.close_tab(ordinal, |_| true) {
                self.after_close(entry);
            }
        }
    }

    fn refresh_tree(&mut self) {
        self.tree.refresh();
        self.bus.emit(EditorEvent::TreeRefreshed);
    }

    /// Applies changes the watcher saw on disk.
    ///
    /// Returns true if anything visible changed.
    pub fn poll_watcher(&mut self) -> bool {
        let changes = match self.watcher.as_mut() {
            Some(watcher) => watcher.poll(),
            None => return false,
        };
        if changes.is_empty() {
            return false;
        }
        for change in &changes {
            self.handle_file_change(change);
        }
        self.refresh_tree();
        true
    }

    /// A file removed behind our back closes its tab unless it has edits.
    pub fn handle_file_change(&mut self, change: &FileChange) {
        if let FileChange::Deleted(path) = change {
            let path = normalize_path(path);
            tracing::debug!(path = %path.display(), "File deleted on disk");
            self.close_tabs_under(&path, false);
            self.ensure_tab();
            self.bus.emit(EditorEvent::FileDeletedOnDisk(path));
        }
    }

    // ==================== Tabs ====================

    pub fn activate(&mut self, ordinal: usize) {
        let before = self.tabs.active();
        self.tabs.activate(ordinal);
        self.announce_activation(before);
    }

    pub fn next_tab(&mut self) {
        let before = self.tabs.active();
        self.tabs.next();
        self.announce_activation(before);
    }

    pub fn previous_tab(&mut self) {
        let before = self.tabs.active();
        self.tabs.previous();
        self.announce_activation(before);
    }

    fn announce_activation(&self, before: Option<usize>) {
        if self.tabs.active() != before {
            if let Some(entry) = self.tabs.current() {
                self.bus.emit(EditorEvent::TabActivated(entry.id()));
            }
        }
    }

    // ==================== Editing ====================

    /// Takes the text a tab's widget now shows.
    pub fn sync_editor(&mut self, id: TabId, text: &str) -> CoreResult<()> {
        let Some(ordinal) = self.tabs.ordinal_of(id) else {
            return Ok(());
        };
        if let Some(entry) = self.tabs.get_mut(ordinal) {
            entry.viewport_mut().sync_text(text)?;
        }
        self.refresh_modified(ordinal);
        Ok(())
    }

    /// Takes the caret a tab's widget now shows (0-based).
    pub fn sync_cursor(&mut self, id: TabId, position: Position) {
        let Some(entry) = self
            .tabs
            .ordinal_of(id)
            .and_then(|ordinal| self.tabs.get_mut(ordinal))
        else {
            return;
        };
        let before = entry.viewport().cursor_position();
        entry.viewport_mut().sync_cursor(position);
        let (line, column) = entry.viewport().cursor_position();
        if (line, column) != before {
            self.listeners.notify(id, &TabEvent::CursorMoved { line, column });
        }
    }

    /// Records where a tab's view is scrolled to.
    pub fn set_scroll(&mut self, id: TabId, top: f32, height: f32) {
        if let Some(entry) = self
            .tabs
            .ordinal_of(id)
            .and_then(|ordinal| self.tabs.get_mut(ordinal))
        {
            entry.viewport_mut().set_scroll(top, height);
        }
    }

    /// New visible height for every tab, after a window resize.
    pub fn set_view_height(&mut self, height: f32) {
        for entry in self.tabs.iter_mut() {
            entry.viewport_mut().set_view_height(height);
        }
    }

    pub fn undo(&mut self) -> bool {
        self.edit_current(|viewport| viewport.undo())
    }

    pub fn redo(&mut self) -> bool {
        self.edit_current(|viewport| viewport.redo())
    }

    /// Selects the next case-insensitive match in the active tab.
    pub fn find_next(&mut self, needle: &str) -> CoreResult<bool> {
        if needle.is_empty() {
            return Ok(false);
        }
        let found = match self.tabs.current_editor_mut() {
            Some(viewport) => viewport.find_next(needle),
            None => return Ok(false),
        };
        self.reported(found).map(|range| range.is_some())
    }

    /// Replaces the selected match and selects the next one.
    pub fn replace(&mut self, needle: &str, replacement: &str) -> CoreResult<bool> {
        if needle.is_empty() {
            return Ok(false);
        }
        let result = match self.tabs.current_editor_mut() {
            Some(viewport) => viewport.replace(needle, replacement),
            None => return Ok(false),
        };
        let found = self.reported(result)?;
        self.refresh_active_modified();
        Ok(found.is_some())
    }

    /// Replaces every match in the active tab. Returns the count.
    pub fn replace_all(&mut self, needle: &str, replacement: &str) -> CoreResult<usize> {
        if needle.is_empty() {
            return Ok(0);
        }
        let result = match self.tabs.current_editor_mut() {
            Some(viewport) => viewport.replace_all(needle, replacement),
            None => return Ok(0),
        };
        let count = self.reported(result)?;
        tracing::debug!(count, "Replaced all matches");
        self.refresh_active_modified();
        Ok(count)
    }

    fn edit_current<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut crate::viewport::EditorViewport) -> bool,
    {
        let changed = self.tabs.current_editor_mut().is_some_and(edit);
        if changed {
            self.refresh_active_modified();
        }
        changed
    }

    fn refresh_active_modified(&mut self) {
        if let Some(ordinal) = self.tabs.active() {
            self.refresh_modified(ordinal);
        }
    }

    /// Brings the title marker in line with the buffer and tells listeners
    /// when the modified flag flipped.
    fn refresh_modified(&mut self, ordinal: usize) {
        let Some(entry) = self.tabs.get_mut(ordinal) else {
            return;
        };
        let modified = entry.is_modified();
        if entry.title().ends_with(MODIFIED_MARKER) != modified {
            entry.refresh_title(modified);
            let id = entry.id();
            self.listeners.notify(id, &TabEvent::Modified(modified));
        }
    }

    // ==================== View ====================

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
        self.bus.emit(EditorEvent::SidebarToggled(self.sidebar_visible));
    }

    pub fn zoom_in(&mut self, now: Instant) {
        self.apply_zoom(|zoom, size| zoom.zoom_in(size), now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.apply_zoom(|zoom, size| zoom.zoom_out(size), now);
    }

    pub fn zoom_reset(&mut self, now: Instant) {
        self.apply_zoom(|zoom, _| zoom.reset(), now);
    }

    fn apply_zoom<F>(&mut self, step: F, now: Instant)
    where
        F: FnOnce(&Zoom, f32) -> f32,
    {
        let zoom = self.zoom;
        let Some(viewport) = self.tabs.current_editor_mut() else {
            return;
        };
        let size = step(&zoom, viewport.font_metrics().point_size);
        viewport.set_font_size(size);
        self.indicator.show(zoom.percent(size), now);
        self.bus.emit(EditorEvent::FontSizeChanged(size));
    }

    /// Periodic housekeeping: hides the zoom popup and applies watcher
    /// changes. Returns true if a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let hidden = self.indicator.tick(now);
        let changed = self.poll_watcher();
        hidden || changed
    }

    // ==================== Internals ====================

    /// Where file pickers start: the active file's folder or the tree root.
    fn dialog_dir(&self) -> PathBuf {
        self.tabs
            .current_path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.tree.root().to_path_buf())
    }

    /// Shows a failure to the user and hands it back.
    fn reported<T>(&mut self, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(err) = &result {
            tracing::error!(%err, "Command failed");
            self.prompter.show_error(err);
        }
        result
    }
}

impl<P: Prompter> std::fmt::Debug for WindowController<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("tabs", &self.tabs.len())
            .field("root", &self.tree.root())
            .field("sidebar_visible", &self.sidebar_visible)
            .finish_non_exhaustive()
    }
}

fn start_watcher(tree: &FileTree) -> Option<FileWatcher> {
    match tree.watch() {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(%err, "File watching disabled");
            None
        }
    }
}

/// Message of the save-changes prompt for one document.
pub fn close_message(title: &str) -> String {
    format!("The document '{title}' has been modified.\nDo you want to save your changes?")
}

/// Save / Discard / Cancel for one modified tab. True means close it.
fn confirm_close<P: Prompter>(
    entry: &mut TabEntry,
    prompter: &mut P,
    start: &Path,
    saved: &mut Option<(TabId, PathBuf)>,
) -> bool {
    let message = close_message(entry.base_title());
    match prompter.ask_save("Unsaved Changes", &message) {
        Ok(SaveChoice::Save) => match persist(entry, prompter, start, false) {
            Ok(Some(path)) => {
                *saved = Some((entry.id(), path));
                true
            }
            Ok(None) => false,
            Err(err) => {
                tracing::error!(%err, "Save before close failed");
                prompter.show_error(&err);
                false
            }
        },
        Ok(SaveChoice::Discard) => true,
        Ok(SaveChoice::Cancel) => false,
        Err(PromptError::Unavailable) => {
            tracing::warn!("No dialog available, keeping tab open");
            false
        }
    }
}

/// Writes a tab to its file, picking a path first when it has none or when
/// `pick_path` is set. `Ok(None)` means the picker was cancelled.
fn persist<P: Prompter>(
    entry: &mut TabEntry,
    prompter: &mut P,
    start: &Path,
    pick_path: bool,
) -> CoreResult<Option<PathBuf>> {
    let target = match entry.path() {
        Some(path) if !pick_path => path.to_path_buf(),
        _ => {
            let suggested = entry.base_title().to_string();
            match prompter.pick_save_path(start, &suggested) {
                Some(path) => path,
                None => return Ok(None),
            }
        }
    };

    entry
        .viewport_mut()
        .save_to(&target)
        .map_err(|source| CoreError::FileNotWritable {
            path: target.clone(),
            source,
        })?;

    let target = normalize_path(&target);
    entry.set_path(target.clone());
    entry.refresh_title(false);
    tracing::info!(path = %target.display(), "Saved file");
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, HeadlessPrompter};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    fn config() -> Config {
        let mut config = Config::default();
        config.files.watch_files = false;
        config
    }

    fn controller(answers: Vec<Answer>) -> (WindowController<HeadlessPrompter>, TempDir) {
        let dir = tempdir().unwrap();
        let controller =
            WindowController::new(config(), dir.path(), HeadlessPrompter::with_answers(answers));
        (controller, dir)
    }

    fn type_into_current(controller: &mut WindowController<HeadlessPrompter>, text: &str) {
        let id = controller.tabs().current().unwrap().id();
        controller.sync_editor(id, text).unwrap();
    }

    fn titles(controller: &WindowController<HeadlessPrompter>) -> Vec<String> {
        controller
            .tabs()
            .iter()
            .map(|entry| entry.title().to_string())
            .collect()
    }

    #[test]
    fn test_starts_with_one_untitled_tab() {
        let (controller, _dir) = controller(vec![]);
        assert_eq!(titles(&controller), vec!["Untitled"]);
        assert_eq!(controller.window_title(), "TextEdit - Untitled");
        assert_eq!(controller.status().position_label(), "Ln 1, Col 1");
    }

    #[test]
    fn test_typing_marks_modified_once() {
        let (mut controller, _dir) = controller(vec![]);
        type_into_current(&mut controller, "a");
        type_into_current(&mut controller, "ab");
        assert_eq!(titles(&controller), vec!["Untitled *"]);

        while controller.undo() {}
        assert_eq!(titles(&controller), vec!["Untitled"]);
        assert!(controller.redo());
        assert_eq!(titles(&controller), vec!["Untitled *"]);
    }

    #[test]
    fn test_cancel_keeps_everything() {
        let (mut controller, _dir) = controller(vec![Answer::Save(SaveChoice::Cancel)]);
        controller.new_file();
        controller.activate(0);
        type_into_current(&mut controller, "draft");

        assert!(!controller.close_tab(0));
        assert_eq!(controller.tabs().len(), 2);
        assert_eq!(controller.tabs().active(), Some(0));
        assert_eq!(controller.tabs().current_editor().unwrap().content(), "draft");
    }

    #[test]
    fn test_discard_closes_without_writing() {
        let (mut controller, dir) = controller(vec![Answer::Save(SaveChoice::Discard)]);
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "on disk").unwrap();
        controller.open_path(&path).unwrap();
        type_into_current(&mut controller, "changed");

        let ordinal = controller.tabs().active().unwrap();
        assert!(controller.close_tab(ordinal));
        assert_eq!(controller.tabs().len(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "on disk");
        assert_eq!(
            controller.prompter().prompts,
            vec!["The document 'a.txt' has been modified.\nDo you want to save your changes?"]
        );
    }

    #[test]
    fn test_save_on_close_writes_then_closes() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("kept.txt");
        let prompter = HeadlessPrompter::with_answers([
            Answer::Save(SaveChoice::Save),
            Answer::Path(Some(target.clone())),
        ]);
        let mut controller = WindowController::new(config(), dir.path(), prompter);

        type_into_current(&mut controller, "keep me");
        assert!(controller.close_current_tab());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
        assert_eq!(titles(&controller), vec!["Untitled"]);
        assert_eq!(controller.tree().rows()[0].name, "kept.txt");
    }

    #[test]
    fn test_save_picker_cancel_aborts_close() {
        let (mut controller, _dir) =
            controller(vec![Answer::Save(SaveChoice::Save), Answer::Path(None)]);
        type_into_current(&mut controller, "x");

        assert!(!controller.close_current_tab());
        assert_eq!(titles(&controller), vec!["Untitled *"]);
    }

    #[test]
    fn test_unavailable_prompt_keeps_tab() {
        let (mut controller, _dir) = controller(vec![]);
        type_into_current(&mut controller, "x");
        assert!(!controller.close_current_tab());
        assert_eq!(controller.tabs().len(), 1);
    }

    #[test]
    fn test_save_failure_keeps_modified() {
        let (mut controller, _dir) = controller(vec![Answer::Path(Some(PathBuf::from(
            "/nonexistent-dir/for/sure/a.txt",
        )))]);
        type_into_current(&mut controller, "x");

        assert!(controller.save().is_err());
        assert!(controller.tabs().current().unwrap().is_modified());
        assert_eq!(controller.prompter().errors.len(), 1);
        assert!(controller.prompter().errors[0].starts_with("Could not save"));
    }

    #[test]
    fn test_open_focuses_existing_tab() {
        let (mut controller, dir) = controller(vec![]);
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let first = controller.open_path(&path).unwrap();
        controller.new_file();
        let again = controller.open_path(&dir.path().join(".").join("a.txt")).unwrap();

        assert_eq!(first, again);
        assert_eq!(controller.tabs().len(), 3);
        assert_eq!(controller.tabs().current().unwrap().id(), first);
    }

    #[test]
    fn test_open_missing_file_reports_error() {
        let (mut controller, dir) = controller(vec![]);
        let result = controller.open_path(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(CoreError::FileNotReadable { .. })));
        assert_eq!(controller.prompter().errors.len(), 1);
        assert_eq!(controller.tabs().len(), 1);
    }

    #[test]
    fn test_create_folder() {
        let (mut controller, dir) = controller(vec![]);
        let created = controller.create_folder("notes").unwrap();
        assert!(created.is_dir());
        assert_eq!(controller.tree().rows()[0].name, "notes");

        let again = controller.create_folder("notes");
        assert!(matches!(again, Err(CoreError::FolderAlreadyExists(_))));
        assert_eq!(controller.prompter().errors, vec!["Folder 'notes' already exists."]);

        assert!(matches!(
            controller.create_folder("a/b"),
            Err(CoreError::InvalidName(_))
        ));
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn test_delete_closes_tab_without_prompting() {
        let (mut controller, dir) = controller(vec![Answer::YesNo(true)]);
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "").unwrap();
        controller.open_path(&path).unwrap();
        type_into_current(&mut controller, "unsaved");
        controller.close_tab(0);
        assert_eq!(controller.tabs().len(), 1);

        assert!(controller.delete_path(&path).unwrap());
        assert!(!path.exists());
        assert_eq!(titles(&controller), vec!["Untitled"]);
        assert_eq!(
            controller.prompter().prompts,
            vec!["Are you sure you want to delete this file?\n\na.txt"]
        );
        assert!(controller.tree().rows().is_empty());
    }

    #[test]
    fn test_delete_folder_closes_nested_tabs() {
        let (mut controller, dir) = controller(vec![Answer::YesNo(true)]);
        let folder = dir.path().join("src");
        std::fs::create_dir(&folder).unwrap();
        std::fs::write(folder.join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("keep.txt"), "k").unwrap();

        controller.open_path(&folder.join("a.txt")).unwrap();
        controller.open_path(&dir.path().join("keep.txt")).unwrap();
        assert_eq!(controller.tabs().len(), 3);

        assert!(controller.delete_path(&folder).unwrap());
        assert_eq!(titles(&controller), vec!["Untitled", "keep.txt"]);
        assert_eq!(controller.tabs().current().unwrap().title(), "keep.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_symlink_removes_only_the_link() {
        let (mut controller, dir) = controller(vec![Answer::YesNo(true), Answer::YesNo(true)]);
        let outside = tempdir().unwrap();
        let target_dir = outside.path().join("shared");
        std::fs::create_dir(&target_dir).unwrap();
        std::fs::write(target_dir.join("precious.txt"), "keep").unwrap();
        let target_file = outside.path().join("notes.txt");
        std::fs::write(&target_file, "keep").unwrap();

        let dir_link = dir.path().join("shared");
        let file_link = dir.path().join("notes.txt");
        std::os::unix::fs::symlink(&target_dir, &dir_link).unwrap();
        std::os::unix::fs::symlink(&target_file, &file_link).unwrap();
        controller.open_path(&target_file).unwrap();

        assert!(controller.delete_path(&dir_link).unwrap());
        assert!(controller.delete_path(&file_link).unwrap());

        assert!(std::fs::symlink_metadata(&dir_link).is_err());
        assert!(std::fs::symlink_metadata(&file_link).is_err());
        assert!(target_dir.join("precious.txt").exists());
        assert!(target_file.exists());
        assert_eq!(
            controller.prompter().prompts[0],
            "Are you sure you want to delete this file?\n\nshared"
        );
        assert_eq!(titles(&controller), vec!["Untitled", "notes.txt"]);
    }

    #[test]
    fn test_delete_declined_or_unavailable() {
        let (mut controller, dir) = controller(vec![Answer::YesNo(false)]);
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "").unwrap();

        assert!(!controller.delete_path(&path).unwrap());
        assert!(!controller.delete_path(&path).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_watcher_deletion_keeps_modified_tabs() {
        let (mut controller, dir) = controller(vec![]);
        let clean = dir.path().join("clean.txt");
        let dirty = dir.path().join("dirty.txt");
        std::fs::write(&clean, "").unwrap();
        std::fs::write(&dirty, "").unwrap();
        controller.open_path(&clean).unwrap();
        controller.open_path(&dirty).unwrap();
        type_into_current(&mut controller, "edits");

        let clean = normalize_path(&clean);
        let dirty = normalize_path(&dirty);
        std::fs::remove_file(&clean).unwrap();
        std::fs::remove_file(&dirty).unwrap();
        controller.handle_file_change(&FileChange::Deleted(clean));
        controller.handle_file_change(&FileChange::Deleted(dirty));

        assert_eq!(titles(&controller), vec!["Untitled", "dirty.txt *"]);
    }

    #[test]
    fn test_exit_paths() {
        let (mut controller, _dir) = controller(vec![
            Answer::Save(SaveChoice::Cancel),
            Answer::Save(SaveChoice::Discard),
        ]);
        // Nothing modified: no prompt at all.
        assert!(controller.request_exit());
        assert!(controller.prompter().prompts.is_empty());

        type_into_current(&mut controller, "x");
        controller.new_file();
        type_into_current(&mut controller, "y");

        assert!(!controller.request_exit());
        assert!(controller.request_exit());
        assert_eq!(
            controller.prompter().prompts[0],
            "You have 2 file(s) with unsaved changes.\nDo you want to save them before exiting?"
        );
    }

    #[test]
    fn test_exit_without_dialog_is_accepted() {
        let (mut controller, _dir) = controller(vec![]);
        type_into_current(&mut controller, "x");
        assert!(controller.request_exit());
    }

    #[test]
    fn test_exit_save_writes_every_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "").unwrap();
        let prompter = HeadlessPrompter::with_answers([
            Answer::Save(SaveChoice::Save),
            Answer::Path(Some(b.clone())),
        ]);
        let mut controller = WindowController::new(config(), dir.path(), prompter);

        type_into_current(&mut controller, "untitled text");
        controller.open_path(&a).unwrap();
        type_into_current(&mut controller, "a text");

        assert!(controller.request_exit());
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "a text");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "untitled text");
    }

    #[test]
    fn test_execute_routes_widget_commands() {
        let (mut controller, _dir) = controller(vec![]);
        let now = Instant::now();
        assert_eq!(
            controller.execute(Command::Copy, now),
            Dispatch::Widget(WidgetAction::Copy)
        );
        assert_eq!(
            controller.execute(Command::NewFolder, now),
            Dispatch::Widget(WidgetAction::AskFolderName)
        );
        assert_eq!(controller.execute(Command::NewFile, now), Dispatch::Handled);
        assert_eq!(controller.tabs().len(), 2);
        assert_eq!(controller.execute(Command::Exit, now), Dispatch::Exit);
    }

    #[test]
    fn test_zoom_shows_indicator() {
        let (mut controller, _dir) = controller(vec![]);
        let start = Instant::now();

        controller.execute(Command::ZoomIn, start);
        assert_eq!(controller.zoom_label(), Some("109%"));
        let size = controller.tabs().current_editor().unwrap().font_metrics().point_size;
        assert_eq!(size, 12.0);

        assert!(!controller.tick(start + Duration::from_millis(500)));
        controller.execute(Command::ZoomReset, start + Duration::from_millis(500));
        assert_eq!(controller.zoom_label(), Some("100%"));
        assert!(!controller.tick(start + Duration::from_millis(1200)));
        assert!(controller.tick(start + Duration::from_millis(1500)));
        assert_eq!(controller.zoom_label(), None);
    }

    #[test]
    fn test_find_and_replace() {
        let (mut controller, _dir) = controller(vec![]);
        type_into_current(&mut controller, "Foo foo FOO");

        assert!(controller.find_next("foo").unwrap());
        assert!(controller.replace("foo", "bar").unwrap());
        assert_eq!(
            controller.tabs().current_editor().unwrap().content(),
            "bar foo FOO"
        );
        assert_eq!(controller.replace_all("FOO", "baz").unwrap(), 2);
        assert_eq!(
            controller.tabs().current_editor().unwrap().content(),
            "bar baz baz"
        );
        assert!(!controller.find_next("").unwrap());
    }

    #[test]
    fn test_tab_listeners_follow_tab_lifetime() {
        let (mut controller, _dir) = controller(vec![Answer::Save(SaveChoice::Discard)]);
        let id = controller.tabs().current().unwrap().id();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        controller.on_tab_event(id, move |event| sink.borrow_mut().push(event.clone()));

        controller.sync_editor(id, "x").unwrap();
        controller.sync_cursor(id, Position::new(0, 1));
        controller.close_current_tab();
        controller.sync_editor(id, "ignored").unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                TabEvent::Modified(true),
                TabEvent::CursorMoved { line: 1, column: 2 },
                TabEvent::Closing,
            ]
        );
    }

    #[test]
    fn test_open_from_tree_toggles_folders() {
        let (mut controller, dir) = controller(vec![]);
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/readme.md"), "# hi").unwrap();
        controller.set_root(dir.path());

        controller.open_from_tree(0).unwrap();
        assert_eq!(controller.tree().rows().len(), 2);
        controller.open_from_tree(1).unwrap();
        assert_eq!(controller.tabs().current().unwrap().title(), "readme.md");
        assert_eq!(controller.status().file_type, "Markdown");
    }
}
