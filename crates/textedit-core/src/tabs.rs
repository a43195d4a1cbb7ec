//! Open tabs and the active tab.
//!
//! ## Learning: Ownership Instead of Handles
//!
//! The registry owns every [`EditorViewport`] outright. Callers borrow a
//! viewport through the registry for as long as they need it, so a closed
//! tab can never be reached through a stale pointer; the next lookup
//! simply returns `None`.

use std::fmt;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::viewport::{EditorViewport, ViewportOptions};

/// Suffix shown after the title of a tab with unsaved changes.
pub const MODIFIED_MARKER: &str = " *";

/// Title of a tab that has no file yet.
pub const UNTITLED: &str = "Untitled";

/// Stable identifier of an open tab.
///
/// Ordinals shift when tabs close; ids don't, which makes them safe keys
/// for anything that outlives a single command (listeners, widget state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open document.
#[derive(Debug)]
pub struct TabEntry {
    id: TabId,
    viewport: EditorViewport,
    path: Option<PathBuf>,
    title: String,
}

impl TabEntry {
    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn viewport(&self) -> &EditorViewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut EditorViewport {
        &mut self.viewport
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Display title, including the marker when modified.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title without the modified marker.
    pub fn base_title(&self) -> &str {
        self.title
            .strip_suffix(MODIFIED_MARKER)
            .unwrap_or(&self.title)
    }

    pub fn is_modified(&self) -> bool {
        self.viewport.is_modified()
    }

    /// Attaches a file and retitles the tab after it.
    pub fn set_path(&mut self, path: PathBuf) {
        let title = title_for(&path);
        self.path = Some(path);
        self.title = title;
        self.refresh_title(self.viewport.is_modified());
    }

    /// Adds or removes the modified marker; never doubles it.
    pub fn refresh_title(&mut self, modified: bool) {
        let has_marker = self.title.ends_with(MODIFIED_MARKER);
        if modified && !has_marker {
            self.title.push_str(MODIFIED_MARKER);
        } else if !modified && has_marker {
            self.title.truncate(self.title.len() - MODIFIED_MARKER.len());
        }
    }
}

/// Result of [`TabRegistry::close_tab`].
#[derive(Debug)]
pub enum CloseOutcome {
    /// The tab was removed; ownership comes back to the caller.
    Closed(TabEntry),
    /// The guard refused; nothing changed.
    Cancelled,
    /// No tab at that ordinal.
    NotFound,
}

impl CloseOutcome {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

/// Ordered open tabs plus the active one.
///
/// Ordinals are positions in the sequence and stay dense: closing a tab
/// shifts every later tab down by one.
#[derive(Debug)]
pub struct TabRegistry {
    tabs: Vec<TabEntry>,
    active: Option<usize>,
    options: ViewportOptions,
}

impl TabRegistry {
    pub fn new(options: ViewportOptions) -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            options,
        }
    }

    /// Opens a tab at the end and makes it active.
    pub fn add_tab(&mut self, path: Option<PathBuf>, content: &str, title: &str) -> (TabId, usize) {
        let mut viewport = EditorViewport::new(self.options);
        viewport.set_content(content);

        let id = TabId::new();
        self.tabs.push(TabEntry {
            id,
            viewport,
            path,
            title: title.to_string(),
        });
        let ordinal = self.tabs.len() - 1;
        self.active = Some(ordinal);

        tracing::debug!(%id, ordinal, title, "Tab added");
        (id, ordinal)
    }

    /// Closes the tab at `ordinal`.
    ///
    /// When the tab is modified, `guard` decides: it may persist the tab
    /// (it gets mutable access for that) and returns whether to proceed.
    /// A refusal leaves the registry untouched. Clean tabs close without
    /// consulting the guard.
    pub fn close_tab<F>(&mut self, ordinal: usize, guard: F) -> CloseOutcome
    where
        F: FnOnce(&mut TabEntry) -> bool,
    {
        let Some(entry) = self.tabs.get_mut(ordinal) else {
            return CloseOutcome::NotFound;
        };
        if entry.is_modified() && !guard(entry) {
            return CloseOutcome::Cancelled;
        }

        let entry = self.tabs.remove(ordinal);
        let remaining = self.tabs.len();
        self.active = match self.active {
            _ if remaining == 0 => None,
            Some(active) if active == ordinal => Some(ordinal.min(remaining - 1)),
            Some(active) if active > ordinal => Some(active - 1),
            other => other,
        };

        tracing::debug!(id = %entry.id, ordinal, remaining, "Tab closed");
        CloseOutcome::Closed(entry)
    }

    /// Makes `ordinal` active; ignored when out of range.
    pub fn activate(&mut self, ordinal: usize) {
        if ordinal < self.tabs.len() {
            self.active = Some(ordinal);
        }
    }

    /// Activates the next tab, wrapping to the first.
    pub fn next(&mut self) {
        if let Some(active) = self.active {
            self.active = Some((active + 1) % self.tabs.len());
        }
    }

    /// Activates the previous tab, wrapping to the last.
    pub fn previous(&mut self) {
        if let Some(active) = self.active {
            let len = self.tabs.len();
            self.active = Some((active + len - 1) % len);
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn current(&self) -> Option<&TabEntry> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut TabEntry> {
        self.active.and_then(|i| self.tabs.get_mut(i))
    }

    pub fn current_editor(&self) -> Option<&EditorViewport> {
        self.current().map(TabEntry::viewport)
    }

    pub fn current_editor_mut(&mut self) -> Option<&mut EditorViewport> {
        self.current_mut().map(TabEntry::viewport_mut)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current().and_then(TabEntry::path)
    }

    /// Attaches `path` to the active tab and retitles it.
    pub fn set_current_path(&mut self, path: PathBuf) {
        if let Some(entry) = self.current_mut() {
            entry.set_path(path);
        }
    }

    /// Adds or removes the modified marker on one tab.
    pub fn refresh_title(&mut self, ordinal: usize, modified: bool) {
        if let Some(entry) = self.tabs.get_mut(ordinal) {
            entry.refresh_title(modified);
        }
    }

    pub fn get(&self, ordinal: usize) -> Option<&TabEntry> {
        self.tabs.get(ordinal)
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut TabEntry> {
        self.tabs.get_mut(ordinal)
    }

    pub fn ordinal_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|entry| entry.id == id)
    }

    /// Ordinal of the tab showing `path`, compared as given.
    pub fn position_of_path(&self, path: &Path) -> Option<usize> {
        self.tabs.iter().position(|entry| entry.path() == Some(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabEntry> {
        self.tabs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TabEntry> {
        self.tabs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn options(&self) -> ViewportOptions {
        self.options
    }
}

/// Tab title for a file: its base name.
pub fn title_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TabRegistry {
        TabRegistry::new(ViewportOptions::default())
    }

    fn modify(registry: &mut TabRegistry, ordinal: usize) {
        let entry = registry.get_mut(ordinal).unwrap();
        entry.viewport_mut().sync_text("edited").unwrap();
        entry.refresh_title(true);
    }

    #[test]
    fn test_add_activates_new_tab() {
        let mut registry = registry();
        let (_, first) = registry.add_tab(None, "", UNTITLED);
        let (id, second) = registry.add_tab(Some("/tmp/b.txt".into()), "b", "b.txt");

        assert_eq!((first, second), (0, 1));
        assert_eq!(registry.active(), Some(1));
        assert_eq!(registry.current().unwrap().id(), id);
        assert_eq!(registry.current_path(), Some(Path::new("/tmp/b.txt")));
        assert_eq!(registry.current_editor().unwrap().content(), "b");
        assert!(!registry.current().unwrap().is_modified());
    }

    #[test]
    fn test_close_active_selects_same_ordinal() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        registry.add_tab(None, "", "b");
        registry.add_tab(None, "", "c");
        registry.activate(1);

        assert!(registry.close_tab(1, |_| true).is_closed());
        assert_eq!(registry.active(), Some(1));
        assert_eq!(registry.current().unwrap().title(), "c");
    }

    #[test]
    fn test_close_last_active_selects_new_last() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        registry.add_tab(None, "", "b");

        registry.close_tab(1, |_| true);
        assert_eq!(registry.active(), Some(0));
        assert_eq!(registry.current().unwrap().title(), "a");
    }

    #[test]
    fn test_close_before_active_keeps_entry_active() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        registry.add_tab(None, "", "b");
        registry.add_tab(None, "", "c");

        registry.close_tab(0, |_| true);
        assert_eq!(registry.active(), Some(1));
        assert_eq!(registry.current().unwrap().title(), "c");
    }

    #[test]
    fn test_close_only_tab_empties_registry() {
        let mut registry = registry();
        registry.add_tab(None, "", UNTITLED);

        assert!(registry.close_tab(0, |_| true).is_closed());
        assert!(registry.is_empty());
        assert_eq!(registry.active(), None);
        assert!(registry.current_editor().is_none());
    }

    #[test]
    fn test_guard_only_runs_for_modified_tabs() {
        let mut registry = registry();
        registry.add_tab(None, "", "clean");

        let outcome = registry.close_tab(0, |_| panic!("clean tabs close silently"));
        assert!(outcome.is_closed());
    }

    #[test]
    fn test_cancel_leaves_everything_unchanged() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        registry.add_tab(None, "", "b");
        modify(&mut registry, 0);
        registry.activate(1);

        let outcome = registry.close_tab(0, |_| false);
        assert!(matches!(outcome, CloseOutcome::Cancelled));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active(), Some(1));
        assert_eq!(registry.get(0).unwrap().viewport().content(), "edited");
    }

    #[test]
    fn test_close_out_of_range() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        assert!(matches!(registry.close_tab(3, |_| true), CloseOutcome::NotFound));
    }

    #[test]
    fn test_activate_out_of_range_is_noop() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        registry.activate(7);
        assert_eq!(registry.active(), Some(0));
    }

    #[test]
    fn test_next_previous_wrap() {
        let mut registry = registry();
        registry.add_tab(None, "", "a");
        registry.add_tab(None, "", "b");
        registry.add_tab(None, "", "c");

        registry.next();
        assert_eq!(registry.active(), Some(0));
        registry.previous();
        assert_eq!(registry.active(), Some(2));
    }

    #[test]
    fn test_set_current_path_uses_base_name() {
        let mut registry = registry();
        registry.add_tab(None, "", UNTITLED);
        modify(&mut registry, 0);
        assert_eq!(registry.current().unwrap().title(), "Untitled *");

        registry.set_current_path(PathBuf::from("/tmp/notes/a.txt"));
        assert_eq!(registry.current().unwrap().title(), "a.txt *");
        assert_eq!(registry.current().unwrap().base_title(), "a.txt");
    }

    #[test]
    fn test_refresh_title_never_doubles_marker() {
        let mut registry = registry();
        registry.add_tab(None, "", "a.txt");

        registry.refresh_title(0, true);
        registry.refresh_title(0, true);
        assert_eq!(registry.get(0).unwrap().title(), "a.txt *");

        registry.refresh_title(0, false);
        registry.refresh_title(0, false);
        assert_eq!(registry.get(0).unwrap().title(), "a.txt");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add,
            Close(usize, bool),
            Activate(usize),
            Edit(usize),
            Next,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Add),
                (0..8usize, any::<bool>()).prop_map(|(i, ok)| Op::Close(i, ok)),
                (0..8usize).prop_map(Op::Activate),
                (0..8usize).prop_map(Op::Edit),
                Just(Op::Next),
            ]
        }

        proptest! {
            #[test]
            fn active_stays_valid_and_titles_track_modified(ops in prop::collection::vec(op(), 1..60)) {
                let mut registry = registry();
                registry.add_tab(None, "", UNTITLED);

                for op in ops {
                    match op {
                        Op::Add => {
                            registry.add_tab(None, "", UNTITLED);
                        }
                        Op::Close(i, ok) => {
                            if !registry.is_empty() {
                                let before = registry.len();
                                let modified = registry.get(i % before).unwrap().is_modified();
                                let outcome = registry.close_tab(i % before, |_| ok);
                                prop_assert_eq!(outcome.is_closed(), ok || !modified);
                                if !outcome.is_closed() {
                                    prop_assert_eq!(registry.len(), before);
                                }
                            }
                            if registry.is_empty() {
                                registry.add_tab(None, "", UNTITLED);
                            }
                        }
                        Op::Activate(i) => registry.activate(i),
                        Op::Edit(i) => {
                            if !registry.is_empty() {
                                let index = i % registry.len();
                                modify(&mut registry, index);
                            }
                        }
                        Op::Next => registry.next(),
                    }

                    prop_assert!(!registry.is_empty());
                    let active = registry.active();
                    prop_assert!(active.is_some_and(|a| a < registry.len()));
                    for entry in registry.iter() {
                        prop_assert_eq!(entry.title().ends_with(MODIFIED_MARKER), entry.is_modified());
                        prop_assert!(!entry.title().ends_with(" * *"));
                    }
                }
            }
        }
    }
}
