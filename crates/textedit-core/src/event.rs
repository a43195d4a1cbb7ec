//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Two flavours live here:
//!
//! - [`EventBus`] broadcasts window-level events as values over a
//!   `tokio::sync::broadcast` channel. Receivers own their end and nobody
//!   holds references into the controller.
//! - [`TabListeners`] keeps callbacks registered against a single tab. The
//!   controller owns the table and drops a tab's callbacks the moment the
//!   tab closes, so no callback ever runs for a removed tab.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tokio::sync::broadcast;

use crate::tabs::TabId;

/// Window-level events.
///
/// ## Learning: Enum Variants
///
/// Each variant carries exactly the data its subscribers need; matching
/// on the enum forces every consumer to decide what to do with each case.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A tab was opened
    TabOpened(TabId),
    /// A tab was closed and its state dropped
    TabClosed(TabId),
    /// Another tab became active
    TabActivated(TabId),
    /// A tab was written to disk
    TabSaved { id: TabId, path: PathBuf },
    /// The file tree moved to a new root
    RootChanged(PathBuf),
    /// The file tree was re-read
    TreeRefreshed,
    /// A watched file disappeared from disk
    FileDeletedOnDisk(PathBuf),
    /// Sidebar shown or hidden
    SidebarToggled(bool),
    /// Font size of the active tab changed
    FontSizeChanged(f32),
    /// The window is about to close
    Quit,
}

/// Event bus for broadcasting editor events.
///
/// ## Design
///
/// A broadcast channel lets any number of receivers observe the same
/// stream without the sender knowing them. A receiver that falls behind
/// loses old events instead of blocking the sender.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is not an error
        let _ = self.sender.send(event);
    }

    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Takes every event currently queued for `receiver` without waiting.
///
/// Used by the render loop, which polls once per frame instead of
/// awaiting the channel.
pub fn drain(receiver: &mut broadcast::Receiver<EditorEvent>) -> Vec<EditorEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                tracing::warn!("Event receiver lagged, missed {} events", n);
            }
            Err(_) => return events,
        }
    }
}

/// Things that happen to one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    /// The modified flag flipped
    Modified(bool),
    /// The caret moved, 1-based
    CursorMoved { line: usize, column: usize },
    /// Written to disk
    Saved(PathBuf),
    /// Last event before the listeners are dropped
    Closing,
}

/// Handle returned when registering a tab listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TabEvent)>;

/// Callbacks registered against individual tabs.
#[derive(Default)]
pub struct TabListeners {
    listeners: HashMap<TabId, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl TabListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, tab: TabId, callback: F) -> ListenerId
    where
        F: FnMut(&TabEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(tab)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes one listener; returns false if it was already gone.
    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        for callbacks in self.listeners.values_mut() {
            if let Some(index) = callbacks.iter().position(|(id, _)| *id == listener) {
                callbacks.remove(index);
                return true;
            }
        }
        false
    }

    pub fn notify(&mut self, tab: TabId, event: &TabEvent) {
        if let Some(callbacks) = self.listeners.get_mut(&tab) {
            for (_, callback) in callbacks.iter_mut() {
                callback(event);
            }
        }
    }

    /// Sends [`TabEvent::Closing`] and drops every listener of `tab`.
    pub fn remove_tab(&mut self, tab: TabId) {
        if let Some(mut callbacks) = self.listeners.remove(&tab) {
            for (_, callback) in callbacks.iter_mut() {
                callback(&TabEvent::Closing);
            }
        }
    }

    /// Number of listeners registered for `tab`.
    pub fn count(&self, tab: TabId) -> usize {
        self.listeners.get(&tab).map_or(0, Vec::len)
    }
}

impl fmt::Debug for TabListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabListeners")
            .field("tabs", &self.listeners.len())
            .finish()
    }
}
