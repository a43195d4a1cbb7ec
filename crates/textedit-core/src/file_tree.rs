//! The sidebar file tree and its watcher.
//!
//! ## Learning: Lazy Trees
//!
//! Directories load their children the first time they are expanded, so
//! opening a huge folder costs one `read_dir`. A refresh rebuilds the tree
//! and re-expands whatever was expanded before, which keeps the view
//! stable after a delete or an external change.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::CoreResult;

/// A node in the file tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub children: Vec<FileNode>,
    pub expanded: bool,
    /// 0 for entries directly under the root
    pub depth: u16,
}

impl FileNode {
    fn from_path(path: &Path, depth: u16) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            name,
            path: path.to_path_buf(),
            is_dir: path.is_dir(),
            children: Vec::new(),
            expanded: false,
            depth,
        })
    }

    fn load_children(&mut self, show_hidden: bool) {
        if !self.is_dir || !self.children.is_empty() {
            return;
        }
        self.children = read_children(&self.path, self.depth + 1, show_hidden);
    }

    /// File extension, if any.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Lists a directory: folders first, then files, each by case-insensitive name.
fn read_children(dir: &Path, depth: u16, show_hidden: bool) -> Vec<FileNode> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut children: Vec<FileNode> = entries
        .filter_map(|e| e.ok())
        .filter(|e| show_hidden || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| FileNode::from_path(&e.path(), depth))
        .collect();

    children.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
    children
}

/// The folder shown in the sidebar.
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    children: Vec<FileNode>,
    show_hidden: bool,
}

impl FileTree {
    pub fn new(root: impl AsRef<Path>, show_hidden: bool) -> Self {
        let root = normalize_path(root.as_ref());
        let children = read_children(&root, 0, show_hidden);
        Self {
            root,
            children,
            show_hidden,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Label for the tree header: the root folder's name.
    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Re-roots the tree; nothing stays expanded.
    pub fn set_root(&mut self, root: impl AsRef<Path>) {
        *self = Self::new(root, self.show_hidden);
    }

    /// Re-reads the tree from disk, keeping expanded folders expanded.
    pub fn refresh(&mut self) {
        let mut expanded = HashSet::new();
        for node in &self.children {
            collect_expanded(node, &mut expanded);
        }

        self.children = read_children(&self.root, 0, self.show_hidden);
        for node in &mut self.children {
            restore_expanded(node, &expanded, self.show_hidden);
        }
    }

    /// Expands or collapses the folder at `path`.
    pub fn toggle(&mut self, path: &Path) -> bool {
        let show_hidden = self.show_hidden;
        self.children
            .iter_mut()
            .any(|node| toggle_node(node, path, show_hidden))
    }

    /// Visible entries in display order.
    pub fn rows(&self) -> Vec<&FileNode> {
        let mut rows = Vec::new();
        for node in &self.children {
            push_visible(node, &mut rows);
        }
        rows
    }

    pub fn path_at(&self, row: usize) -> Option<&Path> {
        self.rows().get(row).map(|node| node.path.as_path())
    }

    pub fn is_dir(&self, row: usize) -> bool {
        self.rows().get(row).is_some_and(|node| node.is_dir)
    }

    /// Starts watching the root for external changes.
    pub fn watch(&self) -> CoreResult<FileWatcher> {
        FileWatcher::new(&self.root)
    }
}

fn collect_expanded(node: &FileNode, set: &mut HashSet<PathBuf>) {
    if node.expanded {
        set.insert(node.path.clone());
        for child in &node.children {
            collect_expanded(child, set);
        }
    }
}

fn restore_expanded(node: &mut FileNode, expanded: &HashSet<PathBuf>, show_hidden: bool) {
    if node.is_dir && expanded.contains(&node.path) {
        node.expanded = true;
        node.load_children(show_hidden);
        for child in &mut node.children {
            restore_expanded(child, expanded, show_hidden);
        }
    }
}

fn toggle_node(node: &mut FileNode, target: &Path, show_hidden: bool) -> bool {
    if node.path == target {
        if node.is_dir {
            node.expanded = !node.expanded;
            if node.expanded {
                node.load_children(show_hidden);
            }
        }
        return true;
    }
    target.starts_with(&node.path)
        && node
            .children
            .iter_mut()
            .any(|child| toggle_node(child, target, show_hidden))
}

fn push_visible<'a>(node: &'a FileNode, rows: &mut Vec<&'a FileNode>) {
    rows.push(node);
    if node.expanded {
        for child in &node.children {
            push_visible(child, rows);
        }
    }
}

/// Absolute form of `path` used for comparisons.
///
/// Existing paths are canonicalized. Paths that no longer exist (a file
/// just deleted) are made absolute and cleaned of `.` and `..` lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    // The parent may exist even when the leaf is gone; resolve it so the
    // result lines up with canonicalized paths of its siblings.
    match (normalized.parent(), normalized.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(parent) => parent.join(name),
            Err(_) => normalized,
        },
        _ => normalized,
    }
}

/// Absolute form of a symlink's own location.
///
/// Only the parent folder is resolved, so the result names the link and
/// not the file it points to.
pub fn normalize_link_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            normalize_path(parent).join(name)
        }
        _ => normalize_path(path),
    }
}

/// File change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Deleted(path) => path,
        }
    }
}

/// Translates a raw notify event into per-path changes.
///
/// A rename reports the old name as deleted and the new one as created.
pub fn changes_from_event(event: Event) -> Vec<FileChange> {
    let kind = event.kind;
    event
        .paths
        .into_iter()
        .filter_map(|path| match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Remove(_) => Some(FileChange::Deleted(path)),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                Some(FileChange::Deleted(path))
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                Some(FileChange::Created(path))
            }
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            _ => None,
        })
        .collect()
}

/// Watches a folder and queues changes for the UI thread.
///
/// ## Learning: Crossing Threads with Channels
///
/// notify calls back on its own thread. The callback only pushes into a
/// tokio mpsc channel; the UI thread drains it with `try_recv` and does
/// all the state mutation itself.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    changes: mpsc::Receiver<FileChange>,
}

impl FileWatcher {
    pub fn new(root: &Path) -> CoreResult<Self> {
        let (tx, rx) = mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for change in changes_from_event(event) {
                        if tx.try_send(change).is_err() {
                            tracing::warn!("File change queue full, dropping event");
                        }
                    }
                }
                Err(err) => tracing::warn!(%err, "File watcher error"),
            }
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::debug!(root = %root.display(), "Watching for file changes");

        Ok(Self {
            _watcher: watcher,
            changes: rx,
        })
    }

    /// Takes every change queued so far.
    pub fn poll(&mut self) -> Vec<FileChange> {
        let mut changes = Vec::new();
        while let Ok(change) = self.changes.try_recv() {
            changes.push(change);
        }
        changes
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher").finish_non_exhaustive()
    }
}
