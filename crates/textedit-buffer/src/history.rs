//! Undo/redo history management.
//!
//! ## Learning: The Command Pattern
//!
//! Each edit is stored as a command that can be undone (reversed) or
//! redone (re-applied). Edits are kept in groups: one group is one undo
//! step, so a replace-all or a typed word comes back in a single step.
//!
//! Every group carries a sequence number. The buffer remembers the number
//! of the group that was on top of the undo stack when the file was last
//! saved, which lets undo walk back to a clean state.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single edit operation.
///
/// ## Learning: Clone vs Copy
///
/// `Edit` implements `Clone` but not `Copy` because it contains
/// a `String`, which owns heap memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What kind of edit this is
    pub kind: EditKind,
    /// Character position where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Returns the inverse of this edit (for undo).
    pub fn inverse(&self) -> Self {
        Self {
            kind: match self.kind {
                EditKind::Insert => EditKind::Delete,
                EditKind::Delete => EditKind::Insert,
            },
            position: self.position,
            content: self.content.clone(),
        }
    }

    /// Character index just past the affected text.
    pub fn end(&self) -> usize {
        self.position + self.content.chars().count()
    }

    /// Returns true if `other` directly continues this edit.
    ///
    /// Newlines break coalescing so that each typed line is its own step.
    pub fn can_coalesce(&self, other: &Edit) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.content.contains('\n') || other.content.contains('\n') {
            return false;
        }

        match self.kind {
            EditKind::Insert => self.end() == other.position,
            // Backspace lands just before us, forward delete at the same spot.
            EditKind::Delete => other.end() == self.position || self.position == other.position,
        }
    }

    pub fn coalesce(&mut self, other: Edit) {
        match self.kind {
            EditKind::Insert => self.content.push_str(&other.content),
            EditKind::Delete => {
                if other.position < self.position {
                    self.content = other.content + &self.content;
                    self.position = other.position;
                } else {
                    self.content.push_str(&other.content);
                }
            }
        }
    }
}

/// A group of edits that are undone/redone together.
#[derive(Debug, Clone)]
pub struct EditGroup {
    /// Sequence number, unique within one `History`
    pub id: u64,
    /// The edits in application order
    pub edits: Vec<Edit>,
    /// Last time an edit joined the group; `None` once sealed
    timestamp: Option<Instant>,
}

impl EditGroup {
    fn new(id: u64, edit: Edit) -> Self {
        Self {
            id,
            edits: vec![edit],
            timestamp: Some(Instant::now()),
        }
    }
}

/// Manages undo/redo history.
///
/// ## Design Decisions
///
/// 1. **Bounded history**: the oldest groups fall off the front
/// 2. **Edit coalescing**: rapid adjacent keystrokes share one group
/// 3. **Explicit grouping**: `begin_group`/`end_group` bracket compound edits
///
/// ## Learning: VecDeque
///
/// `VecDeque` gives cheap pushes and pops at both ends: new groups go
/// to the back, undo pops from the back, capacity trimming pops the front.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<EditGroup>,
    redo_stack: Vec<EditGroup>,
    max_size: usize,
    coalesce_threshold: Duration,
    /// Nesting depth of open compound groups
    group_depth: usize,
    next_id: u64,
}

impl History {
    /// Creates a new history with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size.min(64)),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            coalesce_threshold: Duration::from_millis(300),
            group_depth: 0,
            next_id: 1,
        }
    }

    /// Pushes an edit onto the history.
    ///
    /// Clears the redo stack; may coalesce with the previous edit.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if let Some(last_group) = self.undo_stack.back_mut() {
            if self.group_depth > 0 && last_group.timestamp.is_some() {
                last_group.edits.push(edit);
                last_group.timestamp = Some(Instant::now());
                return;
            }

            let recent = last_group
                .timestamp
                .is_some_and(|at| at.elapsed() < self.coalesce_threshold);
            if recent && last_group.edits.len() == 1 {
                if let Some(last_edit) = last_group.edits.last_mut() {
                    if last_edit.can_coalesce(&edit) {
                        last_edit.coalesce(edit);
                        last_group.timestamp = Some(Instant::now());
                        return;
                    }
                }
            }
        }

        let id = self.allocate_id();
        self.undo_stack.push_back(EditGroup::new(id, edit));

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Starts a compound group.
    ///
    /// All edits until the matching `end_group()` form one undo step.
    pub fn begin_group(&mut self) {
        if self.group_depth == 0 {
            // Sealing makes the first edit of the group open a fresh entry.
            self.seal();
            self.group_depth = 1;
        } else {
            self.group_depth += 1;
        }
    }

    /// Ends the current compound group.
    pub fn end_group(&mut self) {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.seal();
        }
    }

    /// Stops the newest group from absorbing further edits.
    pub fn seal(&mut self) {
        if let Some(group) = self.undo_stack.back_mut() {
            group.timestamp = None;
        }
    }

    /// Pops the newest group for undo.
    ///
    /// The returned edits are in application order; callers reverse them.
    pub fn undo(&mut self) -> Option<&EditGroup> {
        let mut group = self.undo_stack.pop_back()?;
        group.timestamp = None;
        self.redo_stack.push(group);
        self.redo_stack.last()
    }

    /// Pops the most recently undone group for redo.
    pub fn redo(&mut self) -> Option<&EditGroup> {
        let group = self.redo_stack.pop()?;
        self.undo_stack.push_back(group);
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Id of the group on top of the undo stack, 0 when empty.
    pub fn head(&self) -> u64 {
        self.undo_stack.back().map_or(0, |group| group.id)
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_depth = 0;
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_inverse() {
        let insert = Edit::insert(0, "hello");
        let inverse = insert.inverse();

        assert_eq!(inverse.kind, EditKind::Delete);
        assert_eq!(inverse.position, 0);
        assert_eq!(inverse.content, "hello");
    }

    #[test]
    fn test_history_undo_redo() {
        let mut history = History::new(100);

        history.push(Edit::insert(0, "a"));
        history.seal();
        history.push(Edit::insert(1, "b"));

        assert!(history.can_undo());
        let group = history.undo().unwrap();
        assert_eq!(group.edits[0].content, "b");

        assert!(history.can_redo());
        let group = history.redo().unwrap();
        assert_eq!(group.edits[0].content, "b");
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_edit_coalescing() {
        let mut e1 = Edit::insert(0, "a");
        let e2 = Edit::insert(1, "b");

        assert!(e1.can_coalesce(&e2));
        e1.coalesce(e2);
        assert_eq!(e1.content, "ab");
    }

    #[test]
    fn test_backspace_coalescing_prepends() {
        let mut e1 = Edit::delete(4, "d");
        let e2 = Edit::delete(3, "c");

        assert!(e1.can_coalesce(&e2));
        e1.coalesce(e2);
        assert_eq!(e1.position, 3);
        assert_eq!(e1.content, "cd");
    }

    #[test]
    fn test_newline_breaks_coalescing() {
        let e1 = Edit::insert(0, "a");
        assert!(!e1.can_coalesce(&Edit::insert(1, "\n")));
    }

    #[test]
    fn test_rapid_typing_is_one_step() {
        let mut history = History::new(100);
        history.push(Edit::insert(0, "a"));
        history.push(Edit::insert(1, "b"));
        history.push(Edit::insert(2, "c"));

        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo().unwrap().edits[0].content, "abc");
    }

    #[test]
    fn test_group_collects_edits() {
        let mut history = History::new(100);
        history.push(Edit::insert(0, "x"));

        history.begin_group();
        history.push(Edit::delete(0, "x"));
        history.push(Edit::insert(0, "yz"));
        history.end_group();

        assert_eq!(history.undo_count(), 2);
        let group = history.undo().unwrap();
        assert_eq!(group.edits.len(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(100);
        history.push(Edit::insert(0, "a"));
        history.undo();
        assert!(history.can_redo());

        history.push(Edit::insert(0, "b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new(2);
        for i in 0..4 {
            history.push(Edit::insert(i, "\n"));
        }
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_head_tracks_top_group() {
        let mut history = History::new(10);
        assert_eq!(history.head(), 0);

        history.push(Edit::insert(0, "a"));
        let first = history.head();
        history.seal();
        history.push(Edit::insert(1, "b"));
        assert_ne!(history.head(), first);

        history.undo();
        assert_eq!(history.head(), first);
    }
}
