//! Keyboard mapping.
//!
//! Shortcuts are single chords (`Ctrl+Shift+S`), looked up in a hash map.
//! Defaults cover the menu commands; `[keyboard.bindings]` in the config
//! adds to them or overrides them.

use std::collections::HashMap;

use crate::command::Command;
use crate::config::Config;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: true,
        meta: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Parses one modifier name into `self`; false if it isn't one.
    fn add(&mut self, name: &str) -> bool {
        match name {
            "ctrl" | "control" => self.ctrl = true,
            "alt" | "option" => self.alt = true,
            "shift" => self.shift = true,
            "meta" | "cmd" | "super" | "win" => self.meta = true,
            _ => return false,
        }
        true
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            #[cfg(target_os = "macos")]
            parts.push("Cmd");
            #[cfg(not(target_os = "macos"))]
            parts.push("Win");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, stored lowercase
    Char(char),
    Enter,
    Tab,
    Escape,
    F(u8),
}

impl Key {
    /// Parses a key name such as `s`, `tab`, `f5`, `plus`.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "escape" | "esc" => Some(Key::Escape),
            "plus" => Some(Key::Char('+')),
            "minus" => Some(Key::Char('-')),
            _ if lower.len() > 1 && lower.starts_with('f') => lower[1..].parse().ok().map(Key::F),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Escape => write!(f, "Escape"),
            Key::F(n) => write!(f, "F{}", n),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Builds a press, normalizing letters to lowercase.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_lowercase().next().unwrap_or(c)),
            other => other,
        };
        Self { key, modifiers }
    }

    /// Parses a binding string like `ctrl+shift+s` or `ctrl+plus`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        // A trailing "++" means the key itself is '+'.
        let (prefix, key_str) = match s.strip_suffix("++") {
            Some(prefix) => (prefix, "+"),
            None => match s.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", s),
            },
        };

        let mut modifiers = Modifiers::NONE;
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            if !modifiers.add(&part.trim().to_lowercase()) {
                return None;
            }
        }
        Some(Self::new(Key::parse(key_str.trim())?, modifiers))
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// A key binding maps a chord to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyPress,
    pub command: Command,
}

/// Keyboard mapping configuration.
#[derive(Debug, Clone)]
pub struct Keymap {
    /// Bindings in priority order; later entries win.
    bindings: Vec<KeyBinding>,
    by_key: HashMap<KeyPress, Command>,
}

impl Keymap {
    /// Creates a keymap with the default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: Vec::new(),
            by_key: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap.rebuild_index();
        keymap
    }

    /// Defaults plus the user's `[keyboard.bindings]`.
    ///
    /// Entries that don't parse are skipped with a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        for (key_str, command_id) in &config.keyboard.bindings {
            match (KeyPress::parse(key_str), Command::from_id(command_id)) {
                (Some(key), Some(command)) => keymap.bindings.push(KeyBinding { key, command }),
                _ => tracing::warn!(key = %key_str, command = %command_id, "Ignoring key binding"),
            }
        }

        keymap.rebuild_index();
        keymap
    }

    fn add_default_bindings(&mut self) {
        use crate::command::Command::*;

        let ctrl = |c| KeyPress::new(Key::Char(c), Modifiers::CTRL);
        let ctrl_shift = |c| KeyPress::new(Key::Char(c), Modifiers::CTRL_SHIFT);

        let bindings = [
            // File
            (ctrl('n'), NewFile),
            (ctrl_shift('n'), NewFolder),
            (ctrl('o'), Open),
            (ctrl_shift('o'), OpenFolder),
            (ctrl('s'), Save),
            (ctrl_shift('s'), SaveAs),
            (ctrl('w'), CloseTab),
            (ctrl('q'), Exit),
            // Edit
            (ctrl('z'), Undo),
            (ctrl('y'), Redo),
            (ctrl_shift('z'), Redo),
            (ctrl('x'), Cut),
            (ctrl('c'), Copy),
            (ctrl('v'), Paste),
            (ctrl('a'), SelectAll),
            (ctrl('f'), FindReplace),
            // View
            (ctrl('b'), ToggleSidebar),
            (ctrl('='), ZoomIn),
            (ctrl('+'), ZoomIn),
            (ctrl('-'), ZoomOut),
            (ctrl('0'), ZoomReset),
            (KeyPress::new(Key::Tab, Modifiers::CTRL), NextTab),
            (KeyPress::new(Key::Tab, Modifiers::CTRL_SHIFT), PreviousTab),
            // Help
            (KeyPress::new(Key::F(1), Modifiers::NONE), About),
        ];

        self.bindings
            .extend(bindings.into_iter().map(|(key, command)| KeyBinding { key, command }));
    }

    fn rebuild_index(&mut self) {
        self.by_key = self
            .bindings
            .iter()
            .map(|binding| (binding.key, binding.command))
            .collect();
    }

    /// Command bound to `press`, if any.
    ///
    /// Shifted punctuation also matches its unshifted binding, so
    /// `Ctrl+Shift+=` (which arrives as `+` on most layouts) still zooms.
    pub fn lookup(&self, press: &KeyPress) -> Option<Command> {
        if let Some(command) = self.by_key.get(press) {
            return Some(*command);
        }
        match press.key {
            Key::Char(c) if press.modifiers.shift && !c.is_alphabetic() => {
                let unshifted = KeyPress {
                    modifiers: Modifiers {
                        shift: false,
                        ..press.modifiers
                    },
                    ..*press
                };
                self.by_key.get(&unshifted).copied()
            }
            _ => None,
        }
    }

    /// Label of the first chord bound to `command`, for menus.
    pub fn shortcut_for(&self, command: Command) -> Option<String> {
        self.bindings
            .iter()
            .find(|binding| self.by_key.get(&binding.key) == Some(&command) && binding.command == command)
            .map(|binding| binding.key.to_string())
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
