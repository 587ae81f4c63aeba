#![forbid(unsafe_code)]

//! Keyboard shortcut resolution.
//!
//! A chord is a session shortcut only when Ctrl or Cmd is held and Alt is
//! not. Shift is ignored except on the undo key, where it turns undo into
//! redo. Everything else passes through to the host untouched.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::FormatCommand;
use crate::event::{KeyChord, Modifiers};

/// What a resolved shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    Format(FormatCommand),
    Undo,
    Redo,
}

/// Key bindings for the session shortcuts.
///
/// Keys are compared lowercase. The defaults are the common editor
/// bindings: `b`, `i`, `u`, `z`, with `y` and `Shift+z` for redo.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShortcutConfig {
    pub bold: char,
    pub italic: char,
    pub underline: char,
    pub undo: char,
    pub redo: char,
    /// `Shift` + the undo key redoes.
    pub shift_undo_redoes: bool,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            bold: 'b',
            italic: 'i',
            underline: 'u',
            undo: 'z',
            redo: 'y',
            shift_undo_redoes: true,
        }
    }
}

impl ShortcutConfig {
    /// Map `chord` to a session action, or `None` to let it pass through.
    #[must_use]
    pub fn resolve(&self, chord: &KeyChord) -> Option<ShortcutAction> {
        if !chord.modifiers.has_primary() || chord.modifiers.contains(Modifiers::ALT) {
            return None;
        }
        let key = chord.key();
        if key == self.undo.to_ascii_lowercase() {
            return match (chord.shift(), self.shift_undo_redoes) {
                (false, _) => Some(ShortcutAction::Undo),
                (true, true) => Some(ShortcutAction::Redo),
                (true, false) => None,
            };
        }
        if key == self.redo.to_ascii_lowercase() {
            return Some(ShortcutAction::Redo);
        }
        let command = if key == self.bold.to_ascii_lowercase() {
            FormatCommand::Bold
        } else if key == self.italic.to_ascii_lowercase() {
            FormatCommand::Italic
        } else if key == self.underline.to_ascii_lowercase() {
            FormatCommand::Underline
        } else {
            return None;
        };
        Some(ShortcutAction::Format(command))
    }

    /// Bound keys, for validation.
    pub(crate) fn keys(&self) -> [(&'static str, char); 5] {
        [
            ("bold", self.bold),
            ("italic", self.italic),
            ("underline", self.underline),
            ("undo", self.undo),
            ("redo", self.redo),
        ]
    }
}
