#![forbid(unsafe_code)]

//! Events delivered by the host editable surface.
//!
//! The host translates its native input (DOM events, terminal key events,
//! test scripts) into [`SurfaceEvent`] values and feeds them to
//! [`EditSession::handle_event`](crate::EditSession::handle_event).
//!
//! # Design
//!
//! - Only the events that affect history are modeled. Plain typing arrives
//!   as [`SurfaceEvent::ContentChanged`] after the surface already mutated.
//! - Key characters are stored lowercase so `Shift+Z` and `z` share a chord;
//!   the shift state lives in [`Modifiers`].

use bitflags::bitflags;

/// Input event from the editable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEvent {
    /// The surface content changed (the host's `input` notification).
    ContentChanged,
    /// IME composition lifecycle. An `End` that arrives without a `Start`
    /// still commits any content the session has not recorded yet.
    Composition(CompositionPhase),
    /// A key press the host has not handled yet.
    Key(KeyChord),
}

/// Lifecycle phase of an IME composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositionPhase {
    Start,
    Update,
    End,
    Cancel,
}

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Command on macOS, Windows key elsewhere.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Ctrl or Cmd is held.
    #[must_use]
    pub fn has_primary(self) -> bool {
        self.intersects(Self::CTRL | Self::SUPER)
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    key: char,
    pub modifiers: Modifiers,
}

impl KeyChord {
    #[must_use]
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            modifiers,
        }
    }

    /// `key` without modifiers.
    #[must_use]
    pub fn plain(key: char) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    #[must_use]
    pub fn ctrl(key: char) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    #[must_use]
    pub fn cmd(key: char) -> Self {
        Self::new(key, Modifiers::SUPER)
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.modifiers |= Modifiers::SHIFT;
        self
    }

    /// The key, lowercased.
    #[must_use]
    pub fn key(&self) -> char {
        self.key
    }

    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

impl From<KeyChord> for SurfaceEvent {
    fn from(chord: KeyChord) -> Self {
        Self::Key(chord)
    }
}

impl From<CompositionPhase> for SurfaceEvent {
    fn from(phase: CompositionPhase) -> Self {
        Self::Composition(phase)
    }
}
