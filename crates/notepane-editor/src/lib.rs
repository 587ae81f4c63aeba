#![forbid(unsafe_code)]

//! Notepane edit-session layer.
//!
//! Wires a host's editable surface to a [`DocumentHistory`]:
//!
//! - [`EditSession`] - commit boundaries, composition handling, shortcuts,
//!   formatting commands and undo/redo application
//! - [`ToolbarSync`] - frame-coalesced undo/redo affordance updates
//! - [`EditorConfig`] - history depth and key bindings (TOML/JSON with the
//!   `config` feature)
//! - [`NoteStore`] - persistence interface for finished notes
//!
//! Everything here is single-threaded. Listener and frame plumbing uses
//! `Rc`/`Weak`, so none of these types are `Send`.
//!
//! [`DocumentHistory`]: notepane_history::DocumentHistory

pub mod command;
pub mod config;
pub mod event;
pub mod notes;
pub mod session;
pub mod shortcut;
pub mod surface;
pub mod toolbar;

pub use command::{Alignment, FormatCommand, FormatState, ListStyle, PortCommand, SizeStep, TextSize};
pub use config::{ConfigError, EditorConfig};
pub use event::{CompositionPhase, KeyChord, Modifiers, SurfaceEvent};
pub use notes::{MemoryNoteStore, Note, NoteStore, StoreError, note_preview, note_title};
pub use session::{Applied, EditSession, EventOutcome, HistoryStep, SessionState};
pub use shortcut::{ShortcutAction, ShortcutConfig};
pub use surface::{DocumentMutator, EditableSurface, MutationError, SurfaceNode};
pub use toolbar::{
    Affordance, AffordanceKind, AffordanceLocator, FrameCallback, FrameQueue, FrameScheduler,
    ToolbarSync,
};
