#![forbid(unsafe_code)]

//! Edit-session controller.
//!
//! [`EditSession`] owns the history of one open document and decides when
//! the surface's state is committed to it.
//!
//! ```text
//!            compositionStart
//!   ┌──────┐ ───────────────► ┌───────────┐
//!   │ Idle │                  │ Composing │  contentChanged: suppressed
//!   └──────┘ ◄─────────────── └───────────┘
//!      │      compositionEnd / Cancel
//!      │      (push once)
//!      └─ contentChanged: push
//! ```
//!
//! Commit boundaries are every idle content change, the end of a
//! composition, and both sides of a formatting command. There is no
//! debounce: every keystroke outside a composition is its own undo step.
//!
//! # Invariants
//!
//! 1. The history is seeded from the surface at construction and on every
//!    [`reset_session`](EditSession::reset_session), so undo never empties it.
//! 2. Nothing is pushed while composing.
//! 3. Restoring a snapshot always applies its content, even when the
//!    selection cannot be mapped back onto the new tree.

use std::sync::Arc;

use notepane_doc::{decode, encode};
use notepane_history::{
    DocumentHistory, HistoryStatus, HistorySubscription, SerializedDocument, Snapshot,
};
use tracing::{debug, debug_span, trace, warn};

use crate::command::{FormatCommand, FormatState};
use crate::config::EditorConfig;
use crate::event::{CompositionPhase, KeyChord, SurfaceEvent};
use crate::shortcut::{ShortcutAction, ShortcutConfig};
use crate::surface::{DocumentMutator, EditableSurface, MutationError};

/// Composition state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Composing,
}

/// Which history direction produced an [`Applied`] outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Undo,
    Redo,
}

/// A snapshot that was restored onto the surface.
///
/// The shell uses `content` to persist the note again; the surface already
/// shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub step: HistoryStep,
    pub content: SerializedDocument,
    /// The stored selection mapped onto the restored tree. When `false` the
    /// caret was collapsed to the surface default.
    pub selection_restored: bool,
}

/// Result of [`EditSession::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not a session shortcut. The host keeps its default behavior.
    PassThrough,
    /// A session shortcut ran. The host must prevent its default behavior.
    Handled,
    /// An undo/redo shortcut restored a snapshot. Implies
    /// [`Handled`](Self::Handled).
    Applied(Applied),
}

impl EventOutcome {
    /// The host must suppress its own handling of the event.
    #[must_use]
    pub fn prevent_default(&self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

/// Controller for one open document.
#[derive(Debug)]
pub struct EditSession<S> {
    surface: S,
    history: DocumentHistory,
    state: SessionState,
    format: FormatState,
    shortcuts: ShortcutConfig,
}

impl<S> EditSession<S>
where
    S: EditableSurface + DocumentMutator,
{
    /// Start a session over `surface`, seeding history with its current
    /// content.
    pub fn new(surface: S, config: &EditorConfig) -> Self {
        let mut session = Self {
            surface,
            history: DocumentHistory::new(config.history.clone()),
            state: SessionState::Idle,
            format: FormatState::default(),
            shortcuts: config.shortcuts.clone(),
        };
        let initial = session.capture();
        session.history.reset(initial);
        session
    }

    /// Start a session with the default configuration.
    pub fn with_defaults(surface: S) -> Self {
        Self::new(surface, &EditorConfig::default())
    }

    // ====================================================================
    // Events
    // ====================================================================

    /// Feed one surface event through the state machine.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> EventOutcome {
        match event {
            SurfaceEvent::ContentChanged => {
                match self.state {
                    SessionState::Idle => {
                        self.commit();
                    }
                    SessionState::Composing => {
                        trace!("content change suppressed during composition");
                    }
                }
                EventOutcome::PassThrough
            }
            SurfaceEvent::Composition(phase) => {
                self.composition(phase);
                EventOutcome::PassThrough
            }
            SurfaceEvent::Key(chord) => self.shortcut(&chord),
        }
    }

    fn composition(&mut self, phase: CompositionPhase) {
        match phase {
            CompositionPhase::Start => {
                self.state = SessionState::Composing;
                debug!(state = ?self.state, "composition started");
            }
            CompositionPhase::Update => {}
            CompositionPhase::End => {
                self.state = SessionState::Idle;
                let pushed = self.commit();
                debug!(state = ?self.state, pushed, "composition ended");
            }
            CompositionPhase::Cancel => {
                if self.state == SessionState::Composing {
                    self.state = SessionState::Idle;
                    let pushed = self.commit();
                    debug!(state = ?self.state, pushed, "composition cancelled");
                }
            }
        }
    }

    fn shortcut(&mut self, chord: &KeyChord) -> EventOutcome {
        let Some(action) = self.shortcuts.resolve(chord) else {
            return EventOutcome::PassThrough;
        };
        trace!(?chord, ?action, "shortcut");
        let applied = match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Format(command) => {
                // Failure is logged inside `format`; the shortcut is still consumed.
                let _ = self.format(command);
                None
            }
        };
        applied.map_or(EventOutcome::Handled, EventOutcome::Applied)
    }

    // ====================================================================
    // Commands
    // ====================================================================

    /// Push the surface's current state. Returns `false` if it matched the
    /// top of the history.
    pub fn commit(&mut self) -> bool {
        let snapshot = self.capture();
        self.history.push(snapshot)
    }

    /// Run a formatting command.
    ///
    /// The pre-format state is committed first and the result right after,
    /// so the command is exactly one undo step whether or not the host
    /// reports a content change afterwards. This holds during a composition
    /// too. Toggle state only advances when the port succeeds; a port
    /// failure is logged and returned, and the history keeps the pre-format
    /// snapshot.
    pub fn format(&mut self, command: FormatCommand) -> Result<(), MutationError> {
        self.commit();
        let (port, next) = self.format.plan(command);
        match self.surface.execute(port) {
            Ok(()) => {
                self.format = next;
                let pushed = self.commit();
                debug!(?command, ?port, pushed, "format command applied");
                Ok(())
            }
            Err(err) => {
                warn!(?command, ?port, %err, "format command failed");
                Err(err)
            }
        }
    }

    /// Step back one edit and apply it to the surface.
    pub fn undo(&mut self) -> Option<Applied> {
        let _span = debug_span!("undo").entered();
        let snapshot = self.history.undo()?;
        Some(self.apply(HistoryStep::Undo, snapshot))
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> Option<Applied> {
        let _span = debug_span!("redo").entered();
        let snapshot = self.history.redo()?;
        Some(self.apply(HistoryStep::Redo, snapshot))
    }

    /// Load `initial` into the surface and start a fresh history with it as
    /// the only state. Composition and toggle state are reset too.
    pub fn reset_session(&mut self, initial: impl Into<SerializedDocument>) {
        let initial = initial.into();
        self.surface.set_serialized_content(&initial);
        self.surface.collapse_selection();
        self.state = SessionState::Idle;
        self.format = FormatState::default();
        let snapshot = self.capture();
        self.history.reset(snapshot);
        debug!(len = initial.len(), "session reset");
    }

    /// Register `callback(can_undo, can_redo)` for every history change.
    pub fn on_history_changed(
        &self,
        callback: impl Fn(bool, bool) + 'static,
    ) -> HistorySubscription {
        self.history
            .subscribe(move |status| callback(status.can_undo(), status.can_redo()))
    }

    /// Register a raw status listener.
    pub fn subscribe_status(
        &self,
        callback: impl Fn(HistoryStatus) + 'static,
    ) -> HistorySubscription {
        self.history.subscribe(callback)
    }

    /// End the session: drop all history and hand the surface back.
    pub fn into_surface(mut self) -> S {
        self.history.clear();
        self.surface
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for the host's own edits. Call
    /// [`handle_event`](Self::handle_event) with
    /// [`SurfaceEvent::ContentChanged`] afterwards to record them.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn history(&self) -> &DocumentHistory {
        &self.history
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn format_state(&self) -> FormatState {
        self.format
    }

    /// Restore toggle state, e.g. the stored text size of the opened note.
    pub fn set_format_state(&mut self, format: FormatState) {
        self.format = format;
    }

    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        self.history.status()
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn capture(&self) -> Snapshot {
        let content = self.surface.serialized_content();
        let selection = self
            .surface
            .selection()
            .and_then(|range| encode(self.surface.tree(), &range));
        Snapshot::capture(content, selection)
    }

    fn apply(&mut self, step: HistoryStep, snapshot: Arc<Snapshot>) -> Applied {
        self.surface.set_serialized_content(&snapshot.content);
        let restored = snapshot
            .selection
            .as_ref()
            .and_then(|span| decode(self.surface.tree(), span));
        let selection_restored = match restored {
            Some(range) => {
                self.surface.set_selection(range);
                true
            }
            None => {
                self.surface.collapse_selection();
                false
            }
        };
        debug!(
            ?step,
            selection_restored,
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "snapshot applied"
        );
        Applied {
            step,
            content: snapshot.content.clone(),
            selection_restored,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
