#![forbid(unsafe_code)]

//! End-to-end fixture: a session over a [`MemorySurface`] with a manually
//! pumped frame clock and a toolbar that records every write.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use notepane_doc::MarkupError;
use notepane_editor::{
    Affordance, AffordanceKind, AffordanceLocator, Applied, CompositionPhase, EditSession,
    EditorConfig, EventOutcome, FormatCommand, FrameQueue, KeyChord, MutationError, SurfaceEvent,
    ToolbarSync,
};
use tracing::{debug, warn};

use crate::surface::MemorySurface;

/// Toolbar button that records each enabled-state write.
#[derive(Debug, Default)]
pub struct RecordingAffordance {
    writes: RefCell<Vec<bool>>,
}

impl RecordingAffordance {
    #[must_use]
    pub fn writes(&self) -> Vec<bool> {
        self.writes.borrow().clone()
    }

    /// Last written state, `None` before the first write.
    #[must_use]
    pub fn enabled(&self) -> Option<bool> {
        self.writes.borrow().last().copied()
    }
}

impl Affordance for RecordingAffordance {
    fn set_enabled(&self, enabled: bool) {
        self.writes.borrow_mut().push(enabled);
    }
}

/// Undo and redo buttons plus a lookup counter.
#[derive(Debug, Default)]
pub struct RecordingToolbar {
    pub undo: Rc<RecordingAffordance>,
    pub redo: Rc<RecordingAffordance>,
    lookups: Rc<Cell<usize>>,
}

impl RecordingToolbar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator handing out this toolbar's buttons.
    pub fn locator(&self) -> impl AffordanceLocator + 'static {
        let undo = Rc::clone(&self.undo);
        let redo = Rc::clone(&self.redo);
        let lookups = Rc::clone(&self.lookups);
        move |kind: AffordanceKind| -> Option<Rc<dyn Affordance>> {
            lookups.set(lookups.get() + 1);
            let button: Rc<dyn Affordance> = match kind {
                AffordanceKind::Undo => undo.clone(),
                AffordanceKind::Redo => redo.clone(),
            };
            Some(button)
        }
    }

    /// Times the locator was asked for a button.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

/// A wired-up editor: session, frame clock and toolbar.
pub struct EditorFixture {
    pub session: EditSession<MemorySurface>,
    pub frames: Rc<FrameQueue>,
    pub toolbar: RecordingToolbar,
    sync: Option<ToolbarSync>,
}

impl EditorFixture {
    /// Open `markup` with the default configuration.
    pub fn new(markup: &str) -> Result<Self, MarkupError> {
        Self::with_config(markup, &EditorConfig::default())
    }

    pub fn with_config(markup: &str, config: &EditorConfig) -> Result<Self, MarkupError> {
        let surface = MemorySurface::from_markup(markup)?;
        let session = EditSession::new(surface, config);
        let frames = Rc::new(FrameQueue::new());
        let toolbar = RecordingToolbar::new();
        let sync = ToolbarSync::attach(session.history(), frames.clone(), toolbar.locator());
        debug!(markup, "editor fixture opened");
        Ok(Self {
            session,
            frames,
            toolbar,
            sync: Some(sync),
        })
    }

    /// Type `text` as one edit and notify the session.
    pub fn type_text(&mut self, text: &str) -> EventOutcome {
        self.insert(text);
        self.session.handle_event(SurfaceEvent::ContentChanged)
    }

    /// Replace the whole document with `markup` as one edit.
    pub fn replace(&mut self, markup: &str) -> EventOutcome {
        if let Err(err) = self.session.surface_mut().replace_markup(markup) {
            warn!(markup, %err, "replacement markup rejected");
        }
        self.session.handle_event(SurfaceEvent::ContentChanged)
    }

    /// Type `text` one character at a time, notifying after each.
    pub fn type_keystrokes(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.type_text(ch.encode_utf8(&mut buf));
        }
    }

    /// Run an IME composition that inserts each fragment in turn, then
    /// finishes with `finish` (`End` or `Cancel`).
    pub fn compose(&mut self, fragments: &[&str], finish: CompositionPhase) {
        self.session
            .handle_event(SurfaceEvent::Composition(CompositionPhase::Start));
        for fragment in fragments {
            self.type_text(fragment);
            self.session
                .handle_event(SurfaceEvent::Composition(CompositionPhase::Update));
        }
        self.session.handle_event(SurfaceEvent::Composition(finish));
    }

    pub fn press(&mut self, chord: KeyChord) -> EventOutcome {
        self.session.handle_event(SurfaceEvent::Key(chord))
    }

    /// Run a formatting command and report the resulting content change,
    /// as a host's `input` event would.
    pub fn format(&mut self, command: FormatCommand) -> Result<(), MutationError> {
        self.session.format(command)?;
        self.session.handle_event(SurfaceEvent::ContentChanged);
        Ok(())
    }

    pub fn undo(&mut self) -> Option<Applied> {
        self.session.undo()
    }

    pub fn redo(&mut self) -> Option<Applied> {
        self.session.redo()
    }

    /// Pump one render frame. Returns the number of callbacks run.
    pub fn frame(&self) -> usize {
        self.frames.run_frame()
    }

    /// Drop the toolbar sync, as closing the editor view does.
    pub fn dispose_toolbar(&mut self) {
        self.sync = None;
    }

    #[must_use]
    pub fn toolbar_sync(&self) -> Option<&ToolbarSync> {
        self.sync.as_ref()
    }

    #[must_use]
    pub fn markup(&self) -> String {
        self.session.surface().markup()
    }

    fn insert(&mut self, text: &str) {
        if let Err(err) = self.session.surface_mut().type_text(text) {
            warn!(text, %err, "typing into the surface failed");
        }
    }
}
