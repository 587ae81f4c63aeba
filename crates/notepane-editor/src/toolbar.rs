#![forbid(unsafe_code)]

//! Undo/redo toolbar state sync.
//!
//! History notifications can arrive many times per frame (every keystroke
//! pushes). [`ToolbarSync`] records the latest [`HistoryStatus`] and
//! schedules at most one frame callback; when it fires, both affordances are
//! written once with the final state.
//!
//! ```text
//! push ─┐
//! push ─┼─► latest = status, pending? ──no──► request_frame(flush)
//! undo ─┘                            └─yes─► (coalesced)
//!
//! frame ─► Weak::upgrade ──none──► no-op (sync dropped)
//!                         └─some─► locate (cached) ─► set_enabled × 2
//! ```
//!
//! # Invariants
//!
//! 1. At most one frame callback is outstanding per sync.
//! 2. A frame that fires after the sync was dropped touches nothing.
//! 3. A successful affordance lookup is cached for the life of the sync; a
//!    failed lookup is retried on the next frame.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use notepane_history::{DocumentHistory, HistoryStatus, HistorySubscription};
use tracing::trace;

/// Deferred callback queued for the next frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Host frame clock.
pub trait FrameScheduler {
    /// Run `callback` once, on the next render frame.
    fn request_frame(&self, callback: FrameCallback);
}

/// Which toolbar control an affordance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffordanceKind {
    Undo,
    Redo,
}

/// A toolbar control whose enabled state the sync drives.
pub trait Affordance {
    fn set_enabled(&self, enabled: bool);
}

/// Finds toolbar controls on demand.
pub trait AffordanceLocator {
    fn locate(&self, kind: AffordanceKind) -> Option<Rc<dyn Affordance>>;
}

impl<F> AffordanceLocator for F
where
    F: Fn(AffordanceKind) -> Option<Rc<dyn Affordance>>,
{
    fn locate(&self, kind: AffordanceKind) -> Option<Rc<dyn Affordance>> {
        self(kind)
    }
}

// ============================================================================
// FrameQueue
// ============================================================================

/// Manually pumped [`FrameScheduler`].
///
/// The host calls [`run_frame`](Self::run_frame) once per render frame.
/// Callbacks requested while a frame runs wait for the following frame.
#[derive(Default)]
pub struct FrameQueue {
    queued: RefCell<Vec<FrameCallback>>,
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("queued", &self.queued.borrow().len())
            .finish()
    }
}

impl FrameQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued before this call. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let callbacks = std::mem::take(&mut *self.queued.borrow_mut());
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queued.borrow().len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) {
        self.queued.borrow_mut().push(callback);
    }
}

// ============================================================================
// ToolbarSync
// ============================================================================

struct SyncState {
    scheduler: Rc<dyn FrameScheduler>,
    locator: Box<dyn AffordanceLocator>,
    latest: Cell<HistoryStatus>,
    pending: Cell<bool>,
    undo: RefCell<Option<Rc<dyn Affordance>>>,
    redo: RefCell<Option<Rc<dyn Affordance>>>,
    frames: Cell<u64>,
}

impl SyncState {
    fn record(self: &Rc<Self>, status: HistoryStatus) {
        self.latest.set(status);
        if self.pending.replace(true) {
            trace!(?status, "toolbar update coalesced");
            return;
        }
        let weak = Rc::downgrade(self);
        self.scheduler.request_frame(Box::new(move || match weak.upgrade() {
            Some(state) => state.flush(),
            None => trace!("toolbar frame fired after dispose"),
        }));
    }

    fn flush(&self) {
        self.pending.set(false);
        self.frames.set(self.frames.get() + 1);
        let status = self.latest.get();
        self.write(AffordanceKind::Undo, &self.undo, status.can_undo());
        self.write(AffordanceKind::Redo, &self.redo, status.can_redo());
    }

    fn write(
        &self,
        kind: AffordanceKind,
        slot: &RefCell<Option<Rc<dyn Affordance>>>,
        enabled: bool,
    ) {
        let affordance = {
            let mut cached = slot.borrow_mut();
            if cached.is_none() {
                *cached = self.locator.locate(kind);
            }
            cached.clone()
        };
        match affordance {
            Some(affordance) => affordance.set_enabled(enabled),
            None => trace!(?kind, "toolbar affordance not found"),
        }
    }
}

/// Keeps undo/redo affordances in step with a [`DocumentHistory`].
///
/// Dropping the sync unsubscribes from the history; any frame it already
/// requested becomes a no-op.
pub struct ToolbarSync {
    state: Rc<SyncState>,
    _subscription: HistorySubscription,
}

impl fmt::Debug for ToolbarSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarSync")
            .field("latest", &self.state.latest.get())
            .field("pending", &self.state.pending.get())
            .field("frames", &self.state.frames.get())
            .finish()
    }
}

impl ToolbarSync {
    /// Subscribe to `history` and schedule a first update with its current
    /// status.
    pub fn attach(
        history: &DocumentHistory,
        scheduler: Rc<dyn FrameScheduler>,
        locator: impl AffordanceLocator + 'static,
    ) -> Self {
        let state = Rc::new(SyncState {
            scheduler,
            locator: Box::new(locator),
            latest: Cell::new(history.status()),
            pending: Cell::new(false),
            undo: RefCell::new(None),
            redo: RefCell::new(None),
            frames: Cell::new(0),
        });
        let weak: Weak<SyncState> = Rc::downgrade(&state);
        let subscription = history.subscribe(move |status| {
            if let Some(state) = weak.upgrade() {
                state.record(status);
            }
        });
        state.record(history.status());
        Self {
            state,
            _subscription: subscription,
        }
    }

    /// Most recent status received.
    #[must_use]
    pub fn latest(&self) -> HistoryStatus {
        self.state.latest.get()
    }

    /// A frame callback is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    /// Frames that have written the affordances so far.
    #[must_use]
    pub fn frames_flushed(&self) -> u64 {
        self.state.frames.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notepane_history::{HistoryConfig, Snapshot};

    #[derive(Default)]
    struct Button {
        writes: RefCell<Vec<bool>>,
    }

    impl Affordance for Button {
        fn set_enabled(&self, enabled: bool) {
            self.writes.borrow_mut().push(enabled);
        }
    }

    struct Toolbar {
        undo: Rc<Button>,
        redo: Rc<Button>,
        lookups: Rc<Cell<usize>>,
    }

    impl Toolbar {
        fn new() -> Self {
            Self {
                undo: Rc::new(Button::default()),
                redo: Rc::new(Button::default()),
                lookups: Rc::new(Cell::new(0)),
            }
        }

        fn locator(&self) -> impl AffordanceLocator + 'static {
            let undo = Rc::clone(&self.undo);
            let redo = Rc::clone(&self.redo);
            let lookups = Rc::clone(&self.lookups);
            move |kind: AffordanceKind| -> Option<Rc<dyn Affordance>> {
                lookups.set(lookups.get() + 1);
                Some(match kind {
                    AffordanceKind::Undo => Rc::clone(&undo) as Rc<dyn Affordance>,
                    AffordanceKind::Redo => Rc::clone(&redo) as Rc<dyn Affordance>,
                })
            }
        }
    }

    fn history() -> DocumentHistory {
        DocumentHistory::seeded(HistoryConfig::default(), Snapshot::of_content("base"))
    }

    #[test]
    fn attach_schedules_initial_update() {
        let history = history();
        let frames = Rc::new(FrameQueue::new());
        let toolbar = Toolbar::new();
        let sync = ToolbarSync::attach(&history, frames.clone(), toolbar.locator());

        assert!(sync.is_pending());
        assert_eq!(frames.run_frame(), 1);
        assert_eq!(*toolbar.undo.writes.borrow(), vec![false]);
        assert_eq!(*toolbar.redo.writes.borrow(), vec![false]);
        assert!(!sync.is_pending());
    }

    #[test]
    fn notifications_within_a_frame_coalesce() {
        let mut history = history();
        let frames = Rc::new(FrameQueue::new());
        let toolbar = Toolbar::new();
        let sync = ToolbarSync::attach(&history, frames.clone(), toolbar.locator());
        frames.run_frame();

        for i in 0..10 {
            history.push(Snapshot::of_content(format!("edit {i}")));
        }
        history.undo();
        assert_eq!(frames.pending(), 1);
        frames.run_frame();

        assert_eq!(*toolbar.undo.writes.borrow(), vec![false, true]);
        assert_eq!(*toolbar.redo.writes.borrow(), vec![false, true]);
        assert_eq!(sync.frames_flushed(), 2);
        assert_eq!(sync.latest().undo_depth, 10);
    }

    #[test]
    fn frame_after_drop_is_a_no_op() {
        let mut history = history();
        let frames = Rc::new(FrameQueue::new());
        let toolbar = Toolbar::new();
        let sync = ToolbarSync::attach(&history, frames.clone(), toolbar.locator());
        frames.run_frame();

        history.push(Snapshot::of_content("next"));
        drop(sync);
        assert_eq!(frames.run_frame(), 1);
        assert_eq!(*toolbar.undo.writes.borrow(), vec![false]);

        history.push(Snapshot::of_content("after"));
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn affordances_are_located_once() {
        let mut history = history();
        let frames = Rc::new(FrameQueue::new());
        let toolbar = Toolbar::new();
        let _sync = ToolbarSync::attach(&history, frames.clone(), toolbar.locator());
        for i in 0..3 {
            frames.run_frame();
            history.push(Snapshot::of_content(format!("{i}")));
        }
        frames.run_frame();
        assert_eq!(toolbar.lookups.get(), 2);
        assert_eq!(toolbar.undo.writes.borrow().len(), 4);
    }

    #[test]
    fn missing_affordance_is_retried() {
        let history = history();
        let frames = Rc::new(FrameQueue::new());
        let button = Rc::new(Button::default());
        let mounted = Rc::new(Cell::new(false));
        let locator = {
            let button = Rc::clone(&button);
            let mounted = Rc::clone(&mounted);
            move |kind: AffordanceKind| -> Option<Rc<dyn Affordance>> {
                (mounted.get() && kind == AffordanceKind::Undo)
                    .then(|| Rc::clone(&button) as Rc<dyn Affordance>)
            }
        };
        let sync = ToolbarSync::attach(&history, frames.clone(), locator);
        frames.run_frame();
        assert!(button.writes.borrow().is_empty());

        mounted.set(true);
        sync.state.record(history.status());
        frames.run_frame();
        assert_eq!(*button.writes.borrow(), vec![false]);
    }

    #[test]
    fn callbacks_requested_during_a_frame_wait() {
        let frames = Rc::new(FrameQueue::new());
        let ran = Rc::new(Cell::new(0));
        let inner_frames = Rc::clone(&frames);
        let inner_ran = Rc::clone(&ran);
        frames.request_frame(Box::new(move || {
            inner_ran.set(inner_ran.get() + 1);
            let again = Rc::clone(&inner_ran);
            inner_frames.request_frame(Box::new(move || again.set(again.get() + 1)));
        }));
        assert_eq!(frames.run_frame(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(frames.run_frame(), 1);
        assert_eq!(ran.get(), 2);
    }
}
