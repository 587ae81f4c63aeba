#![forbid(unsafe_code)]

//! Bounded undo/redo stacks of document snapshots.
//!
//! [`DocumentHistory`] keeps every committed state of one open document as an
//! `Arc<Snapshot>`. The top of the undo stack is always the state the editor
//! currently shows; undo moves it to the redo stack and hands back the state
//! underneath.
//!
//! ```text
//! reset(A), push(AB), push(ABC)
//! ┌──────────────────────────────────────────────┐
//! │ Undo Stack:  [A, AB, ABC]                    │
//! │ Redo Stack:  []                              │
//! └──────────────────────────────────────────────┘
//!
//! undo() x2  -> returns AB, then A
//! ┌──────────────────────────────────────────────┐
//! │ Undo Stack:  [A]                             │
//! │ Redo Stack:  [ABC, AB]                       │
//! └──────────────────────────────────────────────┘
//!
//! push(AX): new edit, clears redo
//! ┌──────────────────────────────────────────────┐
//! │ Undo Stack:  [A, AX]                         │
//! │ Redo Stack:  []                              │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. After [`reset`](DocumentHistory::reset) the undo stack is never empty.
//! 2. `undo_stack.len() <= config.max_depth` after any operation.
//! 3. The redo stack is cleared by every push that is not deduplicated.
//! 4. Two adjacent undo entries never share the same content.
//!
//! No operation fails. Boundary cases (undo at the base state, redo with an
//! empty redo stack, pushing unchanged content) return `None`/`false`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::listener::{HistorySubscription, Listeners};
use crate::snapshot::Snapshot;

/// Default cap on the undo stack.
pub const MAX_HISTORY: usize = 1000;

/// Configuration for a [`DocumentHistory`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept on the undo stack, including the
    /// base state. Values below 1 behave as 1.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create an unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    fn effective_depth(&self) -> usize {
        self.max_depth.max(1)
    }
}

/// Stack sizes reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStatus {
    pub undo_depth: usize,
    pub redo_depth: usize,
}

impl HistoryStatus {
    /// An undo step exists beyond the base state.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_depth > 1
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.redo_depth > 0
    }
}

/// Undo/redo history for one open document.
pub struct DocumentHistory {
    /// Committed states, oldest at front, current at back.
    undo_stack: VecDeque<Arc<Snapshot>>,
    /// Undone states, most recently undone at back.
    redo_stack: VecDeque<Arc<Snapshot>>,
    config: HistoryConfig,
    listeners: Listeners,
}

impl fmt::Debug for DocumentHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHistory")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for DocumentHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl DocumentHistory {
    /// Create an empty history. Call [`reset`](Self::reset) to seed it
    /// before the editing session starts.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            listeners: Listeners::default(),
        }
    }

    /// Create a history already seeded with `initial`.
    #[must_use]
    pub fn seeded(config: HistoryConfig, initial: Snapshot) -> Self {
        let mut history = Self::new(config);
        history.reset(initial);
        history
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record a new committed state.
    ///
    /// Returns `false` without touching either stack when `snapshot` has
    /// the same content as the current top. Otherwise the snapshot becomes
    /// the new top, the redo stack is cleared and the oldest entries are
    /// evicted down to the depth limit.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if let Some(top) = self.undo_stack.back()
            && top.content == snapshot.content
        {
            trace!(undo_depth = self.undo_stack.len(), "history push skipped: content unchanged");
            return false;
        }

        self.redo_stack.clear();
        self.undo_stack.push_back(Arc::new(snapshot));
        self.enforce_depth();
        trace!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "history push"
        );
        self.notify();
        true
    }

    /// Step back one edit.
    ///
    /// Moves the current snapshot to the redo stack and returns the state
    /// underneath, which the caller should apply. Returns `None` when only
    /// the base state remains.
    pub fn undo(&mut self) -> Option<Arc<Snapshot>> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let current = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(current);
        let restored = self.undo_stack.back().cloned();
        trace!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "history undo"
        );
        self.notify();
        restored
    }

    /// Re-apply the most recently undone edit and return it.
    ///
    /// Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Arc<Snapshot>> {
        let snapshot = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(Arc::clone(&snapshot));
        self.enforce_depth();
        trace!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "history redo"
        );
        self.notify();
        Some(snapshot)
    }

    /// Drop all history and seed the undo stack with exactly `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push_back(Arc::new(initial));
        trace!("history reset");
        self.notify();
    }

    /// Drop every snapshot. Used when the editing session ends.
    pub fn clear(&mut self) {
        let had_entries = !self.undo_stack.is_empty() || !self.redo_stack.is_empty();
        self.undo_stack.clear();
        self.redo_stack.clear();
        if had_entries {
            self.notify();
        }
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// The current committed state.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<Snapshot>> {
        self.undo_stack.back()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots on the undo stack, including the current state.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            undo_depth: self.undo_stack.len(),
            redo_depth: self.redo_stack.len(),
        }
    }

    /// Undo entries from oldest to newest.
    pub fn undo_entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.undo_stack.iter().map(|s| &**s)
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    // ====================================================================
    // Listeners
    // ====================================================================

    /// Register a callback invoked after every change to either stack.
    pub fn subscribe(&self, callback: impl Fn(HistoryStatus) + 'static) -> HistorySubscription {
        self.listeners.subscribe(callback)
    }

    fn notify(&self) {
        self.listeners.notify(self.status());
    }

    fn enforce_depth(&mut self) {
        let limit = self.config.effective_depth();
        while self.undo_stack.len() > limit {
            self.undo_stack.pop_front();
            trace!(limit, "history at capacity; evicted oldest snapshot");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
