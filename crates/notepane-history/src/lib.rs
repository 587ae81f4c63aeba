#![forbid(unsafe_code)]

//! Notepane document history.
//!
//! Snapshot-based undo/redo for one open rich-text document:
//!
//! - [`Snapshot`] - serialized content plus a path-addressed selection
//! - [`DocumentHistory`] - bounded undo/redo stacks with content dedup
//! - [`HistorySubscription`] - RAII guard for size-change listeners
//!
//! The history is ephemeral. It is created or reset when an editing session
//! begins and dropped when the session ends.

pub mod history;
mod listener;
pub mod snapshot;

pub use history::{DocumentHistory, HistoryConfig, HistoryStatus, MAX_HISTORY};
pub use listener::HistorySubscription;
pub use snapshot::{SelectionSpan, SerializedDocument, Snapshot, now_millis};
