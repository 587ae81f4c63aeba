#![forbid(unsafe_code)]

//! Reference surface and end-to-end fixtures for Notepane.
//!
//! [`MemorySurface`] implements the editor's surface and mutation ports
//! over an in-process [`NodeTree`](notepane_doc::NodeTree).
//! [`EditorFixture`] wires it to an [`EditSession`](notepane_editor::EditSession),
//! a [`FrameQueue`](notepane_editor::FrameQueue) and a recording toolbar so
//! tests can script whole editing sessions.

pub mod fixture;
pub mod surface;

pub use fixture::{EditorFixture, RecordingAffordance, RecordingToolbar};
pub use surface::{ALIGN_ATTR, MemorySurface};
