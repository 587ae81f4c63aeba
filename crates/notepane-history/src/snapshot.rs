#![forbid(unsafe_code)]

//! Captured document states.
//!
//! A [`Snapshot`] pairs the serialized document with the selection that was
//! active when it was captured. The history never looks inside
//! [`SerializedDocument`]; it only compares two of them for equality and hands
//! them back verbatim on undo/redo.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

/// Opaque serialized form of a whole document tree (typically markup).
///
/// Cloning shares the underlying buffer.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SerializedDocument(Arc<str>);

impl SerializedDocument {
    /// Wrap serialized content.
    #[must_use]
    pub fn new(content: impl Into<Arc<str>>) -> Self {
        Self(content.into())
    }

    /// The serialized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SerializedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 48;
        match self.0.char_indices().nth(PREVIEW) {
            Some((cut, _)) => write!(f, "{:?}…({} bytes)", &self.as_str()[..cut], self.len()),
            None => write!(f, "{:?}", self.as_str()),
        }
    }
}

impl fmt::Display for SerializedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SerializedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SerializedDocument {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SerializedDocument {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A selection range addressed by structural paths.
///
/// Each path lists child indices from the document root down to the
/// container of the endpoint; an empty path is the root itself. Offsets are
/// character offsets inside text containers and child offsets inside
/// element containers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionSpan {
    pub start_path: Vec<usize>,
    pub start_offset: usize,
    pub end_path: Vec<usize>,
    pub end_offset: usize,
}

impl SelectionSpan {
    /// A collapsed span (caret) at `offset` inside the node at `path`.
    #[must_use]
    pub fn caret(path: Vec<usize>, offset: usize) -> Self {
        Self {
            end_path: path.clone(),
            start_path: path,
            start_offset: offset,
            end_offset: offset,
        }
    }

    /// True when both endpoints address the same position.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.start_path == self.end_path && self.start_offset == self.end_offset
    }
}

/// One undo-able document state.
///
/// Snapshots are immutable once pushed; the history stores them behind
/// `Arc` and hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub content: SerializedDocument,
    pub selection: Option<SelectionSpan>,
    /// Capture time in milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

impl Snapshot {
    /// Capture a snapshot stamped with the current wall-clock time.
    #[must_use]
    pub fn capture(content: SerializedDocument, selection: Option<SelectionSpan>) -> Self {
        Self::at(content, selection, now_millis())
    }

    /// Build a snapshot with an explicit timestamp.
    #[must_use]
    pub fn at(content: SerializedDocument, selection: Option<SelectionSpan>, timestamp: u64) -> Self {
        Self {
            content,
            selection,
            timestamp,
        }
    }

    /// Snapshot of `content` with no recorded selection.
    #[must_use]
    pub fn of_content(content: impl Into<SerializedDocument>) -> Self {
        Self::capture(content.into(), None)
    }
}

/// Milliseconds since the UNIX epoch, or 0 if the clock is before it.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_document_equality_is_by_content() {
        let a = SerializedDocument::from("<p>hi</p>");
        let b = SerializedDocument::from(String::from("<p>hi</p>"));
        assert_eq!(a, b);
        assert_ne!(a, SerializedDocument::from("<p>ho</p>"));
    }

    #[test]
    fn clone_shares_buffer() {
        let a = SerializedDocument::from("shared");
        let b = a.clone();
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
    }

    #[test]
    fn debug_truncates_long_content() {
        let long = "x".repeat(200);
        let doc = SerializedDocument::from(long.as_str());
        let s = format!("{doc:?}");
        assert!(s.contains("200 bytes"));
        assert!(s.len() < 100);
    }

    #[test]
    fn caret_is_collapsed() {
        let span = SelectionSpan::caret(vec![0, 1], 3);
        assert!(span.is_collapsed());
        let wide = SelectionSpan {
            end_offset: 5,
            ..span
        };
        assert!(!wide.is_collapsed());
    }

    #[test]
    fn capture_stamps_time() {
        let snap = Snapshot::of_content("A");
        assert!(snap.timestamp > 0);
        assert_eq!(snap.content.as_str(), "A");
        assert!(snap.selection.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_content_as_string() {
        let snap = Snapshot::at("AB".into(), Some(SelectionSpan::caret(vec![0], 2)), 7);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"content\":\"AB\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
