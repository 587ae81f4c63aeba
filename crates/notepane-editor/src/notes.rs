#![forbid(unsafe_code)]

//! Finished-note persistence interface.
//!
//! The history engine never touches storage. The shell saves the document
//! through a [`NoteStore`] after edits and after every applied undo/redo.
//! [`MemoryNoteStore`] is the in-process implementation; durable backends
//! implement the same trait.

use notepane_doc::NodeTree;
use notepane_history::now_millis;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::command::TextSize;

/// Title shown for a note whose content has no text.
pub const UNTITLED: &str = "New Note";

/// Characters of plain text shown in a list preview.
pub const PREVIEW_CHARS: usize = 100;

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Serialized document markup.
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub modified_at: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub text_size: TextSize,
}

/// Failure reported by a [`NoteStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no note with id {0:?}")]
    UnknownNote(String),
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Persistence for finished notes, keyed by id.
pub trait NoteStore {
    /// All notes, most recently created first.
    fn list(&self) -> Vec<Note>;

    fn get(&self, id: &str) -> Option<Note>;

    /// Create a note and place it first in the list.
    fn create(&mut self, title: &str, content: &str) -> Result<Note, StoreError>;

    /// Replace title and content and bump `modified_at`.
    fn update(&mut self, id: &str, title: &str, content: &str) -> Result<Note, StoreError>;

    fn set_text_size(&mut self, id: &str, text_size: TextSize) -> Result<Note, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;

    /// Notes whose title or content contains `term`, ignoring case.
    fn search(&self, term: &str) -> Vec<Note>;
}

/// In-memory [`NoteStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteStore {
    notes: Vec<Note>,
    last_id: u64,
}

impl MemoryNoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted notes, kept in the given order.
    #[must_use]
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let last_id = notes
            .iter()
            .filter_map(|note| note.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { notes, last_id }
    }

    /// Notes a durable backend should write: those with a non-blank title.
    #[must_use]
    pub fn saved_notes(&self) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|note| !note.title.trim().is_empty())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Millisecond timestamp id, bumped past the last one handed out.
    fn next_id(&mut self, now: u64) -> String {
        self.last_id = now.max(self.last_id.saturating_add(1));
        self.last_id.to_string()
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Note, StoreError> {
        self.notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| StoreError::UnknownNote(id.to_owned()))
    }
}

impl NoteStore for MemoryNoteStore {
    fn list(&self) -> Vec<Note> {
        self.notes.clone()
    }

    fn get(&self, id: &str) -> Option<Note> {
        self.notes.iter().find(|note| note.id == id).cloned()
    }

    fn create(&mut self, title: &str, content: &str) -> Result<Note, StoreError> {
        let now = now_millis();
        let note = Note {
            id: self.next_id(now),
            title: title.to_owned(),
            content: content.to_owned(),
            created_at: now,
            modified_at: now,
            text_size: TextSize::default(),
        };
        debug!(id = %note.id, "note created");
        self.notes.insert(0, note.clone());
        Ok(note)
    }

    fn update(&mut self, id: &str, title: &str, content: &str) -> Result<Note, StoreError> {
        let note = self.find_mut(id)?;
        note.title = title.to_owned();
        note.content = content.to_owned();
        note.modified_at = now_millis().max(note.modified_at);
        Ok(note.clone())
    }

    fn set_text_size(&mut self, id: &str, text_size: TextSize) -> Result<Note, StoreError> {
        let note = self.find_mut(id)?;
        note.text_size = text_size;
        Ok(note.clone())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let index = self
            .notes
            .iter()
            .position(|note| note.id == id)
            .ok_or_else(|| StoreError::UnknownNote(id.to_owned()))?;
        self.notes.remove(index);
        debug!(id, "note deleted");
        Ok(())
    }

    fn search(&self, term: &str) -> Vec<Note> {
        let term = term.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&term)
                    || note.content.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }
}

// ============================================================================
// List helpers
// ============================================================================

/// List title for `content`: its first non-empty line of text, trimmed.
#[must_use]
pub fn note_title(content: &str) -> String {
    plain_lines(content)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(UNTITLED)
        .to_owned()
}

/// List preview for `content`: its text, cut at [`PREVIEW_CHARS`]
/// characters with `...` appended when cut.
#[must_use]
pub fn note_preview(content: &str) -> String {
    let text = match NodeTree::from_markup(content) {
        Ok(tree) => tree.text_content(tree.root()),
        Err(_) => content.to_owned(),
    };
    let mut chars = text.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

/// Text of `content` with block boundaries as newlines. Content that does
/// not parse as markup is treated as plain text.
fn plain_lines(content: &str) -> String {
    match NodeTree::from_markup(content) {
        Ok(tree) => tree.plain_text(),
        Err(_) => content.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_first_non_empty_line() {
        assert_eq!(note_title("<p>Groceries</p><p>milk</p>"), "Groceries");
        assert_eq!(note_title("<p>  </p><p> Plan </p>"), "Plan");
        assert_eq!(note_title("first<br>second"), "first");
    }

    #[test]
    fn empty_content_gets_default_title() {
        assert_eq!(note_title(""), UNTITLED);
        assert_eq!(note_title("<p></p><br>"), UNTITLED);
    }

    #[test]
    fn unparseable_content_is_plain_text() {
        assert_eq!(note_title("a < b\nnext"), "a < b");
    }

    #[test]
    fn preview_truncates_at_limit() {
        let long = "x".repeat(150);
        let preview = note_preview(&format!("<p>{long}</p>"));
        assert_eq!(preview, format!("{}...", "x".repeat(100)));

        let exact = "y".repeat(100);
        assert_eq!(note_preview(&exact), exact);
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let text = "é".repeat(120);
        let preview = note_preview(&text);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_strips_markup() {
        assert_eq!(note_preview("<p>Hi <b>there</b></p>"), "Hi there");
    }

    #[test]
    fn create_puts_newest_first_with_unique_ids() {
        let mut store = MemoryNoteStore::new();
        let a = store.create("a", "").unwrap();
        let b = store.create("b", "").unwrap();
        assert_ne!(a.id, b.id);
        let titles: Vec<_> = store.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["b", "a"]);
        assert_eq!(a.text_size, TextSize::Md);
    }

    #[test]
    fn update_and_get() {
        let mut store = MemoryNoteStore::new();
        let note = store.create("t", "<p>old</p>").unwrap();
        let updated = store.update(&note.id, "t2", "<p>new</p>").unwrap();
        assert_eq!(updated.content, "<p>new</p>");
        assert!(updated.modified_at >= note.modified_at);
        assert_eq!(store.get(&note.id), Some(updated));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut store = MemoryNoteStore::new();
        assert_eq!(
            store.update("nope", "", ""),
            Err(StoreError::UnknownNote("nope".into()))
        );
        assert_eq!(store.delete("nope"), Err(StoreError::UnknownNote("nope".into())));
        assert_eq!(
            store.set_text_size("nope", TextSize::Lg),
            Err(StoreError::UnknownNote("nope".into()))
        );
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn delete_removes_note() {
        let mut store = MemoryNoteStore::new();
        let note = store.create("gone", "").unwrap();
        store.delete(&note.id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        let mut store = MemoryNoteStore::new();
        store.create("Shopping", "<p>Milk</p>").unwrap();
        store.create("Work", "<p>meeting notes</p>").unwrap();
        assert_eq!(store.search("SHOP").len(), 1);
        assert_eq!(store.search("milk").len(), 1);
        assert_eq!(store.search("NOTES")[0].title, "Work");
        assert_eq!(store.search("").len(), 2);
        assert!(store.search("absent").is_empty());
    }

    #[test]
    fn saved_notes_skip_blank_titles() {
        let mut store = MemoryNoteStore::new();
        store.create("   ", "draft").unwrap();
        store.create("Kept", "").unwrap();
        let saved = store.saved_notes();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Kept");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn text_size_is_stored_per_note() {
        let mut store = MemoryNoteStore::new();
        let note = store.create("n", "").unwrap();
        store.set_text_size(&note.id, TextSize::Xxl).unwrap();
        assert_eq!(store.get(&note.id).unwrap().text_size, TextSize::Xxl);
    }

    #[test]
    fn from_notes_continues_id_sequence() {
        let seeded = Note {
            id: u64::MAX.saturating_sub(1).to_string(),
            title: "old".into(),
            content: String::new(),
            created_at: 0,
            modified_at: 0,
            text_size: TextSize::Sm,
        };
        let mut store = MemoryNoteStore::from_notes(vec![seeded.clone()]);
        let fresh = store.create("new", "").unwrap();
        assert_eq!(fresh.id, u64::MAX.to_string());
        assert_eq!(store.list()[1], seeded);
    }
}
