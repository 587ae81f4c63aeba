#![forbid(unsafe_code)]

//! Ports the session drives: the editable surface and the mutation port.
//!
//! Both are implemented by the host. A browser host wraps a
//! `contenteditable` element; the in-process reference lives in
//! `notepane-harness`.

use notepane_doc::{DocumentTree, SelectionRange};
use notepane_history::SerializedDocument;
use thiserror::Error;

use crate::command::PortCommand;

/// Node handle type of a surface's tree.
pub type SurfaceNode<S> = <<S as EditableSurface>::Tree as DocumentTree>::Node;

/// The live, user-editable rendering of one document.
pub trait EditableSurface {
    type Tree: DocumentTree;

    /// Current content in the surface's serialization.
    fn serialized_content(&self) -> SerializedDocument;

    /// Replace the whole content. The previous tree and every node handle
    /// into it are invalidated.
    fn set_serialized_content(&mut self, content: &SerializedDocument);

    /// Structural view used to encode and decode selections.
    fn tree(&self) -> &Self::Tree;

    /// Current selection, if the surface has one.
    fn selection(&self) -> Option<SelectionRange<SurfaceNode<Self>>>;

    fn set_selection(&mut self, range: SelectionRange<SurfaceNode<Self>>);

    /// Drop the selection to the surface's default caret position.
    fn collapse_selection(&mut self);
}

/// Applies formatting commands to the live document.
pub trait DocumentMutator {
    fn execute(&mut self, command: PortCommand) -> Result<(), MutationError>;
}

/// Failure reported by a [`DocumentMutator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The port does not implement this command.
    #[error("command {0:?} is not supported by this surface")]
    Unsupported(PortCommand),
    /// Nothing is selected and the command needs a selection.
    #[error("command {0:?} needs a selection")]
    NoSelection(PortCommand),
    /// The host rejected the command.
    #[error("command {command:?} rejected: {reason}")]
    Rejected { command: PortCommand, reason: String },
}
