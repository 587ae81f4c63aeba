#![forbid(unsafe_code)]

//! Notepane document model.
//!
//! - [`DocumentTree`] - the structural view selections are addressed against
//! - [`NodeTree`] - arena tree with a small HTML-like markup codec
//! - [`selection`] - encode live selections as child-index paths and back
//!
//! Selections are stored by path rather than by node handle because undo and
//! redo rebuild the document from serialized markup.

pub mod error;
mod markup;
pub mod selection;
pub mod tree;

pub use error::{MarkupError, PathError, TreeError};
pub use selection::{SelectionPoint, SelectionRange, decode, encode, node_path, resolve_path};
pub use tree::{DocumentTree, NodeId, NodeKind, NodeTree, ROOT_TAG};
