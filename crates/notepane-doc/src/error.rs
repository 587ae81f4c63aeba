#![forbid(unsafe_code)]

//! Error types for tree edits, markup parsing and path resolution.

use thiserror::Error;

use crate::tree::NodeId;

/// Failure to edit a [`NodeTree`](crate::NodeTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} is a text node and cannot have children")]
    NotAnElement(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("insert index {index} out of range ({len} children)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the root node cannot be moved or renamed")]
    RootImmovable,
}

/// Failure to parse markup into a [`NodeTree`](crate::NodeTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unexpected end of input at byte {position}")]
    UnexpectedEof { position: usize },
    #[error("invalid tag name at byte {position}")]
    InvalidTagName { position: usize },
    #[error("malformed attribute at byte {position}")]
    MalformedAttribute { position: usize },
    #[error("closing tag </{found}> at byte {position} does not match <{expected}>")]
    MismatchedClose {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("closing tag </{found}> at byte {position} has no open element")]
    UnexpectedClose { found: String, position: usize },
    #[error("unclosed element <{tag}>")]
    Unclosed { tag: String },
    #[error("unknown character reference at byte {position}")]
    UnknownEntity { position: usize },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Failure to map between a node and its structural path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("node is not a descendant of the document root")]
    NotDescendant,
    #[error("child index {index} out of range at depth {depth} ({len} children)")]
    IndexOutOfRange {
        depth: usize,
        index: usize,
        len: usize,
    },
}
