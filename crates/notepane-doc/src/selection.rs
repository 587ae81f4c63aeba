#![forbid(unsafe_code)]

//! Structural selection addressing.
//!
//! Undo and redo replace the whole document, so node handles captured before
//! the swap mean nothing afterwards. A selection is therefore stored as a
//! [`SelectionSpan`]: for each endpoint, the child-index path from the root to
//! its container plus an offset. Paths are resolved again against whatever
//! tree is live when the selection is restored.
//!
//! Encoding fails when an endpoint is outside the document; decoding fails
//! when a path walks off the current tree (a node was removed since the
//! span was captured). Both failures are reported as `None` so callers apply
//! content without a selection instead of aborting.

use notepane_history::SelectionSpan;
use tracing::{debug, trace};

use crate::error::PathError;
use crate::tree::DocumentTree;

/// One selection endpoint: a container node and an offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> SelectionPoint<N> {
    #[must_use]
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A live selection expressed with node handles of one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange<N> {
    pub start: SelectionPoint<N>,
    pub end: SelectionPoint<N>,
}

impl<N: Copy> SelectionRange<N> {
    #[must_use]
    pub fn new(start: SelectionPoint<N>, end: SelectionPoint<N>) -> Self {
        Self { start, end }
    }

    /// A collapsed range at `node`/`offset`.
    #[must_use]
    pub fn caret(node: N, offset: usize) -> Self {
        let point = SelectionPoint::new(node, offset);
        Self {
            start: point,
            end: point,
        }
    }
}

/// Child-index path from the root of `tree` down to `node`.
pub fn node_path<T: DocumentTree>(tree: &T, node: T::Node) -> Result<Vec<usize>, PathError> {
    let root = tree.root();
    let mut path = Vec::new();
    let mut cursor = node;
    while cursor != root {
        let parent = tree.parent(cursor).ok_or(PathError::NotDescendant)?;
        let index = tree.child_index(cursor).ok_or(PathError::NotDescendant)?;
        path.push(index);
        cursor = parent;
    }
    path.reverse();
    Ok(path)
}

/// Walk `path` down from the root of `tree`.
pub fn resolve_path<T: DocumentTree>(tree: &T, path: &[usize]) -> Result<T::Node, PathError> {
    let mut node = tree.root();
    for (depth, &index) in path.iter().enumerate() {
        node = tree
            .child(node, index)
            .ok_or_else(|| PathError::IndexOutOfRange {
                depth,
                index,
                len: tree.child_count(node),
            })?;
    }
    Ok(node)
}

/// Encode a live selection as structural paths.
///
/// Returns `None` if either endpoint is not inside the document.
pub fn encode<T: DocumentTree>(tree: &T, range: &SelectionRange<T::Node>) -> Option<SelectionSpan> {
    let start_path = endpoint_path(tree, range.start.node, "start")?;
    let end_path = endpoint_path(tree, range.end.node, "end")?;
    Some(SelectionSpan {
        start_path,
        start_offset: range.start.offset,
        end_path,
        end_offset: range.end.offset,
    })
}

/// Resolve a stored span against the current tree.
///
/// Returns `None` if either path no longer exists. Offsets past the end of
/// their container are clamped to its [`offset_limit`](DocumentTree::offset_limit).
pub fn decode<T: DocumentTree>(tree: &T, span: &SelectionSpan) -> Option<SelectionRange<T::Node>> {
    let start = endpoint_point(tree, &span.start_path, span.start_offset, "start")?;
    let end = endpoint_point(tree, &span.end_path, span.end_offset, "end")?;
    Some(SelectionRange { start, end })
}

fn endpoint_path<T: DocumentTree>(tree: &T, node: T::Node, which: &'static str) -> Option<Vec<usize>> {
    match node_path(tree, node) {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(endpoint = which, ?node, %err, "selection encode failed");
            None
        }
    }
}

fn endpoint_point<T: DocumentTree>(
    tree: &T,
    path: &[usize],
    offset: usize,
    which: &'static str,
) -> Option<SelectionPoint<T::Node>> {
    let node = match resolve_path(tree, path) {
        Ok(node) => node,
        Err(err) => {
            debug!(endpoint = which, ?path, %err, "selection decode failed");
            return None;
        }
    };
    let limit = tree.offset_limit(node);
    if offset > limit {
        trace!(endpoint = which, offset, limit, "clamping stale selection offset");
    }
    Some(SelectionPoint::new(node, offset.min(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, NodeTree};

    /// `<p>Hello <b>big</b> world</p><p>second</p>`
    fn sample() -> NodeTree {
        NodeTree::from_markup("<p>Hello <b>big</b> world</p><p>second</p>").unwrap()
    }

    #[test]
    fn root_has_empty_path() {
        let tree = sample();
        assert_eq!(node_path(&tree, tree.root()), Ok(vec![]));
        assert_eq!(resolve_path(&tree, &[]), Ok(tree.root()));
    }

    #[test]
    fn nested_node_path() {
        let tree = sample();
        let p = tree.children(tree.root())[0];
        let b = tree.children(p)[1];
        let big = tree.children(b)[0];
        assert_eq!(node_path(&tree, big), Ok(vec![0, 1, 0]));
        assert_eq!(resolve_path(&tree, &[0, 1, 0]), Ok(big));
    }

    #[test]
    fn encode_then_decode_on_unchanged_tree_is_identity() {
        let tree = sample();
        let p0 = tree.children(tree.root())[0];
        let hello = tree.children(p0)[0];
        let p1 = tree.children(tree.root())[1];
        let second = tree.children(p1)[0];
        let range = SelectionRange::new(SelectionPoint::new(hello, 2), SelectionPoint::new(second, 4));

        let span = encode(&tree, &range).unwrap();
        assert_eq!(span.start_path, vec![0, 0]);
        assert_eq!(span.end_path, vec![1, 0]);
        assert_eq!(decode(&tree, &span), Some(range));
    }

    #[test]
    fn paths_resolve_against_a_freshly_parsed_tree() {
        let tree = sample();
        let p1 = tree.children(tree.root())[1];
        let second = tree.children(p1)[0];
        let span = encode(&tree, &SelectionRange::caret(second, 3)).unwrap();

        let rebuilt = NodeTree::from_markup(&tree.to_markup()).unwrap();
        let restored = decode(&rebuilt, &span).unwrap();
        assert_eq!(rebuilt.text(restored.start.node), Some("second"));
        assert_eq!(restored.start.offset, 3);
    }

    #[test]
    fn encode_fails_for_detached_endpoint() {
        let mut tree = sample();
        let p1 = tree.children(tree.root())[1];
        let second = tree.children(p1)[0];
        tree.detach(p1).unwrap();

        assert_eq!(node_path(&tree, second), Err(PathError::NotDescendant));
        assert!(encode(&tree, &SelectionRange::caret(second, 0)).is_none());
    }

    #[test]
    fn decode_fails_when_structure_shrank() {
        let tree = sample();
        let span = SelectionSpan {
            start_path: vec![0, 0],
            start_offset: 0,
            end_path: vec![5, 0],
            end_offset: 0,
        };
        assert!(decode(&tree, &span).is_none());
        assert_eq!(
            resolve_path(&tree, &[5, 0]),
            Err(PathError::IndexOutOfRange {
                depth: 0,
                index: 5,
                len: 2
            })
        );
    }

    #[test]
    fn decode_fails_when_either_endpoint_fails() {
        let tree = sample();
        let span = SelectionSpan {
            start_path: vec![9],
            start_offset: 0,
            end_path: vec![0],
            end_offset: 0,
        };
        assert!(decode(&tree, &span).is_none());
    }

    #[test]
    fn decode_clamps_offset_past_container_end() {
        let tree = sample();
        let span = SelectionSpan::caret(vec![1, 0], 42);
        let range = decode(&tree, &span).unwrap();
        assert_eq!(range.start.offset, "second".len());
        assert_eq!(range.end.offset, "second".len());
    }

    #[test]
    fn inserted_sibling_shifts_the_resolved_node() {
        let mut tree = sample();
        let p1 = tree.children(tree.root())[1];
        let second = tree.children(p1)[0];
        let span = encode(&tree, &SelectionRange::caret(second, 1)).unwrap();

        let root = tree.root();
        tree.insert(root, 0, NodeKind::element("hr")).unwrap();
        let range = decode(&tree, &span).unwrap();
        // Path [1, 0] now lands in the first paragraph.
        assert_eq!(tree.text(range.start.node), Some("Hello "));
    }
}
