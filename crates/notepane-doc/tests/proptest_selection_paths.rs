#![forbid(unsafe_code)]

//! Property tests for structural selection paths.
//!
//! Validates:
//! - `resolve_path(node_path(n)) == n` for every attached node.
//! - Encode then decode on an unchanged tree is identity.
//! - Decoded offsets never exceed the container's offset limit.
//! - Removing the last child under a path makes that path fail to decode.
//! - Nodes inside a detached subtree cannot be encoded.

use proptest::prelude::*;

use notepane_doc::{
    DocumentTree, NodeId, NodeTree, SelectionPoint, SelectionRange, decode, encode, node_path,
    resolve_path,
};
use notepane_history::SelectionSpan;

// ============================================================================
// Strategy helpers
// ============================================================================

/// One build step: which existing element to append under, and whether the
/// new node is text.
fn steps_strategy() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((any::<usize>(), any::<bool>()), 1..40)
}

fn build(steps: &[(usize, bool)]) -> NodeTree {
    let mut tree = NodeTree::new();
    let mut elements = vec![tree.root()];
    for (i, &(selector, text)) in steps.iter().enumerate() {
        let parent = elements[selector % elements.len()];
        if text {
            tree.append_text(parent, format!("text-{i}")).unwrap();
        } else {
            let id = tree.append_element(parent, "span").unwrap();
            elements.push(id);
        }
    }
    tree
}

fn attached_nodes(tree: &NodeTree) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        out.push(id);
        stack.extend(tree.children(id).iter().copied());
    }
    out
}

// ============================================================================
// Path resolution
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn node_path_resolves_back_to_node(steps in steps_strategy()) {
        let tree = build(&steps);
        for node in attached_nodes(&tree) {
            let path = node_path(&tree, node).unwrap();
            prop_assert_eq!(resolve_path(&tree, &path), Ok(node));
        }
    }
}

// ============================================================================
// Encode/decode identity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn encode_decode_identity_on_unchanged_tree(
        steps in steps_strategy(),
        a in any::<usize>(),
        b in any::<usize>(),
        offset_seed in any::<usize>(),
    ) {
        let tree = build(&steps);
        let nodes = attached_nodes(&tree);
        let start = nodes[a % nodes.len()];
        let end = nodes[b % nodes.len()];
        let range = SelectionRange::new(
            SelectionPoint::new(start, offset_seed % (tree.offset_limit(start) + 1)),
            SelectionPoint::new(end, offset_seed % (tree.offset_limit(end) + 1)),
        );

        let span = encode(&tree, &range).unwrap();
        prop_assert_eq!(decode(&tree, &span), Some(range));
    }
}

// ============================================================================
// Offset clamping
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn decoded_offsets_stay_within_limit(
        steps in steps_strategy(),
        pick in any::<usize>(),
        offset in 0usize..10_000,
    ) {
        let tree = build(&steps);
        let nodes = attached_nodes(&tree);
        let node = nodes[pick % nodes.len()];
        let path = node_path(&tree, node).unwrap();

        let range = decode(&tree, &SelectionSpan::caret(path, offset)).unwrap();
        let limit = tree.offset_limit(node);
        prop_assert_eq!(range.start.node, node);
        prop_assert_eq!(range.start.offset, offset.min(limit));
        prop_assert!(range.end.offset <= limit);
    }
}

// ============================================================================
// Structural removal
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn removed_last_child_fails_to_decode(
        steps in steps_strategy(),
        pick in any::<usize>(),
    ) {
        let mut tree = build(&steps);
        let candidates: Vec<NodeId> = attached_nodes(&tree)
            .into_iter()
            .filter(|&n| {
                tree.parent(n)
                    .is_some_and(|p| tree.children(p).last() == Some(&n))
            })
            .collect();
        prop_assume!(!candidates.is_empty());
        let victim = candidates[pick % candidates.len()];

        let span = encode(&tree, &SelectionRange::caret(victim, 0)).unwrap();
        tree.detach(victim).unwrap();

        prop_assert!(decode(&tree, &span).is_none());
        prop_assert!(encode(&tree, &SelectionRange::caret(victim, 0)).is_none());
    }

    #[test]
    fn detached_subtree_cannot_be_encoded(
        steps in steps_strategy(),
        pick in any::<usize>(),
    ) {
        let mut tree = build(&steps);
        let root = tree.root();
        let top_level: Vec<NodeId> = tree.children(root).to_vec();
        prop_assume!(!top_level.is_empty());
        let victim = top_level[pick % top_level.len()];

        let mut subtree = vec![victim];
        let mut i = 0;
        while i < subtree.len() {
            subtree.extend(tree.children(subtree[i]).iter().copied());
            i += 1;
        }
        tree.detach(victim).unwrap();

        for node in subtree {
            prop_assert!(encode(&tree, &SelectionRange::caret(node, 0)).is_none());
        }
    }
}
