#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use notepane_doc::{DocumentTree, NodeTree, decode, encode};
use notepane_history::SelectionSpan;

#[derive(Debug, Arbitrary)]
struct Input {
    markup: String,
    start_path: Vec<u8>,
    start_offset: u16,
    end_path: Vec<u8>,
    end_offset: u16,
}

fuzz_target!(|input: Input| {
    let Ok(tree) = NodeTree::from_markup(&input.markup) else {
        return;
    };
    let span = SelectionSpan {
        start_path: input.start_path.iter().map(|&i| usize::from(i % 8)).collect(),
        start_offset: usize::from(input.start_offset),
        end_path: input.end_path.iter().map(|&i| usize::from(i % 8)).collect(),
        end_offset: usize::from(input.end_offset),
    };

    // Stale spans fail to decode; they never panic.
    let Some(range) = decode(&tree, &span) else {
        return;
    };
    assert!(range.start.offset <= tree.offset_limit(range.start.node));
    assert!(range.end.offset <= tree.offset_limit(range.end.node));

    // A decoded range encodes back to the same paths.
    let again = encode(&tree, &range).expect("decoded range must encode");
    assert_eq!(again.start_path, span.start_path);
    assert_eq!(again.end_path, span.end_path);
});
