#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use notepane_history::{DocumentHistory, HistoryConfig, Snapshot};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u8),
    Undo,
    Redo,
    Reset(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    depth: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let limit = usize::from(input.depth % 16);
    let mut history = DocumentHistory::new(HistoryConfig::new(limit));
    history.reset(Snapshot::of_content("base"));

    for op in input.ops {
        match op {
            Op::Push(v) => {
                history.push(Snapshot::of_content(format!("doc-{}", v % 8)));
            }
            Op::Undo => {
                let before = history.undo_depth();
                let restored = history.undo();
                assert_eq!(restored.is_some(), before > 1);
            }
            Op::Redo => {
                history.redo();
            }
            Op::Reset(v) => {
                history.reset(Snapshot::of_content(format!("doc-{}", v % 8)));
                assert!(!history.can_undo());
                assert!(!history.can_redo());
            }
        }

        let depth = history.undo_depth();
        assert!(depth >= 1, "history emptied");
        assert!(depth <= limit.max(1), "depth cap exceeded");

        let contents: Vec<&str> = history
            .undo_entries()
            .map(|snapshot| snapshot.content.as_str())
            .collect();
        assert!(
            contents.windows(2).all(|pair| pair[0] != pair[1]),
            "adjacent duplicate entries"
        );
    }
});
