#![no_main]

use libfuzzer_sys::fuzz_target;
use notepane_doc::NodeTree;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Arbitrary input may be rejected but must never panic.
    let Ok(tree) = NodeTree::from_markup(input) else {
        return;
    };

    // Serialized output always parses, and serializing is stable from there.
    let first = tree.to_markup();
    let reparsed = NodeTree::from_markup(&first).expect("serialized markup must parse");
    assert_eq!(reparsed.to_markup(), first, "markup round trip drifted");
    assert_eq!(reparsed.plain_text(), tree.plain_text());
});
