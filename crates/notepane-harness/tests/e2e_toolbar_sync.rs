#![forbid(unsafe_code)]

//! Toolbar affordances follow the history, once per frame.

use std::cell::RefCell;
use std::rc::Rc;

use notepane_harness::EditorFixture;

fn fixture(markup: &str) -> EditorFixture {
    EditorFixture::new(markup).unwrap()
}

#[test]
fn first_frame_writes_initial_state() {
    let fx = fixture("<p>a</p>");
    assert_eq!(fx.frames.pending(), 1);
    assert!(fx.toolbar.undo.writes().is_empty());

    assert_eq!(fx.frame(), 1);
    assert_eq!(fx.toolbar.undo.enabled(), Some(false));
    assert_eq!(fx.toolbar.redo.enabled(), Some(false));
}

#[test]
fn keystrokes_in_one_frame_write_once() {
    let mut fx = fixture("<p>a</p>");
    fx.frame();
    fx.type_keystrokes("bcd");
    assert_eq!(fx.frames.pending(), 1);

    fx.frame();
    assert_eq!(fx.toolbar.undo.writes(), vec![false, true]);
    assert_eq!(fx.toolbar.redo.writes(), vec![false, false]);
    assert_eq!(fx.toolbar_sync().unwrap().frames_flushed(), 2);
}

#[test]
fn frame_writes_the_final_state_of_the_burst() {
    let mut fx = fixture("<p>a</p>");
    fx.type_text("b");
    fx.undo();
    assert!(fx.toolbar_sync().unwrap().latest().can_redo());

    fx.frame();
    assert_eq!(fx.toolbar.undo.enabled(), Some(false));
    assert_eq!(fx.toolbar.redo.enabled(), Some(true));
    assert_eq!(fx.toolbar.undo.writes().len(), 1);
}

#[test]
fn quiet_frames_write_nothing() {
    let fx = fixture("<p>a</p>");
    fx.frame();
    assert_eq!(fx.frame(), 0);
    assert_eq!(fx.frame(), 0);
    assert_eq!(fx.toolbar.undo.writes().len(), 1);
}

#[test]
fn disposed_sync_ignores_its_pending_frame() {
    let mut fx = fixture("<p>a</p>");
    fx.frame();
    fx.type_text("b");
    assert_eq!(fx.frames.pending(), 1);

    fx.dispose_toolbar();
    assert_eq!(fx.frame(), 1);
    assert_eq!(fx.toolbar.undo.writes(), vec![false]);
    assert_eq!(fx.frames.pending(), 0);

    fx.type_text("c");
    assert_eq!(fx.frames.pending(), 0);
}

#[test]
fn affordances_are_looked_up_once() {
    let mut fx = fixture("<p>a</p>");
    for ch in ["b", "c", "d"] {
        fx.type_text(ch);
        fx.frame();
        fx.undo();
        fx.frame();
    }
    assert_eq!(fx.toolbar.lookups(), 2);
    assert!(fx.toolbar.undo.writes().len() > 3);
}

#[test]
fn history_listener_sees_every_change() {
    let mut fx = fixture("<p>a</p>");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = fx
        .session
        .on_history_changed(move |undo, redo| sink.borrow_mut().push((undo, redo)));

    fx.type_text("b");
    fx.type_text("c");
    fx.undo();
    assert_eq!(
        *seen.borrow(),
        vec![(true, false), (true, false), (true, true)]
    );

    drop(subscription);
    fx.redo();
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn reset_reenables_nothing() {
    let mut fx = fixture("<p>a</p>");
    fx.type_keystrokes("bc");
    fx.undo();
    fx.session.reset_session("<p>fresh</p>");
    fx.frame();
    assert_eq!(fx.toolbar.undo.enabled(), Some(false));
    assert_eq!(fx.toolbar.redo.enabled(), Some(false));
}
