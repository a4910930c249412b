mod common;
use common::*;

use core_actions::Action;

#[test]
fn chord_toggles_comment_and_back() {
    let (mut m, t0) = manager("foo");
    let lead = stroke(&mut m, "Ctrl+K", t0);
    assert!(lead.handled);
    assert_eq!(lead.action, Some(Action::ArmChord));
    assert!(m.chord_armed(t0));

    let fire = stroke(&mut m, "Ctrl+C", t0 + MS * 10);
    assert!(fire.handled);
    assert_eq!(fire.action, Some(Action::ToggleComment));
    assert_eq!(m.content(), "// foo");
    assert_eq!(m.caret(), 6);
    assert!(!m.chord_armed(t0 + MS * 10));

    stroke(&mut m, "Ctrl+K", t0 + MS * 20);
    stroke(&mut m, "Ctrl+C", t0 + MS * 30);
    assert_eq!(m.content(), "foo");
    assert_eq!(m.caret(), 3);
}

#[test]
fn toggle_is_one_undo_step() {
    let (mut m, t0) = manager("foo");
    stroke(&mut m, "Ctrl+K", t0);
    stroke(&mut m, "Ctrl+C", t0);
    stroke(&mut m, "Ctrl+Z", t0);
    assert_eq!(m.content(), "foo");
    stroke(&mut m, "Ctrl+Y", t0);
    assert_eq!(m.content(), "// foo");
}

#[test]
fn unrelated_key_discards_chord() {
    let (mut m, t0) = manager("foo");
    stroke(&mut m, "Ctrl+K", t0);
    let d = stroke(&mut m, "x", t0);
    assert!(d.handled);
    assert_eq!(d.action, None);
    assert_eq!(m.content(), "foo");
    assert!(!m.chord_armed(t0));

    let after = stroke(&mut m, "Ctrl+C", t0);
    assert!(!after.handled);
    assert_eq!(m.content(), "foo");
}

#[test]
fn chord_expires_after_window() {
    let (mut m, t0) = manager("foo");
    stroke(&mut m, "Ctrl+K", t0);
    assert!(m.chord_armed(t0 + MS * 999));
    assert!(!m.chord_armed(t0 + MS * 1500));
    let d = stroke(&mut m, "Ctrl+C", t0 + MS * 1500);
    assert!(!d.handled);
    assert_eq!(m.content(), "foo");
}

#[test]
fn lead_while_armed_rearms() {
    let (mut m, t0) = manager("foo");
    stroke(&mut m, "Ctrl+K", t0);
    let again = stroke(&mut m, "Cmd+K", t0 + MS * 900);
    assert!(again.handled);
    assert!(m.chord_armed(t0 + MS * 1500));
    stroke(&mut m, "Ctrl+C", t0 + MS * 1500);
    assert_eq!(m.content(), "// foo");
}

#[test]
fn bare_modifier_does_not_resolve_chord() {
    let (mut m, t0) = manager("foo");
    stroke(&mut m, "Ctrl+K", t0);
    let d = m.on_key_down(key("Ctrl"), t0);
    assert!(!d.handled);
    assert!(m.chord_armed(t0));
    stroke(&mut m, "Ctrl+C", t0);
    assert_eq!(m.content(), "// foo");
}

#[test]
fn toggle_on_indented_middle_line() {
    let (mut m, t0) = manager("");
    m.on_text_changed("fn a() {\n    let x = 1;\n}", 14, t0);
    stroke(&mut m, "Ctrl+K", t0);
    stroke(&mut m, "Ctrl+C", t0);
    assert_eq!(m.content(), "fn a() {\n//     let x = 1;\n}");
    assert_eq!(m.caret(), 17);
}

#[test]
fn toggle_after_undo_reuses_newest_snapshot() {
    // Dedupe compares against the newest stored snapshot, not the cursor
    // target: re-applying the undone edit stores nothing new.
    let (mut m, t0) = manager("foo");
    stroke(&mut m, "Ctrl+K", t0);
    stroke(&mut m, "Ctrl+C", t0);
    stroke(&mut m, "Ctrl+Z", t0);
    assert_eq!(m.content(), "foo");

    stroke(&mut m, "Ctrl+K", t0);
    stroke(&mut m, "Ctrl+C", t0);
    assert_eq!(m.content(), "// foo");
    let diag = m.history_diagnostics();
    assert_eq!((diag.size, diag.cursor_index), (2, 0));
    assert!(!m.can_undo());
    assert!(m.can_redo());

    let undo = stroke(&mut m, "Ctrl+Z", t0);
    assert!(undo.handled);
    assert_eq!(undo.apply, None);
    assert_eq!(m.content(), "// foo");

    stroke(&mut m, "Ctrl+Y", t0);
    assert_eq!(m.content(), "// foo");
    assert_eq!(m.history_diagnostics().cursor_index, 1);
}
