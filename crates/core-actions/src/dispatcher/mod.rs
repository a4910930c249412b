//! Dispatcher applying an `Action` to mutable editor state.
//!
//! Sub-modules:
//! * `edit` - text mutation (indent, comment toggle)
//! * `undo` - undo / redo dispatch
//!
//! `classify` holds the keydown decision table. Rows are evaluated in order
//! and the first match wins:
//!
//! | key                               | action      |
//! |-----------------------------------|-------------|
//! | Ctrl/Cmd + Z (no Shift)           | `Undo`      |
//! | Ctrl/Cmd + Shift + Z, Ctrl/Cmd + Y | `Redo`      |
//! | Tab                               | `Indent`    |
//! | chord lead (Ctrl/Cmd + K)         | `ArmChord`  |
//!
//! Anything else is not a shortcut and passes through to the surface.

use crate::{Action, EditSettings};
use core_events::{KeyCode, KeyEvent};
use core_keymap::{ChordAction, ChordRecognizer};
use core_state::EditorState;
use std::time::Instant;

mod edit;
mod undo;

pub use edit::{CommentEdit, toggle_comment_line};

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Content or caret changed and must be pushed back to the surface.
    pub dirty: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self { dirty: true }
    }
    pub fn clean() -> Self {
        Self { dirty: false }
    }
}

/// Classify a keydown against the shortcut table.
pub fn classify(key: &KeyEvent, chords: &ChordRecognizer) -> Option<Action> {
    if key.ctrl_or_cmd() && key.is_char('z') && !key.shift() {
        return Some(Action::Undo);
    }
    if key.ctrl_or_cmd() && ((key.shift() && key.is_char('z')) || key.is_char('y')) {
        return Some(Action::Redo);
    }
    if key.code == KeyCode::Tab {
        return Some(Action::Indent);
    }
    if chords.is_lead(key) {
        return Some(Action::ArmChord);
    }
    None
}

pub(crate) fn chord_action(action: ChordAction) -> Action {
    match action {
        ChordAction::ToggleComment => Action::ToggleComment,
    }
}

/// Apply an action to editor state.
pub fn dispatch(
    action: Action,
    key: KeyEvent,
    state: &mut EditorState,
    chords: &mut ChordRecognizer,
    settings: &EditSettings,
    now: Instant,
) -> DispatchResult {
    match action {
        Action::Undo => undo::handle_undo(state),
        Action::Redo => undo::handle_redo(state),
        Action::Indent => edit::handle_indent(state, &settings.indent),
        Action::ToggleComment => edit::handle_toggle_comment(state, &settings.comment_marker),
        Action::ArmChord => {
            chords.arm(key, now);
            DispatchResult::clean()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyModifiers;

    fn chords() -> ChordRecognizer {
        ChordRecognizer::default()
    }

    fn key(spec: &str) -> KeyEvent {
        spec.parse().unwrap()
    }

    #[test]
    fn table_rows() {
        let c = chords();
        assert_eq!(classify(&key("Ctrl+Z"), &c), Some(Action::Undo));
        assert_eq!(classify(&key("Cmd+z"), &c), Some(Action::Undo));
        assert_eq!(classify(&key("Ctrl+Shift+Z"), &c), Some(Action::Redo));
        assert_eq!(classify(&key("Ctrl+Y"), &c), Some(Action::Redo));
        assert_eq!(classify(&key("Cmd+Shift+Y"), &c), Some(Action::Redo));
        assert_eq!(classify(&key("Tab"), &c), Some(Action::Indent));
        assert_eq!(classify(&key("Shift+Tab"), &c), Some(Action::Indent));
        assert_eq!(classify(&key("Ctrl+K"), &c), Some(Action::ArmChord));
    }

    #[test]
    fn non_shortcuts_pass_through() {
        let c = chords();
        assert_eq!(classify(&key("z"), &c), None);
        assert_eq!(classify(&key("Alt+Z"), &c), None);
        assert_eq!(classify(&key("Shift+Z"), &c), None);
        assert_eq!(classify(&key("k"), &c), None);
        assert_eq!(classify(&key("Ctrl+C"), &c), None);
        assert_eq!(classify(&key("Enter"), &c), None);
    }

    #[test]
    fn uppercase_key_from_host_is_normalized() {
        let upper = KeyEvent::new(KeyCode::Char('Z'), KeyModifiers::CTRL);
        assert_eq!(classify(&upper, &chords()), Some(Action::Undo));
    }

    #[test]
    fn arm_chord_dispatch_arms_recognizer() {
        let mut state = EditorState::default();
        let mut c = chords();
        let now = Instant::now();
        let res = dispatch(
            Action::ArmChord,
            key("Ctrl+K"),
            &mut state,
            &mut c,
            &EditSettings::default(),
            now,
        );
        assert_eq!(res, DispatchResult::clean());
        assert!(c.is_armed(now));
    }
}
