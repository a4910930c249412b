//! Undo / Redo handling.
//!
//! Both delegate to `EditorState`, which steps the history cursor and applies
//! the snapshot to the buffer. At either end of history nothing changes and
//! the result is clean; the keystroke is still consumed by the caller.

use super::DispatchResult;
use core_state::EditorState;

pub(crate) fn handle_undo(state: &mut EditorState) -> DispatchResult {
    match state.undo() {
        Some(snap) => {
            tracing::trace!(target: "actions.dispatch", op = "undo", caret = snap.caret, cursor = state.history().cursor_index(), "undo");
            DispatchResult::dirty()
        }
        None => {
            tracing::trace!(target: "actions.dispatch", op = "undo", "undo_noop");
            DispatchResult::clean()
        }
    }
}

pub(crate) fn handle_redo(state: &mut EditorState) -> DispatchResult {
    match state.redo() {
        Some(snap) => {
            tracing::trace!(target: "actions.dispatch", op = "redo", caret = snap.caret, cursor = state.history().cursor_index(), "redo");
            DispatchResult::dirty()
        }
        None => {
            tracing::trace!(target: "actions.dispatch", op = "redo", "redo_noop");
            DispatchResult::clean()
        }
    }
}
