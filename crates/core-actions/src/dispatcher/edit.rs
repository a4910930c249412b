//! Text edit action handling (indent, comment toggle).
//!
//! Both edits mutate the buffer through `EditorState` helpers and then record
//! a history snapshot immediately, so the edit is one undo step even though
//! the host never reports it as a text change.

use super::DispatchResult;
use core_state::EditorState;

/// A single-line comment toggle, in chars relative to the line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEdit {
    /// Replacement text for the line.
    pub line: String,
    /// Offset where text was inserted or removed.
    pub at: usize,
    pub inserted: usize,
    pub removed: usize,
}

impl CommentEdit {
    /// Where a caret at `caret` (line-relative) lands after the edit.
    pub fn map_caret(&self, caret: usize) -> usize {
        if self.inserted > 0 {
            if caret >= self.at {
                caret + self.inserted
            } else {
                caret
            }
        } else if caret <= self.at {
            caret
        } else if caret >= self.at + self.removed {
            caret - self.removed
        } else {
            self.at
        }
    }
}

/// Toggle `marker` on one line: strip the first marker (plus at most one
/// following space) when the trimmed line starts with it, else prepend
/// `marker` and a space.
pub fn toggle_comment_line(line: &str, marker: &str) -> CommentEdit {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix(marker) {
        let (rest, space) = match rest.strip_prefix(' ') {
            Some(r) => (r, 1),
            None => (rest, 0),
        };
        let indent = &line[..line.len() - trimmed.len()];
        CommentEdit {
            line: format!("{indent}{rest}"),
            at: indent.chars().count(),
            inserted: 0,
            removed: marker.chars().count() + space,
        }
    } else {
        CommentEdit {
            line: format!("{marker} {line}"),
            at: 0,
            inserted: marker.chars().count() + 1,
            removed: 0,
        }
    }
}

pub(crate) fn handle_indent(state: &mut EditorState, indent: &str) -> DispatchResult {
    if indent.is_empty() {
        return DispatchResult::clean();
    }
    let before = state.caret();
    state.insert_at_caret(indent);
    state.record_snapshot();
    tracing::trace!(target: "actions.dispatch", op = "indent", from = before, to = state.caret(), "edit");
    DispatchResult::dirty()
}

pub(crate) fn handle_toggle_comment(state: &mut EditorState, marker: &str) -> DispatchResult {
    let caret = state.caret();
    let span = state.buffer().line_span(caret);
    let line = state.buffer().slice(span.range());
    let edit = toggle_comment_line(&line, marker);
    let within = caret.saturating_sub(span.start).min(span.len());
    let new_caret = span.start + edit.map_caret(within);
    state.replace_range(span.range(), &edit.line, new_caret);
    state.record_snapshot();
    tracing::trace!(
        target: "actions.dispatch",
        op = "toggle_comment",
        line = span.line,
        inserted = edit.inserted,
        removed = edit.removed,
        caret = new_caret,
        "edit"
    );
    DispatchResult::dirty()
}
