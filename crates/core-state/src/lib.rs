//! Editor state: the text buffer, caret, undo history and dashboard counters.
//!
//! History model:
//! - `History` stores whole-content snapshots in a bounded, linear list with a
//!   cursor. Recording after an undo drops the redo branch.
//! - Snapshots are taken after each host-reported text change and after each
//!   shortcut mutation (indent, comment toggle). Undo/redo replace the buffer
//!   with the snapshot content and restore its caret; they never record.
//! - Dedupe compares against the newest stored snapshot, so a text-changed
//!   notification repeating the same content is a no-op.
//!
//! Telemetry Integration:
//! - Snapshot lifecycle emits trace events under `state.history`
//!   (`record_snapshot`, `snapshot_dedupe_skip`, `redo_branch_discarded`,
//!   `oldest_snapshot_evicted`, `undo`, `redo`).

use core_text::Buffer;

pub mod counters;
pub mod history;

pub use counters::{
    EVENT_LOG_CAP, EventCounter, EventLogEntry, KeyEventKind, KeyboardEventCounts,
};
pub use history::{HISTORY_CAP, History, HistoryDiagnostics, Snapshot};

#[derive(Debug, Clone)]
pub struct EditorState {
    buffer: Buffer,
    caret: usize,
    history: History,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new("", HISTORY_CAP)
    }
}

impl EditorState {
    /// State seeded with `initial` content (caret at its end) as the first snapshot.
    pub fn new(initial: &str, history_cap: usize) -> Self {
        let buffer = Buffer::from_str(initial);
        let caret = buffer.len_chars();
        let mut history = History::with_cap(history_cap);
        history.record_if_changed(initial, caret);
        Self {
            buffer,
            caret,
            history,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn content(&self) -> String {
        self.buffer.contents()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Accept content reported by the host and snapshot it when it differs.
    /// Returns whether a snapshot was stored.
    pub fn set_text(&mut self, content: &str, caret: usize) -> bool {
        if !self.buffer.eq_str(content) {
            self.buffer.set(content);
        }
        self.caret = self.buffer.clamp_caret(caret);
        self.history.record_if_changed(content, self.caret)
    }

    /// Insert `text` at the caret and advance the caret past it. Does not snapshot.
    pub fn insert_at_caret(&mut self, text: &str) {
        self.caret = self.buffer.insert(self.caret, text);
    }

    /// Replace the chars in `range` and move the caret to `caret`. Does not snapshot.
    pub fn replace_range(&mut self, range: std::ops::Range<usize>, text: &str, caret: usize) {
        self.buffer.replace(range, text);
        self.caret = self.buffer.clamp_caret(caret);
    }

    /// Snapshot the current buffer and caret.
    pub fn record_snapshot(&mut self) -> bool {
        let content = self.buffer.contents();
        self.history.record_if_changed(&content, self.caret)
    }

    /// Step history back and apply the snapshot. Returns the applied snapshot.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let snap = self.history.undo()?.clone();
        self.apply(&snap);
        Some(snap)
    }

    /// Step history forward and apply the snapshot. Returns the applied snapshot.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snap = self.history.redo()?.clone();
        self.apply(&snap);
        Some(snap)
    }

    fn apply(&mut self, snap: &Snapshot) {
        self.buffer.set(&snap.content);
        self.caret = self.buffer.clamp_caret(snap.caret);
    }
}
