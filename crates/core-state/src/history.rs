use serde::Serialize;
use std::collections::VecDeque;
use tracing::trace;

/// Default maximum number of snapshots retained in history.
pub const HISTORY_CAP: usize = 50;

/// Content and caret captured at one point in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub content: String,
    /// Char offset of the caret within `content`.
    pub caret: usize,
}

impl Snapshot {
    pub fn new(content: impl Into<String>, caret: usize) -> Self {
        Self {
            content: content.into(),
            caret,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryDiagnostics {
    pub size: usize,
    pub cap: usize,
    pub cursor_index: usize,
    pub within_limit: bool,
}

/// Linear undo/redo history.
///
/// Snapshots live in a bounded deque with `cursor` pointing at the current
/// entry. Recording after an undo discards everything past the cursor; there
/// is no branching. Every boundary condition is a silent no-op.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    cap: usize,
    snapshots_skipped: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_cap(HISTORY_CAP)
    }

    /// History bounded to `cap` snapshots (at least one).
    pub fn with_cap(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap + 1),
            cursor: 0,
            cap,
            snapshots_skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor
    }

    /// Number of `record_if_changed` calls dropped as duplicates of the last snapshot.
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// Store a snapshot unless `content` equals the most recently recorded one.
    ///
    /// The comparison is against the tail of the history, not the cursor
    /// target. Returns whether a snapshot was stored.
    pub fn record_if_changed(&mut self, content: &str, caret: usize) -> bool {
        if let Some(last) = self.entries.back()
            && last.content == content
        {
            self.snapshots_skipped += 1;
            trace!(target: "state.history", size = self.entries.len(), cursor = self.cursor, "snapshot_dedupe_skip");
            return false;
        }
        if !self.entries.is_empty() {
            let dropped = self.entries.len() - (self.cursor + 1);
            if dropped > 0 {
                self.entries.truncate(self.cursor + 1);
                trace!(target: "state.history", dropped, "redo_branch_discarded");
            }
        }
        self.entries.push_back(Snapshot::new(content, caret));
        if self.entries.len() > self.cap {
            // The list shifts left under the cursor, so leaving it in place
            // lands it on the new tail.
            self.entries.pop_front();
            trace!(target: "state.history", cap = self.cap, "oldest_snapshot_evicted");
        } else if self.entries.len() > 1 {
            self.cursor += 1;
        }
        debug_assert_eq!(self.cursor, self.entries.len() - 1);
        trace!(target: "state.history", size = self.entries.len(), cursor = self.cursor, "record_snapshot");
        true
    }

    /// Step back one snapshot, returning the snapshot now current.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            trace!(target: "state.history", cursor = self.cursor, "undo_at_oldest");
            return None;
        }
        self.cursor -= 1;
        trace!(target: "state.history", size = self.entries.len(), cursor = self.cursor, "undo");
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot, returning the snapshot now current.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            trace!(target: "state.history", cursor = self.cursor, "redo_at_newest");
            return None;
        }
        self.cursor += 1;
        trace!(target: "state.history", size = self.entries.len(), cursor = self.cursor, "redo");
        self.entries.get(self.cursor)
    }

    pub fn diagnostics(&self) -> HistoryDiagnostics {
        HistoryDiagnostics {
            size: self.entries.len(),
            cap: self.cap,
            cursor_index: self.cursor,
            within_limit: self.entries.len() <= self.cap,
        }
    }
}
