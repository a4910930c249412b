//! Keyboard event counters and the bounded event log feeding the dashboard.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::trace;

/// Default number of log entries retained.
pub const EVENT_LOG_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Down,
    Up,
    Press,
}

impl KeyEventKind {
    pub fn label(self) -> &'static str {
        match self {
            KeyEventKind::Down => "keydown",
            KeyEventKind::Up => "keyup",
            KeyEventKind::Press => "keypress",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyboardEventCounts {
    pub key_down: u64,
    pub key_up: u64,
    pub key_press: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogEntry {
    pub sequence_id: u64,
    pub message: String,
    pub timestamp: Instant,
}

#[derive(Debug, Clone)]
pub struct EventCounter {
    counts: KeyboardEventCounts,
    log: VecDeque<EventLogEntry>,
    capacity: usize,
    next_sequence: u64,
}

impl Default for EventCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCounter {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            counts: KeyboardEventCounts::default(),
            log: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 1,
        }
    }

    pub fn counts(&self) -> KeyboardEventCounts {
        self.counts
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count a classified key event and append its description to the log.
    pub fn record_key(&mut self, kind: KeyEventKind, message: impl Into<String>, now: Instant) {
        match kind {
            KeyEventKind::Down => self.counts.key_down += 1,
            KeyEventKind::Up => self.counts.key_up += 1,
            KeyEventKind::Press => self.counts.key_press += 1,
        }
        self.log_message(message, now);
    }

    /// Append a log entry without touching the counters.
    pub fn log_message(&mut self, message: impl Into<String>, now: Instant) {
        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(EventLogEntry {
            sequence_id: self.next_sequence,
            message: message.into(),
            timestamp: now,
        });
        self.next_sequence += 1;
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &EventLogEntry> {
        self.log.iter().skip(self.log.len().saturating_sub(n))
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Reset counts, log and sequence numbering.
    pub fn clear(&mut self) {
        trace!(target: "state.counters", dropped = self.log.len(), "counters_cleared");
        self.counts = KeyboardEventCounts::default();
        self.log.clear();
        self.next_sequence = 1;
    }
}
