//! `EditStateManager`: one instance per text surface.
//!
//! The host forwards every surface notification here and applies whatever the
//! returned `KeyDecision` asks for. All methods take the current instant so
//! chord expiry and debounce timing are deterministic under test.

use crate::dispatcher::{self, chord_action};
use crate::highlight::HighlightDebouncer;
use crate::{Action, ActionObserver, EditSettings, KeyDecision};
use core_config::Config;
use core_events::{InputEvent, KeyEvent};
use core_keymap::{ChordOutcome, ChordRecognizer, default_chords};
use core_state::{
    EditorState, EventCounter, EventLogEntry, HistoryDiagnostics, KeyEventKind,
    KeyboardEventCounts, Snapshot,
};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Content summary for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorView {
    pub content: String,
    pub history_size: usize,
}

/// Log entry with its timestamp expressed relative to manager creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub sequence_id: u64,
    pub elapsed_ms: u64,
    pub message: String,
}

/// Effective timing and capacity settings, echoed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSettings {
    /// `None` when chord expiry is disabled.
    pub chord_timeout_ms: Option<u64>,
    pub highlight_debounce_ms: u64,
    pub log_capacity: usize,
}

/// Everything the dashboard renders, in one serializable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub state: EditorView,
    pub caret: usize,
    pub highlight_calls: u64,
    pub keyboard: KeyboardEventCounts,
    pub history: HistoryDiagnostics,
    pub settings: DashboardSettings,
    pub recent_events: Vec<LogLine>,
}

pub struct EditStateManager {
    state: EditorState,
    chords: ChordRecognizer,
    counter: EventCounter,
    highlight: HighlightDebouncer,
    settings: EditSettings,
    observers: Vec<Box<dyn ActionObserver>>,
    started_at: Instant,
}

impl Default for EditStateManager {
    fn default() -> Self {
        Self::new(&Config::default(), "", Instant::now())
    }
}

impl EditStateManager {
    pub fn new(cfg: &Config, initial: &str, now: Instant) -> Self {
        debug!(
            target: "actions.manager",
            history_cap = cfg.history_cap(),
            chord_timeout_ms = cfg.chord_timeout().map(|d| d.as_millis() as u64),
            debounce_ms = cfg.highlight_debounce().as_millis() as u64,
            "manager_created"
        );
        Self {
            state: EditorState::new(initial, cfg.history_cap()),
            chords: ChordRecognizer::new(&default_chords(), cfg.chord_timeout()),
            counter: EventCounter::with_capacity(cfg.log_capacity()),
            highlight: HighlightDebouncer::new(cfg.highlight_debounce()),
            settings: EditSettings::from_config(cfg),
            observers: Vec::new(),
            started_at: now,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ActionObserver>) {
        self.observers.push(observer);
    }

    // ---------------------------------------------------------------------------------------------
    // Host notifications
    // ---------------------------------------------------------------------------------------------

    /// Route a host event to the matching handler. Returns the keydown decision
    /// for `KeyDown`, and a pass-through decision for everything else.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> KeyDecision {
        match event {
            InputEvent::TextChanged { content, caret } => {
                self.on_text_changed(&content, caret, now);
                KeyDecision::pass_through()
            }
            InputEvent::KeyDown(key) => self.on_key_down(key, now),
            InputEvent::KeyUp(key) => {
                self.on_key_up(key, now);
                KeyDecision::pass_through()
            }
            InputEvent::KeyPress(key) => {
                self.on_key_press(key, now);
                KeyDecision::pass_through()
            }
            InputEvent::Clear => {
                self.on_clear();
                KeyDecision::pass_through()
            }
        }
    }

    /// Content changed through ordinary typing.
    pub fn on_text_changed(&mut self, content: &str, caret: usize, now: Instant) {
        let changed = !self.state.buffer().eq_str(content);
        let recorded = self.state.set_text(content, caret);
        if changed {
            self.highlight.notify(now);
        }
        tracing::trace!(target: "actions.manager", changed, recorded, caret = self.state.caret(), "text_changed");
    }

    pub fn on_key_down(&mut self, key: KeyEvent, now: Instant) -> KeyDecision {
        let outcome = self.chords.resolve(key, now);
        let decision = match outcome {
            ChordOutcome::Fired(chord) => self.run(chord_action(chord), key, now),
            ChordOutcome::Extended | ChordOutcome::Rearmed => {
                // Recognizer state already advanced; observers still see the action.
                self.notify(Action::ArmChord);
                KeyDecision::consumed(Some(Action::ArmChord), None)
            }
            ChordOutcome::Discarded => KeyDecision::consumed(None, None),
            ChordOutcome::Waiting => KeyDecision::pass_through(),
            ChordOutcome::Inactive => match dispatcher::classify(&key, &self.chords) {
                Some(action) => self.run(action, key, now),
                None => KeyDecision::pass_through(),
            },
        };
        let message = match (decision.action, outcome) {
            (Some(action), _) => format!("keydown {key} ({})", action.label()),
            (None, ChordOutcome::Discarded) => format!("keydown {key} (chord discarded)"),
            (None, _) => format!("keydown {key}"),
        };
        self.counter.record_key(KeyEventKind::Down, message, now);
        decision
    }

    pub fn on_key_up(&mut self, key: KeyEvent, now: Instant) {
        self.counter
            .record_key(KeyEventKind::Up, format!("keyup {key}"), now);
    }

    pub fn on_key_press(&mut self, key: KeyEvent, now: Instant) {
        self.counter
            .record_key(KeyEventKind::Press, format!("keypress {key}"), now);
    }

    /// Reset dashboard counters and log. History is untouched.
    pub fn on_clear(&mut self) {
        self.counter.clear();
        debug!(target: "actions.manager", "dashboard_cleared");
    }

    /// Drive timers. Returns whether the highlight hook fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.highlight.poll(now)
    }

    fn notify(&self, action: Action) {
        for obs in &self.observers {
            obs.on_action(&action);
        }
    }

    fn run(&mut self, action: Action, key: KeyEvent, now: Instant) -> KeyDecision {
        self.notify(action);
        let result = dispatcher::dispatch(
            action,
            key,
            &mut self.state,
            &mut self.chords,
            &self.settings,
            now,
        );
        let apply = if result.dirty {
            self.highlight.notify(now);
            Some(Snapshot::new(self.state.content(), self.state.caret()))
        } else {
            None
        };
        debug!(target: "actions.dispatch", ?action, dirty = result.dirty, key = %key, "dispatched");
        KeyDecision::consumed(Some(action), apply)
    }

    // ---------------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------------

    pub fn state(&self) -> EditorView {
        EditorView {
            content: self.state.content(),
            history_size: self.state.history().len(),
        }
    }

    pub fn content(&self) -> String {
        self.state.content()
    }

    pub fn caret(&self) -> usize {
        self.state.caret()
    }

    pub fn can_undo(&self) -> bool {
        self.state.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.history().can_redo()
    }

    pub fn chord_armed(&self, now: Instant) -> bool {
        self.chords.is_armed(now)
    }

    pub fn highlight_call_count(&self) -> u64 {
        self.highlight.calls()
    }

    pub fn keyboard_event_counts(&self) -> KeyboardEventCounts {
        self.counter.counts()
    }

    /// Up to `n` most recent log entries, most recent last.
    pub fn recent_event_log(&self, n: usize) -> Vec<EventLogEntry> {
        self.counter.recent(n).cloned().collect()
    }

    pub fn history_diagnostics(&self) -> HistoryDiagnostics {
        self.state.history().diagnostics()
    }

    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            chord_timeout_ms: self.chords.timeout().map(|d| d.as_millis() as u64),
            highlight_debounce_ms: self.highlight.interval().as_millis() as u64,
            log_capacity: self.counter.capacity(),
        }
    }

    pub fn dashboard(&self, log_lines: usize) -> Dashboard {
        let recent_events = self
            .counter
            .recent(log_lines)
            .map(|e| LogLine {
                sequence_id: e.sequence_id,
                elapsed_ms: e
                    .timestamp
                    .saturating_duration_since(self.started_at)
                    .as_millis() as u64,
                message: e.message.clone(),
            })
            .collect();
        Dashboard {
            state: self.state(),
            caret: self.caret(),
            highlight_calls: self.highlight_call_count(),
            keyboard: self.keyboard_event_counts(),
            history: self.history_diagnostics(),
            settings: self.settings(),
            recent_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyCode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver(Arc<AtomicUsize>);

    impl ActionObserver for CountingObserver {
        fn on_action(&self, _action: &Action) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn observers_see_each_action() {
        let now = Instant::now();
        let mut m = EditStateManager::new(&Config::default(), "", now);
        let seen = Arc::new(AtomicUsize::new(0));
        m.add_observer(Box::new(CountingObserver(seen.clone())));
        m.on_key_down(KeyEvent::plain(KeyCode::Tab), now);
        m.on_key_down(KeyEvent::ctrl('z'), now);
        m.on_key_down(KeyEvent::plain(KeyCode::Char('a')), now);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn keydown_log_names_the_action() {
        let now = Instant::now();
        let mut m = EditStateManager::new(&Config::default(), "", now);
        m.on_key_down(KeyEvent::ctrl('z'), now);
        m.on_key_down(KeyEvent::plain(KeyCode::Char('q')), now);
        let log: Vec<_> = m
            .recent_event_log(10)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(log, ["keydown Ctrl+Z (undo)", "keydown Q"]);
    }

    #[test]
    fn handle_routes_events() {
        let now = Instant::now();
        let mut m = EditStateManager::default();
        m.handle(
            InputEvent::TextChanged {
                content: "hi".into(),
                caret: 2,
            },
            now,
        );
        let d = m.handle(InputEvent::KeyDown(KeyEvent::ctrl('z')), now);
        assert!(d.handled);
        assert_eq!(d.apply, Some(Snapshot::new("", 0)));
        m.handle(InputEvent::KeyUp(KeyEvent::ctrl('z')), now);
        m.handle(InputEvent::KeyPress(KeyEvent::plain(KeyCode::Char('a'))), now);
        assert_eq!(
            m.keyboard_event_counts(),
            KeyboardEventCounts {
                key_down: 1,
                key_up: 1,
                key_press: 1
            }
        );
        m.handle(InputEvent::Clear, now);
        assert_eq!(m.keyboard_event_counts(), KeyboardEventCounts::default());
    }

    #[test]
    fn dashboard_reports_relative_timestamps() {
        let t0 = Instant::now();
        let mut m = EditStateManager::new(&Config::default(), "x", t0);
        m.on_key_up(
            KeyEvent::plain(KeyCode::Char('x')),
            t0 + std::time::Duration::from_millis(42),
        );
        let dash = m.dashboard(5);
        assert_eq!(dash.recent_events.len(), 1);
        assert_eq!(dash.recent_events[0].elapsed_ms, 42);
        assert_eq!(dash.state.content, "x");
        assert_eq!(dash.history.size, 1);
        assert_eq!(
            dash.settings,
            DashboardSettings {
                chord_timeout_ms: Some(1000),
                highlight_debounce_ms: 150,
                log_capacity: 100,
            }
        );
    }
}
