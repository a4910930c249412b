#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{EditStateManager, KeyDecision};
use core_config::Config;
use core_events::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

pub const MS: Duration = Duration::from_millis(1);

pub fn key(spec: &str) -> KeyEvent {
    spec.parse().expect("valid key spec")
}

pub fn ch(c: char) -> KeyEvent {
    KeyEvent::plain(KeyCode::Char(c))
}

/// Manager with default config seeded with `initial`, plus its creation instant.
pub fn manager(initial: &str) -> (EditStateManager, Instant) {
    let t0 = Instant::now();
    (EditStateManager::new(&Config::default(), initial, t0), t0)
}

/// Full host sequence for one key: keydown, keypress when it produces text, keyup.
pub fn stroke(m: &mut EditStateManager, spec: &str, now: Instant) -> KeyDecision {
    let k = key(spec);
    let decision = m.on_key_down(k, now);
    if !decision.handled && k.produces_text() {
        m.on_key_press(k, now);
    }
    m.on_key_up(k, now);
    decision
}

/// Type `text` the way a surface would: content grows and a change is reported.
pub fn type_text(m: &mut EditStateManager, text: &str, now: Instant) {
    let caret = m.caret();
    let mut chars: Vec<char> = m.content().chars().collect();
    let tail: Vec<char> = chars.split_off(caret);
    chars.extend(text.chars());
    let new_caret = chars.len();
    chars.extend(tail);
    let content: String = chars.into_iter().collect();
    m.on_text_changed(&content, new_caret, now);
}
