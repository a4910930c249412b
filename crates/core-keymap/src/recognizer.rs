//! Chord recognizer state machine.
//!
//! Idle -> (lead key) -> Armed -> (next keydown) -> Idle.
//!
//! * Only one chord is armed at a time. A lead key pressed while armed (and
//!   not completing a chord) re-arms with the new lead.
//! * Every keydown observed while armed is consumed, matching or not.
//! * Bare modifier key-downs are ignored: pressing Ctrl ahead of `C` neither
//!   resolves nor disarms the chord.
//! * Arming expires after `timeout`; a keydown after expiry is handled as if
//!   nothing were armed. A `None` timeout keeps the chord armed indefinitely.

use crate::{ChordAction, ChordSpec, ChordTrie, Resolution};
use core_events::KeyEvent;
use smallvec::SmallVec;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default arming window.
pub const DEFAULT_CHORD_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordOutcome {
    /// No chord armed (or it expired); the key is up to the dispatcher.
    Inactive,
    /// The key completed a chord.
    Fired(ChordAction),
    /// The key extended a multi-step chord; still armed.
    Extended,
    /// The key replaced the pending chord with a new lead.
    Rearmed,
    /// The key did not match; chord dropped, key swallowed.
    Discarded,
    /// Bare modifier while armed; chord still pending, key not consumed.
    Waiting,
}

impl ChordOutcome {
    /// Whether the keydown must be kept from the text surface.
    pub fn consumed(self) -> bool {
        !matches!(self, ChordOutcome::Inactive | ChordOutcome::Waiting)
    }
}

#[derive(Debug, Clone)]
pub struct ChordRecognizer {
    trie: ChordTrie,
    pending: SmallVec<[KeyEvent; 2]>,
    armed_at: Option<Instant>,
    timeout: Option<Duration>,
}

impl Default for ChordRecognizer {
    fn default() -> Self {
        Self::new(&crate::default_chords(), Some(DEFAULT_CHORD_TIMEOUT))
    }
}

impl ChordRecognizer {
    pub fn new(specs: &[ChordSpec], timeout: Option<Duration>) -> Self {
        Self {
            trie: ChordTrie::build(specs),
            pending: SmallVec::new(),
            armed_at: None,
            timeout,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether `key` starts a chord.
    pub fn is_lead(&self, key: &KeyEvent) -> bool {
        self.trie.is_lead(key)
    }

    /// Arm with `lead`, replacing any pending chord.
    pub fn arm(&mut self, lead: KeyEvent, now: Instant) {
        if !self.pending.is_empty() {
            debug!(target: "input.chord", replaced = %self.pending[0], lead = %lead, "chord_replaced");
        }
        self.pending.clear();
        self.pending.push(lead);
        self.armed_at = Some(now);
        debug!(target: "input.chord", lead = %lead, "chord_armed");
    }

    pub fn disarm(&mut self) {
        self.pending.clear();
        self.armed_at = None;
    }

    fn expired(&self, now: Instant) -> bool {
        match (self.armed_at, self.timeout) {
            (Some(at), Some(limit)) => now.saturating_duration_since(at) > limit,
            _ => false,
        }
    }

    /// Whether a chord is armed and still inside its window at `now`.
    pub fn is_armed(&self, now: Instant) -> bool {
        self.armed_at.is_some() && !self.expired(now)
    }

    /// Lead key of the pending chord, if any (ignores expiry).
    pub fn pending_lead(&self) -> Option<KeyEvent> {
        self.pending.first().copied()
    }

    /// Feed a keydown. Returns `Inactive` unless a chord was armed and live.
    pub fn resolve(&mut self, key: KeyEvent, now: Instant) -> ChordOutcome {
        if self.armed_at.is_none() {
            return ChordOutcome::Inactive;
        }
        if self.expired(now) {
            debug!(target: "input.chord", lead = ?self.pending_lead().map(|k| k.to_string()), "chord_expired");
            self.disarm();
            return ChordOutcome::Inactive;
        }
        if key.is_modifier_only() {
            return ChordOutcome::Waiting;
        }
        self.pending.push(key);
        match self.trie.resolve(&self.pending) {
            Resolution::Matched(action) => {
                debug!(target: "input.chord", key = %key, ?action, "chord_fired");
                self.disarm();
                ChordOutcome::Fired(action)
            }
            Resolution::NeedMore => {
                self.armed_at = Some(now);
                ChordOutcome::Extended
            }
            Resolution::NoMatch => {
                if self.trie.is_lead(&key) {
                    self.arm(key, now);
                    ChordOutcome::Rearmed
                } else {
                    debug!(target: "input.chord", key = %key, "chord_discarded");
                    self.disarm();
                    ChordOutcome::Discarded
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPattern, default_chords};
    use core_events::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn key(c: char) -> KeyEvent {
        KeyEvent::plain(KeyCode::Char(c))
    }

    #[test]
    fn idle_recognizer_is_inactive() {
        let mut r = ChordRecognizer::default();
        assert_eq!(r.resolve(KeyEvent::ctrl('c'), Instant::now()), ChordOutcome::Inactive);
        assert!(!ChordOutcome::Inactive.consumed());
    }

    #[test]
    fn lead_then_match_fires() {
        let mut r = ChordRecognizer::default();
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        assert!(r.is_armed(t0));
        let out = r.resolve(KeyEvent::ctrl('c'), t0 + Duration::from_millis(100));
        assert_eq!(out, ChordOutcome::Fired(ChordAction::ToggleComment));
        assert!(out.consumed());
        assert!(!r.is_armed(t0));
    }

    #[test]
    fn unrelated_key_discards_and_disarms() {
        let mut r = ChordRecognizer::default();
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        let out = r.resolve(key('x'), t0);
        assert_eq!(out, ChordOutcome::Discarded);
        assert!(out.consumed());
        assert_eq!(r.resolve(KeyEvent::ctrl('c'), t0), ChordOutcome::Inactive);
    }

    #[test]
    fn lead_while_armed_rearms() {
        let mut r = ChordRecognizer::default();
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        let t1 = t0 + Duration::from_millis(900);
        assert_eq!(r.resolve(KeyEvent::ctrl('k'), t1), ChordOutcome::Rearmed);
        // window restarts at t1
        let t2 = t1 + Duration::from_millis(900);
        assert_eq!(
            r.resolve(KeyEvent::ctrl('c'), t2),
            ChordOutcome::Fired(ChordAction::ToggleComment)
        );
    }

    #[test]
    fn chord_expires_after_timeout() {
        let mut r = ChordRecognizer::default();
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        let late = t0 + DEFAULT_CHORD_TIMEOUT + Duration::from_millis(1);
        assert!(!r.is_armed(late));
        assert_eq!(r.resolve(KeyEvent::ctrl('c'), late), ChordOutcome::Inactive);
        assert_eq!(r.pending_lead(), None);
    }

    #[test]
    fn no_timeout_keeps_chord_armed() {
        let mut r = ChordRecognizer::new(&default_chords(), None);
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        let much_later = t0 + Duration::from_secs(3600);
        assert!(r.is_armed(much_later));
        assert_eq!(
            r.resolve(KeyEvent::ctrl('c'), much_later),
            ChordOutcome::Fired(ChordAction::ToggleComment)
        );
    }

    #[test]
    fn bare_modifier_keeps_chord_pending() {
        let mut r = ChordRecognizer::default();
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        let ctrl = KeyEvent::new(KeyCode::Modifier, KeyModifiers::CTRL);
        let out = r.resolve(ctrl, t0);
        assert_eq!(out, ChordOutcome::Waiting);
        assert!(!out.consumed());
        assert_eq!(
            r.resolve(KeyEvent::ctrl('c'), t0),
            ChordOutcome::Fired(ChordAction::ToggleComment)
        );
    }

    #[test]
    fn three_step_chord_extends() {
        let specs = vec![ChordSpec {
            sequence: vec![
                KeyPattern::primary('k'),
                KeyPattern::primary('k'),
                KeyPattern::plain(KeyCode::Char('c')),
            ],
            action: ChordAction::ToggleComment,
        }];
        let mut r = ChordRecognizer::new(&specs, Some(DEFAULT_CHORD_TIMEOUT));
        let t0 = Instant::now();
        r.arm(KeyEvent::ctrl('k'), t0);
        assert_eq!(r.resolve(KeyEvent::ctrl('k'), t0), ChordOutcome::Extended);
        assert_eq!(
            r.resolve(key('c'), t0),
            ChordOutcome::Fired(ChordAction::ToggleComment)
        );
    }
}
