//! core-keymap: chord table and two-step chord recognizer.
//!
//! Design principles:
//! - Chords are data: each `ChordSpec` lists the key patterns that must be
//!   pressed in sequence and the action they trigger. Specs are compiled into
//!   a small trie so lead keys shared by several chords resolve in one walk.
//! - Resolution is pure: `ChordTrie::resolve` depends only on the pending keys.
//!   Timing (the arming window) lives in `ChordRecognizer`, which takes the
//!   current instant from the caller.
//! - No side effects: logging only at TRACE/DEBUG.

use core_events::{KeyCode, KeyEvent};
use smallvec::SmallVec;
use tracing::trace;

mod recognizer;
pub use recognizer::{ChordOutcome, ChordRecognizer, DEFAULT_CHORD_TIMEOUT};

// -------------------------------------------------------------------------------------------------
// Public Symbolic Output
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordAction {
    /// Add or remove the line-comment marker on the caret line.
    ToggleComment,
}

// -------------------------------------------------------------------------------------------------
// Key Pattern
// -------------------------------------------------------------------------------------------------
/// One step of a chord: a key plus whether the primary shortcut modifier
/// (Ctrl or Cmd) must be held. Shift and Alt are not considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub ctrl_or_cmd: bool,
}

impl KeyPattern {
    /// `Ctrl+<c>` (or `Cmd+<c>`).
    pub fn primary(c: char) -> Self {
        Self {
            code: core_events::normalize_keycode(KeyCode::Char(c)),
            ctrl_or_cmd: true,
        }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self {
            code: core_events::normalize_keycode(code),
            ctrl_or_cmd: false,
        }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.ctrl_or_cmd == key.ctrl_or_cmd()
    }
}

// -------------------------------------------------------------------------------------------------
// Chord Definitions
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct ChordSpec {
    pub sequence: Vec<KeyPattern>,
    pub action: ChordAction,
}

/// Built-in chords: `Ctrl+K Ctrl+C` toggles a line comment.
pub fn default_chords() -> Vec<ChordSpec> {
    vec![ChordSpec {
        sequence: vec![KeyPattern::primary('k'), KeyPattern::primary('c')],
        action: ChordAction::ToggleComment,
    }]
}

// -------------------------------------------------------------------------------------------------
// Trie Representation
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
struct Edge {
    pat: KeyPattern,
    next: usize,
}

#[derive(Debug, Clone)]
struct Node {
    terminal: Option<ChordAction>,
    edges: SmallVec<[Edge; 4]>,
}

impl Node {
    fn new() -> Self {
        Self {
            terminal: None,
            edges: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChordTrie {
    nodes: Vec<Node>,
}

/// Result of walking the trie with the keys pressed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The keys complete a chord.
    Matched(ChordAction),
    /// The keys are a strict prefix of at least one chord.
    NeedMore,
    /// The keys do not lead anywhere.
    NoMatch,
}

impl ChordTrie {
    pub fn build(specs: &[ChordSpec]) -> Self {
        let mut trie = ChordTrie {
            nodes: vec![Node::new()],
        };
        for (idx, spec) in specs.iter().enumerate() {
            if spec.sequence.is_empty() {
                trace!(target: "input.chord", spec_index = idx, "empty_chord_ignored");
                continue;
            }
            let mut cur = 0usize;
            for pat in &spec.sequence {
                let next = if let Some(e) = trie.nodes[cur].edges.iter().find(|e| e.pat == *pat) {
                    e.next
                } else {
                    let new_idx = trie.nodes.len();
                    trie.nodes.push(Node::new());
                    trie.nodes[cur].edges.push(Edge {
                        pat: *pat,
                        next: new_idx,
                    });
                    new_idx
                };
                cur = next;
            }
            if trie.nodes[cur].terminal.is_some() {
                // Later spec overrides earlier.
                trace!(target: "input.chord", spec_index = idx, node = cur, "terminal_override");
            }
            trie.nodes[cur].terminal = Some(spec.action);
        }
        trie
    }

    pub fn resolve(&self, keys: &[KeyEvent]) -> Resolution {
        let mut node_idx = 0usize;
        for (i, key) in keys.iter().enumerate() {
            match self.nodes[node_idx].edges.iter().find(|e| e.pat.matches(key)) {
                Some(edge) => {
                    node_idx = edge.next;
                    trace!(target: "input.chord", step = i, key = %key, node = node_idx, "advance");
                }
                None => return Resolution::NoMatch,
            }
        }
        if node_idx == 0 {
            return Resolution::NoMatch;
        }
        // A chord that is also the prefix of a longer one waits for the longer one.
        let node = &self.nodes[node_idx];
        if !node.edges.is_empty() {
            Resolution::NeedMore
        } else if let Some(action) = node.terminal {
            Resolution::Matched(action)
        } else {
            Resolution::NoMatch
        }
    }

    /// Whether `key` starts at least one chord.
    pub fn is_lead(&self, key: &KeyEvent) -> bool {
        matches!(self.resolve(std::slice::from_ref(key)), Resolution::NeedMore)
    }
}
