//! Shortcut actions and the `EditStateManager` facade driven by a host surface.
//!
//! Flow for a keydown:
//! 1. The chord recognizer sees the key first. A live armed chord consumes it
//!    (firing, re-arming or discarding).
//! 2. Otherwise the dispatcher's decision table classifies the key into an
//!    `Action` (undo, redo, indent, arm chord) or lets it through.
//! 3. The action runs against `EditorState`; any content change is reported
//!    back to the host as a snapshot to apply.

use core_config::Config;
use core_state::Snapshot;
use serde::Serialize;

pub mod dispatcher;
pub mod highlight;
pub mod manager;

pub use dispatcher::{DispatchResult, classify};
pub use highlight::HighlightDebouncer;
pub use manager::{Dashboard, DashboardSettings, EditStateManager, EditorView, LogLine};

/// Shortcut actions recognized on keydown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Undo,
    Redo,
    /// Insert indentation at the caret.
    Indent,
    /// Arm the chord recognizer with the current key as lead.
    ArmChord,
    ToggleComment,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::Indent => "indent",
            Action::ArmChord => "chord armed",
            Action::ToggleComment => "toggle comment",
        }
    }
}

/// Observer notified before each action is applied.
pub trait ActionObserver: Send + Sync {
    fn on_action(&self, action: &Action);
}

/// Edit parameters derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSettings {
    pub indent: String,
    pub comment_marker: String,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EditSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            indent: cfg.indent(),
            comment_marker: cfg.comment_marker().to_string(),
        }
    }
}

/// Answer returned to the host for a keydown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyDecision {
    /// The key was consumed; the host must suppress its default handling.
    pub handled: bool,
    /// Action performed, if any.
    pub action: Option<Action>,
    /// Content and caret the host must apply when the core changed them.
    pub apply: Option<Snapshot>,
}

impl KeyDecision {
    pub fn pass_through() -> Self {
        Self::default()
    }

    pub fn consumed(action: Option<Action>, apply: Option<Snapshot>) -> Self {
        Self {
            handled: true,
            action,
            apply,
        }
    }
}
