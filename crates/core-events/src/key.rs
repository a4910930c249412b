//! Key identity and modifier model shared by the dispatcher, chord recognizer
//! and host adapters.
//!
//! Hosts report raw key names (browser style `"z"`, `"Z"`, `"Tab"`) plus
//! modifier flags. Everything downstream compares against the normalized form
//! produced here: printable characters are lower-cased so `Ctrl+Z` and
//! `Ctrl+Shift+z` both carry `KeyCode::Char('z')` and rely on the modifier mask
//! for the shift distinction.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
        /// Platform "command" key (Cmd on macOS, Super/Win elsewhere).
        const META  = 0b0000_1000;
    }
}

impl KeyModifiers {
    /// Cross-platform primary shortcut modifier: Ctrl on Linux/Windows, Cmd on macOS.
    pub fn ctrl_or_cmd(self) -> bool {
        self.intersects(KeyModifiers::CTRL | KeyModifiers::META)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// KeyCode enumerates normalized logical key representations consumed by higher layers.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    /// A modifier key pressed on its own (e.g. the Control keydown that precedes `C`).
    Modifier,
}

/// Normalize a raw key code so comparisons are case-insensitive.
pub fn normalize_keycode(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_lowercase().next().unwrap_or(c)),
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self {
            code: normalize_keycode(code),
            mods,
        }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub fn ctrl_or_cmd(&self) -> bool {
        self.mods.ctrl_or_cmd()
    }

    pub fn shift(&self) -> bool {
        self.mods.contains(KeyModifiers::SHIFT)
    }

    /// True when the key is the given character, ignoring case.
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(k) if k == c.to_lowercase().next().unwrap_or(c))
    }

    pub fn is_modifier_only(&self) -> bool {
        matches!(self.code, KeyCode::Modifier)
    }

    /// Whether a host would also emit a character-producing keypress for this key.
    pub fn produces_text(&self) -> bool {
        match self.code {
            KeyCode::Char(_) => !self.ctrl_or_cmd(),
            KeyCode::Enter => true,
            _ => false,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("Ctrl+")?;
        }
        if self.mods.contains(KeyModifiers::META) {
            f.write_str("Cmd+")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Esc => f.write_str("Esc"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Delete => f.write_str("Delete"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::Up => f.write_str("Up"),
            KeyCode::Down => f.write_str("Down"),
            KeyCode::Left => f.write_str("Left"),
            KeyCode::Right => f.write_str("Right"),
            KeyCode::Home => f.write_str("Home"),
            KeyCode::End => f.write_str("End"),
            KeyCode::Modifier => f.write_str("Modifier"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeySpecError {
    #[error("empty key spec")]
    Empty,
    #[error("key spec `{0}` has modifiers but no key")]
    MissingKey(String),
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

fn parse_modifier(token: &str) -> Option<KeyModifiers> {
    match token.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Some(KeyModifiers::CTRL),
        "shift" => Some(KeyModifiers::SHIFT),
        "alt" | "option" => Some(KeyModifiers::ALT),
        "meta" | "cmd" | "command" | "super" => Some(KeyModifiers::META),
        _ => None,
    }
}

fn parse_code(token: &str) -> Option<KeyCode> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    let code = match token.to_ascii_lowercase().as_str() {
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        other if parse_modifier(other).is_some() => KeyCode::Modifier,
        _ => return None,
    };
    Some(code)
}

/// Parses human-readable specs such as `Ctrl+Shift+Z`, `Cmd+k`, `Tab` or `Ctrl++`.
impl FromStr for KeyEvent {
    type Err = KeySpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeySpecError::Empty);
        }
        let (mods_part, key_part) = if s == "+" {
            ("", "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            s.rsplit_once('+').unwrap_or(("", s))
        };
        if key_part.is_empty() {
            return Err(KeySpecError::MissingKey(s.to_string()));
        }
        let mut mods = KeyModifiers::empty();
        for token in mods_part.split('+').filter(|t| !t.is_empty()) {
            mods |= parse_modifier(token)
                .ok_or_else(|| KeySpecError::UnknownModifier(token.to_string()))?;
        }
        let code =
            parse_code(key_part).ok_or_else(|| KeySpecError::UnknownKey(key_part.to_string()))?;
        Ok(KeyEvent::new(code, mods))
    }
}
