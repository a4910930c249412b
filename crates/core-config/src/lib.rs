//! Configuration loading and parsing.
//!
//! Parses `chordpad.toml` (or an override path provided by the binary). Every
//! section and field is optional; absent values fall back to the defaults
//! below. Unknown fields are ignored so older binaries tolerate newer files.
//! A file that fails to parse is reported at WARN and replaced by defaults.
//!
//! ```toml
//! [input]
//! timeout = true      # expire an armed chord
//! timeoutlen = 1000   # arming window in ms
//!
//! [history]
//! cap = 50
//!
//! [edit]
//! indent_width = 2
//! comment_marker = "//"
//!
//! [highlight]
//! debounce_ms = 150
//!
//! [dashboard]
//! log_capacity = 100
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_timeout")]
    pub timeout: bool,
    #[serde(default = "InputConfig::default_timeoutlen")]
    pub timeoutlen: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            timeoutlen: Self::default_timeoutlen(),
        }
    }
}

impl InputConfig {
    const fn default_timeout() -> bool {
        true
    }
    const fn default_timeoutlen() -> u32 {
        1000
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_cap")]
    pub cap: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            cap: Self::default_cap(),
        }
    }
}

impl HistoryConfig {
    const fn default_cap() -> usize {
        50
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditConfig {
    #[serde(default = "EditConfig::default_indent_width")]
    pub indent_width: u8,
    #[serde(default = "EditConfig::default_comment_marker")]
    pub comment_marker: String,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            indent_width: Self::default_indent_width(),
            comment_marker: Self::default_comment_marker(),
        }
    }
}

impl EditConfig {
    const fn default_indent_width() -> u8 {
        2
    }
    fn default_comment_marker() -> String {
        "//".to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HighlightConfig {
    #[serde(default = "HighlightConfig::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

impl HighlightConfig {
    const fn default_debounce_ms() -> u64 {
        150
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "DashboardConfig::default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_capacity: Self::default_log_capacity(),
        }
    }
}

impl DashboardConfig {
    const fn default_log_capacity() -> usize {
        100
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub edit: EditConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("chordpad.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("chordpad").join("chordpad.toml");
    }
    PathBuf::from("chordpad.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match Config::parse(&content) {
        Ok(cfg) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Parse TOML text into a config, keeping the raw text.
    pub fn parse(content: &str) -> Result<Config> {
        let file = toml::from_str::<ConfigFile>(content)?;
        Ok(Config {
            raw: Some(content.to_string()),
            file,
        })
    }

    /// Chord arming window; `None` when chord expiry is disabled.
    pub fn chord_timeout(&self) -> Option<Duration> {
        let input = &self.file.input;
        input
            .timeout
            .then(|| Duration::from_millis(u64::from(input.timeoutlen)))
    }

    pub fn highlight_debounce(&self) -> Duration {
        Duration::from_millis(self.file.highlight.debounce_ms)
    }

    /// History cap, never below one snapshot.
    pub fn history_cap(&self) -> usize {
        self.file.history.cap.max(1)
    }

    /// Whitespace inserted by the Tab shortcut.
    pub fn indent(&self) -> String {
        " ".repeat(usize::from(self.file.edit.indent_width))
    }

    /// Line-comment marker; an empty marker falls back to `//`.
    pub fn comment_marker(&self) -> &str {
        let marker = self.file.edit.comment_marker.trim();
        if marker.is_empty() { "//" } else { marker }
    }

    pub fn log_capacity(&self) -> usize {
        self.file.dashboard.log_capacity.max(1)
    }
}
