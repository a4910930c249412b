//! Replay scripts: a line-oriented description of host notifications.
//!
//! ```text
//! # comment
//! text 3 foo          # content changed; caret then content (`\n` escapes)
//! key Ctrl+K          # keydown, keypress when it produces text, keyup
//! down Ctrl           # bare keydown
//! up Ctrl             # bare keyup
//! wait 200            # sleep in milliseconds
//! clear               # dashboard clear
//! ```

use anyhow::{Context, Result, bail};
use core_events::{AsyncEventSource, CHANNEL_SEND_FAILURES, Event, InputEvent, KeyEvent};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Send(InputEvent),
    Wait(Duration),
}

pub fn parse(source: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        parse_line(line, &mut steps)
            .with_context(|| format!("script line {}: `{line}`", idx + 1))?;
    }
    Ok(steps)
}

fn parse_line(line: &str, steps: &mut Vec<Step>) -> Result<()> {
    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();
    match cmd {
        "text" => {
            let (caret, content) = rest.split_once(' ').unwrap_or((rest, ""));
            let caret: usize = caret.parse().context("caret must be a char offset")?;
            steps.push(Step::Send(InputEvent::TextChanged {
                content: unescape(content),
                caret,
            }));
        }
        "key" => {
            let key = key_arg(rest)?;
            steps.push(Step::Send(InputEvent::KeyDown(key)));
            if key.produces_text() {
                steps.push(Step::Send(InputEvent::KeyPress(key)));
            }
            steps.push(Step::Send(InputEvent::KeyUp(key)));
        }
        "down" => steps.push(Step::Send(InputEvent::KeyDown(key_arg(rest)?))),
        "up" => steps.push(Step::Send(InputEvent::KeyUp(key_arg(rest)?))),
        "wait" => {
            let ms: u64 = rest.trim().parse().context("wait takes milliseconds")?;
            steps.push(Step::Wait(Duration::from_millis(ms)));
        }
        "clear" => steps.push(Step::Send(InputEvent::Clear)),
        other => bail!("unknown command `{other}`"),
    }
    Ok(())
}

fn key_arg(spec: &str) -> Result<KeyEvent> {
    Ok(spec.parse::<KeyEvent>()?)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Event source replaying parsed steps, ending with `Event::Shutdown`.
pub struct ScriptEventSource {
    steps: Vec<Step>,
}

impl ScriptEventSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

impl AsyncEventSource for ScriptEventSource {
    fn name(&self) -> &'static str {
        "script"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let total = self.steps.len();
            for step in self.steps {
                match step {
                    Step::Send(ev) => {
                        if tx.send(Event::Input(ev)).await.is_err() {
                            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                            warn!(target: "runtime.events", source = "script", "channel_closed");
                            return;
                        }
                    }
                    Step::Wait(d) => tokio::time::sleep(d).await,
                }
            }
            debug!(target: "runtime.events", source = "script", steps = total, "script_complete");
            if tx.send(Event::Shutdown).await.is_err() {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            }
        })
    }
}
