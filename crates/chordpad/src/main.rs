//! chordpad entrypoint: replays a host script through one `EditStateManager`
//! and prints the resulting dashboard as JSON.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{Action, ActionObserver, EditStateManager};
use core_config::load_from;
use core_events::{
    CHANNEL_SEND_FAILURES, EVENT_CHANNEL_CAP, Event, EventSourceRegistry, InputEvent,
    TickEventSource,
};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod script;

use script::ScriptEventSource;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "chordpad", version, about = "Replay editor shortcuts and report state")]
struct Args {
    /// Script to replay. Read from stdin when omitted.
    pub script: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `chordpad.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Initial surface content.
    #[arg(long = "initial", default_value = "")]
    pub initial: String,
    /// Tick interval driving the highlight debounce, in milliseconds.
    #[arg(long = "tick-ms", default_value_t = 25)]
    pub tick_ms: u64,
    /// Number of recent log entries included in the report.
    #[arg(long = "log-lines", default_value_t = 10)]
    pub log_lines: usize,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("chordpad.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "chordpad.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Subscriber already installed; dropping the guard stops the writer.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Logs every shortcut action as it runs.
struct TraceObserver;

impl ActionObserver for TraceObserver {
    fn on_action(&self, action: &Action) {
        trace!(target: "runtime.actions", action = action.label(), "action");
    }
}

struct Runtime {
    manager: EditStateManager,
    debounce: Duration,
    log_lines: usize,
    rx: mpsc::Receiver<Event>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Runtime {
    async fn run(mut self) -> Result<String> {
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        while let Some(event) = self.rx.recv().await {
            let now = Instant::now();
            match event {
                Event::Input(input) => self.handle_input(input, now),
                Event::Tick => {
                    if self.manager.tick(now) {
                        debug!(target: "runtime", calls = self.manager.highlight_call_count(), "highlight");
                    }
                }
                Event::Shutdown => break,
            }
        }

        self.rx.close();
        self.finalize_shutdown().await;

        // Flush a pending trailing-edge highlight before reporting.
        self.manager.tick(Instant::now() + self.debounce);
        let report = serde_json::to_string_pretty(&self.manager.dashboard(self.log_lines))?;
        Ok(report)
    }

    fn handle_input(&mut self, input: InputEvent, now: Instant) {
        let is_key_down = matches!(input, InputEvent::KeyDown(_));
        let decision = self.manager.handle(input, now);
        if !is_key_down {
            return;
        }
        match decision.apply {
            Some(snap) => debug!(
                target: "runtime",
                action = ?decision.action,
                caret = snap.caret,
                len = snap.content.chars().count(),
                "apply_snapshot"
            ),
            None if decision.handled => {
                trace!(target: "runtime", action = ?decision.action, "key_consumed")
            }
            None => trace!(target: "runtime", "key_passed_through"),
        }
    }

    async fn finalize_shutdown(&mut self) {
        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
                Ok(Err(err)) if err.is_cancelled() => {
                    trace!(target: "runtime.shutdown", "event_source_task_cancelled")
                }
                Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
                Err(_) => warn!(target: "runtime.shutdown", "event_source_task_timeout"),
            }
        }
        let failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed);
        if failures > 0 {
            warn!(target: "runtime.shutdown", failures, "channel_send_failures");
        }
    }
}

fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("reading script {}", p.display())),
        None => std::io::read_to_string(std::io::stdin()).context("reading script from stdin"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let steps = script::parse(&read_script(args.script.as_deref())?)?;
    info!(
        target: "runtime.startup",
        steps = steps.len(),
        config_override = args.config.is_some(),
        tick_ms = args.tick_ms,
        "bootstrap_complete"
    );

    let mut manager = EditStateManager::new(&config, &args.initial, Instant::now());
    manager.add_observer(Box::new(TraceObserver));

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    registry.register(ScriptEventSource::new(steps));
    registry.register(TickEventSource::new(Duration::from_millis(args.tick_ms.max(1))));
    let source_handles = registry.spawn_all(&tx);
    drop(tx);

    let runtime = Runtime {
        manager,
        debounce: config.highlight_debounce(),
        log_lines: args.log_lines,
        rx,
        source_handles,
    };
    let report = runtime.run().await?;
    println!("{report}");
    info!(target: "runtime", "shutdown");
    Ok(())
}
