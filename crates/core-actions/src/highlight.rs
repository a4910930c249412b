//! Trailing-edge debounce for the highlight hook.
//!
//! There is no highlighter: the hook only counts calls. Each content change
//! pushes the deadline out to `now + interval`; `poll` fires once the deadline
//! has passed. A burst of changes therefore yields one call, and two calls are
//! always at least `interval` apart.

use std::time::{Duration, Instant};

pub const DEFAULT_HIGHLIGHT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct HighlightDebouncer {
    interval: Duration,
    deadline: Option<Instant>,
    calls: u64,
}

impl Default for HighlightDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT_DEBOUNCE)
    }
}

impl HighlightDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            calls: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a trigger at `now`, restarting the quiet period.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Fire the hook if the quiet period has elapsed. Returns whether it fired.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.calls += 1;
                tracing::trace!(target: "actions.highlight", calls = self.calls, "highlight_call");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn burst_collapses_into_one_call() {
        let mut d = HighlightDebouncer::default();
        let t0 = Instant::now();
        for i in 0..10 {
            d.notify(t0 + MS * (i * 20));
            assert!(!d.poll(t0 + MS * (i * 20 + 1)));
        }
        // last trigger at 180ms -> fires at 330ms
        assert!(!d.poll(t0 + MS * 329));
        assert!(d.poll(t0 + MS * 330));
        assert!(!d.poll(t0 + MS * 1000));
        assert_eq!(d.calls(), 1);
    }

    #[test]
    fn idle_poll_does_nothing() {
        let mut d = HighlightDebouncer::new(Duration::from_millis(10));
        assert!(!d.poll(Instant::now()));
        assert!(!d.is_pending());
        assert_eq!(d.calls(), 0);
    }

    #[test]
    fn separated_triggers_fire_separately() {
        let mut d = HighlightDebouncer::default();
        let t0 = Instant::now();
        d.notify(t0);
        assert!(d.poll(t0 + MS * 150));
        d.notify(t0 + MS * 400);
        assert!(d.is_pending());
        assert!(d.poll(t0 + MS * 600));
        assert_eq!(d.calls(), 2);
    }
}
