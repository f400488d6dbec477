use std::thread;
use std::time::{Duration, Instant};

/// Fixed-interval throttle for the dispatch loop. Each call to `wait` blocks until at least
/// `interval` has passed since the previous call returned; a `Pacer` without an interval never
/// blocks.
#[derive(Clone, Debug)]
pub struct Pacer {
    interval: Option<Duration>,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Option<Duration>) -> Self {
        Pacer {
            interval,
            last: None,
        }
    }

    pub fn disabled() -> Self {
        Pacer::new(None)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// How long `wait` would block if it were called at `now`.
    pub fn delay_at(&self, now: Instant) -> Duration {
        match (self.interval, self.last) {
            (None, _) => Duration::from_secs(0),
            (Some(interval), None) => interval,
            (Some(interval), Some(last)) => {
                interval
                    .checked_sub(now.saturating_duration_since(last))
                    .unwrap_or_else(|| Duration::from_secs(0))
            }
        }
    }

    pub fn wait(&mut self) {
        if self.interval.is_none() {
            return;
        }
        let delay = self.delay_at(Instant::now());
        if delay > Duration::from_secs(0) {
            thread::sleep(delay);
        }
        self.last = Some(Instant::now());
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Pacer::disabled()
    }
}
