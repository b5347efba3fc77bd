// Frame pacing
//
// Ticks fall on a fixed grid of deadlines. If a frame runs past one or more
// deadlines, those ticks are skipped and counted as overruns rather than
// replayed back to back.

use super::signals::Termination;
use std::thread;
use std::time::{Duration, Instant};

/// Longest single sleep, so termination requests are noticed promptly
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Deadline-based ticker
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    deadline: Instant,
    overruns: u64,
}

impl Ticker {
    /// Create a ticker whose first tick is one interval from now
    pub fn new(interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            deadline: Instant::now() + interval,
            overruns: 0,
        }
    }

    /// Create a ticker whose first tick is due immediately
    pub fn immediate(interval: Duration) -> Self {
        let mut ticker = Self::new(interval);
        ticker.deadline = Instant::now();
        ticker
    }

    /// Block until the next tick
    ///
    /// # Returns
    ///
    /// `false` if termination was requested while waiting
    pub fn wait(&mut self, termination: &Termination) -> bool {
        loop {
            if termination.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= self.deadline {
                break;
            }
            thread::sleep((self.deadline - now).min(SLEEP_SLICE));
        }

        let late = Instant::now().saturating_duration_since(self.deadline);
        let missed = (late.as_nanos() / self.interval.as_nanos()) as u64;
        self.overruns += missed;

        let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        self.deadline += self.interval * steps;
        true
    }

    /// Ticks skipped because a frame was still being processed
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
