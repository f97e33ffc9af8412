//! General time utility functions

use chrono::{DateTime, Utc};
use std::cell::Cell;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration.num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// A monotonic source of time in seconds.
pub trait Clock {
    /// Seconds elapsed since the clock's epoch.
    fn now_s(&self) -> f64;
}

/// Wall clock, counting from its creation.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: DateTime<Utc>
}

/// Clock which only moves when told to, for simulation and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_s: Cell<f64>
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Utc::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_s(&self) -> f64 {
        duration_to_seconds(Utc::now() - self.epoch).unwrap_or(std::f64::NAN)
    }
}

impl ManualClock {
    pub fn new(start_s: f64) -> Self {
        Self { now_s: Cell::new(start_s) }
    }

    /// Move the clock forward by `dt_s` seconds.
    pub fn advance(&self, dt_s: f64) {
        self.now_s.set(self.now_s.get() + dt_s);
    }

    pub fn set(&self, now_s: f64) {
        self.now_s.set(now_s);
    }
}

impl Clock for ManualClock {
    fn now_s(&self) -> f64 {
        self.now_s.get()
    }
}
