//! Countdown measured against the system clock.

use crate::Countdown;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Countdown timer backed by the system wall clock.
///
/// Subject to clock adjustments. If the clock moves backwards past the
/// reference instant, the elapsed time reads as zero until it catches up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClockTimeout {
    interval: Duration,
    started_at: DateTime<Utc>,
}

impl WallClockTimeout {
    /// Creates a timer armed from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started_at: Utc::now(),
        }
    }

    /// Creates a timer armed from now with an interval in milliseconds.
    #[must_use]
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Returns the wall-clock time the timer was last armed.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Countdown for WallClockTimeout {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn start(&mut self) {
        self.started_at = Utc::now();
    }

    fn elapsed(&self) -> Duration {
        (Utc::now() - self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
