//! Countdown measured against the monotonic clock.

use crate::Countdown;
use std::time::{Duration, Instant};

/// Countdown timer backed by [`Instant`].
///
/// Immune to wall-clock adjustments, so prefer it for short or precise
/// intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonotonicTimeout {
    interval: Duration,
    started_at: Instant,
}

impl MonotonicTimeout {
    /// Creates a timer armed from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started_at: Instant::now(),
        }
    }

    /// Creates a timer armed from now with an interval in milliseconds.
    #[must_use]
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Returns the instant the timer was last armed.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl Countdown for MonotonicTimeout {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn start(&mut self) {
        self.started_at = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_not_timed_out_after_start() {
        let mut timer = MonotonicTimeout::from_millis(10_000);
        timer.start();
        assert!(!timer.has_timed_out());
        assert!(timer.remaining() > Duration::from_secs(9));
    }

    #[test]
    fn test_times_out_after_interval() {
        let timer = MonotonicTimeout::from_millis(20);
        thread::sleep(Duration::from_millis(30));
        assert!(timer.has_timed_out());
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_zero_interval_times_out_immediately() {
        let timer = MonotonicTimeout::new(Duration::ZERO);
        assert!(timer.has_timed_out());
    }

    #[test]
    fn test_reset_rearms() {
        let mut timer = MonotonicTimeout::from_millis(20);
        thread::sleep(Duration::from_millis(30));
        assert!(timer.has_timed_out());

        timer.set_interval(Duration::from_secs(10));
        timer.reset();
        assert!(!timer.has_timed_out());
    }

    #[test]
    fn test_set_interval_applies_without_rearm() {
        let mut timer = MonotonicTimeout::from_millis(10_000);
        let armed = timer.started_at();
        assert!(!timer.has_timed_out());

        timer.set_interval(Duration::ZERO);
        assert!(timer.has_timed_out());
        assert_eq!(timer.started_at(), armed);
    }

    #[test]
    fn test_usable_through_trait_object() {
        let mut timer: Box<dyn Countdown> = Box::new(MonotonicTimeout::from_millis(10_000));
        timer.start();
        assert!(!timer.has_timed_out());
        timer.set_interval(Duration::ZERO);
        assert!(timer.has_timed_out());
    }
}
