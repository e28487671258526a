//! Countdown timer abstraction.

use std::time::Duration;

/// A countdown timer.
///
/// A countdown is armed when it is constructed and re-armed by
/// [`start`](Self::start) or [`reset`](Self::reset). It has timed out once
/// the time elapsed since it was last armed reaches its interval. A zero
/// interval times out immediately.
pub trait Countdown: Send + Sync {
    /// Returns the countdown interval.
    fn interval(&self) -> Duration;

    /// Replaces the countdown interval.
    ///
    /// Takes effect on the next [`has_timed_out`](Self::has_timed_out) query
    /// without re-arming the timer.
    fn set_interval(&mut self, interval: Duration);

    /// Arms the timer from now. Calling it on a running timer restarts the count.
    fn start(&mut self);

    /// Restarts the count. Same effect as [`start`](Self::start).
    fn reset(&mut self) {
        self.start();
    }

    /// Returns the time elapsed since the timer was last armed.
    fn elapsed(&self) -> Duration;

    /// Returns true once the elapsed time has reached the interval.
    fn has_timed_out(&self) -> bool {
        self.elapsed() >= self.interval()
    }

    /// Returns the time left before the timer times out, saturating at zero.
    fn remaining(&self) -> Duration {
        self.interval().saturating_sub(self.elapsed())
    }
}
