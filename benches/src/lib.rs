//! Benchmark utilities for pollwork.

use pollwork_lib::prelude::*;
use std::time::{Duration, Instant};

/// Result of one stop latency measurement.
#[derive(Debug, Clone, Copy)]
pub struct LatencySample {
    /// Poll interval the worker ran with.
    pub poll_interval: Duration,
    /// Time from `stop` until `join` returned.
    pub stop_to_join: Duration,
    /// Process hook invocations before the stop.
    pub ticks: u64,
}

impl LatencySample {
    /// Stop latency as a fraction of the poll interval.
    ///
    /// Returns zero for a zero poll interval.
    #[must_use]
    pub fn interval_ratio(&self) -> f64 {
        let interval = self.poll_interval.as_secs_f64();
        if interval > 0.0 {
            self.stop_to_join.as_secs_f64() / interval
        } else {
            0.0
        }
    }
}

/// Behavior that only counts process hook calls.
#[derive(Debug, Default)]
pub struct Ticker {
    ticks: u64,
}

impl Ticker {
    /// Number of process hook calls so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl WorkerBehavior for Ticker {
    fn on_process(&mut self, _ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        self.ticks += 1;
        Ok(())
    }
}

/// Runs a counting worker for `run_for`, then measures how long stopping takes.
///
/// # Errors
///
/// Returns an error if the worker cannot be started or ends abnormally.
pub fn measure_stop_latency(
    poll_interval: Duration,
    run_for: Duration,
) -> pollwork_lib::Result<LatencySample> {
    let mut worker = PollingWorker::new("latency", poll_interval, Ticker::default());
    worker.start()?;
    std::thread::sleep(run_for);

    let stopped_at = Instant::now();
    worker.stop();
    worker.join()?;
    let stop_to_join = stopped_at.elapsed();

    let ticks = worker.with_behavior(|ticker| ticker.ticks());
    Ok(LatencySample {
        poll_interval,
        stop_to_join,
        ticks,
    })
}

/// Format a duration for display.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1_000 {
        format!("{micros}µs")
    } else {
        format!("{:.2}ms", d.as_secs_f64() * 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.50ms");
    }

    #[test]
    fn test_interval_ratio() {
        let sample = LatencySample {
            poll_interval: Duration::from_millis(100),
            stop_to_join: Duration::from_millis(5),
            ticks: 3,
        };
        assert!((sample.interval_ratio() - 0.05).abs() < 1e-9);

        let zero = LatencySample {
            poll_interval: Duration::ZERO,
            ..sample
        };
        assert_eq!(zero.interval_ratio(), 0.0);
    }

    #[test]
    fn test_measure_stop_latency() {
        let sample =
            measure_stop_latency(Duration::from_millis(10), Duration::from_millis(60)).unwrap();
        assert!(sample.ticks >= 1);
        assert!(sample.stop_to_join < Duration::from_secs(1));
    }
}
