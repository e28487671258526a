//! Display utilities and output formatting for the pollwork CLI.

use pollwork_lib::prelude::*;
use std::time::Duration;

/// Outcome of a `run` command.
#[derive(Debug)]
pub(crate) struct RunSummary {
    pub(crate) name: String,
    pub(crate) poll_interval: Duration,
    pub(crate) failure_delay: Duration,
    pub(crate) elapsed: Duration,
    pub(crate) ticks: u64,
    pub(crate) faults: Vec<FaultRecord>,
}

/// Format a duration as a short human-readable string.
pub(crate) fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}

/// Print the summary of a finished run.
pub(crate) fn print_summary(summary: &RunSummary) {
    println!("Worker: {}", summary.name);
    println!(
        "Poll interval: {}  Failure delay: {}",
        format_duration(summary.poll_interval),
        format_duration(summary.failure_delay)
    );
    println!("Ran for: {}", format_duration(summary.elapsed));
    println!("Ticks: {}", summary.ticks);
    println!("Faults: {}", summary.faults.len());

    for fault in &summary.faults {
        println!(
            "  {} {} (streak {}): {}",
            fault.occurred_at.format("%H:%M:%S%.3f"),
            fault.kind,
            fault.streak,
            fault.message
        );
    }
}
