//! Countdown timer command.

use crate::display::format_duration;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use pollwork_lib::prelude::*;
use std::time::Duration;

/// Longest sleep between progress updates.
const REFRESH: Duration = Duration::from_millis(20);

/// Execute the timer command.
pub(crate) fn timer(interval_ms: u64, wall_clock: bool, quiet: bool) -> Result<()> {
    let (label, mut countdown): (&str, Box<dyn Countdown>) = if wall_clock {
        ("wall-clock", Box::new(WallClockTimeout::from_millis(interval_ms)))
    } else {
        ("monotonic", Box::new(MonotonicTimeout::from_millis(interval_ms)))
    };

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(interval_ms);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ms ({percent}%) {msg}",
            )?
            .progress_chars("=>-"),
        );
        pb
    };

    countdown.start();
    while !countdown.has_timed_out() {
        pb.set_position(millis(countdown.elapsed()).min(interval_ms));
        std::thread::sleep(countdown.remaining().min(REFRESH));
    }

    let elapsed = countdown.elapsed();
    pb.set_position(interval_ms);
    pb.finish_with_message("timed out");

    println!(
        "{label} countdown of {} timed out after {}",
        format_duration(countdown.interval()),
        format_duration(elapsed)
    );
    Ok(())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
