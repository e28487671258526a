//! Stop latency runner that outputs a markdown table for the README.
//!
//! Run with: `cargo run --package pollwork-bench --bin latency_table --release`

use pollwork_bench::{LatencySample, format_duration, measure_stop_latency};
use std::io::Write;
use std::time::Duration;

/// Number of measurements per poll interval.
const ITERATIONS: u32 = 5;

/// How long each worker runs before it is stopped.
const RUN_FOR: Duration = Duration::from_millis(300);

fn main() {
    println!("pollwork Stop Latency");
    println!("=====================\n");
    println!("Running measurements ({ITERATIONS} iterations each)...\n");

    let intervals = [10_u64, 50, 100, 250];
    let mut results: Vec<(Duration, Vec<LatencySample>)> = Vec::new();

    for millis in intervals {
        let interval = Duration::from_millis(millis);
        print!("Measuring {millis}ms interval... ");
        let _ = std::io::stdout().flush();

        let mut samples = Vec::new();
        for i in 0..ITERATIONS {
            match measure_stop_latency(interval, RUN_FOR) {
                Ok(sample) => samples.push(sample),
                Err(e) => eprintln!("\nIteration {} failed: {e}", i + 1),
            }
        }

        results.push((interval, samples));
        println!("done");
    }

    println!("\n## Results\n");
    println!("| Poll Interval | Ticks | Stop to Join (avg) | Stop to Join (max) | Ratio |");
    println!("|---------------|-------|--------------------|--------------------|-------|");

    for (interval, samples) in &results {
        if samples.is_empty() {
            println!("| {} | - | failed | failed | - |", format_duration(*interval));
            continue;
        }

        let count = u32::try_from(samples.len()).unwrap_or(u32::MAX);
        let total: Duration = samples.iter().map(|s| s.stop_to_join).sum();
        let avg = total / count;
        let max = samples
            .iter()
            .map(|s| s.stop_to_join)
            .max()
            .unwrap_or_default();
        let ticks = samples.iter().map(|s| s.ticks).sum::<u64>() / u64::from(count);
        let ratio = samples.iter().map(LatencySample::interval_ratio).sum::<f64>()
            / f64::from(count);

        println!(
            "| {} | {} | {} | {} | {:.3} |",
            format_duration(*interval),
            ticks,
            format_duration(avg),
            format_duration(max),
            ratio
        );
    }

    println!("\n*Stop to Join is measured from `stop()` until `join()` returns.*");
}
