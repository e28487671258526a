//! Heartbeat worker command.
//!
//! Runs a worker whose process hook counts ticks, optionally failing on
//! every Nth tick, for a fixed duration and prints a summary.

use crate::display::{RunSummary, format_duration, print_summary};
use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use pollwork_lib::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Options for the run command.
#[derive(Debug)]
pub(crate) struct RunOptions {
    pub(crate) config: Option<PathBuf>,
    pub(crate) name: Option<String>,
    pub(crate) interval_ms: Option<u64>,
    pub(crate) failure_delay_ms: Option<u64>,
    pub(crate) duration_secs: u64,
    pub(crate) fail_every: Option<u64>,
    pub(crate) quiet: bool,
}

/// Counts process hook invocations and fails on a schedule.
struct Heartbeat {
    ticks: Arc<AtomicU64>,
    fail_every: Option<u64>,
}

impl WorkerBehavior for Heartbeat {
    fn on_start(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        ctx.log(format_args!(
            "heartbeat online, polling every {}",
            format_duration(ctx.process_interval())
        ));
        Ok(())
    }

    fn on_process(&mut self, _ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_every.is_some_and(|n| n > 0 && tick.is_multiple_of(n)) {
            return Err(anyhow!("simulated fault on tick {tick}").into());
        }
        Ok(())
    }

    fn on_stop(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        ctx.log(format_args!(
            "heartbeat offline after {} ticks",
            self.ticks.load(Ordering::SeqCst)
        ));
        Ok(())
    }
}

/// Keeps fault records for the summary and forwards everything to tracing.
#[derive(Default)]
struct SummarySink {
    faults: Mutex<Vec<FaultRecord>>,
}

impl SummarySink {
    fn faults(&self) -> Vec<FaultRecord> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for SummarySink {
    fn message(&self, worker: &str, text: &str) {
        TracingSink.message(worker, text);
    }

    fn fault(&self, record: &FaultRecord) {
        TracingSink.fault(record);
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Execute the run command.
pub(crate) fn run(options: &RunOptions) -> Result<()> {
    let config = resolve_config(options)?;
    let duration = Duration::from_secs(options.duration_secs);

    let ticks = Arc::new(AtomicU64::new(0));
    let sink = Arc::new(SummarySink::default());
    let behavior = Heartbeat {
        ticks: Arc::clone(&ticks),
        fail_every: options.fail_every,
    };

    let mut worker = PollingWorker::from_config(&config, behavior).with_log_sink(sink.clone());

    let pb = if options.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {msg}",
        )?);
        pb
    };

    info!(
        worker = %config.name,
        duration = %format_duration(duration),
        "Running worker"
    );
    worker.start().context("Failed to start worker")?;

    let mut deadline = MonotonicTimeout::new(duration);
    deadline.start();
    while !deadline.has_timed_out() {
        pb.set_message(format!(
            "{} ticks, {} left",
            ticks.load(Ordering::SeqCst),
            format_duration(deadline.remaining())
        ));
        pb.tick();
        std::thread::sleep(deadline.remaining().min(Duration::from_millis(100)));
    }

    worker.stop();
    worker.join().context("Worker ended abnormally")?;
    pb.finish_and_clear();

    print_summary(&RunSummary {
        name: config.name.clone(),
        poll_interval: config.poll_interval(),
        failure_delay: config.failure_delay(),
        elapsed: deadline.elapsed(),
        ticks: ticks.load(Ordering::SeqCst),
        faults: sink.faults(),
    });
    Ok(())
}

/// Load the config file, if any, and apply command-line overrides.
fn resolve_config(options: &RunOptions) -> Result<WorkerConfig> {
    let mut config = match &options.config {
        Some(path) => WorkerConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => WorkerConfig {
            name: "heartbeat".to_string(),
            ..WorkerConfig::default()
        },
    };

    if let Some(name) = &options.name {
        config.name.clone_from(name);
    }
    if let Some(interval) = options.interval_ms {
        config.poll_interval_ms = interval;
    }
    if let Some(delay) = options.failure_delay_ms {
        config.failure_delay_ms = delay;
    }

    config.validate()?;
    Ok(config)
}
