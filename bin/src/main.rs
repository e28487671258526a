//! pollwork CLI - Run background polling workers and countdown timers.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "pollwork")]
#[command(about = "Background polling workers and countdown timers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output and info logs)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a heartbeat worker for a fixed duration
    Run {
        /// JSON worker config (name, poll_interval_ms, failure_delay_ms)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker name (overrides config)
        #[arg(short, long)]
        name: Option<String>,

        /// Poll interval in milliseconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Delay after a failed poll in milliseconds (overrides config)
        #[arg(long)]
        failure_delay: Option<u64>,

        /// How long to run before stopping, in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,

        /// Simulate a fault on every Nth tick
        #[arg(long)]
        fail_every: Option<u64>,
    },

    /// Count down an interval and report when it times out
    Timer {
        /// Countdown interval in milliseconds
        interval: u64,

        /// Measure against the wall clock instead of the monotonic clock
        #[arg(long)]
        wall_clock: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        LevelFilter::WARN
    } else {
        match verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_logging(cli.verbose, cli.quiet)?;

    match command {
        Commands::Run {
            config,
            name,
            interval,
            failure_delay,
            duration,
            fail_every,
        } => {
            let options = commands::run::RunOptions {
                config,
                name,
                interval_ms: interval,
                failure_delay_ms: failure_delay,
                duration_secs: duration,
                fail_every,
                quiet: cli.quiet,
            };
            commands::run::run(&options)
        }
        Commands::Timer {
            interval,
            wall_clock,
        } => commands::timer::timer(interval, wall_clock, cli.quiet),
    }
}
