//! Background polling workers and countdown timers.
//!
//! This is a facade crate that re-exports functionality from the pollwork
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```no_run
//! use pollwork_lib::prelude::*;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let behavior = FnBehavior::new(|ctx| {
//!         ctx.log("polled");
//!         Ok(())
//!     });
//!
//!     let mut worker = PollingWorker::new("poller", Duration::from_millis(250), behavior)
//!         .with_failure_delay(Duration::from_secs(5));
//!     worker.start()?;
//!
//!     let mut deadline = MonotonicTimeout::from_millis(2_000);
//!     deadline.start();
//!     while !deadline.has_timed_out() {
//!         std::thread::sleep(deadline.remaining().min(Duration::from_millis(100)));
//!     }
//!
//!     worker.stop();
//!     worker.join()?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pollwork/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use pollwork_types::*;

// Re-export timers
pub use pollwork_timer::{Countdown, MonotonicTimeout, WallClockTimeout};

// Re-export the worker
#[cfg(feature = "worker")]
pub use pollwork_worker::{
    CancellationLatch, FaultKind, FaultRecord, FnBehavior, LatchPoisoned, LogSink, PollingWorker,
    StopHandle, TracingSink, WaitOutcome, WorkerBehavior, WorkerContext,
};

/// Prelude module for convenient imports.
///
/// ```
/// use pollwork_lib::prelude::*;
/// ```
pub mod prelude {
    pub use pollwork_types::{
        BoxError, ConfigError, HookKind, WorkerConfig, WorkerError, WorkerState,
    };

    pub use pollwork_timer::{Countdown, MonotonicTimeout, WallClockTimeout};

    #[cfg(feature = "worker")]
    pub use pollwork_worker::{
        FaultKind, FaultRecord, FnBehavior, LogSink, PollingWorker, StopHandle, TracingSink,
        WorkerBehavior, WorkerContext,
    };
}
