//! Background polling worker for pollwork.
//!
//! - [`PollingWorker`] - Owns one thread that runs a [`WorkerBehavior`] every poll interval
//! - [`StopHandle`] - Cloneable handle that requests a stop from any thread
//! - [`WorkerBehavior`] / [`FnBehavior`] - The start, process and stop hooks
//! - [`WorkerContext`] - What hooks can see of their worker
//! - [`CancellationLatch`] - The stop signal and its cancellable wait
//! - [`LogSink`] / [`TracingSink`] / [`FaultRecord`] - Diagnostics

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pollwork/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod behavior;
mod context;
mod fault;
mod latch;
mod worker;

pub use behavior::{FnBehavior, WorkerBehavior};
pub use context::WorkerContext;
pub use fault::{FaultKind, FaultRecord, LogSink, TracingSink};
pub use latch::{CancellationLatch, LatchPoisoned, WaitOutcome};
pub use pollwork_types::{BoxError, HookKind, Result, WorkerConfig, WorkerError, WorkerState};
pub use worker::{PollingWorker, StopHandle};
