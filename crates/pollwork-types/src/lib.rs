//! Core types for pollwork polling workers.
//!
//! This crate provides the vocabulary shared by the timer and worker crates:
//!
//! - [`WorkerState`] - Lifecycle state of a polling worker
//! - [`HookKind`] - Identifies one of the three worker hooks
//! - [`WorkerConfig`] - Name, poll interval and failure delay of a worker
//! - [`WorkerError`] - Errors surfaced by worker lifecycle operations
//! - [`ConfigError`] - Errors loading or validating a [`WorkerConfig`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pollwork/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod state;

pub use config::WorkerConfig;
pub use error::{BoxError, ConfigError, Result, WorkerError};
pub use state::{HookKind, WorkerState};
