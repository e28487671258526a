//! Countdown timers for pollwork.
//!
//! - [`Countdown`] - The shared countdown contract
//! - [`WallClockTimeout`] - Measures elapsed time against the system clock
//! - [`MonotonicTimeout`] - Measures elapsed time against a monotonic counter
//!
//! Neither timer owns a thread or blocks; both are queried.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pollwork/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod countdown;
mod monotonic;
mod wall;

pub use countdown::Countdown;
pub use monotonic::MonotonicTimeout;
pub use wall::WallClockTimeout;
