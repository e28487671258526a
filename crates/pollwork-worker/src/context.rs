//! Context handed to worker hooks.

use crate::fault::{Notice, Notifier};
use crate::worker::Shared;
use std::time::Duration;

/// View of the running worker available to its hooks.
///
/// Long-running process hooks should poll [`stop_requested`](Self::stop_requested)
/// and return early once it is true; the worker never interrupts a hook.
#[derive(Debug)]
pub struct WorkerContext<'a> {
    name: &'a str,
    shared: &'a Shared,
    notifier: &'a Notifier,
}

impl<'a> WorkerContext<'a> {
    pub(crate) const fn new(name: &'a str, shared: &'a Shared, notifier: &'a Notifier) -> Self {
        Self {
            name,
            shared,
            notifier,
        }
    }

    /// Returns the worker name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name
    }

    /// Returns true once stop has been requested. Never blocks.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.shared.latch.is_set()
    }

    /// Returns the current poll interval.
    #[must_use]
    pub fn process_interval(&self) -> Duration {
        self.shared.poll_interval()
    }

    /// Replaces the poll interval, starting with the next wait.
    pub fn set_process_interval(&self, interval: Duration) {
        self.shared.set_poll_interval(interval);
    }

    /// Writes a message to the worker's log sink.
    pub fn log(&self, message: impl std::fmt::Display) {
        self.notifier.send(Notice::Message {
            worker: self.name.to_string(),
            text: message.to_string(),
        });
    }
}
