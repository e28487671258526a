//! Cancellation latch with a cancellable timed wait.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// How a [`CancellationLatch::wait_timeout`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The latch was set before the timeout.
    Signalled,
    /// The timeout elapsed with the latch still unset.
    TimedOut,
}

/// The latch mutex was poisoned by a thread that panicked while holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchPoisoned;

impl std::fmt::Display for LatchPoisoned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cancellation latch mutex is poisoned")
    }
}

impl std::error::Error for LatchPoisoned {}

/// A binary "stop requested" flag that waiters can block on.
///
/// Only the owner sets and resets the latch; the worker thread only reads it.
#[derive(Debug, Default)]
pub struct CancellationLatch {
    requested: Mutex<bool>,
    signal: Condvar,
}

impl CancellationLatch {
    /// Creates an unset latch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requested: Mutex::new(false),
            signal: Condvar::new(),
        }
    }

    /// Sets the latch and wakes every waiter.
    pub fn set(&self) {
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.signal.notify_all();
    }

    /// Clears the latch.
    pub fn reset(&self) {
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Returns true if the latch is set. Never blocks on a waiter.
    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the latch is set or `timeout` elapses, whichever comes first.
    ///
    /// Spurious wakeups are absorbed; the call returns early only when the
    /// latch is actually set. A latch that is already set returns
    /// [`WaitOutcome::Signalled`] without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`LatchPoisoned`] if the latch mutex is poisoned. The latch
    /// value is left untouched.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<WaitOutcome, LatchPoisoned> {
        let guard = self.requested.lock().map_err(|_| LatchPoisoned)?;
        let (guard, _) = self
            .signal
            .wait_timeout_while(guard, timeout, |requested| !*requested)
            .map_err(|_| LatchPoisoned)?;

        if *guard {
            Ok(WaitOutcome::Signalled)
        } else {
            Ok(WaitOutcome::TimedOut)
        }
    }

    /// Clears a poisoned state so later waits succeed again.
    pub fn clear_poison(&self) {
        self.requested.clear_poison();
    }

    /// Poisons the latch mutex by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = self.requested.lock();
                    panic!("poison the latch");
                })
                .join();
        });
    }
}
