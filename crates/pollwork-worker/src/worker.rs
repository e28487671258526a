//! The polling worker and its background loop.
//!
//! A worker thread runs:
//!
//! 1. `on_start`
//! 2. until stop is requested: wait one poll interval on the latch, then run
//!    `on_process`; a fault from `on_process` is followed by a failure-delay
//!    wait on the same latch, then reported, then polling resumes
//! 3. `on_stop`
//!
//! Every wait returns as soon as the latch is set, so a stop request is seen
//! within one wait of whichever duration is active.

use crate::fault::{FaultKind, FaultRecord, LogSink, Notice, Notifier, TracingSink, panic_message};
use crate::latch::{CancellationLatch, WaitOutcome};
use crate::{WorkerBehavior, WorkerContext};
use pollwork_types::{BoxError, HookKind, Result, WorkerConfig, WorkerError, WorkerState};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// State shared between the owner and the worker thread.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) latch: CancellationLatch,
    poll_interval_us: AtomicU64,
    state: AtomicU8,
}

impl Shared {
    fn new(poll_interval: Duration) -> Self {
        Self {
            latch: CancellationLatch::new(),
            poll_interval_us: AtomicU64::new(duration_to_micros(poll_interval)),
            state: AtomicU8::new(WorkerState::Created as u8),
        }
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us.load(Ordering::Relaxed))
    }

    pub(crate) fn set_poll_interval(&self, interval: Duration) {
        self.poll_interval_us
            .store(duration_to_micros(interval), Ordering::Relaxed);
    }

    fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn request_stop(&self) {
        self.latch.set();
        // Only a running worker moves to StopRequested.
        let _ = self.state.compare_exchange(
            WorkerState::Running as u8,
            WorkerState::StopRequested as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Requests a worker stop from any thread.
///
/// Obtained from [`PollingWorker::stop_handle`]. Useful when the owner is
/// blocked in [`PollingWorker::join`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

impl StopHandle {
    /// Signals the worker to stop. Returns immediately.
    pub fn stop(&self) {
        self.shared.request_stop();
    }

    /// Returns true if a stop has been requested and not yet re-armed by `start`.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.shared.latch.is_set()
    }
}

/// A worker that runs a [`WorkerBehavior`] on its own thread at a fixed poll interval.
///
/// The worker can be started again after it has been joined. Dropping a
/// running worker requests a stop and joins the thread.
///
/// A zero poll interval makes the process hook run back-to-back; the stop
/// latch is still checked before every call.
pub struct PollingWorker<B> {
    name: Arc<str>,
    failure_delay: Duration,
    shared: Arc<Shared>,
    behavior: Arc<Mutex<B>>,
    sink: Arc<dyn LogSink>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl<B: WorkerBehavior> PollingWorker<B> {
    /// Default wait after a process hook fault (10 seconds).
    pub const DEFAULT_FAILURE_DELAY: Duration =
        Duration::from_millis(WorkerConfig::DEFAULT_FAILURE_DELAY_MS);

    /// Creates a worker. The thread is not started.
    ///
    /// NUL bytes are removed from `name`, which also names the thread.
    #[must_use]
    pub fn new(name: impl Into<String>, poll_interval: Duration, behavior: B) -> Self {
        let name: String = name.into().replace('\0', "");
        Self {
            name: name.into(),
            failure_delay: Self::DEFAULT_FAILURE_DELAY,
            shared: Arc::new(Shared::new(poll_interval)),
            behavior: Arc::new(Mutex::new(behavior)),
            sink: Arc::new(TracingSink),
            thread: None,
        }
    }

    /// Creates a worker from a [`WorkerConfig`].
    #[must_use]
    pub fn from_config(config: &WorkerConfig, behavior: B) -> Self {
        Self::new(config.name.as_str(), config.poll_interval(), behavior)
            .with_failure_delay(config.failure_delay())
    }

    /// Sets the wait applied after a process hook fault.
    ///
    /// Takes effect on the next `start`.
    #[must_use]
    pub fn with_failure_delay(mut self, failure_delay: Duration) -> Self {
        self.failure_delay = failure_delay;
        self
    }

    /// Sets the sink receiving messages and fault records.
    ///
    /// Takes effect on the next `start`.
    #[must_use]
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Starts the worker thread.
    ///
    /// Re-arms the stop latch, then spawns the thread and returns without
    /// waiting for `on_start`. A previous run that has finished but was
    /// never joined is reaped first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::AlreadyRunning`] if the thread is still alive,
    /// or [`WorkerError::Spawn`] if a thread cannot be created.
    pub fn start(&mut self) -> Result<()> {
        if let Some(handle) = self.thread.take() {
            if !handle.is_finished() {
                self.thread = Some(handle);
                return Err(WorkerError::AlreadyRunning {
                    name: self.name.to_string(),
                });
            }
            if let Err(e) = self.reap(handle) {
                warn!(worker = %self.name, error = %e, "Previous run ended abnormally");
            }
        }

        self.shared.latch.reset();

        let notifier = Notifier::spawn(&self.name, Arc::clone(&self.sink))
            .map_err(|e| self.spawn_error(e))?;

        let run = Run {
            name: Arc::clone(&self.name),
            shared: Arc::clone(&self.shared),
            behavior: Arc::clone(&self.behavior),
            failure_delay: self.failure_delay,
            notifier,
        };

        let previous = self.shared.state();
        self.shared.set_state(WorkerState::Running);

        let spawned = thread::Builder::new()
            .name(self.name.to_string())
            .spawn(move || run.execute());

        match spawned {
            Ok(handle) => {
                debug!(worker = %self.name, "Worker thread spawned");
                self.thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.set_state(previous);
                Err(self.spawn_error(e))
            }
        }
    }

    /// Returns the current poll interval.
    #[must_use]
    pub fn process_interval(&self) -> Duration {
        self.shared.poll_interval()
    }

    /// Replaces the poll interval.
    ///
    /// A wait already in progress keeps the interval it started with.
    /// Intervals are kept at microsecond resolution; a non-zero interval
    /// shorter than that is rounded up to one microsecond.
    pub fn set_process_interval(&self, interval: Duration) {
        self.shared.set_poll_interval(interval);
    }

    /// Runs `f` with exclusive access to the behavior.
    ///
    /// Blocks while the worker thread is running, since the thread holds
    /// the behavior for the whole run. Intended for use between runs.
    pub fn with_behavior<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut behavior = self.behavior.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut behavior)
    }
}

impl<B> PollingWorker<B> {
    /// Returns the worker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wait applied after a process hook fault.
    #[must_use]
    pub const fn failure_delay(&self) -> Duration {
        self.failure_delay
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.shared.state()
    }

    /// Returns true once the worker thread has exited, or if it never started.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signals the worker to stop. Returns immediately.
    ///
    /// Idempotent, and harmless before `start`. The thread notices the
    /// request at its next wait; a process hook already running is not
    /// interrupted.
    pub fn stop(&self) {
        debug!(worker = %self.name, "Stop requested");
        self.shared.request_stop();
    }

    /// Returns true if a stop has been requested since the last `start`.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.shared.latch.is_set()
    }

    /// Returns a handle that can request a stop from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Blocks until the worker thread has exited and `on_stop` has run.
    ///
    /// Returns immediately if the worker is not running. Does not request a
    /// stop by itself.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Hook`] if `on_start` or `on_stop` returned an
    /// error, or [`WorkerError::Panicked`] if either of them panicked.
    pub fn join(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(handle) => self.reap(handle),
            None => Ok(()),
        }
    }

    /// Joins the thread. The sink already saw any hook panic from the thread.
    fn reap(&self, handle: JoinHandle<Result<()>>) -> Result<()> {
        handle.join().unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            error!(worker = %self.name, %message, "Worker thread panicked");
            Err(WorkerError::Panicked {
                name: self.name.to_string(),
                message,
            })
        })
    }

    fn spawn_error(&self, source: std::io::Error) -> WorkerError {
        error!(worker = %self.name, error = %source, "Failed to spawn worker thread");
        WorkerError::Spawn {
            name: self.name.to_string(),
            source,
        }
    }
}

impl<B> Drop for PollingWorker<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.shared.request_stop();
            if let Err(e) = self.reap(handle) {
                warn!(worker = %self.name, error = %e, "Worker ended abnormally while dropped");
            }
        }
    }
}

impl<B> std::fmt::Debug for PollingWorker<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingWorker")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("process_interval", &self.shared.poll_interval())
            .field("failure_delay", &self.failure_delay)
            .finish_non_exhaustive()
    }
}

/// A process hook fault, before it becomes a [`FaultRecord`].
struct Fault {
    kind: FaultKind,
    message: String,
}

/// Everything the worker thread owns for one run.
///
/// Dropping it drains the notification thread and marks the worker stopped,
/// including when a lifecycle hook panics.
struct Run<B> {
    name: Arc<str>,
    shared: Arc<Shared>,
    behavior: Arc<Mutex<B>>,
    failure_delay: Duration,
    notifier: Notifier,
}

impl<B: WorkerBehavior> Run<B> {
    fn execute(self) -> Result<()> {
        let behavior = Arc::clone(&self.behavior);
        let mut behavior = behavior.lock().unwrap_or_else(PoisonError::into_inner);
        self.drive(&mut behavior)
    }

    fn drive(&self, behavior: &mut B) -> Result<()> {
        let ctx = WorkerContext::new(&self.name, &self.shared, &self.notifier);

        info!(worker = %self.name, interval = ?self.shared.poll_interval(), "Worker started");
        self.invoke_lifecycle(HookKind::Start, || behavior.on_start(&ctx))?;

        let mut streak: u32 = 0;
        while !self.shared.latch.is_set() {
            if let Err(fault) = self.poll(behavior, &ctx, &mut streak) {
                streak = streak.saturating_add(1);
                self.wait(self.failure_delay);
                self.notifier.send(Notice::Fault(
                    FaultRecord::new(&*self.name, fault.kind, fault.message).with_streak(streak),
                ));
            }
        }

        debug!(worker = %self.name, "Stop observed");
        self.invoke_lifecycle(HookKind::Stop, || behavior.on_stop(&ctx))?;

        info!(worker = %self.name, "Worker stopped");
        Ok(())
    }

    /// Waits and processes until the latch is set or the process hook faults.
    fn poll(
        &self,
        behavior: &mut B,
        ctx: &WorkerContext<'_>,
        streak: &mut u32,
    ) -> std::result::Result<(), Fault> {
        loop {
            match self.wait(self.shared.poll_interval()) {
                WaitOutcome::Signalled => return Ok(()),
                WaitOutcome::TimedOut => {
                    invoke_process(behavior, ctx)?;
                    *streak = 0;
                }
            }
        }
    }

    /// Cancellable wait. A failing wait is reported and counts as a timeout.
    fn wait(&self, timeout: Duration) -> WaitOutcome {
        match self.shared.latch.wait_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.notifier.send(Notice::Fault(FaultRecord::new(
                    &*self.name,
                    FaultKind::Wait,
                    e.to_string(),
                )));
                self.shared.latch.clear_poison();
                WaitOutcome::TimedOut
            }
        }
    }

    /// Runs a start or stop hook. A panic is reported, then resumed so the
    /// thread still ends abnormally.
    fn invoke_lifecycle(
        &self,
        hook: HookKind,
        f: impl FnOnce() -> std::result::Result<(), BoxError>,
    ) -> Result<()> {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(self.lifecycle_failure(hook, e)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(worker = %self.name, %hook, %message, "Lifecycle hook panicked");
                self.notifier.send(Notice::Fault(FaultRecord::new(
                    &*self.name,
                    FaultKind::Panic,
                    message,
                )));
                panic::resume_unwind(payload)
            }
        }
    }

    fn lifecycle_failure(&self, hook: HookKind, source: BoxError) -> WorkerError {
        error!(worker = %self.name, %hook, error = %source, "Lifecycle hook failed");
        self.notifier.send(Notice::Fault(FaultRecord::new(
            &*self.name,
            FaultKind::Lifecycle(hook),
            source.to_string(),
        )));
        WorkerError::Hook {
            name: self.name.to_string(),
            hook,
            source,
        }
    }
}

impl<B> Drop for Run<B> {
    fn drop(&mut self) {
        self.notifier.finish();
        self.shared.set_state(WorkerState::Stopped);
    }
}

fn invoke_process<B: WorkerBehavior>(
    behavior: &mut B,
    ctx: &WorkerContext<'_>,
) -> std::result::Result<(), Fault> {
    match panic::catch_unwind(AssertUnwindSafe(|| behavior.on_process(ctx))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Fault {
            kind: FaultKind::ProcessError,
            message: e.to_string(),
        }),
        Err(payload) => Err(Fault {
            kind: FaultKind::ProcessPanic,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn duration_to_micros(duration: Duration) -> u64 {
    match u64::try_from(duration.as_micros()).unwrap_or(u64::MAX) {
        0 if !duration.is_zero() => 1,
        micros => micros,
    }
}
