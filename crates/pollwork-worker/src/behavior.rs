//! Worker behavior: the three hooks a polling worker drives.

use crate::WorkerContext;
use pollwork_types::BoxError;

/// The operations a [`PollingWorker`](crate::PollingWorker) runs on its thread.
///
/// Errors and panics from [`on_process`](Self::on_process) are recovered by
/// the worker. Errors and panics from [`on_start`](Self::on_start) and
/// [`on_stop`](Self::on_stop) are not: they end the worker thread and
/// surface from [`join`](crate::PollingWorker::join).
pub trait WorkerBehavior: Send + 'static {
    /// Runs once on the worker thread before the first wait.
    ///
    /// # Errors
    ///
    /// An error ends the thread without running the loop or `on_stop`.
    fn on_start(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        let _ = ctx;
        Ok(())
    }

    /// Runs once per elapsed poll interval.
    ///
    /// The next wait begins only after this returns, so the effective period
    /// is the poll interval plus the time spent here.
    ///
    /// # Errors
    ///
    /// An error is logged and followed by the failure delay; the loop then
    /// resumes.
    fn on_process(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError>;

    /// Runs once on the worker thread right before it terminates.
    ///
    /// # Errors
    ///
    /// An error is reported and returned from `join`.
    fn on_stop(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        let _ = ctx;
        Ok(())
    }
}

type Hook = Box<dyn FnMut(&WorkerContext<'_>) -> Result<(), BoxError> + Send>;

/// A [`WorkerBehavior`] assembled from closures.
///
/// ```
/// use pollwork_worker::FnBehavior;
///
/// let behavior = FnBehavior::new(|ctx| {
///     ctx.log("polling");
///     Ok(())
/// })
/// .on_start(|ctx| {
///     ctx.log("connected");
///     Ok(())
/// });
/// # drop(behavior);
/// ```
pub struct FnBehavior {
    start: Option<Hook>,
    process: Hook,
    stop: Option<Hook>,
}

impl FnBehavior {
    /// Creates a behavior with the given process hook and no-op start/stop hooks.
    #[must_use]
    pub fn new<F>(process: F) -> Self
    where
        F: FnMut(&WorkerContext<'_>) -> Result<(), BoxError> + Send + 'static,
    {
        Self {
            start: None,
            process: Box::new(process),
            stop: None,
        }
    }

    /// Sets the start hook.
    #[must_use]
    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&WorkerContext<'_>) -> Result<(), BoxError> + Send + 'static,
    {
        self.start = Some(Box::new(hook));
        self
    }

    /// Sets the stop hook.
    #[must_use]
    pub fn on_stop<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&WorkerContext<'_>) -> Result<(), BoxError> + Send + 'static,
    {
        self.stop = Some(Box::new(hook));
        self
    }
}

impl WorkerBehavior for FnBehavior {
    fn on_start(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        self.start.as_mut().map_or(Ok(()), |hook| hook(ctx))
    }

    fn on_process(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        (self.process)(ctx)
    }

    fn on_stop(&mut self, ctx: &WorkerContext<'_>) -> Result<(), BoxError> {
        self.stop.as_mut().map_or(Ok(()), |hook| hook(ctx))
    }
}

impl std::fmt::Debug for FnBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBehavior")
            .field("start", &self.start.is_some())
            .field("stop", &self.stop.is_some())
            .finish_non_exhaustive()
    }
}
