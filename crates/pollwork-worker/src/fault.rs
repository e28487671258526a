//! Fault records, log sinks and the notification thread that feeds them.
//!
//! Workers never write diagnostics to a sink from their own thread. Every
//! notice is queued to a per-run notification thread, so a slow sink cannot
//! delay the polling loop.

use chrono::{DateTime, Utc};
use pollwork_types::HookKind;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// What went wrong in a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The process hook returned an error.
    ProcessError,
    /// The process hook panicked.
    ProcessPanic,
    /// The cancellable wait itself failed and was treated as a timeout.
    Wait,
    /// The start or stop hook returned an error, ending the thread.
    Lifecycle(HookKind),
    /// The worker thread panicked outside the process hook.
    Panic,
}

impl FaultKind {
    /// Returns true if the worker keeps running after this fault.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::ProcessError | Self::ProcessPanic | Self::Wait)
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProcessError => write!(f, "process error"),
            Self::ProcessPanic => write!(f, "process panic"),
            Self::Wait => write!(f, "wait failure"),
            Self::Lifecycle(hook) => write!(f, "{hook} hook failure"),
            Self::Panic => write!(f, "thread panic"),
        }
    }
}

/// A fault observed by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    /// Name of the worker that faulted.
    pub worker: String,
    /// Kind of fault.
    pub kind: FaultKind,
    /// Error or panic message.
    pub message: String,
    /// When the fault was recorded.
    pub occurred_at: DateTime<Utc>,
    /// Number of process hook faults in a row, including this one.
    ///
    /// Zero for faults that are not process hook faults.
    pub streak: u32,
}

impl FaultRecord {
    /// Creates a record timestamped now.
    #[must_use]
    pub fn new(worker: impl Into<String>, kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            kind,
            message: message.into(),
            occurred_at: Utc::now(),
            streak: 0,
        }
    }

    /// Sets the consecutive fault count.
    #[must_use]
    pub const fn with_streak(mut self, streak: u32) -> Self {
        self.streak = streak;
        self
    }
}

impl std::fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.worker, self.kind, self.message)
    }
}

/// Receives diagnostics from a worker.
///
/// Called from the worker's notification thread, never from the thread
/// running the hooks, unless the notification thread is already gone; the
/// notice is then delivered on the thread that raised it. Panics raised by
/// a sink are caught and logged on every path.
pub trait LogSink: Send + Sync {
    /// Receives a plain message.
    fn message(&self, worker: &str, text: &str);

    /// Receives a fault record.
    fn fault(&self, record: &FaultRecord);
}

/// Forwards diagnostics to [`tracing`].
///
/// This is the default sink. It stays silent unless the host installs a
/// subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn message(&self, worker: &str, text: &str) {
        info!(worker = %worker, "{text}");
    }

    fn fault(&self, record: &FaultRecord) {
        if record.kind.is_recoverable() {
            warn!(
                worker = %record.worker,
                kind = %record.kind,
                streak = record.streak,
                "{}",
                record.message
            );
        } else {
            error!(worker = %record.worker, kind = %record.kind, "{}", record.message);
        }
    }
}

/// A diagnostic queued for the notification thread.
#[derive(Debug)]
pub(crate) enum Notice {
    Message { worker: String, text: String },
    Fault(FaultRecord),
}

/// Owns the notification thread of one worker run.
pub(crate) struct Notifier {
    sender: Option<mpsc::UnboundedSender<Notice>>,
    sink: Arc<dyn LogSink>,
    thread: Option<JoinHandle<()>>,
}

impl Notifier {
    /// Spawns the notification thread, named `<worker>-notify`.
    pub(crate) fn spawn(worker: &str, sink: Arc<dyn LogSink>) -> std::io::Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Notice>();
        let thread_sink = Arc::clone(&sink);

        let thread = thread::Builder::new()
            .name(format!("{worker}-notify"))
            .spawn(move || {
                while let Some(notice) = receiver.blocking_recv() {
                    deliver(thread_sink.as_ref(), notice);
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            sink,
            thread: Some(thread),
        })
    }

    /// Queues a notice. Delivers inline if the notification thread is gone.
    pub(crate) fn send(&self, notice: Notice) {
        let Some(sender) = &self.sender else {
            deliver(self.sink.as_ref(), notice);
            return;
        };

        if let Err(mpsc::error::SendError(notice)) = sender.send(notice) {
            deliver(self.sink.as_ref(), notice);
        }
    }

    /// Closes the queue and waits until every queued notice is delivered.
    pub(crate) fn finish(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("notification thread panicked");
            }
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("open", &self.sender.is_some())
            .finish_non_exhaustive()
    }
}

fn deliver(sink: &dyn LogSink, notice: Notice) {
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| match &notice {
        Notice::Message { worker, text } => sink.message(worker, text),
        Notice::Fault(record) => sink.fault(record),
    }));

    if let Err(payload) = delivered {
        warn!(panic = %panic_message(payload.as_ref()), "log sink panicked");
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Collect {
        messages: Mutex<Vec<String>>,
        faults: Mutex<Vec<FaultRecord>>,
    }

    impl LogSink for Collect {
        fn message(&self, worker: &str, text: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("{worker}: {text}"));
        }

        fn fault(&self, record: &FaultRecord) {
            self.faults.lock().unwrap().push(record.clone());
        }
    }

    struct Panicky;

    impl LogSink for Panicky {
        fn message(&self, _worker: &str, _text: &str) {
            panic!("sink exploded");
        }

        fn fault(&self, _record: &FaultRecord) {}
    }

    #[test]
    fn test_fault_kind_recoverable() {
        assert!(FaultKind::ProcessError.is_recoverable());
        assert!(FaultKind::ProcessPanic.is_recoverable());
        assert!(FaultKind::Wait.is_recoverable());
        assert!(!FaultKind::Lifecycle(HookKind::Start).is_recoverable());
        assert!(!FaultKind::Panic.is_recoverable());
    }

    #[test]
    fn test_fault_record_display() {
        let record = FaultRecord::new("poller", FaultKind::Lifecycle(HookKind::Stop), "disk full")
            .with_streak(3);
        assert_eq!(record.to_string(), "[poller] stop hook failure: disk full");
        assert_eq!(record.streak, 3);
    }

    #[test]
    fn test_finish_drains_queue() {
        let sink = Arc::new(Collect::default());
        let mut notifier = Notifier::spawn("drain", sink.clone()).unwrap();

        for i in 0..50 {
            notifier.send(Notice::Message {
                worker: "drain".to_string(),
                text: format!("line {i}"),
            });
        }
        notifier.send(Notice::Fault(FaultRecord::new(
            "drain",
            FaultKind::ProcessError,
            "oops",
        )));
        notifier.finish();

        assert_eq!(sink.messages.lock().unwrap().len(), 50);
        assert_eq!(sink.faults.lock().unwrap().len(), 1);
        assert_eq!(sink.messages.lock().unwrap()[0], "drain: line 0");
    }

    #[test]
    fn test_send_after_finish_delivers_inline() {
        let sink = Arc::new(Collect::default());
        let mut notifier = Notifier::spawn("late", sink.clone()).unwrap();
        notifier.finish();

        notifier.send(Notice::Message {
            worker: "late".to_string(),
            text: "after".to_string(),
        });
        assert_eq!(sink.messages.lock().unwrap().as_slice(), ["late: after"]);
    }

    #[test]
    fn test_panicking_sink_keeps_thread_alive() {
        let mut notifier = Notifier::spawn("panicky", Arc::new(Panicky)).unwrap();
        notifier.send(Notice::Message {
            worker: "panicky".to_string(),
            text: "first".to_string(),
        });
        std::thread::sleep(Duration::from_millis(20));
        assert!(notifier.thread.as_ref().is_some_and(|t| !t.is_finished()));
        notifier.finish();
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
