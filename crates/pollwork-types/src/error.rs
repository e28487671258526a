//! Error types for pollwork.

use crate::HookKind;
use std::path::PathBuf;
use thiserror::Error;

/// Error type returned by worker hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for worker lifecycle operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Errors surfaced by worker lifecycle operations.
///
/// Faults raised by the process hook never appear here: they are recovered
/// inside the worker loop and reported through its log sink instead.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// `start` was called while the worker thread is still alive.
    #[error("Worker '{name}' is already running")]
    AlreadyRunning {
        /// The worker name.
        name: String,
    },

    /// The operating system refused to create a thread.
    #[error("Failed to spawn thread for worker '{name}': {source}")]
    Spawn {
        /// The worker name.
        name: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The start or stop hook returned an error, ending the worker thread.
    #[error("Worker '{name}' {hook} hook failed: {source}")]
    Hook {
        /// The worker name.
        name: String,
        /// The hook that failed.
        hook: HookKind,
        /// The error returned by the hook.
        source: BoxError,
    },

    /// The worker thread terminated by panicking.
    #[error("Worker '{name}' thread panicked: {message}")]
    Panicked {
        /// The worker name.
        name: String,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl WorkerError {
    /// Returns the name of the worker this error belongs to.
    #[must_use]
    pub fn worker_name(&self) -> &str {
        match self {
            Self::AlreadyRunning { name }
            | Self::Spawn { name, .. }
            | Self::Hook { name, .. }
            | Self::Panicked { name, .. } => name,
        }
    }
}

/// Errors that can occur while loading a worker configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration JSON.
    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        /// The path (or `<inline>`) that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("Invalid worker config: {0}")]
    Invalid(String),
}
