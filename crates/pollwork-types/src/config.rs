//! Worker configuration.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a polling worker.
///
/// Missing fields fall back to their defaults when deserialized, so a config
/// file only needs to name the values it overrides:
///
/// ```
/// use pollwork_types::WorkerConfig;
///
/// let config = WorkerConfig::from_json(r#"{ "poll_interval_ms": 50 }"#).unwrap();
/// assert_eq!(config.poll_interval_ms, 50);
/// assert_eq!(config.failure_delay_ms, WorkerConfig::DEFAULT_FAILURE_DELAY_MS);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker name, also used as the thread name.
    pub name: String,
    /// Wait between successive process hook invocations (in milliseconds).
    ///
    /// Zero is accepted: the process hook then runs back-to-back, with the
    /// stop latch still checked before every call.
    pub poll_interval_ms: u64,
    /// Backoff after a process hook fault before polling resumes (in milliseconds).
    pub failure_delay_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "worker".to_string(),
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            failure_delay_ms: Self::DEFAULT_FAILURE_DELAY_MS,
        }
    }
}

impl WorkerConfig {
    /// Default poll interval (250 ms).
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

    /// Default failure delay (10 seconds).
    pub const DEFAULT_FAILURE_DELAY_MS: u64 = 10_000;

    /// Creates a config with the given name and poll interval.
    #[must_use]
    pub fn new(name: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            name: name.into(),
            poll_interval_ms: duration_to_millis(poll_interval),
            ..Self::default()
        }
    }

    /// Replaces the failure delay.
    #[must_use]
    pub fn with_failure_delay(mut self, failure_delay: Duration) -> Self {
        self.failure_delay_ms = duration_to_millis(failure_delay);
        self
    }

    /// Returns the poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the failure delay as a [`Duration`].
    #[must_use]
    pub const fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_delay_ms)
    }

    /// Parses a config from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the config can name an OS thread.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty name or a name containing NUL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("worker name is empty".to_string()));
        }
        if self.name.contains('\0') {
            return Err(ConfigError::Invalid(format!(
                "worker name {:?} contains a NUL byte",
                self.name
            )));
        }
        Ok(())
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
