//! Worker lifecycle states and hook identifiers.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a polling worker.
///
/// ```text
/// Created -> Running -> StopRequested -> Stopped
///               ^                           |
///               +---------- start ----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WorkerState {
    /// Constructed, thread never started.
    #[default]
    Created = 0,
    /// Thread is looping.
    Running = 1,
    /// Stop has been signalled but the thread has not exited yet.
    StopRequested = 2,
    /// Thread has exited (normally or not).
    Stopped = 3,
}

impl WorkerState {
    /// Returns true while the worker thread may still be executing hooks.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::StopRequested)
    }

    /// Returns true if `start` is valid from this state.
    #[must_use]
    pub const fn can_start(&self) -> bool {
        matches!(self, Self::Created | Self::Stopped)
    }

    /// Decodes a state previously stored with `as u8`.
    ///
    /// Unknown values decode to [`WorkerState::Stopped`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::StopRequested,
            _ => Self::Stopped,
        }
    }

    /// Returns the state as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::StopRequested => "stop_requested",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the three hooks a worker behavior supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    /// Runs once before the first wait.
    Start,
    /// Runs once per elapsed poll interval.
    Process,
    /// Runs once before the thread terminates.
    Stop,
}

impl HookKind {
    /// Returns the hook as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Process => "process",
            Self::Stop => "stop",
        }
    }
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_u8_roundtrip() {
        for state in [
            WorkerState::Created,
            WorkerState::Running,
            WorkerState::StopRequested,
            WorkerState::Stopped,
        ] {
            assert_eq!(WorkerState::from_u8(state as u8), state);
        }
        assert_eq!(WorkerState::from_u8(200), WorkerState::Stopped);
    }

    #[test]
    fn test_state_predicates() {
        assert!(WorkerState::Created.can_start());
        assert!(WorkerState::Stopped.can_start());
        assert!(!WorkerState::Running.can_start());
        assert!(!WorkerState::StopRequested.can_start());

        assert!(WorkerState::Running.is_active());
        assert!(WorkerState::StopRequested.is_active());
        assert!(!WorkerState::Created.is_active());
        assert!(!WorkerState::Stopped.is_active());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&WorkerState::StopRequested).unwrap();
        assert_eq!(json, "\"stop_requested\"");
        let state: WorkerState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(state, WorkerState::Running);
    }

    #[test]
    fn test_hook_display() {
        assert_eq!(HookKind::Start.to_string(), "start");
        assert_eq!(HookKind::Process.to_string(), "process");
        assert_eq!(HookKind::Stop.to_string(), "stop");
    }
}
