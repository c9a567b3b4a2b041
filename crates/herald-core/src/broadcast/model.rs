use serde::{Deserialize, Serialize};

/// Observable state of the dispatch engine.
///
/// A finished run returns to `Idle`; "completed" is not a separate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    #[default]
    Idle,
    Running,
    /// Still running, but a stop has been requested and will be honored at
    /// the next loop boundary.
    Stopping,
}

impl DispatchState {
    pub fn is_active(&self) -> bool {
        !matches!(self, DispatchState::Idle)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Stopped,
}

/// Per-run counters, returned when a run finishes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

/// Position of the active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastProgress {
    /// Index of the recipient currently (or last) being processed.
    pub cursor: usize,
    pub total: usize,
}
