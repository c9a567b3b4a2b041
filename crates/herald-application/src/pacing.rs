//! Inter-send pacing.

use herald_core::config::BroadcastSettings;
use std::time::Duration;

/// Fixed-delay scheduler used between consecutive sends of a run.
///
/// Delays are whole seconds clamped into `[min, max]`. The wait always runs
/// to completion; there is no jitter and no early wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayScheduler {
    min_secs: u64,
    max_secs: u64,
}

impl DelayScheduler {
    /// A reversed range is normalized rather than rejected.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: max_secs.max(min_secs),
        }
    }

    pub fn from_settings(settings: &BroadcastSettings) -> Self {
        Self::new(settings.min_delay_secs, settings.max_delay_secs)
    }

    pub fn clamp(&self, secs: u64) -> u64 {
        secs.clamp(self.min_secs, self.max_secs)
    }

    pub async fn wait(&self, secs: u64) {
        tokio::time::sleep(Duration::from_secs(self.clamp(secs))).await;
    }
}

impl Default for DelayScheduler {
    fn default() -> Self {
        Self::from_settings(&BroadcastSettings::default())
    }
}
