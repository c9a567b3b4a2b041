//! Append-only status log shown to the user during broadcasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Pending,
    Success,
    Error,
    Info,
}

/// One line of the status log. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub status: LogStatus,
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<LogEntry>,
    /// Survives `clear()` so timestamps stay non-decreasing for the log's lifetime.
    last_timestamp: Option<DateTime<Utc>>,
}

/// Shared handle to the status log.
///
/// Clones refer to the same log. Readers get snapshots via [`entries`](Self::entries)
/// or a live feed via [`subscribe`](Self::subscribe); only `append` and
/// `clear` change it.
#[derive(Debug, Clone)]
pub struct StatusLog {
    state: Arc<RwLock<LogState>>,
    feed: broadcast::Sender<LogEntry>,
}

impl StatusLog {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(LogState::default())),
            feed,
        }
    }

    /// Appends an entry, assigning its id and a timestamp no earlier than
    /// the previous entry's.
    pub fn append(&self, status: LogStatus, text: impl Into<String>) -> LogEntry {
        let entry = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            let now = Utc::now();
            let timestamp = match state.last_timestamp {
                Some(last) if last > now => last,
                _ => now,
            };
            let entry = LogEntry {
                id: Uuid::new_v4(),
                timestamp,
                text: text.into(),
                status,
            };
            state.last_timestamp = Some(timestamp);
            state.entries.push(entry.clone());
            entry
        };

        // No subscribers is fine
        let _ = self.feed.send(entry.clone());
        entry
    }

    pub fn info(&self, text: impl Into<String>) -> LogEntry {
        self.append(LogStatus::Info, text)
    }

    pub fn pending(&self, text: impl Into<String>) -> LogEntry {
        self.append(LogStatus::Pending, text)
    }

    pub fn success(&self, text: impl Into<String>) -> LogEntry {
        self.append(LogStatus::Success, text)
    }

    pub fn error(&self, text: impl Into<String>) -> LogEntry {
        self.append(LogStatus::Error, text)
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the whole sequence with an empty one.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.entries = Vec::new();
    }

    /// Live feed of entries appended after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.feed.subscribe()
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new()
    }
}
