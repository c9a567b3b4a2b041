//! Broadcast dispatch engine.
//!
//! A run walks a snapshotted recipient list one send at a time, pacing
//! itself with the [`DelayScheduler`] and reporting every step to the
//! [`StatusLog`]. Stop requests are cooperative and are honored only between
//! sends.

use crate::pacing::DelayScheduler;
use crate::session_manager::SessionManager;
use herald_core::broadcast::{
    BroadcastProgress, DispatchState, MessagingService, RunOutcome, RunSummary,
};
use herald_core::config::BroadcastSettings;
use herald_core::recipient::Recipient;
use herald_core::session::AccessToken;
use herald_core::{HeraldError, PreconditionError, Result, StatusLog};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const STOPPED_TEXT: &str = "Broadcast stopped by user.";
pub const COMPLETED_TEXT: &str = "Broadcast completed!";

/// Bookkeeping for the run currently in flight.
#[derive(Debug)]
struct ActiveRun {
    id: Uuid,
    cancel: CancellationToken,
    cursor: usize,
    total: usize,
}

#[derive(Debug, Default)]
struct EngineState {
    state: DispatchState,
    run: Option<ActiveRun>,
}

impl EngineState {
    /// Returns the engine to `Idle` if `id` is still the active run.
    fn release(&mut self, id: Uuid) -> bool {
        if self.run.as_ref().is_some_and(|run| run.id == id) {
            self.run = None;
            self.state = DispatchState::Idle;
            true
        } else {
            false
        }
    }
}

/// Held by the run task. Releases the engine when the task ends without
/// reaching `finish`, e.g. when a send panics.
struct RunGuard {
    engine: Arc<Mutex<EngineState>>,
    id: Uuid,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
        if engine.release(self.id) {
            tracing::error!("[Dispatch] Run {} ended abnormally", self.id);
        }
    }
}

/// Immutable inputs of one run, captured at `start`.
struct RunPlan {
    id: Uuid,
    recipients: Vec<Recipient>,
    message: String,
    delay_secs: u64,
    token: AccessToken,
    cancel: CancellationToken,
}

/// Handle to a started run.
#[derive(Debug)]
pub struct BroadcastHandle {
    id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<(RunOutcome, RunSummary)>,
}

impl BroadcastHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Requests a stop, same as [`BroadcastDispatcher::stop`] for this run.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Waits for the run to finish.
    ///
    /// # Errors
    ///
    /// `Internal` if the run task panicked. The engine is idle again by then.
    pub async fn wait(self) -> Result<(RunOutcome, RunSummary)> {
        self.task
            .await
            .map_err(|e| HeraldError::internal(format!("Broadcast task failed: {}", e)))
    }
}

/// Runs at most one broadcast at a time.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    session: SessionManager,
    messaging: Arc<dyn MessagingService>,
    log: StatusLog,
    pacing: DelayScheduler,
    max_message_chars: usize,
    engine: Arc<Mutex<EngineState>>,
}

impl BroadcastDispatcher {
    pub fn new(
        session: SessionManager,
        messaging: Arc<dyn MessagingService>,
        log: StatusLog,
        settings: &BroadcastSettings,
    ) -> Self {
        Self {
            session,
            messaging,
            log,
            pacing: DelayScheduler::from_settings(settings),
            max_message_chars: settings.max_message_chars,
            engine: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    /// Starts a run over `recipients`.
    ///
    /// The delay is clamped into the configured range. Rejections leave the
    /// engine and the status log untouched.
    ///
    /// # Errors
    ///
    /// A [`PreconditionError`] if there is no session, a run is already
    /// active, `recipients` is empty, or `message` is blank or too long.
    pub async fn start(
        &self,
        recipients: Vec<Recipient>,
        message: &str,
        delay_secs: u64,
    ) -> Result<BroadcastHandle> {
        let token = self
            .session
            .token()
            .await
            .ok_or(PreconditionError::NotConnected)?;

        let plan = {
            let mut engine = self.engine();
            if engine.state.is_active() {
                return Err(PreconditionError::AlreadyRunning.into());
            }
            if recipients.is_empty() {
                return Err(PreconditionError::NoRecipients.into());
            }
            if message.trim().is_empty() {
                return Err(PreconditionError::EmptyMessage.into());
            }
            let length = message.chars().count();
            if length > self.max_message_chars {
                return Err(PreconditionError::MessageTooLong {
                    length,
                    limit: self.max_message_chars,
                }
                .into());
            }

            let plan = RunPlan {
                id: Uuid::new_v4(),
                recipients,
                message: message.to_string(),
                delay_secs: self.pacing.clamp(delay_secs),
                token,
                cancel: CancellationToken::new(),
            };
            engine.state = DispatchState::Running;
            engine.run = Some(ActiveRun {
                id: plan.id,
                cancel: plan.cancel.clone(),
                cursor: 0,
                total: plan.recipients.len(),
            });
            plan
        };

        self.log.info(format!(
            "Starting broadcast to {} recipient(s)...",
            plan.recipients.len()
        ));
        tracing::info!(
            "[Dispatch] Run {} started: {} recipient(s), {}s delay",
            plan.id,
            plan.recipients.len(),
            plan.delay_secs
        );

        let id = plan.id;
        let cancel = plan.cancel.clone();
        let dispatcher = self.clone();
        let task = tokio::spawn(async move { dispatcher.run(plan).await });

        Ok(BroadcastHandle { id, cancel, task })
    }

    /// Requests the active run to stop at its next loop boundary.
    ///
    /// Idempotent. Does nothing when no run is active and never interrupts
    /// a send in flight.
    pub fn stop(&self) {
        let mut engine = self.engine();
        if let Some(run) = &engine.run {
            run.cancel.cancel();
            engine.state = DispatchState::Stopping;
            tracing::info!("[Dispatch] Stop requested");
        }
    }

    pub fn state(&self) -> DispatchState {
        let engine = self.engine();
        match &engine.run {
            // Stopped through a handle
            Some(run) if run.cancel.is_cancelled() => DispatchState::Stopping,
            _ => engine.state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    pub fn progress(&self) -> Option<BroadcastProgress> {
        self.engine().run.as_ref().map(|run| BroadcastProgress {
            cursor: run.cursor,
            total: run.total,
        })
    }

    pub fn status_log(&self) -> &StatusLog {
        &self.log
    }

    async fn run(&self, plan: RunPlan) -> (RunOutcome, RunSummary) {
        let _guard = RunGuard {
            engine: Arc::clone(&self.engine),
            id: plan.id,
        };
        let total = plan.recipients.len();
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };

        for (index, recipient) in plan.recipients.iter().enumerate() {
            if plan.cancel.is_cancelled() {
                return self.finish(plan.id, RunOutcome::Stopped, summary);
            }
            self.set_cursor(plan.id, index);

            self.log.pending(format!("Sending to {}...", recipient.name));
            match self
                .messaging
                .send(&recipient.id, recipient.kind, &plan.message, &plan.token)
                .await
            {
                Ok(()) => {
                    summary.sent += 1;
                    self.log.success(format!(
                        "✓ Sent to {} ({}/{})",
                        recipient.name,
                        index + 1,
                        total
                    ));
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::debug!("[Dispatch] Send to {} failed: {}", recipient.id, e);
                    self.log
                        .error(format!("✗ Failed to send to {}: {}", recipient.name, e));
                }
            }

            if index + 1 < total && !plan.cancel.is_cancelled() {
                self.pacing.wait(plan.delay_secs).await;
            }
        }

        let outcome = if plan.cancel.is_cancelled() {
            RunOutcome::Stopped
        } else {
            RunOutcome::Completed
        };
        self.finish(plan.id, outcome, summary)
    }

    fn finish(&self, id: Uuid, outcome: RunOutcome, summary: RunSummary) -> (RunOutcome, RunSummary) {
        match outcome {
            RunOutcome::Stopped => self.log.info(STOPPED_TEXT),
            RunOutcome::Completed => self.log.success(COMPLETED_TEXT),
        };

        self.engine().release(id);

        tracing::info!(
            "[Dispatch] Run {} {:?}: {} sent, {} failed of {}",
            id,
            outcome,
            summary.sent,
            summary.failed,
            summary.total
        );
        (outcome, summary)
    }

    fn set_cursor(&self, id: Uuid, cursor: usize) {
        let mut engine = self.engine();
        if let Some(run) = engine.run.as_mut().filter(|run| run.id == id) {
            run.cursor = run.cursor.max(cursor);
        }
    }

    fn engine(&self) -> MutexGuard<'_, EngineState> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }
}
