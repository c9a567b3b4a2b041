//! End-to-end broadcast flow over mock identity and messaging backends.

use async_trait::async_trait;
use herald_application::dispatch::{COMPLETED_TEXT, STOPPED_TEXT};
use herald_application::{BroadcastDispatcher, RecipientCatalog, SessionManager};
use herald_core::broadcast::{DispatchState, MessagingService, RunOutcome, SendError};
use herald_core::config::{BroadcastSettings, IdentityConfig};
use herald_core::recipient::{Recipient, RecipientKind};
use herald_core::session::{
    AccessToken, IdentityProvider, LoginOutcome, LoginStatus, PROFILE_KEY, Profile, SessionStore,
    TOKEN_KEY,
};
use herald_core::{LogStatus, Result, StatusLog};
use herald_infrastructure::FileSessionStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::Instant;

const SEND_LATENCY: Duration = Duration::from_millis(200);

struct MockIdentity {
    logins: Mutex<usize>,
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn init(&self, _app_id: &str, _config: &IdentityConfig) -> Result<()> {
        Ok(())
    }

    async fn get_status(&self, known: Option<&AccessToken>) -> Result<LoginStatus> {
        Ok(match known {
            Some(token) => LoginStatus::Connected {
                token: token.clone(),
            },
            None => LoginStatus::NotAuthorized,
        })
    }

    async fn login(&self, _scopes: &[String]) -> Result<LoginOutcome> {
        *self.logins.lock().unwrap() += 1;
        Ok(LoginOutcome::Denied)
    }

    async fn logout(&self, _token: &AccessToken) -> Result<()> {
        Ok(())
    }

    async fn fetch_profile(&self, _token: &AccessToken) -> Result<Profile> {
        Ok(Profile::new("1", "Ada"))
    }

    async fn list_individuals(&self, _token: &AccessToken) -> Result<Vec<Recipient>> {
        Ok(vec![
            Recipient::individual("a", "A"),
            Recipient::individual("b", "B"),
            Recipient::individual("c", "C"),
        ])
    }

    async fn list_groups(&self, _token: &AccessToken) -> Result<Vec<Recipient>> {
        Ok(vec![
            Recipient::group("g1", "Hikers").with_member_count(40),
            Recipient::group("g2", "Chess").with_member_count(12),
        ])
    }
}

/// Fails the listed ids and reports every finished send on a channel.
struct ScriptedMessenger {
    fail_ids: Vec<&'static str>,
    finished: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl MessagingService for ScriptedMessenger {
    async fn send(
        &self,
        recipient_id: &str,
        _kind: RecipientKind,
        _text: &str,
        _token: &AccessToken,
    ) -> std::result::Result<(), SendError> {
        tokio::time::sleep(SEND_LATENCY).await;
        let _ = self.finished.send(recipient_id.to_string());
        if self.fail_ids.iter().any(|id| *id == recipient_id) {
            return Err(SendError::RateLimited("Rate limit exceeded".to_string()));
        }
        Ok(())
    }
}

struct Harness {
    _home: TempDir,
    identity: Arc<MockIdentity>,
    session: SessionManager,
    catalog: RecipientCatalog,
    dispatcher: BroadcastDispatcher,
    log: StatusLog,
    finished: mpsc::UnboundedReceiver<String>,
}

async fn harness(fail_ids: Vec<&'static str>) -> Harness {
    let home = TempDir::new().unwrap();
    let store = FileSessionStore::new(Some(home.path())).unwrap();
    store
        .set_many(&[(TOKEN_KEY, "tok-1"), (PROFILE_KEY, r#"{"id":"1","name":"Ada"}"#)])
        .unwrap();

    let identity = Arc::new(MockIdentity {
        logins: Mutex::new(0),
    });
    let config = IdentityConfig {
        app_id: Some("app".to_string()),
        ..IdentityConfig::default()
    };
    let session = SessionManager::new(identity.clone(), Arc::new(store), config);
    session.initialize().await.unwrap();
    if let Some(check) = session.restore().await.unwrap() {
        check.await.unwrap();
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let log = StatusLog::new();
    let dispatcher = BroadcastDispatcher::new(
        session.clone(),
        Arc::new(ScriptedMessenger {
            fail_ids,
            finished: tx,
        }),
        log.clone(),
        &BroadcastSettings::default(),
    );
    let catalog = RecipientCatalog::new(identity.clone(), session.clone());

    Harness {
        _home: home,
        identity,
        session,
        catalog,
        dispatcher,
        log,
        finished: rx,
    }
}

fn count(log: &StatusLog, status: LogStatus) -> usize {
    log.entries().iter().filter(|e| e.status == status).count()
}

fn without_pending(log: &StatusLog) -> Vec<(LogStatus, String)> {
    log.entries()
        .into_iter()
        .filter(|e| e.status != LogStatus::Pending)
        .map(|e| (e.status, e.text))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_restore_from_disk_connects_without_login() {
    let h = harness(vec![]).await;

    let session = h.session.session().await;
    assert!(session.is_connected());
    assert_eq!(session.user.unwrap().name, "Ada");
    assert_eq!(*h.identity.logins.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_full_run_matches_expected_log_and_pacing() {
    let h = harness(vec![]).await;
    h.catalog.fetch().await.unwrap();
    h.catalog.select_all(RecipientKind::Individual);

    let started = Instant::now();
    let handle = h
        .dispatcher
        .start(h.catalog.selected_recipients(), "Hello!", 1)
        .await
        .unwrap();
    let (outcome, summary) = handle.wait().await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(summary.sent, 3);
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(
        without_pending(&h.log),
        vec![
            (LogStatus::Info, "Starting broadcast to 3 recipient(s)...".to_string()),
            (LogStatus::Success, "✓ Sent to A (1/3)".to_string()),
            (LogStatus::Success, "✓ Sent to B (2/3)".to_string()),
            (LogStatus::Success, "✓ Sent to C (3/3)".to_string()),
            (LogStatus::Success, COMPLETED_TEXT.to_string()),
        ]
    );
    assert_eq!(count(&h.log, LogStatus::Pending), 3);
    assert_eq!(h.dispatcher.state(), DispatchState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_run_elapses_at_least_the_inter_send_delays() {
    let h = harness(vec![]).await;
    h.catalog.fetch().await.unwrap();
    h.catalog.select_all(RecipientKind::Individual);
    h.catalog.select_all(RecipientKind::Group);
    let recipients = h.catalog.selected_recipients();
    assert_eq!(recipients.len(), 5);

    let started = Instant::now();
    let (_, summary) = h
        .dispatcher
        .start(recipients, "Hello!", 7)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.sent, 5);
    assert!(started.elapsed() >= Duration::from_secs(4 * 7));
    assert_eq!(count(&h.log, LogStatus::Success), 5 + 1);
    assert_eq!(count(&h.log, LogStatus::Info), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_after_k_sends() {
    for k in 0..3 {
        let mut h = harness(vec![]).await;
        h.catalog.fetch().await.unwrap();
        h.catalog.select_all(RecipientKind::Individual);

        let handle = h
            .dispatcher
            .start(h.catalog.selected_recipients(), "Hello!", 5)
            .await
            .unwrap();
        for _ in 0..k {
            h.finished.recv().await.unwrap();
        }
        let before = h.dispatcher.progress().unwrap();
        assert!(before.cursor <= k, "cursor {} before stop (k = {})", before.cursor, k);
        assert_eq!(before.total, 3);
        h.dispatcher.stop();
        h.dispatcher.stop();
        tokio::task::yield_now().await;
        let after = h.dispatcher.progress().map_or(0, |p| p.cursor);
        assert!(after <= k, "cursor {} after stop (k = {})", after, k);

        let (outcome, summary) = handle.wait().await.unwrap();

        assert_eq!(outcome, RunOutcome::Stopped, "k = {}", k);
        assert_eq!(summary.attempted(), k, "k = {}", k);
        assert_eq!(
            count(&h.log, LogStatus::Success) + count(&h.log, LogStatus::Error),
            k
        );
        let entries = h.log.entries();
        let stopped: Vec<_> = entries.iter().filter(|e| e.text == STOPPED_TEXT).collect();
        assert_eq!(stopped.len(), 1);
        assert_eq!(stopped[0].status, LogStatus::Info);
        assert_eq!(entries.last().unwrap().text, STOPPED_TEXT);
        assert!(h.finished.try_recv().is_err(), "no send after stop (k = {})", k);
        assert_eq!(h.dispatcher.state(), DispatchState::Idle);
    }
}

#[tokio::test(start_paused = true)]
async fn test_failure_does_not_block_next_recipient() {
    let h = harness(vec!["b"]).await;
    h.catalog.fetch().await.unwrap();
    h.catalog.select_all(RecipientKind::Individual);

    let (outcome, summary) = h
        .dispatcher
        .start(h.catalog.selected_recipients(), "Hello!", 1)
        .await
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!((summary.sent, summary.failed), (2, 1));
    let entries = without_pending(&h.log);
    assert_eq!(
        entries[2],
        (LogStatus::Error, "✗ Failed to send to B: Rate limit exceeded".to_string())
    );
    assert_eq!(entries[3], (LogStatus::Success, "✓ Sent to C (3/3)".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_start_leaves_log_empty() {
    let h = harness(vec![]).await;
    h.catalog.fetch().await.unwrap();

    assert!(h.dispatcher.start(Vec::new(), "Hello!", 5).await.is_err());

    h.catalog.select_all(RecipientKind::Group);
    assert!(
        h.dispatcher
            .start(h.catalog.selected_recipients(), " \t ", 5)
            .await
            .is_err()
    );

    assert!(h.log.is_empty());
    assert_eq!(h.dispatcher.state(), DispatchState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_select_all_twice_restores_selection() {
    let h = harness(vec![]).await;
    h.catalog.fetch().await.unwrap();
    h.catalog.toggle_selection("g1");

    // No individual selected
    let before = h.catalog.selection();
    h.catalog.select_all(RecipientKind::Individual);
    h.catalog.select_all(RecipientKind::Individual);
    assert_eq!(h.catalog.selection(), before);

    // Every group selected
    h.catalog.toggle_selection("g2");
    let before = h.catalog.selection();
    h.catalog.select_all(RecipientKind::Group);
    assert!(h.catalog.selection().is_empty());
    h.catalog.select_all(RecipientKind::Group);
    assert_eq!(h.catalog.selection(), before);
}

#[tokio::test(start_paused = true)]
async fn test_selection_changes_do_not_affect_running_job() {
    let mut h = harness(vec![]).await;
    h.catalog.fetch().await.unwrap();
    h.catalog.select_all(RecipientKind::Individual);

    let handle = h
        .dispatcher
        .start(h.catalog.selected_recipients(), "Hello!", 1)
        .await
        .unwrap();
    h.catalog.select_none(RecipientKind::Individual);
    h.catalog.clear();

    let (_, summary) = handle.wait().await.unwrap();
    assert_eq!(summary.sent, 3);
    let mut sent = Vec::new();
    while let Ok(id) = h.finished.try_recv() {
        sent.push(id);
    }
    assert_eq!(sent, vec!["a", "b", "c"]);
}
