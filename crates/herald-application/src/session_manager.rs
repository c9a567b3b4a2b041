//! Session lifecycle.
//!
//! [`SessionManager`] owns the authenticated [`Session`], wraps the identity
//! provider and writes every token/profile change through to the
//! [`SessionStore`].

use herald_core::config::IdentityConfig;
use herald_core::session::{
    AccessToken, IdentityProvider, LoginOutcome, LoginStatus, PROFILE_KEY, Profile, Session,
    SessionStore, TOKEN_KEY,
};
use herald_core::{HeraldError, Result};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

/// Manages connection state and its persistence.
///
/// Cloning is cheap; clones share the same session. Background tasks
/// (liveness check, profile fetch) hold a clone.
#[derive(Clone)]
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    config: IdentityConfig,
    session: Arc<RwLock<Session>>,
    /// Flips to `true` once `initialize` succeeded.
    ready: Arc<watch::Sender<bool>>,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        config: IdentityConfig,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            identity,
            store,
            config,
            session: Arc::new(RwLock::new(Session::default())),
            ready: Arc::new(ready),
        }
    }

    /// One-time bootstrap of the identity provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no application id is configured, or
    /// whatever the provider's `init` returns. Calling it again after success
    /// is a no-op.
    pub async fn initialize(&self) -> Result<()> {
        let app_id = self.require_app_id()?;
        if self.is_ready() {
            return Ok(());
        }

        self.identity.init(app_id, &self.config).await?;
        self.ready.send_replace(true);
        tracing::info!("[SessionManager] Identity provider initialized");
        Ok(())
    }

    /// Restores the persisted session.
    ///
    /// Only reads the store; no remote call is awaited. When a token is found
    /// the session is connected right away and a liveness check is spawned;
    /// its handle is returned for callers that want to wait for the verdict.
    pub async fn restore(&self) -> Result<Option<JoinHandle<()>>> {
        let token = self
            .store
            .get(TOKEN_KEY)?
            .filter(|raw| !raw.trim().is_empty())
            .map(AccessToken::new);
        let user = self.read_persisted_profile()?;

        let Some(token) = token else {
            if user.is_some() {
                // A profile without a token cannot be used
                self.store.remove(PROFILE_KEY)?;
            }
            return Ok(None);
        };

        {
            let mut session = self.session.write().await;
            *session = Session::connected(token.clone(), user);
        }
        tracing::info!("[SessionManager] Restored persisted session");

        let manager = self.clone();
        Ok(Some(tokio::spawn(async move {
            manager.check_liveness(token).await;
        })))
    }

    /// Runs the interactive login.
    ///
    /// On a grant the token is stored and persisted immediately, and the
    /// profile fetch is spawned; its handle is returned. Returns `Ok(None)`
    /// without contacting the provider when already connected.
    ///
    /// # Errors
    ///
    /// - `Config` if no application id is configured
    /// - `NotReady` if [`initialize`](Self::initialize) has not completed
    /// - `AuthDenied` if the user declined; the session stays disconnected
    pub async fn connect(&self) -> Result<Option<JoinHandle<()>>> {
        self.require_app_id()?;
        if !self.is_ready() {
            return Err(HeraldError::NotReady);
        }
        if self.is_connected().await {
            return Ok(None);
        }

        let token = match self.identity.login(&self.config.scopes).await? {
            LoginOutcome::Granted { token } => token,
            LoginOutcome::Denied => {
                tracing::info!("[SessionManager] Login denied by user");
                return Err(HeraldError::AuthDenied(
                    "User cancelled login or did not fully authorize".to_string(),
                ));
            }
        };

        {
            let mut session = self.session.write().await;
            self.store.set(TOKEN_KEY, token.as_str())?;
            self.store.remove(PROFILE_KEY)?;
            *session = Session::connected(token.clone(), None);
        }
        tracing::info!("[SessionManager] Connected");

        let manager = self.clone();
        Ok(Some(tokio::spawn(async move {
            manager.refresh_profile(token).await;
        })))
    }

    /// Logs out remotely and clears the local session.
    ///
    /// A failed remote logout is logged and the local state is cleared anyway.
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(token) = self.token().await {
            if let Err(e) = self.identity.logout(&token).await {
                tracing::warn!("[SessionManager] Remote logout failed: {}", e);
            }
        }

        let mut session = self.session.write().await;
        let removed = self.store.remove_many(&[TOKEN_KEY, PROFILE_KEY]);
        *session = Session::default();
        tracing::info!("[SessionManager] Disconnected");
        removed
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.session.read().await.is_connected()
    }

    pub async fn token(&self) -> Option<AccessToken> {
        self.session.read().await.token.clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn scopes(&self) -> &[String] {
        &self.config.scopes
    }

    fn require_app_id(&self) -> Result<&str> {
        self.config
            .app_id()
            .ok_or_else(|| HeraldError::config("application id is not configured"))
    }

    async fn wait_until_ready(&self) {
        let mut ready = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = ready.wait_for(|ready| *ready).await;
    }

    fn read_persisted_profile(&self) -> Result<Option<Profile>> {
        let Some(raw) = self.store.get(PROFILE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!("[SessionManager] Discarding unreadable stored profile: {}", e);
                self.store.remove(PROFILE_KEY)?;
                Ok(None)
            }
        }
    }

    /// Corroborates a restored session with the provider.
    async fn check_liveness(&self, known: AccessToken) {
        self.wait_until_ready().await;

        match self.identity.get_status(Some(&known)).await {
            Ok(LoginStatus::NotAuthorized) => {
                let mut session = self.session.write().await;
                if session.token.as_ref() != Some(&known) {
                    return;
                }
                if let Err(e) = self.store.remove_many(&[TOKEN_KEY, PROFILE_KEY]) {
                    tracing::warn!("[SessionManager] Failed to clear stored session: {}", e);
                }
                *session = Session::default();
                tracing::info!("[SessionManager] Stored session is no longer valid; disconnected");
            }
            Ok(LoginStatus::Connected { token }) => {
                let profile = match self.identity.fetch_profile(&token).await {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        tracing::warn!("[SessionManager] Profile refresh failed: {}", e);
                        None
                    }
                };

                let mut session = self.session.write().await;
                if session.token.as_ref() != Some(&known) {
                    return;
                }
                let user = profile.or_else(|| session.user.clone());
                match self.persist(&token, user.as_ref()) {
                    Ok(()) => *session = Session::connected(token, user),
                    Err(e) => tracing::warn!("[SessionManager] Failed to persist session: {}", e),
                }
                tracing::debug!("[SessionManager] Session verified");
            }
            Err(e) => {
                tracing::warn!(
                    "[SessionManager] Could not verify stored session, keeping it: {}",
                    e
                );
            }
        }
    }

    /// Fetches the profile for `token` and stores it if the session still holds that token.
    async fn refresh_profile(&self, token: AccessToken) {
        let profile = match self.identity.fetch_profile(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to fetch profile: {}", e);
                return;
            }
        };

        let mut session = self.session.write().await;
        if session.token.as_ref() != Some(&token) {
            tracing::debug!("[SessionManager] Discarding profile for a replaced session");
            return;
        }
        match self.persist(&token, Some(&profile)) {
            Ok(()) => session.user = Some(profile),
            Err(e) => tracing::warn!("[SessionManager] Failed to persist profile: {}", e),
        }
    }

    fn persist(&self, token: &AccessToken, user: Option<&Profile>) -> Result<()> {
        match user {
            Some(profile) => {
                let json = serde_json::to_string(profile)?;
                self.store
                    .set_many(&[(TOKEN_KEY, token.as_str()), (PROFILE_KEY, json.as_str())])
            }
            None => self.store.set(TOKEN_KEY, token.as_str()),
        }
    }
}
