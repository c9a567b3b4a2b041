//! Dependency wiring shared by all commands.

use crate::login_flow::PromptLoginFlow;
use anyhow::{Context, Result};
use herald_application::{BroadcastDispatcher, RecipientCatalog, SessionManager};
use herald_core::StatusLog;
use herald_core::config::HeraldConfig;
use herald_core::session::IdentityProvider;
use herald_infrastructure::{FileSessionStore, GraphIdentityProvider, SimulatedMessenger};
use std::path::Path;
use std::sync::Arc;

pub struct AppContext {
    pub config: HeraldConfig,
    pub session: SessionManager,
    pub catalog: RecipientCatalog,
    pub dispatcher: BroadcastDispatcher,
    pub log: StatusLog,
}

impl AppContext {
    pub fn build(config: HeraldConfig, home: Option<&Path>, preset_token: Option<String>) -> Result<Self> {
        let store = FileSessionStore::new(home).context("Failed to open the session store")?;
        let identity: Arc<dyn IdentityProvider> = Arc::new(GraphIdentityProvider::new(Arc::new(
            PromptLoginFlow::new(preset_token),
        )));
        let messenger = Arc::new(SimulatedMessenger::from_settings(&config.messaging));
        let log = StatusLog::new();

        let session = SessionManager::new(identity.clone(), Arc::new(store), config.identity.clone());
        let catalog = RecipientCatalog::new(identity, session.clone());
        let dispatcher =
            BroadcastDispatcher::new(session.clone(), messenger, log.clone(), &config.broadcast);

        Ok(Self {
            config,
            session,
            catalog,
            dispatcher,
            log,
        })
    }

    /// Initializes the provider and restores the persisted session,
    /// waiting for the liveness check so commands see a verified state.
    pub async fn bootstrap(&self) -> Result<()> {
        self.session.initialize().await?;
        if let Some(check) = self.session.restore().await? {
            check.await.context("Session check task failed")?;
        }
        Ok(())
    }
}
