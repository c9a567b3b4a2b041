//! Identity provider capability.
//!
//! Abstracts the third-party login SDK so the session manager and the
//! recipient catalog hold it by reference instead of reaching for a global.

use async_trait::async_trait;

use super::model::{AccessToken, Profile};
use crate::config::IdentityConfig;
use crate::error::Result;
use crate::recipient::Recipient;

/// Result of asking the provider whether a session is still live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    /// The session is valid. The token may differ from the one we asked about
    /// if the provider refreshed it.
    Connected { token: AccessToken },
    /// The provider does not recognize the session.
    NotAuthorized,
}

/// Result of the interactive login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted { token: AccessToken },
    /// The user closed or rejected the login dialog.
    Denied,
}

/// The external identity provider (login SDK plus the read APIs it gates).
///
/// `init` must complete before `login` or `get_status` is called; the
/// session manager enforces that ordering.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// One-time bootstrap with the application id.
    async fn init(&self, app_id: &str, config: &IdentityConfig) -> Result<()>;

    /// Corroborates a persisted session with the provider.
    ///
    /// `Err` means the provider could not be reached; it does not say the
    /// session is invalid.
    async fn get_status(&self, known: Option<&AccessToken>) -> Result<LoginStatus>;

    /// Runs the interactive login for the given permission scopes.
    async fn login(&self, scopes: &[String]) -> Result<LoginOutcome>;

    async fn logout(&self, token: &AccessToken) -> Result<()>;

    async fn fetch_profile(&self, token: &AccessToken) -> Result<Profile>;

    async fn list_individuals(&self, token: &AccessToken) -> Result<Vec<Recipient>>;

    async fn list_groups(&self, token: &AccessToken) -> Result<Vec<Recipient>>;
}
