//! `IdentityProvider` implementation over the Graph HTTP API.

use super::wire;
use async_trait::async_trait;
use herald_core::config::IdentityConfig;
use herald_core::recipient::Recipient;
use herald_core::session::{AccessToken, IdentityProvider, LoginOutcome, LoginStatus, Profile};
use herald_core::{HeraldError, Result};
use reqwest::{Client, Method, Request, Url};
use std::sync::{Arc, RwLock};
use std::time::Duration;

const DIALOG_BASE_URL: &str = "https://www.facebook.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROFILE_FIELDS: &str = "id,name,email,picture.type(large)";
const FRIEND_FIELDS: &str = "id,name,picture.type(large)";
const GROUP_FIELDS: &str = "id,name,icon,member_count";

/// The interactive half of the login.
///
/// The provider builds the OAuth dialog URL; the implementor shows it to the
/// user and hands back whatever came out of the dialog.
#[async_trait]
pub trait LoginFlow: Send + Sync {
    /// Returns the granted token, or `None` if the user cancelled.
    async fn authorize(&self, dialog_url: &str) -> Result<Option<String>>;
}

/// Values fixed by `init`.
#[derive(Debug, Clone)]
struct GraphSettings {
    app_id: String,
    api_base: String,
    api_version: String,
    redirect_uri: String,
}

/// Graph-backed identity provider.
///
/// There is no Graph call that only ends a session, so `logout` revokes
/// the app's permissions (`DELETE /me/permissions`).
pub struct GraphIdentityProvider {
    client: Client,
    login_flow: Arc<dyn LoginFlow>,
    settings: RwLock<Option<GraphSettings>>,
}

impl GraphIdentityProvider {
    pub fn new(login_flow: Arc<dyn LoginFlow>) -> Self {
        Self {
            client: Client::new(),
            login_flow,
            settings: RwLock::new(None),
        }
    }

    fn settings(&self) -> Result<GraphSettings> {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(HeraldError::NotReady)
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        fields: Option<&str>,
        token: &AccessToken,
    ) -> Result<Request> {
        let settings = self.settings()?;
        let url = format!(
            "{}/{}/{}",
            settings.api_base.trim_end_matches('/'),
            settings.api_version,
            path
        );

        let mut query = vec![("access_token", token.as_str())];
        if let Some(fields) = fields {
            query.push(("fields", fields));
        }

        self.client
            .request(method, &url)
            .query(&query)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HeraldError::config(format!("Invalid Graph request /{}: {}", path, e)))
    }

    /// Sends one Graph request and returns the raw success body.
    async fn call(
        &self,
        method: Method,
        path: &str,
        fields: Option<&str>,
        token: &AccessToken,
    ) -> Result<String> {
        let request = self.build_request(method, path, fields, token)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| HeraldError::network(format!("Graph request to /{} failed: {}", path, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HeraldError::network(format!("Failed to read Graph response: {}", e)))?;

        if !status.is_success() {
            return Err(wire::map_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Builds the OAuth dialog URL for a token-response login.
pub fn oauth_dialog_url(
    app_id: &str,
    api_version: &str,
    redirect_uri: &str,
    scopes: &[String],
) -> Result<Url> {
    let scope = scopes.join(",");
    Url::parse_with_params(
        &format!("{}/{}/dialog/oauth", DIALOG_BASE_URL, api_version),
        &[
            ("client_id", app_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "token"),
            ("scope", scope.as_str()),
        ],
    )
    .map_err(|e| HeraldError::config(format!("Invalid OAuth dialog URL: {}", e)))
}

#[async_trait]
impl IdentityProvider for GraphIdentityProvider {
    async fn init(&self, app_id: &str, config: &IdentityConfig) -> Result<()> {
        let settings = GraphSettings {
            app_id: app_id.to_string(),
            api_base: config.graph_base_url.clone(),
            api_version: config.api_version.clone(),
            redirect_uri: config.redirect_uri.clone(),
        };
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = Some(settings);
        tracing::debug!(
            "[Graph] Initialized for app {} (API {})",
            app_id,
            config.api_version
        );
        Ok(())
    }

    async fn get_status(&self, known: Option<&AccessToken>) -> Result<LoginStatus> {
        self.settings()?;
        let Some(token) = known else {
            return Ok(LoginStatus::NotAuthorized);
        };

        match self.call(Method::GET, "me", Some("id"), token).await {
            Ok(_) => Ok(LoginStatus::Connected {
                token: token.clone(),
            }),
            Err(HeraldError::SessionInvalid(reason)) => {
                tracing::info!("[Graph] Stored token rejected: {}", reason);
                Ok(LoginStatus::NotAuthorized)
            }
            Err(e) => Err(e),
        }
    }

    async fn login(&self, scopes: &[String]) -> Result<LoginOutcome> {
        let settings = self.settings()?;
        let url = oauth_dialog_url(
            &settings.app_id,
            &settings.api_version,
            &settings.redirect_uri,
            scopes,
        )?;

        match self.login_flow.authorize(url.as_str()).await? {
            Some(raw) => match wire::token_from_redirect(&raw) {
                Some(token) => Ok(LoginOutcome::Granted {
                    token: AccessToken::new(token),
                }),
                None => Ok(LoginOutcome::Denied),
            },
            None => Ok(LoginOutcome::Denied),
        }
    }

    /// Revokes the app's permissions for the user. This de-authorizes the
    /// app as a whole, so the next login shows the consent dialog again.
    async fn logout(&self, token: &AccessToken) -> Result<()> {
        self.call(Method::DELETE, "me/permissions", None, token)
            .await
            .map(|_| ())
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<Profile> {
        let body = self
            .call(Method::GET, "me", Some(PROFILE_FIELDS), token)
            .await?;
        wire::parse_profile(&body)
    }

    async fn list_individuals(&self, token: &AccessToken) -> Result<Vec<Recipient>> {
        let body = self
            .call(Method::GET, "me/friends", Some(FRIEND_FIELDS), token)
            .await?;
        wire::parse_individuals(&body)
    }

    async fn list_groups(&self, token: &AccessToken) -> Result<Vec<Recipient>> {
        let body = self
            .call(Method::GET, "me/groups", Some(GROUP_FIELDS), token)
            .await?;
        wire::parse_groups(&body)
    }
}
