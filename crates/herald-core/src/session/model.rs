//! Session domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque credential issued by the identity provider.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<redacted, {} chars>)", self.0.len())
    }
}

/// Snapshot of the authenticated user as reported by the identity provider.
///
/// Replaced wholesale on every fetch, never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            picture: None,
            email: None,
        }
    }
}

/// The authenticated session.
///
/// There is no separate `connected` flag: a session is connected exactly
/// when it holds a token. `user` may still be `None` right after a fresh
/// connect while the profile fetch is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<AccessToken>,
    pub user: Option<Profile>,
}

impl Session {
    pub fn connected(token: AccessToken, user: Option<Profile>) -> Self {
        Self {
            token: Some(token),
            user,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.token.is_some()
    }
}
