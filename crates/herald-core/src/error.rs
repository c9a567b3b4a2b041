//! Error types for Herald.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a broadcast (or a catalog fetch) is refused before any state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreconditionError {
    #[error("no active session; connect first")]
    NotConnected,

    #[error("a broadcast is already running")]
    AlreadyRunning,

    #[error("no recipients selected")]
    NoRecipients,

    #[error("message is empty")]
    EmptyMessage,

    #[error("message is {length} characters, limit is {limit}")]
    MessageTooLong { length: usize, limit: usize },
}

/// A shared error type for the whole Herald workspace.
///
/// Variants follow the failure taxonomy of the broadcaster: configuration
/// problems, authentication outcomes, rejected preconditions, and plain
/// infrastructure failures. Per-recipient send failures are not represented
/// here; they are [`crate::broadcast::SendError`] and never escape a run.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum HeraldError {
    /// Required configuration is missing or invalid (e.g. no application id)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The identity provider has not finished its one-time initialization
    #[error("Identity provider is not initialized yet")]
    NotReady,

    /// The user declined the interactive login
    #[error("Login was denied: {0}")]
    AuthDenied(String),

    /// The identity provider reported the session as no longer valid
    #[error("Session is no longer valid: {0}")]
    SessionInvalid(String),

    /// An operation was called while its preconditions did not hold
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Local filesystem failure
    #[error("I/O failure: {message}")]
    Io { message: String },

    /// A stored or received document could not be encoded or decoded
    #[error("Malformed {format}: {message}")]
    Serialization { format: String, message: String },

    /// The persistent store could not be read or written
    #[error("Session store unavailable: {0}")]
    DataAccess(String),

    /// Remote call failed before a response was obtained
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered with an error payload
    #[error("Remote API error: {0}")]
    Remote(String),

    /// Broken internal state, such as a panicked background task
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl HeraldError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Configuration errors are fatal to `connect()` and never retried.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::NotReady)
    }

    /// Authentication outcomes are informational: the session is simply disconnected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthDenied(_) | Self::SessionInvalid(_))
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Returns the precondition that was violated, if any.
    pub fn precondition(&self) -> Option<&PreconditionError> {
        match self {
            Self::Precondition(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<std::io::Error> for HeraldError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{:?}: {}", err.kind(), err),
        }
    }
}

impl From<serde_json::Error> for HeraldError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HeraldError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HeraldError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for HeraldError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HeraldError>;
