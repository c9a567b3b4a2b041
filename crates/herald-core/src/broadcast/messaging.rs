//! Messaging capability used by the dispatch engine.

use async_trait::async_trait;
use thiserror::Error;

use crate::recipient::RecipientKind;
use crate::session::AccessToken;

/// Why a single send failed.
///
/// These are always recovered inside a run: the failure becomes an `error`
/// entry in the status log and the run moves on to the next recipient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Network(String),
}

/// The external send operation.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Delivers `text` to one recipient. Resolves once the platform answered.
    async fn send(
        &self,
        recipient_id: &str,
        kind: RecipientKind,
        text: &str,
        token: &AccessToken,
    ) -> Result<(), SendError>;
}
