//! Graph API adapter for the identity provider capability.
//!
//! - `client`: [`GraphIdentityProvider`] and the [`LoginFlow`] seam
//! - `wire`: response payloads and error mapping

mod client;
mod wire;

pub use client::{GraphIdentityProvider, LoginFlow, oauth_dialog_url};
pub use wire::token_from_redirect;
