//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: `Session`, `Profile` and the redacted `AccessToken`
//! - `store`: `SessionStore` trait and its two keys
//! - `identity`: `IdentityProvider` capability and its outcome types

mod identity;
mod model;
mod store;

pub use identity::{IdentityProvider, LoginOutcome, LoginStatus};
pub use model::{AccessToken, Profile, Session};
pub use store::{PROFILE_KEY, SessionStore, TOKEN_KEY};
