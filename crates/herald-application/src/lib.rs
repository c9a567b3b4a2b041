//! Application layer for Herald.
//!
//! Coordinates the domain types from `herald-core` with the injected
//! identity, messaging and storage capabilities: session lifecycle,
//! recipient selection, pacing and the broadcast run itself.

pub mod dispatch;
pub mod pacing;
pub mod recipient_catalog;
pub mod session_manager;

pub use dispatch::{BroadcastDispatcher, BroadcastHandle};
pub use pacing::DelayScheduler;
pub use recipient_catalog::{FetchSummary, RecipientCatalog};
pub use session_manager::SessionManager;
