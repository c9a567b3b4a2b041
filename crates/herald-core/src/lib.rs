//! Domain layer for Herald.
//!
//! Models, capability traits and shared error/config types. Nothing here
//! performs I/O; implementations of the traits live in
//! `herald-infrastructure` and the orchestration in `herald-application`.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod recipient;
pub mod session;
pub mod status_log;

// Re-export common error type
pub use error::{HeraldError, PreconditionError, Result};
pub use status_log::{LogEntry, LogStatus, StatusLog};
