//! Broadcast domain module.
//!
//! Holds the state types observed around a dispatch run and the messaging
//! capability the run drives. The engine itself lives in the application
//! layer.

mod messaging;
mod model;

pub use messaging::{MessagingService, SendError};
pub use model::{BroadcastProgress, DispatchState, RunOutcome, RunSummary};
