//! Infrastructure layer for Herald.
//!
//! File-backed persistence, configuration loading and the adapters for the
//! external identity and messaging capabilities defined in `herald-core`.

pub mod config_service;
pub mod file_session_store;
pub mod graph;
pub mod memory_session_store;
pub mod paths;
pub mod simulated_messenger;
pub mod storage;

pub use config_service::ConfigService;
pub use file_session_store::FileSessionStore;
pub use graph::{GraphIdentityProvider, LoginFlow};
pub use memory_session_store::InMemorySessionStore;
pub use paths::{HeraldPaths, ServiceType};
pub use simulated_messenger::SimulatedMessenger;
