//! Unified path management for Herald files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/herald/            # Config directory (or the --home override)
//! ├── config.toml              # Application configuration
//! ├── session.toml             # Persisted session (token + profile), mode 600
//! └── logs/                    # Application logs
//!     └── herald.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "herald";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home/config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot determine the config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for herald_core::HeraldError {
    fn from(err: PathError) -> Self {
        herald_core::HeraldError::config(err.to_string())
    }
}

/// The files Herald keeps on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    Session,
    Logs,
}

impl ServiceType {
    fn relative_path(&self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::Session => "session.toml",
            ServiceType::Logs => "logs",
        }
    }
}

/// Resolves Herald paths, optionally rooted at a custom base directory.
#[derive(Debug, Clone, Default)]
pub struct HeraldPaths {
    base: Option<PathBuf>,
}

impl HeraldPaths {
    /// `base` replaces the platform config directory (used by tests and `--home`).
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the root directory, e.g. `~/.config/herald/`.
    pub fn root_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        Ok(self.root_dir()?.join(service.relative_path()))
    }
}
