//! Configuration service implementation.
//!
//! Loads [`HeraldConfig`] from `~/.config/herald/config.toml`, writing a
//! default file on first use, then layers `HERALD_*` environment overrides
//! on top.

use crate::paths::{HeraldPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use herald_core::Result;
use herald_core::config::{HeraldConfig, parse_scopes};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const ENV_APP_ID: &str = "HERALD_APP_ID";
pub const ENV_SCOPES: &str = "HERALD_SCOPES";
pub const ENV_LOG: &str = "HERALD_LOG";

/// Configuration service that loads and caches the configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, environment overrides already applied.
    config: Arc<RwLock<Option<HeraldConfig>>>,
}

impl ConfigService {
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = HeraldPaths::new(base_path).get_path(ServiceType::Config)?;
        Ok(Self {
            path,
            config: Arc::new(RwLock::new(None)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<HeraldConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = apply_env_overrides(self.load_file()?, |key| std::env::var(key).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        tracing::debug!("[ConfigService] Loaded configuration from {:?}", self.path);
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_file(&self) -> Result<HeraldConfig> {
        let file = AtomicTomlFile::<HeraldConfig>::new(self.path.clone());
        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = HeraldConfig::default();
                file.save(&default_config)?;
                tracing::info!("[ConfigService] Created default config at {:?}", self.path);
                Ok(default_config)
            }
        }
    }
}

/// Applies `HERALD_*` overrides using `lookup` to read variables.
///
/// Blank values are ignored so an exported-but-empty variable does not wipe
/// a configured value.
pub fn apply_env_overrides<F>(mut config: HeraldConfig, lookup: F) -> HeraldConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(app_id) = non_blank(ENV_APP_ID) {
        config.identity.app_id = Some(app_id.trim().to_string());
    }
    if let Some(raw) = non_blank(ENV_SCOPES) {
        let scopes = parse_scopes(&raw);
        if !scopes.is_empty() {
            config.identity.scopes = scopes;
        }
    }
    if let Some(level) = non_blank(ENV_LOG) {
        config.logging.level = level.trim().to_string();
    }

    config
}
