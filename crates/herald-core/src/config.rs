//! Configuration model.
//!
//! Every section and field has a default so a partial (or empty) config
//! file is always valid.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SCOPES: &[&str] = &["public_profile", "email"];

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct HeraldConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub broadcast: BroadcastSettings,
    #[serde(default)]
    pub messaging: MessagingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Identity provider settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    /// Application id registered with the platform. `connect` refuses to run without it.
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

impl IdentityConfig {
    /// Returns the application id if one is configured and non-blank.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            scopes: default_scopes(),
            api_version: default_api_version(),
            graph_base_url: default_graph_base_url(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_redirect_uri() -> String {
    "https://www.facebook.com/connect/login_success.html".to_string()
}

/// Parses a comma separated scope list, trimming entries and dropping empties.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pacing and validation limits for broadcasts.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BroadcastSettings {
    #[serde(default = "default_delay_secs")]
    pub default_delay_secs: u64,
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            default_delay_secs: default_delay_secs(),
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_delay_secs() -> u64 {
    5
}

fn default_min_delay_secs() -> u64 {
    1
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_max_message_chars() -> usize {
    2000
}

/// Settings for the simulated send backend.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MessagingSettings {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Probability in `[0, 1]` that a send fails with a rate-limit error.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            failure_rate: default_failure_rate(),
        }
    }
}

fn default_latency_ms() -> u64 {
    500
}

fn default_failure_rate() -> f64 {
    0.1
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write a daily rolling log file under the logs directory.
    #[serde(default = "default_log_file")]
    pub file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> bool {
    true
}
