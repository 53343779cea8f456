//! Configuration settings structures for chirp-client.
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

// ============================================================================
// Default value functions
// ============================================================================

fn default_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_refetch_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// API Configuration
// ============================================================================

/// REST API endpoint configuration.
///
/// All relative paths issued by the transport are resolved against
/// `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

// ============================================================================
// Search Configuration
// ============================================================================

/// Debounced-search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Trailing debounce window in milliseconds; a keystroke arriving before
    /// the window elapses restarts it.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

// ============================================================================
// Sync Configuration
// ============================================================================

/// Background synchronization configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval for polling queries (notification count, open chat) in
    /// milliseconds.
    #[serde(default = "default_refetch_interval_ms")]
    pub refetch_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refetch_interval_ms: default_refetch_interval_ms(),
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level filter (passed to `EnvFilter`)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted events instead of human-readable lines
    #[serde(default)]
    pub json: bool,

    /// Colored console output (when attached to a terminal)
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            colored: true,
        }
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Settings {
    /// Validates settings consistency after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("api.base_url must not be empty"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::invalid(
                "api.base_url must start with http:// or https://",
            ));
        }
        if self.api.request_timeout == 0 {
            return Err(ConfigError::invalid("api.request_timeout must be positive"));
        }
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::invalid("search.debounce_ms must be positive"));
        }
        if self.sync.refetch_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "sync.refetch_interval_ms must be positive",
            ));
        }
        Ok(())
    }
}
