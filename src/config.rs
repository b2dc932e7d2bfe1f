//! Configuration Module
//!
//! Handles loading the caching layer's settings from environment variables.

use std::env;

use once_cell::sync::Lazy;

/// Namespace used for context-local caches when none is configured.
pub const DEFAULT_NAMESPACE: &str = "__cacheable_storage__";

static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Caching layer configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Context-propagation namespace for request-scoped caches
    pub namespace: String,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Demo HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHEABLE_NAMESPACE` - Context namespace (default: `__cacheable_storage__`)
    /// - `CACHEABLE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - Demo server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            namespace: env::var("CACHEABLE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            sweep_interval: env::var("CACHEABLE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Process-wide configuration, read from the environment on first use.
    pub fn global() -> &'static Config {
        &GLOBAL_CONFIG
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            sweep_interval: 60,
            server_port: 3000,
        }
    }
}
