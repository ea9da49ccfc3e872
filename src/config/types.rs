// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_HOST: &str = "backend";
pub const DEFAULT_BACKEND_PORT: u16 = 8000;
pub const DEFAULT_PROXY_PREFIXES: [&str; 3] = ["/pixels", "/session", "/ws"];
pub const DEFAULT_STATIC_ROOT: &str = "./src";
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_ACCESS_LOG_FORMAT: &str = "combined";
pub const DEFAULT_SHUTDOWN_TIMEOUT: u64 = 10;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Listening socket configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads (CPU cores when unset)
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: None,
        }
    }
}

/// Backend origin that owns every proxied route
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BACKEND_HOST.to_string(),
            port: DEFAULT_BACKEND_PORT,
        }
    }
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RoutesConfig {
    /// Path prefixes forwarded to the backend (first match wins)
    pub proxy_prefixes: Vec<String>,
    /// Directory holding the frontend assets
    pub static_root: String,
    /// File served for `/`
    pub index_document: String,
    /// Reject static paths that resolve outside `static_root`
    #[serde(default = "default_confine_to_root")]
    pub confine_to_root: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_confine_to_root() -> bool {
    true
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            proxy_prefixes: DEFAULT_PROXY_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            static_root: DEFAULT_STATIC_ROOT.to_string(),
            index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
            confine_to_root: default_confine_to_root(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    DEFAULT_ACCESS_LOG_FORMAT.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    #[serde(default)]
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            max_connections: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}
