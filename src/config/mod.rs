// Configuration module entry point
// Loads layered configuration and resolves it into runtime form

mod state;
mod types;

use hyper::http::uri::Authority;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

// Re-export public types
pub use state::AppState;
pub use types::{
    BackendConfig, Config, LoggingConfig, PerformanceConfig, RoutesConfig, ServerConfig,
};

/// Access log formats understood by `logger::AccessLogEntry`
pub const ACCESS_LOG_FORMATS: [&str; 3] = ["combined", "common", "json"];

/// Default config file name (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the specified file path (extension optional).
    ///
    /// Sources, lowest precedence first: built-in defaults, the file (if it
    /// exists), then `EDGE_*` environment variables such as `EDGE_SERVER__PORT`.
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.host", types::DEFAULT_HOST)?
            .set_default("server.port", i64::from(types::DEFAULT_PORT))?
            .set_default("backend.host", types::DEFAULT_BACKEND_HOST)?
            .set_default("backend.port", i64::from(types::DEFAULT_BACKEND_PORT))?
            .set_default("routes.proxy_prefixes", types::DEFAULT_PROXY_PREFIXES.to_vec())?
            .set_default("routes.static_root", types::DEFAULT_STATIC_ROOT)?
            .set_default("routes.index_document", types::DEFAULT_INDEX_DOCUMENT)?
            .set_default("routes.confine_to_root", true)?
            .set_default("logging.level", types::DEFAULT_LOG_LEVEL)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", types::DEFAULT_ACCESS_LOG_FORMAT)?
            .set_default("performance.keep_alive", true)?
            .set_default(
                "performance.shutdown_timeout",
                i64::try_from(types::DEFAULT_SHUTDOWN_TIMEOUT).unwrap_or(i64::MAX),
            )?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("EDGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("routes.proxy_prefixes")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field the server relies on before anything is bound
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.backend_authority()?;

        for prefix in &self.routes.proxy_prefixes {
            if !prefix.starts_with('/') || prefix.len() < 2 {
                return Err(Error::Config(format!(
                    "Proxy prefix '{prefix}' must start with '/' and name a path"
                )));
            }
        }

        let index = self.routes.index_document.as_str();
        if index.is_empty() || index == ".." || index.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "Index document '{index}' must be a bare file name"
            )));
        }

        if self.routes.static_root.is_empty() {
            return Err(Error::Config("Static root must not be empty".to_string()));
        }

        let format = self.logging.access_log_format.as_str();
        if !ACCESS_LOG_FORMATS.contains(&format) {
            return Err(Error::Config(format!(
                "Unknown access log format '{format}' (expected one of {ACCESS_LOG_FORMATS:?})"
            )));
        }

        Ok(())
    }

    /// Settings that are valid but probably not intended.
    ///
    /// Kept out of `validate` so the caller can report them once logging is up.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.routes.proxy_prefixes.is_empty() {
            warnings.push("No proxy prefixes configured, every path is static".to_string());
        }
        if !Path::new(&self.routes.static_root).is_dir() {
            warnings.push(format!(
                "Static root '{}' does not exist yet, static requests return 404 until it does",
                self.routes.static_root
            ));
        }
        warnings
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse()
            .map_err(|e| Error::InvalidAddress(format!("{raw} ({e})")))
    }

    /// Backend origin as a URI authority (`host:port`)
    pub fn backend_authority(&self) -> Result<Authority> {
        let raw = format!("{}:{}", self.backend.host, self.backend.port);
        Authority::from_str(&raw).map_err(|e| Error::InvalidAddress(format!("{raw} ({e})")))
    }
}
