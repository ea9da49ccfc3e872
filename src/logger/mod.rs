//! Logger module
//!
//! Thin facade over `tracing` so call sites stay short:
//! - Subscriber initialisation from `LoggingConfig`
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `logging.level`. Calling this twice is harmless,
/// the second subscriber is simply not installed.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    let backend = format!("{}:{}", config.backend.host, config.backend.port);
    tracing::info!(
        address = %addr,
        backend = %backend,
        static_root = %config.routes.static_root,
        "Frontend running on http://{addr}"
    );
    tracing::info!(prefixes = ?config.routes.proxy_prefixes, "Proxy prefixes");
    if let Some(workers) = config.server.workers {
        tracing::info!(workers, "Worker threads");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::error!(error = %err, "Failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_upgrade_started(path: &str) {
    tracing::debug!(path, "Upgraded connection relay started");
}

pub fn log_upgrade_finished(path: &str, client_to_backend: u64, backend_to_client: u64) {
    tracing::debug!(
        path,
        client_to_backend,
        backend_to_client,
        "Upgraded connection relay finished"
    );
}

pub fn log_shutdown_requested(active: usize) {
    tracing::info!(active_connections = active, "Shutdown requested, draining connections");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("Server stopped");
    } else {
        tracing::warn!(
            remaining_connections = remaining,
            "Server stopped before all connections finished"
        );
    }
}
