// Application state module
// Read-only state shared by every connection task

use hyper::body::Incoming;
use hyper::http::uri::Authority;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::error::Result;

/// Outbound client; request bodies are the inbound `Incoming` streams
pub type BackendClient = Client<HttpConnector, Incoming>;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Backend origin, resolved once
    pub backend: Authority,
    pub client: BackendClient,
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let backend = config.backend_authority()?;

        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            config: config.clone(),
            backend,
            client,
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }
}
