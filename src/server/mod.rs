// Server module entry point
// Binds the listener, runs the accept loop and owns shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{AppState, Config};
use crate::error::{Error, Result};
use crate::logger;

pub use listener::create_listener;

/// Poll interval while draining connections on shutdown
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Handle to a running server returned by [`start`]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Arc<watch::Sender<bool>>,
    task: JoinHandle<Result<()>>,
    state: Arc<AppState>,
}

/// Requests shutdown of the server it was taken from; cheap to clone
#[derive(Clone)]
pub struct ShutdownTrigger(Arc<watch::Sender<bool>>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }
}

/// Validate `config`, bind the listener and spawn the accept loop.
///
/// Must be called from within a Tokio runtime. Returns as soon as the
/// socket is listening.
pub async fn start(config: Config) -> Result<ServerHandle> {
    config.validate()?;
    let addr = config.socket_addr()?;

    let listener = create_listener(addr)?;
    let local_addr = listener.local_addr()?;
    let state = Arc::new(AppState::new(&config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    logger::log_server_start(&local_addr, &config);
    for warning in config.warnings() {
        logger::log_warning(&warning);
    }

    let task = tokio::spawn(server_loop::run(listener, Arc::clone(&state), shutdown_rx));

    Ok(ServerHandle {
        local_addr,
        shutdown_tx: Arc::new(shutdown_tx),
        task,
        state,
    })
}

impl ServerHandle {
    /// Address the listener is bound to (resolves port `0`)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn active_connections(&self) -> usize {
        self.state.active_connections.load(Ordering::SeqCst)
    }

    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        ShutdownTrigger(Arc::clone(&self.shutdown_tx))
    }

    /// Stop accepting, let in-flight requests finish, then return.
    ///
    /// Connections still open after `performance.shutdown_timeout` seconds
    /// are left to finish in the background.
    pub async fn shutdown(self) -> Result<()> {
        logger::log_shutdown_requested(self.active_connections());
        self.shutdown_tx.send_replace(true);
        self.wait().await
    }

    /// Run until a [`ShutdownTrigger`] fires, then drain like [`Self::shutdown`]
    pub async fn wait(self) -> Result<()> {
        let result = join(self.task).await;

        let timeout = Duration::from_secs(self.state.config.performance.shutdown_timeout);
        let deadline = tokio::time::Instant::now() + timeout;
        while self.state.active_connections.load(Ordering::SeqCst) > 0
            && tokio::time::Instant::now() < deadline
        {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }

        logger::log_shutdown_complete(self.state.active_connections.load(Ordering::SeqCst));
        result
    }
}

async fn join(task: JoinHandle<Result<()>>) -> Result<()> {
    task.await
        .map_err(|e| Error::Io(std::io::Error::other(format!("Accept loop failed: {e}"))))?
}

/// Resolves once the shutdown flag is set. A dropped sender never resolves,
/// so losing the handle does not stop the server.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
