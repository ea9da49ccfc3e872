// Server loop module
// Accepts connections until shutdown is requested

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use super::shutdown_requested;
use crate::config::AppState;
use crate::error::Result;
use crate::logger;

/// Accept loop. Returns once `shutdown` flips to `true`; the listener is
/// dropped on return so no new connections are queued.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, shutdown.clone());
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown_requested(&mut shutdown) => {
                break;
            }
        }
    }

    Ok(())
}
