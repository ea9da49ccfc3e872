//! Edge router for the pixel canvas frontend.
//!
//! Serves the frontend's static assets and forwards backend-owned path
//! prefixes (`/pixels`, `/session`, `/ws` by default) to the backend origin,
//! relaying its responses untouched.
//!
//! ```text
//!  browser ──▶ listener ──▶ router ──┬─ prefix match ──▶ proxy ──▶ backend
//!                                    └─ otherwise ─────▶ static files (./src)
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use config::Config;
pub use error::{Error, Result};
pub use server::{start, ServerHandle, ShutdownTrigger};
