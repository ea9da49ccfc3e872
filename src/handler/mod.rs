//! Request handler module
//!
//! Dispatches every request to one of two branches: the reverse proxy for
//! backend-owned prefixes, or static files for everything else.

pub mod proxy;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::route;
