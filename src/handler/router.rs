//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: classify by path prefix, then
//! hand the request to exactly one branch.

use hyper::body::{Body, Incoming};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::{Request, Response, Version};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::error::Result;
use crate::handler::{proxy, static_files};
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, RouteKind};

/// Main entry point for HTTP request handling.
///
/// Errors (backend unreachable, unreadable file) belong to this request
/// only; the connection layer logs them and drops the connection.
pub async fn route(
    req: Request<Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>> {
    let start = Instant::now();
    let kind = routing::classify(req.uri().path(), &state.config.routes.proxy_prefixes);

    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, remote_addr, kind));

    let response = match kind {
        RouteKind::Proxy => proxy::forward(req, &state).await?,
        RouteKind::Static => {
            let path = req.uri().path().to_string();
            static_files::serve(&path, &state).await?
        }
    };

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact();
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry(
    req: &Request<Incoming>,
    remote_addr: SocketAddr,
    kind: RouteKind,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
        kind,
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
