//! Reverse proxy module
//!
//! Forwards a request to the backend origin with its method, headers and
//! body stream untouched, and hands the backend response back as received.
//! Upgrade handshakes (WebSocket on `/ws`) are relayed byte-for-byte once
//! the backend answers `101 Switching Protocols`.

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::UPGRADE;
use hyper::http::uri::{Authority, Scheme};
use hyper::upgrade::OnUpgrade;
use hyper::{Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;

use crate::config::AppState;
use crate::error::Result;
use crate::http::ResponseBody;
use crate::logger;

/// Forward `req` to the backend. One outbound call, no retries; transport
/// failures are returned to the caller untouched.
pub async fn forward(
    mut req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<ResponseBody>> {
    let target = build_target_uri(&state.backend, req.uri())?;
    let path = req.uri().path().to_string();

    let client_upgrade = is_upgrade_request(&req).then(|| hyper::upgrade::on(&mut req));
    *req.uri_mut() = target;

    let mut resp = state.client.request(req).await?;

    if resp.status() == StatusCode::SWITCHING_PROTOCOLS {
        if let Some(client_upgrade) = client_upgrade {
            let backend_upgrade = hyper::upgrade::on(&mut resp);
            tokio::spawn(relay_upgraded(client_upgrade, backend_upgrade, path));
        }
    }

    Ok(resp.map(|body| body.boxed()))
}

/// `http://<backend>` + original path + original query
pub fn build_target_uri(backend: &Authority, original: &Uri) -> Result<Uri> {
    let path_and_query = original
        .path_and_query()
        .map_or("/", hyper::http::uri::PathAndQuery::as_str);

    Ok(Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(backend.clone())
        .path_and_query(path_and_query)
        .build()?)
}

/// Whether the client asked to switch protocols
pub fn is_upgrade_request<B>(req: &Request<B>) -> bool {
    req.headers().contains_key(UPGRADE)
}

/// Copy bytes both ways between the upgraded client and backend
/// connections until either side closes.
async fn relay_upgraded(client: OnUpgrade, backend: OnUpgrade, path: String) {
    let (client, backend) = match tokio::try_join!(client, backend) {
        Ok(pair) => pair,
        Err(e) => {
            logger::log_error(&format!("Upgrade failed for {path}: {e}"));
            return;
        }
    };

    logger::log_upgrade_started(&path);
    let mut client = TokioIo::new(client);
    let mut backend = TokioIo::new(backend);

    match tokio::io::copy_bidirectional(&mut client, &mut backend).await {
        Ok((to_backend, to_client)) => {
            logger::log_upgrade_finished(&path, to_backend, to_client);
        }
        Err(e) => {
            logger::log_warning(&format!("Upgraded connection for {path} closed: {e}"));
        }
    }
}
