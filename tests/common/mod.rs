//! Shared utilities for integration testing.

#![allow(dead_code)]

use edge_router::Config;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONNECTION, UPGRADE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Body of the mock backend's `429` reply
pub const RATE_LIMIT_BODY: &[u8] = b"You can only change one pixel every 30 seconds.";

/// What the mock backend saw
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub type Recorder = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start a mock backend on an ephemeral port.
///
/// Plain requests get `201` with `x-backend-token: canvas` and a body
/// describing the request, except paths under `/pixels/limited`, which get a
/// `429` rate-limit rejection. Upgrade requests get `101` and the upgraded
/// connection echoes every byte back.
pub async fn start_mock_backend() -> (SocketAddr, Recorder) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
    let rec = Arc::clone(&recorder);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let rec = Arc::clone(&rec);
            tokio::spawn(async move {
                let service = service_fn(move |req| backend_handler(req, Arc::clone(&rec)));
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .with_upgrades()
                    .await;
            });
        }
    });

    (addr, recorder)
}

async fn backend_handler(
    mut req: Request<Incoming>,
    recorder: Recorder,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(ToString::to_string)
        .unwrap_or_default();
    let headers = req
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    if req.headers().contains_key(UPGRADE) {
        recorder.lock().unwrap().push(RecordedRequest {
            method,
            path_and_query,
            headers,
            body: Vec::new(),
        });
        let on_upgrade = hyper::upgrade::on(&mut req);
        tokio::spawn(async move {
            if let Ok(upgraded) = on_upgrade.await {
                let mut io = TokioIo::new(upgraded);
                let mut buf = [0u8; 1024];
                while let Ok(n) = io.read(&mut buf).await {
                    if n == 0 || io.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        });
        return Ok(Response::builder()
            .status(StatusCode::SWITCHING_PROTOCOLS)
            .header(CONNECTION, "Upgrade")
            .header(UPGRADE, "websocket")
            .body(Full::new(Bytes::new()))
            .unwrap());
    }

    let body = req.into_body().collect().await.unwrap().to_bytes().to_vec();
    let reply = format!("backend saw {method} {path_and_query} ({} bytes)", body.len());
    let limited = path_and_query.starts_with("/pixels/limited");
    recorder.lock().unwrap().push(RecordedRequest {
        method,
        path_and_query,
        headers,
        body,
    });

    if limited {
        return Ok(Response::builder()
            .status(StatusCode::TOO_MANY_REQUESTS)
            .header("retry-after", "30")
            .header("x-ratelimit-remaining", "0")
            .header("content-type", "text/plain")
            .body(Full::new(Bytes::from_static(RATE_LIMIT_BODY)))
            .unwrap());
    }

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("x-backend-token", "canvas")
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(reply)))
        .unwrap())
}

/// An address nothing listens on
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Create an asset root holding `index.html`, `app.js` and `assets/`
pub fn temp_asset_root(label: &str) -> PathBuf {
    let idx = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "edge_router_it_{label}_{}_{idx}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&path);
    std::fs::create_dir_all(path.join("assets")).unwrap();
    std::fs::write(path.join("index.html"), "<!doctype html><canvas id=\"c\"></canvas>").unwrap();
    std::fs::write(path.join("app.js"), "const socket = new WebSocket('/ws');").unwrap();
    std::fs::write(path.join("assets/palette.bin"), [0u8, 159, 146, 150, 255]).unwrap();
    path
}

/// A fresh path under the temp dir that does not exist yet
pub fn temp_missing_root(label: &str) -> PathBuf {
    let idx = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "edge_router_it_{label}_{}_{idx}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&path);
    path
}

/// Config bound to an ephemeral loopback port
pub fn test_config(backend: SocketAddr, static_root: &std::path::Path) -> Config {
    let mut cfg = Config::default();
    cfg.server.host = "127.0.0.1".to_string();
    cfg.server.port = 0;
    cfg.backend.host = backend.ip().to_string();
    cfg.backend.port = backend.port();
    cfg.routes.static_root = static_root.to_string_lossy().into_owned();
    cfg.logging.access_log = false;
    cfg.performance.shutdown_timeout = 2;
    cfg
}

pub type TestClient = Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>;

pub fn client() -> TestClient {
    Client::builder(TokioExecutor::new()).build_http()
}

/// Send a request and collect the whole response
pub async fn send(
    client: &TestClient,
    req: Request<Full<Bytes>>,
) -> Result<(StatusCode, hyper::HeaderMap, Vec<u8>), hyper_util::client::legacy::Error> {
    let resp = client.request(req).await?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    Ok((status, headers, body))
}

pub fn get(addr: SocketAddr, path: &str) -> Request<Full<Bytes>> {
    Request::get(format!("http://{addr}{path}"))
        .body(Full::new(Bytes::new()))
        .unwrap()
}
