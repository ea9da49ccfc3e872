//! HTTP response building module
//!
//! Builders for the responses the router synthesises itself. Proxied
//! responses never pass through here.

use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::{full, ResponseBody};

/// Exact 404 body; clients compare against it
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/plain")
        .body(full(NOT_FOUND_BODY))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            let mut resp = Response::new(full(NOT_FOUND_BODY));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            resp
        })
}

/// Build 200 response carrying a static file
pub fn build_file_response(data: Vec<u8>, content_type: &str) -> Response<ResponseBody> {
    let content_length = data.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .body(full(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(full(Vec::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
