//! HTTP protocol layer module
//!
//! Body type, MIME table and response builders shared by the static and
//! proxy branches.

pub mod mime;
pub mod response;

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;

// Re-export commonly used items
pub use response::{build_404_response, build_file_response, NOT_FOUND_BODY};

/// Response body for both branches: buffered static content or the
/// backend's streaming body
pub type ResponseBody = BoxBody<Bytes, hyper::Error>;

/// Wrap buffered bytes as a `ResponseBody`
pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}
