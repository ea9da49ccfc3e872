//! Static file serving module
//!
//! Maps request paths onto the asset root, checks existence and builds the
//! file response. Anything that is not a readable regular file is a 404.

use hyper::Response;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::AppState;
use crate::error::Result;
use crate::http::{self, mime, ResponseBody};
use crate::logger;

/// Serve a static asset for `path`
pub async fn serve(path: &str, state: &AppState) -> Result<Response<ResponseBody>> {
    let routes = &state.config.routes;
    let file_path = resolve_path(Path::new(&routes.static_root), &routes.index_document, path);

    if routes.confine_to_root {
        // Resolved per request so a root created or swapped after startup is honoured
        let Ok(root) = fs::canonicalize(&routes.static_root).await else {
            return Ok(http::build_404_response());
        };
        if !is_within_root(&file_path, &root, path) {
            return Ok(http::build_404_response());
        }
    }

    match load_file(&file_path).await? {
        Some(content) => {
            let content_type =
                mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
            Ok(http::build_file_response(content, content_type))
        }
        None => Ok(http::build_404_response()),
    }
}

/// Map a request path to a file under `root`.
///
/// `/` is the index document; every other path is joined onto the root as-is
/// (leading slashes removed so the join never escapes to `/`).
pub fn resolve_path(root: &Path, index_document: &str, path: &str) -> PathBuf {
    if path == "/" {
        return root.join(index_document);
    }
    root.join(path.trim_start_matches('/'))
}

/// Confinement check against the canonical root.
///
/// Missing files canonicalize to an error and are reported as outside, which
/// the caller turns into the same 404 a missing file would get anyway.
fn is_within_root(file_path: &Path, root_canonical: &Path, request_path: &str) -> bool {
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return false;
    };
    if file_path_canonical.starts_with(root_canonical) {
        return true;
    }
    logger::log_warning(&format!(
        "Path traversal attempt blocked: {} -> {}",
        request_path,
        file_path_canonical.display()
    ));
    false
}

/// Read a regular file; `None` when it does not exist or is not a file
pub async fn load_file(file_path: &Path) -> Result<Option<Vec<u8>>> {
    // File not found is common (404), no need to log
    let Ok(metadata) = fs::metadata(file_path).await else {
        return Ok(None);
    };
    if !metadata.is_file() {
        return Ok(None);
    }

    match fs::read(file_path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            Err(e.into())
        }
    }
}
