//! Route matching module
//!
//! Prefix matching against the configured proxy prefixes.

use std::fmt;

/// Which branch handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Forwarded untouched to the backend origin
    Proxy,
    /// Served from the local asset root
    Static,
}

impl RouteKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request path.
///
/// First matching prefix wins. Matching is a plain string prefix test, so
/// `/session` also claims `/sessions`.
pub fn classify<S: AsRef<str>>(path: &str, proxy_prefixes: &[S]) -> RouteKind {
    if proxy_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_ref()))
    {
        RouteKind::Proxy
    } else {
        RouteKind::Static
    }
}
