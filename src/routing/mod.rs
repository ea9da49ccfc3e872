//! Routing module
//!
//! Classifies a request path into one of the two route kinds. The decision
//! looks at the path only; method, headers and body never influence it.

mod matcher;

pub use matcher::{classify, RouteKind};
