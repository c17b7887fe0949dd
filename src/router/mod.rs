//! # Router Module
//!
//! Route registration and path matching for dishpatch.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building the routing table at startup from verb registrations and mounted sub-routers
//! - Normalizing paths (`/a//b/` and `/a/b` are the same path)
//! - Matching a method + path to the first registration that accepts it
//! - Extracting named path parameters (`/orders/:id` → `{"id": "ORDER123"}`)
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: each registered pattern is normalized and split into literal and
//!    parameter segments once, when it is registered or mounted.
//!
//! 2. **Matching**: for each request the table is walked in registration order. An entry is
//!    skipped when its method differs or its segments do not line up with the request path;
//!    the first entry that matches wins. There is no specificity ranking, no wildcard and no
//!    optional segment.
//!
//! ## Example
//!
//! ```rust
//! use dishpatch::dispatcher::Flow;
//! use dishpatch::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.get("/orders/:id", |req, res| {
//!     let id = req.param("id").unwrap_or_default().to_string();
//!     res.json(&serde_json::json!({ "id": id }))?;
//!     Ok(Flow::Continue)
//! });
//!
//! let matched = router.find(&Method::GET, "/orders/ORDER123").unwrap();
//! assert_eq!(matched.path_params[0].1, "ORDER123");
//! ```
//!
//! ## Mounting
//!
//! [`Router::mount`] copies a sub-router's entries into the parent with the prefix prepended.
//! It is a one-time copy: later registrations on the sub-router do not reach the parent.

mod core;
mod path;
#[cfg(test)]
mod tests;

pub use core::{RouteEntry, RouteMatch, Router};
pub(crate) use core::find_in;
pub use path::{
    match_path, normalize_path, param, segments, ParamVec, PathPattern, Segment,
    MAX_INLINE_PARAMS, PARAM_MARKER, SEPARATOR,
};
