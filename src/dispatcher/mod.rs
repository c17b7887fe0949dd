//! # Dispatcher Module
//!
//! The dispatcher owns the request lifecycle. It freezes a [`Router`](crate::router::Router)
//! into a read-only table and, for each request, walks it and runs the matched handler chain.
//!
//! ## Overview
//!
//! For every request the dispatcher:
//! - Normalizes the path and upper-cases the method
//! - Stamps CORS headers and answers `OPTIONS` preflight without routing
//! - Drains the body and decodes it as JSON (an empty object when it cannot)
//! - Finds the first registration matching method and path, binds its parameters
//! - Runs the handler chain until a handler ends the response or returns [`Flow::Stop`]
//! - Answers `404 {"error":"Not Found"}` when nothing matches
//!
//! ## Handler Chains
//!
//! A chain behaves like a small middleware pipeline:
//!
//! ```rust
//! use dishpatch::dispatcher::{
//!     Dispatcher, Flow, HandlerChain, HandlerResult, Incoming, RequestContext, ResponseWriter,
//! };
//! use dishpatch::router::Router;
//! use http::Method;
//!
//! fn guard(req: &mut RequestContext, res: &mut ResponseWriter) -> HandlerResult {
//!     if req.header("authorization").is_none() {
//!         res.json_with_status(401, &serde_json::json!({ "error": "Unauthorized" }))?;
//!     }
//!     Ok(Flow::Continue)
//! }
//!
//! let mut router = Router::new();
//! router.route(
//!     Method::GET,
//!     "/orders/:id",
//!     HandlerChain::new(guard).then(|req, res| {
//!         res.json(&serde_json::json!({ "id": req.param("id") }))?;
//!         Ok(Flow::Continue)
//!     }),
//! );
//!
//! let dispatcher = Dispatcher::new(router);
//! let mut res = ResponseWriter::new();
//! dispatcher.handle(Incoming::new("GET", "/orders/ORDER123"), &mut res).unwrap();
//! assert_eq!(res.status_code(), 401);
//! ```
//!
//! ## Concurrency
//!
//! Dispatch runs inside the `may` coroutine serving the connection. Body reads and any
//! blocking work in handlers yield to the scheduler, so requests interleave without sharing
//! per-request state. The table is never mutated after [`Dispatcher::new`].
//!
//! ## Error Handling
//!
//! - Malformed bodies are replaced with an empty object (or rejected with `400` when
//!   [`BodyPolicy::strict_json`] is set)
//! - Unmatched requests get the fixed `404` body
//! - Handler errors are returned as [`DispatchError::Handler`]; the server layer turns them
//!   into `500` responses

mod context;
mod core;
mod handler;
mod response;

pub use context::{
    parse_query, split_target, HeaderVec, Incoming, RequestContext, MAX_INLINE_HEADERS,
};
pub use core::{decode_body, BodyPolicy, ChainEnd, DispatchError, Dispatcher, Outcome};
pub use handler::{Flow, Handler, HandlerChain, HandlerResult};
pub use response::ResponseWriter;
