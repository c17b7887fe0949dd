//! # dishpatch
//!
//! **dishpatch** is a small HTTP request dispatcher for the `may` coroutine runtime, plus the
//! food-delivery API it was built to serve.
//!
//! ## Overview
//!
//! Routes are registered in order on a [`Router`], each as an HTTP method, a path pattern with
//! `:param` segments and a chain of handlers. Sub-routers are mounted under a prefix by copying
//! their registrations. The [`Dispatcher`] freezes the table and runs every request through a
//! fixed pipeline: CORS headers, `OPTIONS` preflight, lenient JSON body decoding, first-match
//! routing, and the matched handler chain. Unmatched requests get `404 {"error":"Not Found"}`.
//!
//! ## Architecture
//!
//! - **[`router`]** - Path normalization, `:param` matching and the ordered route table
//! - **[`dispatcher`]** - Request lifecycle, handler chains, request context and response writer
//! - **[`middleware`]** - CORS policy, global before/after hooks and request metrics
//! - **[`server`]** - `may_minihttp` adapter that hosts a [`Dispatcher`]
//! - **[`config`]** - YAML configuration with `DISHPATCH_*` environment overrides
//! - **[`otel`]** - Structured logging setup
//! - **[`demo`]** - The food-delivery API served by the binary
//! - **[`cli`]** - `dishpatch serve` and `dishpatch routes`
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as AppService<br/>(may_minihttp)
//!     participant Dispatcher
//!     participant Table as Route table
//!     participant Chain as Handler chain
//!
//!     Client->>Server: POST /api/v1/orders
//!     Server->>Dispatcher: handle(Incoming, ResponseWriter)
//!     Dispatcher->>Dispatcher: CORS headers
//!     alt OPTIONS
//!         Dispatcher-->>Server: 200 Preflight (empty)
//!     end
//!     Dispatcher->>Dispatcher: Drain + decode JSON body
//!     Dispatcher->>Table: first match (method, path)
//!     alt No match
//!         Dispatcher-->>Server: 404 {"error":"Not Found"}
//!     else Match
//!         loop each handler
//!             Dispatcher->>Chain: call(ctx, res)
//!             Chain-->>Dispatcher: Continue / Stop / Err
//!         end
//!     end
//!     Server-->>Client: HTTP response
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dishpatch::dispatcher::{Dispatcher, Flow, Incoming, ResponseWriter};
//! use dishpatch::router::Router;
//!
//! let mut api = Router::new();
//! api.get("/products/:id", |req, res| {
//!     res.json(&serde_json::json!({ "id": req.param("id") }))?;
//!     Ok(Flow::Continue)
//! });
//!
//! let mut app = Router::new();
//! app.mount("/api/v1", &api);
//!
//! let dispatcher = Dispatcher::new(app);
//! let mut res = ResponseWriter::new();
//! dispatcher.handle(Incoming::new("GET", "/api/v1/products/p1"), &mut res).unwrap();
//! assert_eq!(res.body_json()["id"], "p1");
//! ```

pub mod cli;
pub mod config;
pub mod demo;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod middleware;
pub mod otel;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{Dispatcher, Flow, HandlerChain, HandlerResult, RequestContext, ResponseWriter};
pub use router::Router;
