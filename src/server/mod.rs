//! HTTP hosting on `may_minihttp`.
//!
//! Each connection is served in its own coroutine; [`AppService`] adapts the
//! wire request into an [`Incoming`](crate::dispatcher::Incoming) and flushes the
//! dispatcher's [`ResponseWriter`](crate::dispatcher::ResponseWriter) back.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::request_head;
pub use response::{
    header_line, status_reason, write_response, HeaderLineCache, MAX_INTERNED_HEADER_LINES,
};
pub use service::AppService;
