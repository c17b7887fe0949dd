//! Cross-cutting request concerns: CORS headers and global before/after hooks.

mod core;
mod cors;
mod metrics;

pub use core::Middleware;
pub use cors::{CorsConfig, CorsPolicy};
pub use metrics::MetricsMiddleware;
