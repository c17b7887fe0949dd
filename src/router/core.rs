//! Routing table construction.
//!
//! A [`Router`] is an ordered list of [`RouteEntry`] values built once during
//! startup. Nothing here validates duplicates: dispatch is first-match-wins, so
//! an earlier registration shadows any later identical one.

use http::Method;
use tracing::{debug, info};

use super::path::{ParamVec, PathPattern};
use crate::dispatcher::{HandlerChain, HandlerResult, RequestContext, ResponseWriter};

/// One registration: method, compiled pattern and the handler chain to run.
#[derive(Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub pattern: PathPattern,
    pub chain: HandlerChain,
}

impl RouteEntry {
    /// `"GET /orders/:id"`, used in logs and route dumps.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.pattern)
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("handlers", &self.chain.len())
            .finish()
    }
}

/// A successful table lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// Position of the entry in registration order.
    pub index: usize,
    pub entry: &'a RouteEntry,
    pub path_params: ParamVec,
}

/// Ordered routing table builder.
///
/// ```
/// use dishpatch::dispatcher::Flow;
/// use dishpatch::router::Router;
/// use http::Method;
///
/// let mut users = Router::new();
/// users.post("/users", |_req, res| {
///     res.json_with_status(201, &serde_json::json!({ "created": true }))?;
///     Ok(Flow::Continue)
/// });
///
/// let mut api = Router::new();
/// api.mount("/api/v1", &users);
///
/// assert!(api.find(&Method::POST, "/api/v1/users").is_some());
/// assert!(api.find(&Method::POST, "/users").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration with an explicit handler chain.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        chain: impl Into<HandlerChain>,
    ) -> &mut Self {
        let pattern = PathPattern::parse(pattern);
        let chain = chain.into();
        debug!(method = %method, pattern = %pattern, handlers = chain.len(), "Route registered");
        self.routes.push(RouteEntry {
            method,
            pattern,
            chain,
        });
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, HandlerChain::new(handler))
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, HandlerChain::new(handler))
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, HandlerChain::new(handler))
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PATCH, pattern, HandlerChain::new(handler))
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, HandlerChain::new(handler))
    }

    /// Flatten `child`'s current table into this one under `prefix`.
    ///
    /// The entries are copied: routes added to `child` afterwards are not seen
    /// here, so mount a sub-router only once it is fully built.
    #[doc(alias = "use")]
    pub fn mount(&mut self, prefix: &str, child: &Router) -> &mut Self {
        let before = self.routes.len();
        self.routes
            .extend(child.routes.iter().map(|entry| RouteEntry {
                method: entry.method.clone(),
                pattern: entry.pattern.prefixed(prefix),
                chain: entry.chain.clone(),
            }));
        debug!(
            prefix = %prefix,
            mounted = self.routes.len() - before,
            "Sub-router mounted"
        );
        self
    }

    /// Registrations in dispatch order.
    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First registration whose method equals `method` and whose pattern
    /// matches the already-normalized `path`.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        find_in(&self.routes, method, path)
    }

    /// Normalized patterns of every registration, in dispatch order.
    #[must_use]
    pub fn path_patterns(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| r.pattern.as_str().to_string())
            .collect()
    }

    /// Print the table to stdout, one route per line.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for entry in &self.routes {
            println!("[route] {} ({} handlers)", entry.describe(), entry.chain.len());
        }
    }

    /// Log a summary of the finished table.
    pub(crate) fn log_loaded(&self) {
        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(RouteEntry::describe)
            .collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
    }
}

pub(crate) fn find_in<'a>(
    routes: &'a [RouteEntry],
    method: &Method,
    path: &str,
) -> Option<RouteMatch<'a>> {
    routes
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.method == *method)
        .find_map(|(index, entry)| {
            entry.pattern.match_path(path).map(|path_params| RouteMatch {
                index,
                entry,
                path_params,
            })
        })
}
