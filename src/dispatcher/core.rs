//! Request lifecycle: CORS, preflight, body decoding, routing and the handler chain.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, info, info_span, warn};

use super::context::{parse_query, split_target, Incoming, RequestContext};
use super::handler::Flow;
use super::response::ResponseWriter;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::middleware::{CorsPolicy, Middleware};
use crate::router::{find_in, normalize_path, ParamVec, RouteEntry, Router};

/// How request bodies are drained and decoded.
///
/// The default is lenient and unbounded: any body is read in full and an
/// undecodable one becomes an empty JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyPolicy {
    /// Reject larger bodies with `413` before routing.
    pub max_body_bytes: Option<usize>,
    /// Reject undecodable non-empty bodies with `400` before routing.
    pub strict_json: bool,
}

/// How a matched handler chain finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// A handler finalized the response.
    Ended,
    /// A handler returned [`Flow::Stop`] without finalizing the response.
    Stopped,
    /// Every handler returned [`Flow::Continue`] and the response is still open.
    Exhausted,
}

/// What [`Dispatcher::handle`] did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `OPTIONS` request answered with CORS headers only.
    Preflight,
    /// A route matched and its chain ran.
    Matched {
        /// `"METHOD /pattern"` of the matched registration.
        route: String,
        /// Position of the registration in the table.
        index: usize,
        end: ChainEnd,
    },
    /// A global middleware stopped the request before routing.
    Intercepted,
    /// The request was refused before routing (bad method, body policy).
    Rejected { status: u16 },
    /// Nothing in the table matched; `404 {"error":"Not Found"}` was written.
    NotFound,
}

/// Failures that escape dispatch.
///
/// Handler errors are not caught here: the hosting layer decides what to send.
#[derive(Debug)]
pub enum DispatchError {
    /// The body stream failed while being drained.
    Body(io::Error),
    /// A handler returned an error.
    Handler {
        route: String,
        source: anyhow::Error,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Body(e) => write!(f, "failed to read request body: {e}"),
            DispatchError::Handler { route, source } => {
                write!(f, "handler for {route} failed: {source}")
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Body(e) => Some(e),
            DispatchError::Handler { source, .. } => {
                let source: &(dyn std::error::Error + 'static) = source.as_ref();
                Some(source)
            }
        }
    }
}

/// Frozen routing table plus the per-request pipeline around it.
///
/// Built once at startup from a [`Router`]; read-only afterwards, so any
/// number of coroutines may call [`handle`](Self::handle) concurrently.
pub struct Dispatcher {
    routes: Arc<[RouteEntry]>,
    cors: CorsPolicy,
    body_policy: BodyPolicy,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Router) -> Self {
        router.log_loaded();
        Self {
            routes: Arc::from(router.routes().to_vec()),
            cors: CorsPolicy::default(),
            body_policy: BodyPolicy::default(),
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    #[must_use]
    pub fn with_body_policy(mut self, body_policy: BodyPolicy) -> Self {
        self.body_policy = body_policy;
        self
    }

    /// Add a global middleware; hooks run in the order they were added.
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Run one request through the pipeline, writing into `res`.
    ///
    /// Steps, in order:
    /// 1. normalize the path and upper-case the method
    /// 2. stamp CORS headers; `OPTIONS` ends here with `200` and an empty body
    /// 3. drain and decode the body
    /// 4. global `before` hooks
    /// 5. first-match walk of the table and the matched handler chain
    /// 6. `404 {"error":"Not Found"}` when nothing matched
    /// 7. global `after` hooks
    ///
    /// # Errors
    ///
    /// [`DispatchError::Body`] when the body stream fails and
    /// [`DispatchError::Handler`] when a handler returns an error. In both cases
    /// `res` may be left unterminated.
    pub fn handle<B: Read>(
        &self,
        incoming: Incoming<B>,
        res: &mut ResponseWriter,
    ) -> Result<Outcome, DispatchError> {
        let started = Instant::now();
        let Incoming {
            method,
            target,
            headers,
            mut body,
        } = incoming;

        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(REQUEST_ID_HEADER))
                .map(|(_, v)| v.as_str()),
        );
        let (raw_path, raw_query) = split_target(&target);
        let path = normalize_path(raw_path);
        let method = method.to_ascii_uppercase();

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %path
        );
        let _entered = span.enter();

        self.cors.apply(res);

        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            warn!("Rejected request with invalid method token");
            res.error(400, "Bad Request");
            return Ok(self.settle(None, res, Outcome::Rejected { status: 400 }, started));
        };

        let mut ctx = RequestContext {
            request_id,
            method,
            path,
            raw_query: raw_query.map(str::to_string),
            query: raw_query.map(parse_query).unwrap_or_default(),
            headers,
            body: empty_body(),
            params: ParamVec::new(),
            locals: Map::new(),
        };

        if ctx.method == Method::OPTIONS {
            debug!("Preflight answered");
            res.status(200);
            res.end();
            return Ok(self.settle(Some(&ctx), res, Outcome::Preflight, started));
        }

        let Some(raw_body) =
            drain_body(&mut body, self.body_policy.max_body_bytes).map_err(DispatchError::Body)?
        else {
            warn!(
                max_body_bytes = ?self.body_policy.max_body_bytes,
                "Request body exceeds limit"
            );
            res.error(413, "Payload Too Large");
            return Ok(self.settle(Some(&ctx), res, Outcome::Rejected { status: 413 }, started));
        };

        match decode_body(&raw_body) {
            Some(value) => ctx.body = value,
            None if self.body_policy.strict_json => {
                warn!(body_len = raw_body.len(), "Rejected undecodable request body");
                res.error(400, "Invalid JSON body");
                return Ok(self.settle(Some(&ctx), res, Outcome::Rejected { status: 400 }, started));
            }
            None => {
                debug!(
                    body_len = raw_body.len(),
                    "Undecodable request body replaced with empty object"
                );
            }
        }

        for middleware in &self.middlewares {
            let flow = middleware.before(&mut ctx, res);
            if flow == Flow::Stop || res.is_ended() {
                debug!("Request intercepted by middleware");
                return Ok(self.settle(Some(&ctx), res, Outcome::Intercepted, started));
            }
        }

        debug!("Route match attempt");
        let outcome = match find_in(&self.routes, &ctx.method, &ctx.path) {
            Some(matched) => {
                let entry = matched.entry;
                let route = entry.describe();
                ctx.params = matched.path_params;
                info!(
                    route = %route,
                    path_params = ?ctx.params,
                    "Route matched"
                );

                let mut end = ChainEnd::Exhausted;
                for handler in entry.chain.iter() {
                    let flow = handler
                        .call(&mut ctx, res)
                        .map_err(|source| DispatchError::Handler {
                            route: route.clone(),
                            source,
                        })?;
                    if res.is_ended() {
                        end = ChainEnd::Ended;
                        break;
                    }
                    if flow == Flow::Stop {
                        end = ChainEnd::Stopped;
                        break;
                    }
                }
                if end == ChainEnd::Exhausted {
                    warn!(route = %route, "Handler chain finished without ending the response");
                }
                Outcome::Matched {
                    route,
                    index: matched.index,
                    end,
                }
            }
            None => {
                warn!("No route matched");
                res.error(404, "Not Found");
                Outcome::NotFound
            }
        };

        Ok(self.settle(Some(&ctx), res, outcome, started))
    }

    fn settle(
        &self,
        ctx: Option<&RequestContext>,
        res: &ResponseWriter,
        outcome: Outcome,
        started: Instant,
    ) -> Outcome {
        let latency = started.elapsed();
        for middleware in &self.middlewares {
            middleware.after(ctx, res, &outcome, latency);
        }
        debug!(
            status = res.status_code(),
            latency_us = latency.as_micros() as u64,
            "Request settled"
        );
        outcome
    }
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

/// Read the whole body, or `None` when it is longer than `limit` bytes.
fn drain_body<B: Read>(body: &mut B, limit: Option<usize>) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    match limit {
        Some(max) => {
            body.by_ref()
                .take((max as u64).saturating_add(1))
                .read_to_end(&mut buf)?;
            if buf.len() > max {
                return Ok(None);
            }
        }
        None => {
            body.read_to_end(&mut buf)?;
        }
    }
    Ok(Some(buf))
}

/// Decode a drained body.
///
/// An empty body decodes to an empty object. `None` means the body is not
/// UTF-8 text holding a JSON document.
#[must_use]
pub fn decode_body(raw: &[u8]) -> Option<Value> {
    if raw.is_empty() {
        return Some(empty_body());
    }
    let text = std::str::from_utf8(raw).ok()?;
    serde_json::from_str(text).ok()
}
