use std::io::{self, Read};
use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::ids::RequestId;
use crate::router::{normalize_path, ParamVec};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the dispatch path. Names are lower-cased on insert.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A request as delivered by the hosting HTTP layer.
///
/// `target` is the raw request target (`/orders/1?expand=items`); the body is
/// any reader and is drained by the dispatcher before routing.
pub struct Incoming<B> {
    pub method: String,
    pub target: String,
    pub headers: HeaderVec,
    pub body: B,
}

impl Incoming<io::Empty> {
    /// A request without a body.
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            headers: HeaderVec::new(),
            body: io::empty(),
        }
    }
}

impl<B: Read> Incoming<B> {
    /// Replace the body reader.
    pub fn with_body<R: Read>(self, body: R) -> Incoming<R> {
        Incoming {
            method: self.method,
            target: self.target,
            headers: self.headers,
            body,
        }
    }

    /// Add a header; the name is stored lower-cased.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.into()));
        self
    }
}

/// Split a request target into its path and optional query component.
#[must_use]
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Parse a query string into name/value pairs, URL-decoding both.
#[must_use]
pub fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(&*k), v.into_owned()))
        .collect()
}

/// Per-request state handed to every handler in the matched chain.
///
/// Private to one request; nothing here is shared across concurrent dispatches.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id, taken from `X-Request-ID` when it carries a valid ULID.
    pub request_id: RequestId,
    /// Upper-cased request method.
    pub method: Method,
    /// Normalized request path without the query component.
    pub path: String,
    /// Raw query component, if the target had one.
    pub raw_query: Option<String>,
    /// Decoded query parameters.
    pub query: ParamVec,
    /// Request headers with lower-cased names.
    pub headers: HeaderVec,
    /// Decoded JSON body, or an empty object.
    pub body: Value,
    /// Path parameters bound by the matched pattern.
    pub params: ParamVec,
    /// Values left by earlier handlers in the chain for later ones.
    pub locals: Map<String, Value>,
}

impl RequestContext {
    /// A context with an empty body and no headers, parameters or query.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            request_id: RequestId::new(),
            method,
            path: normalize_path(path),
            raw_query: query.map(str::to_string),
            query: query.map(parse_query).unwrap_or_default(),
            headers: HeaderVec::new(),
            body: Value::Object(Map::new()),
            params: ParamVec::new(),
            locals: Map::new(),
        }
    }

    /// Get a path parameter by name. The last binding wins on duplicates.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        crate::router::param(&self.params, name)
    }

    /// Get a query parameter by name. The last occurrence wins.
    #[inline]
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        crate::router::param(&self.query, name)
    }

    /// Get a header by name, case-insensitively.
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn set_local(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    /// Deserialize the body into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body does not have the expected shape.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}
