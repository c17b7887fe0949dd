use http::Method;
use serde::Deserialize;

use crate::dispatcher::ResponseWriter;

/// Cross-origin headers stamped on every response before routing.
///
/// Preflight handling lives in the dispatcher: an `OPTIONS` request is ended
/// right after these headers are set and never reaches the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    allow_origin: String,
    allow_methods: Vec<Method>,
    allow_headers: Vec<String>,
}

impl CorsPolicy {
    /// Create a policy with explicit values.
    ///
    /// ```rust
    /// use dishpatch::middleware::CorsPolicy;
    /// use http::Method;
    ///
    /// let cors = CorsPolicy::new(
    ///     "https://shop.example.com",
    ///     vec![Method::GET, Method::POST],
    ///     vec!["Content-Type".to_string()],
    /// );
    /// assert_eq!(cors.allow_methods_value(), "GET, POST");
    /// ```
    pub fn new(
        allow_origin: impl Into<String>,
        allow_methods: Vec<Method>,
        allow_headers: Vec<String>,
    ) -> Self {
        Self {
            allow_origin: allow_origin.into(),
            allow_methods,
            allow_headers,
        }
    }

    #[must_use]
    pub fn allow_origin(&self) -> &str {
        &self.allow_origin
    }

    #[must_use]
    pub fn allow_methods_value(&self) -> String {
        self.allow_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn allow_headers_value(&self) -> String {
        self.allow_headers.join(", ")
    }

    /// Set the three `Access-Control-Allow-*` headers on `res`.
    pub fn apply(&self, res: &mut ResponseWriter) {
        res.set_header("Access-Control-Allow-Origin", self.allow_origin.as_str());
        res.set_header("Access-Control-Allow-Methods", self.allow_methods_value());
        res.set_header("Access-Control-Allow-Headers", self.allow_headers_value());
    }
}

/// Allow every origin, the five registration verbs plus `OPTIONS`, and the
/// `Content-Type` and `Authorization` request headers.
impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: "*".into(),
            allow_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ],
            allow_headers: vec!["Content-Type".into(), "Authorization".into()],
        }
    }
}

/// `cors:` section of the config file. Missing fields keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: Option<String>,
    pub allow_methods: Option<Vec<String>>,
    pub allow_headers: Option<Vec<String>>,
}

impl CorsConfig {
    /// Build the policy, skipping method names that are not valid HTTP tokens.
    #[must_use]
    pub fn into_policy(self) -> CorsPolicy {
        let mut policy = CorsPolicy::default();
        if let Some(origin) = self.allow_origin {
            policy.allow_origin = origin;
        }
        if let Some(methods) = self.allow_methods {
            policy.allow_methods = methods
                .iter()
                .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
                .collect();
        }
        if let Some(headers) = self.allow_headers {
            policy.allow_headers = headers;
        }
        policy
    }
}
