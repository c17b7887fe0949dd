//! Built-in handlers for infrastructure endpoints.
//!
//! They are ordinary handlers: register them on a router like any other route.

use std::sync::Arc;

use serde_json::json;

use crate::dispatcher::{Flow, HandlerResult, RequestContext, ResponseWriter};
use crate::middleware::MetricsMiddleware;

/// `{"status":"ok"}` with `200`.
///
/// # Errors
///
/// Never fails in practice; the signature matches the handler contract.
pub fn health(_req: &mut RequestContext, res: &mut ResponseWriter) -> HandlerResult {
    res.json(&json!({ "status": "ok" }))?;
    Ok(Flow::Continue)
}

/// Prometheus text rendering of `metrics`.
pub fn metrics_endpoint(
    metrics: Arc<MetricsMiddleware>,
) -> impl Fn(&mut RequestContext, &mut ResponseWriter) -> HandlerResult + Send + Sync + 'static {
    move |_req, res| {
        res.status(200);
        res.send("text/plain; version=0.0.4", metrics.render_prometheus());
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_health() {
        let mut req = RequestContext::new(Method::GET, "/health");
        let mut res = ResponseWriter::new();
        assert_eq!(health(&mut req, &mut res).unwrap(), Flow::Continue);
        assert!(res.is_ended());
        assert_eq!(res.body_json(), json!({ "status": "ok" }));
    }

    #[test]
    fn test_metrics_endpoint_renders_text() {
        let metrics = Arc::new(MetricsMiddleware::new());
        let handler = metrics_endpoint(metrics);
        let mut req = RequestContext::new(Method::GET, "/metrics");
        let mut res = ResponseWriter::new();
        handler(&mut req, &mut res).unwrap();
        let body = String::from_utf8(res.body().to_vec()).unwrap();
        assert!(body.contains("dishpatch_requests_total 0"));
        assert!(res.header("content-type").unwrap().starts_with("text/plain"));
    }
}
