use std::time::Duration;

use crate::dispatcher::{Flow, Outcome, RequestContext, ResponseWriter};

/// Process-wide hooks around dispatch.
///
/// `before` runs once the body is parsed and before the routing table is
/// walked; returning [`Flow::Stop`] or ending the response skips routing.
/// `after` runs once the request is settled, whatever the outcome. Its
/// context is `None` only for a request refused before one could be built
/// (a method token that is not a valid HTTP method).
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &mut RequestContext, _res: &mut ResponseWriter) -> Flow {
        Flow::Continue
    }
    fn after(
        &self,
        _req: Option<&RequestContext>,
        _res: &ResponseWriter,
        _outcome: &Outcome,
        _latency: Duration,
    ) {
    }
}
