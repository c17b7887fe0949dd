use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{Outcome, RequestContext, ResponseWriter};

/// Request counters, collected with relaxed atomics.
///
/// Metrics collected:
/// - Total request count (counted in `after`, which runs for every outcome)
/// - Average latency
/// - Responses per status class (2xx, 3xx, 4xx, 5xx)
/// - Not-found and preflight responses
/// - Coroutine stack size of the serving coroutine
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    status_classes: [AtomicUsize; 4],
    not_found: AtomicUsize,
    preflight: AtomicUsize,
    stack_size: AtomicUsize,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests that reached routing or preflight.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean processing time, zero until a request completes.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Responses whose status falls in `class`xx (2 through 5).
    #[must_use]
    pub fn status_class_count(&self, class: u16) -> usize {
        match class {
            2..=5 => self.status_classes[(class - 2) as usize].load(Ordering::Relaxed),
            _ => 0,
        }
    }

    #[must_use]
    pub fn not_found_count(&self) -> usize {
        self.not_found.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn preflight_count(&self) -> usize {
        self.preflight.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }

    /// Prometheus text exposition of the counters.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let mut out = format!(
            "# HELP dishpatch_requests_total Total number of dispatched requests\n\
             # TYPE dishpatch_requests_total counter\n\
             dishpatch_requests_total {}\n\
             # HELP dishpatch_request_latency_seconds Average request latency in seconds\n\
             # TYPE dishpatch_request_latency_seconds gauge\n\
             dishpatch_request_latency_seconds {}\n\
             # HELP dishpatch_not_found_total Requests that matched no route\n\
             # TYPE dishpatch_not_found_total counter\n\
             dishpatch_not_found_total {}\n\
             # HELP dishpatch_preflight_total CORS preflight requests\n\
             # TYPE dishpatch_preflight_total counter\n\
             dishpatch_preflight_total {}\n\
             # HELP dishpatch_coroutine_stack_bytes Configured coroutine stack size\n\
             # TYPE dishpatch_coroutine_stack_bytes gauge\n\
             dishpatch_coroutine_stack_bytes {}\n\
             # HELP dishpatch_responses_total Responses by status class\n\
             # TYPE dishpatch_responses_total counter\n",
            self.request_count(),
            self.average_latency().as_secs_f64(),
            self.not_found_count(),
            self.preflight_count(),
            self.stack_size(),
        );
        for class in 2..=5u16 {
            out.push_str(&format!(
                "dishpatch_responses_total{{class=\"{class}xx\"}} {}\n",
                self.status_class_count(class)
            ));
        }
        out
    }
}

impl Middleware for MetricsMiddleware {
    fn after(
        &self,
        _req: Option<&RequestContext>,
        res: &ResponseWriter,
        outcome: &Outcome,
        latency: Duration,
    ) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Outcome::Preflight => {
                self.preflight.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::NotFound => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Matched { .. } | Outcome::Intercepted | Outcome::Rejected { .. } => {}
        }
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);

        let class = res.status_code() / 100;
        if (2..=5).contains(&class) {
            self.status_classes[(class - 2) as usize].fetch_add(1, Ordering::Relaxed);
        }

        let size = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(size, Ordering::Relaxed);
    }
}
