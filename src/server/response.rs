use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;
use may_minihttp::Response;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::dispatcher::ResponseWriter;

/// Upper bound on distinct interned header lines outside the CORS set.
pub const MAX_INTERNED_HEADER_LINES: usize = 1024;

const CORS_PREFIX: &str = "access-control-";

static HEADER_LINES: Lazy<HeaderLineCache> =
    Lazy::new(|| HeaderLineCache::new(MAX_INTERNED_HEADER_LINES));

/// Leaked `"Name: value"` lines for `may_minihttp`, which only accepts
/// `'static` header lines.
///
/// Each distinct line is leaked once and reused for the life of the process,
/// so the number of lines is capped. `Access-Control-*` lines are fixed per
/// process and always admitted.
pub struct HeaderLineCache {
    lines: DashMap<String, &'static str>,
    admitted: AtomicUsize,
    limit: usize,
    full_logged: AtomicBool,
}

impl HeaderLineCache {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            lines: DashMap::new(),
            admitted: AtomicUsize::new(0),
            limit,
            full_logged: AtomicBool::new(false),
        }
    }

    /// Interned line, or `None` when the cache is full and this line is new.
    /// CR and LF are dropped from both parts.
    pub fn line(&self, name: &str, value: &str) -> Option<&'static str> {
        let line: String = format!("{name}: {value}")
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        if let Some(existing) = self.lines.get(&line) {
            return Some(*existing);
        }
        let cors = name
            .get(..CORS_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CORS_PREFIX));
        if !cors && self.admitted.fetch_add(1, Ordering::Relaxed) >= self.limit {
            self.admitted.fetch_sub(1, Ordering::Relaxed);
            if !self.full_logged.swap(true, Ordering::Relaxed) {
                warn!(
                    limit = self.limit,
                    header = %name,
                    "Header line cache full; new header values are dropped"
                );
            }
            return None;
        }
        let leaked: &'static str = Box::leak(line.clone().into_boxed_str());
        Some(*self.lines.entry(line).or_insert(leaked))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Canonical reason phrase for `status`, `"Unknown"` for unregistered codes.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Process-wide interned header line; see [`HeaderLineCache::line`].
pub fn header_line(name: &str, value: &str) -> Option<&'static str> {
    HEADER_LINES.line(name, value)
}

/// Copy status, headers and body from the dispatcher's writer into the wire response.
pub fn write_response(writer: &ResponseWriter, res: &mut Response) {
    let status = writer.status_code();
    res.status_code(status as usize, status_reason(status));
    for (name, value) in writer.headers() {
        match header_line(name, value) {
            Some(line) => {
                res.header(line);
            }
            None => debug!(header = %name, "Header dropped"),
        }
    }
    res.body_vec(writer.body().to_vec());
}
