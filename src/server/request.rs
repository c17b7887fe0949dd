use std::sync::Arc;

use may_minihttp::Request;

use crate::dispatcher::HeaderVec;

/// Method, raw target and lower-cased headers of a `may_minihttp` request.
///
/// The body is left on the request so the dispatcher can drain it inside the
/// serving coroutine.
pub fn request_head(req: &Request) -> (String, String, HeaderVec) {
    let method = req.method().to_string();
    let target = req.path().to_string();
    let headers = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    (method, target, headers)
}
