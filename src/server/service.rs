use std::io::{self, Read};
use std::sync::Arc;

use may_minihttp::{HttpService, Request, Response};
use tracing::{error, warn};

use super::request::request_head;
use super::response::write_response;
use crate::dispatcher::{ChainEnd, Dispatcher, Incoming, Outcome, ResponseWriter};

/// `may_minihttp` service wrapping a shared [`Dispatcher`].
///
/// This is the top-level safety net around dispatch: handler and body errors
/// are logged and answered with `500` unless the response was already ended.
#[derive(Clone)]
pub struct AppService {
    dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// Dispatch one request and settle it into a response that can be written.
pub(crate) fn respond<B: Read>(dispatcher: &Dispatcher, incoming: Incoming<B>) -> ResponseWriter {
    let mut writer = ResponseWriter::new();
    match dispatcher.handle(incoming, &mut writer) {
        Ok(Outcome::Matched {
            route,
            end: ChainEnd::Exhausted,
            ..
        }) => {
            warn!(route = %route, status = writer.status_code(), "Flushing unterminated response");
        }
        Ok(_) => {}
        Err(err) => {
            error!(error = %err, "Request failed");
            if !writer.is_ended() {
                writer.error(500, "Internal Server Error");
            }
        }
    }
    writer
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let (method, target, headers) = request_head(&req);
        let incoming = Incoming {
            method,
            target,
            headers,
            body: req.body(),
        };

        let writer = respond(&self.dispatcher, incoming);
        write_response(&writer, res);
        Ok(())
    }
}
