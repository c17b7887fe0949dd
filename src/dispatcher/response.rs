use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::context::HeaderVec;

/// Response under construction for one request.
///
/// Handlers write through it; the hosting layer flushes it once dispatch
/// returns. After [`end`](Self::end) or any of the terminating writers the
/// response is final and further writes are ignored.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    status: u16,
    headers: HeaderVec,
    body: Vec<u8>,
    ended: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
            ended: false,
        }
    }
}

impl ResponseWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status used by the next write. Does not end the response.
    pub fn status(&mut self, status: u16) -> &mut Self {
        if self.guard_ended("status") {
            self.status = status;
        }
        self
    }

    /// Set a header, replacing any previous value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        if !self.guard_ended("set_header") {
            return self;
        }
        let value = value.into();
        if let Some(slot) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            slot.1 = value;
        } else {
            self.headers.push((Arc::from(name), value));
        }
        self
    }

    /// Serialize `value` as the JSON body with the pending status (200 unless
    /// [`status`](Self::status) was called) and end the response.
    ///
    /// # Errors
    ///
    /// Returns the serialization error; the response is left open in that case.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let status = self.status;
        self.json_with_status(status, value)
    }

    /// Serialize `value` as the JSON body with `status` and end the response.
    ///
    /// # Errors
    ///
    /// Returns the serialization error; the response is left open in that case.
    pub fn json_with_status<T: Serialize + ?Sized>(
        &mut self,
        status: u16,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        if !self.guard_ended("json") {
            return Ok(());
        }
        let bytes = serde_json::to_vec(value)?;
        self.status = status;
        self.set_header("Content-Type", "application/json");
        self.body = bytes;
        self.ended = true;
        Ok(())
    }

    /// Write a raw body with the given content type and end the response.
    pub fn send(&mut self, content_type: &str, body: impl Into<Vec<u8>>) {
        if !self.guard_ended("send") {
            return;
        }
        self.set_header("Content-Type", content_type);
        self.body = body.into();
        self.ended = true;
    }

    /// End the response with whatever status and headers are pending and no body.
    pub fn end(&mut self) {
        if self.guard_ended("end") {
            self.ended = true;
        }
    }

    /// `true` once the response has been finalized.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body decoded as JSON, or `Value::Null` when it is empty or not JSON.
    #[must_use]
    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Write `{"error": message}` with `status` and end the response.
    pub(crate) fn error(&mut self, status: u16, message: &str) {
        if !self.guard_ended("error") {
            return;
        }
        self.status = status;
        self.set_header("Content-Type", "application/json");
        self.body = serde_json::json!({ "error": message }).to_string().into_bytes();
        self.ended = true;
    }

    fn guard_ended(&self, op: &'static str) -> bool {
        if self.ended {
            debug!(op, "Write ignored on ended response");
            return false;
        }
        true
    }
}
