//! Buffered response sink
//!
//! Handlers and responsive outputs write into a `Response`; the host turns
//! it into a hyper response once dispatch finishes. Nothing reaches the wire
//! before that, so a late failure can still replace the whole response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Method, StatusCode};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Response under construction
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Plain-text error response, the message is sent verbatim
    pub fn text(status: StatusCode, message: &str) -> Self {
        let mut res = Self::new();
        res.status = status;
        res.insert_static(CONTENT_TYPE, TEXT_PLAIN);
        res.insert_static(
            HeaderName::from_static("x-content-type-options"),
            "nosniff",
        );
        res.body.extend_from_slice(message.as_bytes());
        res
    }

    /// Status-only response with an empty body
    pub fn empty(status: StatusCode) -> Self {
        let mut res = Self::new();
        res.status = status;
        res
    }

    pub fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "404 page not found")
    }

    /// 405 listing the permitted methods in `Allow`
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let mut res = Self::text(StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed");
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            res.headers.insert(hyper::header::ALLOW, value);
        }
        res
    }

    pub fn payload_too_large() -> Self {
        Self::text(StatusCode::PAYLOAD_TOO_LARGE, "413 payload too large")
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Append bytes to the body
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append a JSON-encoded body, setting the content type if unset
    pub(crate) fn write_json(&mut self, encoded: &[u8]) {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.insert_static(CONTENT_TYPE, APPLICATION_JSON);
        }
        self.body.extend_from_slice(encoded);
        self.body.push(b'\n');
    }

    /// Append plain text, setting the content type if unset
    pub(crate) fn write_text(&mut self, text: &str) {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.insert_static(CONTENT_TYPE, TEXT_PLAIN);
        }
        self.body.extend_from_slice(text.as_bytes());
    }

    fn insert_static(&mut self, name: HeaderName, value: &'static str) {
        self.headers.insert(name, HeaderValue::from_static(value));
    }

    /// Convert into the hyper response sent on the wire
    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut res = hyper::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}
