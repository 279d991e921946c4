//! Request view handed to extractors
//!
//! The host collects the body before dispatch, so everything an extractor
//! may look at is available synchronously.

use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::http::uri::InvalidUri;
use hyper::{Method, Uri};

/// Values captured from named path segments for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incoming request with its body already collected
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    path_params: PathParams,
    body: Bytes,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            query,
            path_params: PathParams::new(),
            body: Bytes::new(),
        }
    }

    /// Parse an origin-form target such as `/user/10?verbose=1`
    pub fn from_target(method: Method, target: &str) -> Result<Self, InvalidUri> {
        Ok(Self::new(method, target.parse()?))
    }

    /// Build from hyper request parts and a collected body
    pub fn from_parts(parts: hyper::http::request::Parts, body: Bytes) -> Self {
        let mut req = Self::new(parts.method, parts.uri);
        req.headers = parts.headers;
        req.body = body;
        req
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value, if present and valid ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// First decoded query value for `name`
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Path capture `name`, falling back to the query string
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_param(name).or_else(|| self.query(name))
    }

    pub const fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub(crate) fn set_path_params(&mut self, params: PathParams) {
        self.path_params = params;
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }
}
