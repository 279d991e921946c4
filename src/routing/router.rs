//! Route table
//!
//! Holds `(method, pattern) -> endpoint` entries and picks the most specific
//! entry for a request. Entries are added during setup; lookups take `&self`
//! and are safe for any number of concurrent readers.

use super::pattern::{decode_path, Pattern};
use crate::binding::{PathParams, Request, Response};
use crate::dispatch::Endpoint;
use crate::error::ConfigError;
use hyper::{Method, StatusCode};
use std::fmt;

/// Which request methods an entry accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Method),
}

impl MethodFilter {
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => only == method,
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Only(a), Self::Only(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(method) => f.write_str(method.as_str()),
        }
    }
}

struct RouteEntry {
    method: MethodFilter,
    pattern: Pattern,
    endpoint: Endpoint,
}

/// Outcome of matching a request against the table
pub enum RouteMatch<'a> {
    Found {
        endpoint: &'a Endpoint,
        params: PathParams,
    },
    /// The path matched, the method did not
    MethodNotAllowed(Vec<Method>),
    NotFound,
    /// A path segment did not decode to UTF-8
    InvalidPath,
}

/// Ordered route table
#[derive(Default)]
pub struct Router {
    entries: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; malformed or colliding patterns are rejected
    pub fn insert(
        &mut self,
        method: MethodFilter,
        pattern: &str,
        endpoint: Endpoint,
    ) -> Result<(), ConfigError> {
        let pattern = Pattern::parse(pattern)?;

        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.method.overlaps(&method) && e.pattern.collides_with(&pattern))
        {
            return Err(ConfigError::DuplicateRoute {
                method: method.to_string(),
                pattern: pattern.as_str().to_string(),
                existing: existing.pattern.as_str().to_string(),
            });
        }

        self.entries.push(RouteEntry {
            method,
            pattern,
            endpoint,
        });
        Ok(())
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let Ok(segments) = decode_path(path) else {
            return RouteMatch::InvalidPath;
        };
        let mut path_matched = false;
        let mut allowed = Vec::new();
        let mut best: Option<(&RouteEntry, PathParams)> = None;

        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(&segments) else {
                continue;
            };
            path_matched = true;

            if !entry.method.accepts(method) {
                if let MethodFilter::Only(m) = &entry.method {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
                continue;
            }

            let better = best.as_ref().map_or(true, |(current, _)| {
                entry.pattern.specificity() > current.pattern.specificity()
            });
            if better {
                best = Some((entry, params));
            }
        }

        match best {
            Some((entry, params)) => RouteMatch::Found {
                endpoint: &entry.endpoint,
                params,
            },
            None if path_matched => RouteMatch::MethodNotAllowed(allowed),
            None => RouteMatch::NotFound,
        }
    }

    /// Match, bind the captures into the request and run the endpoint
    pub fn serve(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            RouteMatch::Found { endpoint, params } => {
                req.set_path_params(params);
                endpoint(&req)
            }
            RouteMatch::MethodNotAllowed(allowed) => Response::method_not_allowed(&allowed),
            RouteMatch::NotFound => Response::not_found(),
            RouteMatch::InvalidPath => Response::text(
                StatusCode::BAD_REQUEST,
                "path is not valid percent-encoded UTF-8",
            ),
        }
    }

    /// Registered `(method, pattern)` pairs in registration order
    pub fn routes(&self) -> impl Iterator<Item = (&MethodFilter, &str)> {
        self.entries
            .iter()
            .map(|e| (&e.method, e.pattern.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
