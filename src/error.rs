//! Setup-time error types
//!
//! Everything that can go wrong while building plans or registering routes.
//! These errors are returned to whoever performs the registration; nothing
//! here is ever produced while serving a request.

use hyper::Method;

/// Configuration error raised during plan building or route registration
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The handler's signature cannot be turned into an execution plan.
    #[error("unsupported handler signature `{signature}`: {reason}")]
    UnsupportedSignature { signature: String, reason: String },

    /// The path pattern does not follow the `/literal/:capture` syntax.
    #[error("malformed path pattern '{pattern}': {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// An entry with the same method and pattern shape already exists.
    #[error("route {method} '{pattern}' collides with existing route '{existing}'")]
    DuplicateRoute {
        method: String,
        pattern: String,
        existing: String,
    },

    /// A `ByMethod` table names the same method twice.
    #[error("method {0} registered twice")]
    DuplicateMethod(Method),

    /// Wraps any of the above with the route being registered.
    #[error("error while routing {route}: {source}")]
    Route {
        route: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    pub(crate) fn unsupported(signature: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnsupportedSignature {
            signature: signature.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the offending route, unless it is already attached
    #[must_use]
    pub fn in_route(self, route: &str) -> Self {
        match self {
            Self::Route { .. } => self,
            other => Self::Route {
                route: route.to_string(),
                source: Box::new(other),
            },
        }
    }
}
