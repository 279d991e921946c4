//! Request-time error types
//!
//! `BindingError` covers input that could not be turned into handler
//! arguments. `HttpError` is the status-carrying capability for errors
//! returned by handlers; `StatusError` is a ready-made implementation.

use hyper::StatusCode;
use std::fmt;

/// Status-carrying capability for handler errors.
///
/// An error that reports a code is answered with that code and its display
/// message as a plain-text body. An error that reports `None` is answered
/// with a bare 500 and the message only reaches the server log.
///
/// Your own error types opt in with an impl before they can appear in a
/// handler's `Result`. An empty impl keeps the default and hides the error
/// behind a 500:
///
/// ```
/// #[derive(Debug, thiserror::Error)]
/// enum StoreError {
///     #[error("connection lost")]
///     Disconnected,
/// }
///
/// impl typemux::HttpError for StoreError {}
///
/// let err: &dyn typemux::HttpError = &StoreError::Disconnected;
/// assert!(err.response_code().is_none());
/// ```
pub trait HttpError: fmt::Display + fmt::Debug + Send + 'static {
    fn response_code(&self) -> Option<StatusCode> {
        None
    }
}

/// Failure to bind request data to a handler argument, or to write a
/// responsive output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BindingError {
    /// A named value is not present in the path captures or query string.
    #[error("missing required parameter '{0}'")]
    Missing(String),

    /// A named value is present but cannot be parsed.
    #[error("invalid value for '{name}': {reason}")]
    Malformed { name: String, reason: String },

    /// The request carries no body but one is required.
    #[error("missing request body")]
    MissingBody,

    /// The request body is not valid JSON for the target type.
    #[error("error decoding json: {0}")]
    Body(#[source] serde_json::Error),

    /// An extractor refused the request with a specific status.
    #[error("{0}")]
    Rejected(StatusError),

    /// A responsive output failed to write itself.
    #[error("failed to write response: {0}")]
    Write(String),
}

impl BindingError {
    /// Build a `Malformed` error for the named value
    pub fn malformed(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Malformed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure is pure absence rather than bad input
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Missing(_) | Self::MissingBody)
    }

    /// Status code the dispatcher answers with
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(err) => err.code,
            Self::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl HttpError for BindingError {
    fn response_code(&self) -> Option<StatusCode> {
        match self {
            Self::Write(_) => None,
            other => Some(other.status()),
        }
    }
}

/// Error with an explicit status code and client-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    code: StatusCode,
    message: String,
}

impl StatusError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build from a raw numeric code; invalid codes become 500
    pub fn from_u16(code: u16, message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        )
    }

    pub const fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StatusError {}

impl HttpError for StatusError {
    fn response_code(&self) -> Option<StatusCode> {
        Some(self.code)
    }
}

impl HttpError for std::io::Error {}

impl HttpError for serde_json::Error {}

impl HttpError for String {}

impl HttpError for &'static str {}

impl HttpError for Box<dyn std::error::Error + Send + Sync> {}

/// Build a [`StatusError`] from a numeric code and a format string.
///
/// ```
/// let err = typemux::status_error!(404, "user {} not found", 7);
/// assert_eq!(err.code().as_u16(), 404);
/// ```
#[macro_export]
macro_rules! status_error {
    ($code:expr, $($arg:tt)+) => {
        $crate::StatusError::from_u16($code, format!($($arg)+))
    };
}
