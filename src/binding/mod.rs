//! Binding protocol
//!
//! The capabilities a parameter or result type may implement:
//! - [`FromRequest`]: populate itself from the request (query, path captures, headers)
//! - [`ToResponse`]: write itself to the response, bypassing body encoding
//! - [`HttpError`]: expose a status code for an error returned by a handler
//!
//! Types that implement none of these travel as JSON through [`Json`].

mod error;
mod param;
mod request;
mod response;

pub use error::{BindingError, HttpError, StatusError};
#[doc(hidden)]
pub use param::parse_param;
pub use request::{PathParams, Request};
pub use response::Response;

use hyper::StatusCode;

/// Extract-from-request capability.
///
/// Return [`BindingError::Missing`] when the data is simply not there, so
/// that an `Option<Self>` parameter can be left unset; any other error fails
/// the request.
pub trait FromRequest: Sized {
    fn from_request(req: &Request) -> Result<Self, BindingError>;
}

/// Write-to-response capability.
///
/// Types that append to the body must set `WRITES_BODY`; a handler cannot
/// return one of them together with a [`Json`] body result.
pub trait ToResponse {
    const WRITES_BODY: bool = false;

    fn to_response(&self, res: &mut Response) -> Result<(), BindingError>;
}

/// JSON request or response body.
///
/// As a parameter it is decoded from the request body; as a result it is
/// encoded into the response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl ToResponse for StatusCode {
    fn to_response(&self, res: &mut Response) -> Result<(), BindingError> {
        res.set_status(*self);
        Ok(())
    }
}

impl ToResponse for String {
    const WRITES_BODY: bool = true;

    fn to_response(&self, res: &mut Response) -> Result<(), BindingError> {
        res.write_text(self);
        Ok(())
    }
}

impl ToResponse for &'static str {
    const WRITES_BODY: bool = true;

    fn to_response(&self, res: &mut Response) -> Result<(), BindingError> {
        res.write_text(self);
        Ok(())
    }
}

impl FromRequest for hyper::Method {
    fn from_request(req: &Request) -> Result<Self, BindingError> {
        Ok(req.method().clone())
    }
}

impl FromRequest for PathParams {
    fn from_request(req: &Request) -> Result<Self, BindingError> {
        Ok(req.path_params().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, CONTENT_TYPE};
    use hyper::Method;

    #[test]
    fn test_status_code_sets_status() {
        let mut res = Response::new();
        StatusCode::CREATED.to_response(&mut res).unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_text_keeps_explicit_content_type() {
        let mut res = Response::new();
        "plain".to_response(&mut res).unwrap();
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");

        let mut res = Response::new();
        res.insert_header(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        String::from("<b>hi</b>").to_response(&mut res).unwrap();
        assert_eq!(res.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(res.body(), b"<b>hi</b>");
    }

    #[test]
    fn test_method_extracts_itself() {
        let req = Request::from_target(Method::PUT, "/").unwrap();
        assert_eq!(Method::from_request(&req).unwrap(), Method::PUT);
    }
}
