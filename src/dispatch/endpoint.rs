//! Low-level endpoints
//!
//! An `Endpoint` is the compiled, request-serving form of anything that can
//! be registered: a typed function, a raw handler, or a `ByMethod` table.

use super::dynamic;
use crate::binding::{Request, Response};
use crate::error::ConfigError;
use crate::plan::{AdaptorCache, Handler, Inputs};
use std::sync::Arc;

/// Request-serving function shared across connections
pub type Endpoint = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Anything that compiles into an [`Endpoint`].
///
/// `M` only disambiguates the implementations; callers never name it.
pub trait IntoEndpoint<M> {
    fn into_endpoint(self, cache: &AdaptorCache) -> Result<Endpoint, ConfigError>;
}

#[doc(hidden)]
pub enum ViaRaw {}

#[doc(hidden)]
pub enum ViaEndpoint {}

impl<H, Args> IntoEndpoint<(Args,)> for H
where
    H: Handler<Args>,
    Args: Inputs,
{
    fn into_endpoint(self, cache: &AdaptorCache) -> Result<Endpoint, ConfigError> {
        let plan = cache.plan::<Args, H::Output>()?;
        Ok(dynamic::adapt(plan, self))
    }
}

impl IntoEndpoint<ViaEndpoint> for Endpoint {
    fn into_endpoint(self, _cache: &AdaptorCache) -> Result<Endpoint, ConfigError> {
        Ok(self)
    }
}

/// Handler that works on the request and response directly
pub struct Raw<F>(F);

/// Wrap a function of `(&Request, &mut Response)`; it starts from an
/// empty 200 response
pub fn raw<F>(handler: F) -> Raw<F>
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    Raw(handler)
}

impl<F> IntoEndpoint<ViaRaw> for Raw<F>
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    fn into_endpoint(self, _cache: &AdaptorCache) -> Result<Endpoint, ConfigError> {
        let handler = self.0;
        Ok(Arc::new(move |req: &Request| {
            let mut res = Response::new();
            handler(req, &mut res);
            res
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{Method, StatusCode};

    #[test]
    fn test_raw_handler_writes_directly() {
        let cache = AdaptorCache::new();
        let endpoint = cache
            .adapt(raw(|req: &Request, res: &mut Response| {
                res.set_status(StatusCode::ACCEPTED);
                res.write(req.path().as_bytes());
            }))
            .unwrap();

        let res = endpoint(&Request::from_target(Method::GET, "/raw").unwrap());
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.body(), b"/raw");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_endpoint_passes_through() {
        let endpoint: Endpoint = Arc::new(|_: &Request| Response::empty(StatusCode::NO_CONTENT));
        let same = AdaptorCache::new().adapt(Arc::clone(&endpoint)).unwrap();
        assert!(Arc::ptr_eq(&endpoint, &same));
    }
}
