//! Method dispatch wrapper
//!
//! Routes one path to different handlers by request method. There is no
//! fallback method: anything not listed answers 405.

use crate::binding::{Request, Response};
use crate::dispatch::{Endpoint, IntoEndpoint};
use crate::error::ConfigError;
use crate::plan::AdaptorCache;
use hyper::Method;
use std::sync::Arc;

type Pending = Box<dyn FnOnce(&AdaptorCache) -> Result<Endpoint, ConfigError> + Send>;

/// Method name → handler table, compiled when registered
#[derive(Default)]
pub struct ByMethod {
    handlers: Vec<(Method, Pending)>,
}

#[doc(hidden)]
pub enum ViaByMethod {}

impl ByMethod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for `method`
    #[must_use]
    pub fn on<M, H>(mut self, method: Method, handler: H) -> Self
    where
        M: 'static,
        H: IntoEndpoint<M> + Send + 'static,
    {
        self.handlers.push((
            method,
            Box::new(move |cache: &AdaptorCache| handler.into_endpoint(cache)),
        ));
        self
    }

    #[must_use]
    pub fn get<M: 'static, H: IntoEndpoint<M> + Send + 'static>(self, handler: H) -> Self {
        self.on(Method::GET, handler)
    }

    #[must_use]
    pub fn post<M: 'static, H: IntoEndpoint<M> + Send + 'static>(self, handler: H) -> Self {
        self.on(Method::POST, handler)
    }

    #[must_use]
    pub fn put<M: 'static, H: IntoEndpoint<M> + Send + 'static>(self, handler: H) -> Self {
        self.on(Method::PUT, handler)
    }

    #[must_use]
    pub fn patch<M: 'static, H: IntoEndpoint<M> + Send + 'static>(self, handler: H) -> Self {
        self.on(Method::PATCH, handler)
    }

    #[must_use]
    pub fn delete<M: 'static, H: IntoEndpoint<M> + Send + 'static>(self, handler: H) -> Self {
        self.on(Method::DELETE, handler)
    }

    pub fn methods(&self) -> Vec<Method> {
        self.handlers.iter().map(|(m, _)| m.clone()).collect()
    }

    fn compile(self, cache: &AdaptorCache) -> Result<Endpoint, ConfigError> {
        let mut table: Vec<(Method, Endpoint)> = Vec::with_capacity(self.handlers.len());
        for (method, pending) in self.handlers {
            if table.iter().any(|(m, _)| *m == method) {
                return Err(ConfigError::DuplicateMethod(method));
            }
            table.push((method, pending(cache)?));
        }

        let allowed: Vec<Method> = table.iter().map(|(m, _)| m.clone()).collect();
        Ok(Arc::new(move |req: &Request| {
            match table.iter().find(|(m, _)| m == req.method()) {
                Some((_, endpoint)) => endpoint(req),
                None => Response::method_not_allowed(&allowed),
            }
        }))
    }
}

impl IntoEndpoint<ViaByMethod> for ByMethod {
    fn into_endpoint(self, cache: &AdaptorCache) -> Result<Endpoint, ConfigError> {
        self.compile(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Json;
    use hyper::StatusCode;

    fn call(endpoint: &Endpoint, method: Method) -> Response {
        endpoint(&Request::from_target(method, "/").unwrap())
    }

    #[test]
    fn test_only_listed_methods_are_served() {
        let endpoint = AdaptorCache::new()
            .adapt(ByMethod::new().put(|| Json("stored")))
            .unwrap();

        let res = call(&endpoint, Method::GET);
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[hyper::header::ALLOW], "PUT");

        let res = call(&endpoint, Method::PUT);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body(), b"\"stored\"\n");
    }

    #[test]
    fn test_each_method_gets_its_handler() {
        let endpoint = AdaptorCache::new()
            .adapt(
                ByMethod::new()
                    .get(|| Json("read"))
                    .delete(|| StatusCode::NO_CONTENT),
            )
            .unwrap();

        assert_eq!(call(&endpoint, Method::GET).body(), b"\"read\"\n");
        assert_eq!(
            call(&endpoint, Method::DELETE).status(),
            StatusCode::NO_CONTENT
        );
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let table = ByMethod::new().get(|| ()).get(|| StatusCode::OK);
        assert_eq!(table.methods(), vec![Method::GET, Method::GET]);

        let err = AdaptorCache::new().adapt(table).err().unwrap();
        assert!(matches!(err, ConfigError::DuplicateMethod(m) if m == Method::GET));
    }

    #[test]
    fn test_bad_signature_surfaces() {
        let table = ByMethod::new().post(|_: Json<u8>, _: Json<u8>| ());
        assert!(matches!(
            AdaptorCache::new().adapt(table),
            Err(ConfigError::UnsupportedSignature { .. })
        ));
    }
}
