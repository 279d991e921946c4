//! Serve mux
//!
//! Entry point for registration and request processing. Registration takes
//! `&mut self` and happens during setup; once the mux is shared (usually in
//! an `Arc`) it is read-only and serves any number of requests concurrently.

use crate::binding::{Request, Response};
use crate::dispatch::IntoEndpoint;
use crate::error::ConfigError;
use crate::plan::AdaptorCache;
use crate::routing::{MethodFilter, Router};
use hyper::Method;
use std::sync::Arc;

/// Registered route, as reported by [`ServeMux::routes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: String,
    pub pattern: String,
}

/// Path router plus the adaptor cache its handlers are compiled with
pub struct ServeMux {
    router: Router,
    cache: Arc<AdaptorCache>,
}

impl Default for ServeMux {
    fn default() -> Self {
        Self::new()
    }
}

impl ServeMux {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(AdaptorCache::new()))
    }

    /// Share plans with other muxes, or reuse precompiled ones
    pub fn with_cache(cache: Arc<AdaptorCache>) -> Self {
        Self {
            router: Router::new(),
            cache,
        }
    }

    pub const fn cache(&self) -> &Arc<AdaptorCache> {
        &self.cache
    }

    /// Register `handler` for every method on `route`
    pub fn handle<M, H: IntoEndpoint<M>>(
        &mut self,
        route: &str,
        handler: H,
    ) -> Result<&mut Self, ConfigError> {
        self.register(MethodFilter::Any, route, handler)
    }

    /// Register `handler` for one method on `route`
    pub fn handle_method<M, H: IntoEndpoint<M>>(
        &mut self,
        method: Method,
        route: &str,
        handler: H,
    ) -> Result<&mut Self, ConfigError> {
        self.register(MethodFilter::Only(method), route, handler)
    }

    fn register<M, H: IntoEndpoint<M>>(
        &mut self,
        method: MethodFilter,
        route: &str,
        handler: H,
    ) -> Result<&mut Self, ConfigError> {
        let endpoint = handler
            .into_endpoint(&self.cache)
            .map_err(|e| e.in_route(route))?;
        self.router
            .insert(method, route, endpoint)
            .map_err(|e| e.in_route(route))?;
        Ok(self)
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.router
            .routes()
            .map(|(method, pattern)| RouteInfo {
                method: method.to_string(),
                pattern: pattern.to_string(),
            })
            .collect()
    }

    /// Serve one request
    pub fn serve(&self, req: Request) -> Response {
        self.router.serve(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{FromRequest, Json, BindingError, StatusError};
    use crate::handler::ByMethod;
    use hyper::StatusCode;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct UserId(String);

    impl FromRequest for UserId {
        fn from_request(req: &Request) -> Result<Self, BindingError> {
            req.param("userId")
                .map(|id| Self(id.to_string()))
                .ok_or_else(|| BindingError::Missing("userId".into()))
        }
    }

    fn request(method: Method, target: &str) -> Request {
        Request::from_target(method, target).unwrap()
    }

    #[test]
    fn test_path_params_reach_extractors() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        let mut mux = ServeMux::new();
        mux.handle("/user/:userId/name", move |id: UserId| {
            *sink.lock().unwrap() = id.0;
        })
        .unwrap();

        let res = mux.serve(request(Method::GET, "/user/10/name"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*seen.lock().unwrap(), "10");
    }

    #[test]
    fn test_undecodable_capture_never_reaches_handler() {
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        let mut mux = ServeMux::new();
        mux.handle("/user/:userId/name", move |id: UserId| {
            *flag.lock().unwrap() = true;
            Json(id.0)
        })
        .unwrap();

        let res = mux.serve(request(Method::GET, "/user/%FF%FE/name"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(!*called.lock().unwrap());
    }

    #[test]
    fn test_by_method_on_route() {
        #[derive(Deserialize, Serialize)]
        struct Note {
            text: String,
        }

        let mut mux = ServeMux::new();
        mux.handle(
            "/notes/:userId",
            ByMethod::new().put(|id: UserId, note: Json<Note>| {
                Json(Note {
                    text: format!("{}: {}", id.0, note.text),
                })
            }),
        )
        .unwrap();

        let res = mux.serve(request(Method::GET, "/notes/4"));
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

        let res = mux.serve(request(Method::PUT, "/notes/4").with_body(r#"{"text":"hi"}"#));
        assert_eq!(res.status(), StatusCode::OK);
        let note: Note = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(note.text, "4: hi");
    }

    #[test]
    fn test_method_specific_routes() {
        let mut mux = ServeMux::new();
        mux.handle_method(Method::GET, "/items", || Json(vec![1, 2, 3]))
            .unwrap()
            .handle_method(Method::POST, "/items", || StatusCode::CREATED)
            .unwrap();

        assert_eq!(
            mux.serve(request(Method::POST, "/items")).status(),
            StatusCode::CREATED
        );
        let res = mux.serve(request(Method::PATCH, "/items"));
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[hyper::header::ALLOW], "GET, POST");
        assert_eq!(
            mux.serve(request(Method::GET, "/missing")).status(),
            StatusCode::NOT_FOUND
        );

        assert_eq!(
            mux.routes(),
            vec![
                RouteInfo {
                    method: "GET".into(),
                    pattern: "/items".into()
                },
                RouteInfo {
                    method: "POST".into(),
                    pattern: "/items".into()
                },
            ]
        );
    }

    #[test]
    fn test_registration_errors_name_the_route() {
        let mut mux = ServeMux::new();
        let err = mux
            .handle("/upload", |_: Json<String>, _: Json<String>| ())
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("error while routing /upload:"));

        mux.handle("/a", || ()).unwrap();
        let err = mux.handle("/a", || StatusCode::OK).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::Route { ref route, .. } if route == "/a"
        ));

        assert!(mux.handle("no-slash", || ()).is_err());
        assert_eq!(mux.routes().len(), 1);
    }

    #[test]
    fn test_shared_cache_reuses_plans() {
        let cache = Arc::new(AdaptorCache::new());
        cache.precompile::<(UserId,), Result<Json<String>, StatusError>>().unwrap();

        let mut mux = ServeMux::with_cache(Arc::clone(&cache));
        mux.handle("/a/:userId", |id: UserId| -> Result<Json<String>, StatusError> {
            Ok(Json(id.0))
        })
        .unwrap()
        .handle("/b/:userId", |id: UserId| -> Result<Json<String>, StatusError> {
            Err(StatusError::from_u16(404, format!("no user {}", id.0)))
        })
        .unwrap();
        assert_eq!(cache.len(), 1);

        let res = mux.serve(request(Method::GET, "/b/9"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"no user 9");
    }
}
