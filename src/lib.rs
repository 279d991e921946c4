//! Type-directed request dispatch.
//!
//! Handlers are plain functions whose parameter and result types decide how
//! they are wired to HTTP:
//!
//! - parameters implementing [`FromRequest`] are extracted from the request
//! - a [`Json`] parameter is decoded from the request body
//! - results implementing [`ToResponse`] write themselves to the response
//! - a [`Json`] result is encoded as the response body
//! - a final `Result<_, E>` error slot fails the request with `E`'s status
//!
//! ```no_run
//! use typemux::{Json, ServeMux};
//!
//! typemux::request_param! {
//!     pub struct Name(pub String) = "name";
//! }
//!
//! let mut mux = ServeMux::new();
//! mux.handle("/hello/:name", |name: Name| Json(format!("hello {}", name.0)))
//!     .unwrap();
//! ```
//!
//! Every distinct signature is inspected once; the resulting
//! [`ExecutionPlan`] is shared through the [`AdaptorCache`].

pub mod binding;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod logger;
pub mod plan;
pub mod routing;
pub mod server;

pub use binding::{
    BindingError, FromRequest, HttpError, Json, PathParams, Request, Response, StatusError,
    ToResponse,
};
pub use dispatch::{raw, Endpoint, IntoEndpoint};
pub use error::ConfigError;
pub use handler::{ByMethod, RouteInfo, ServeMux};
pub use plan::{AdaptorCache, ExecutionPlan, Handler, PlanOrigin};
