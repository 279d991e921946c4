//! Request handler module
//!
//! Registration surface of the crate: the serve mux that owns the route
//! table, and the per-method dispatch wrapper.

pub mod by_method;
pub mod mux;

pub use by_method::{ByMethod, ViaByMethod};
pub use mux::{RouteInfo, ServeMux};
