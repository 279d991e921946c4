//! Request dispatch
//!
//! Compiles registered values into endpoints and runs typed handlers
//! through their cached execution plans.

mod dynamic;
mod endpoint;

pub use dynamic::error_response;
pub use endpoint::{raw, Endpoint, IntoEndpoint, Raw, ViaEndpoint, ViaRaw};
