//! Routing module
//!
//! Path patterns with literal and named segments, and the route table that
//! matches requests against them:
//! - literal segments match exactly, `:name` segments match any non-empty segment
//! - the entry with the most literal segments wins
//! - unmatched paths answer 404, unmatched methods 405

mod pattern;
mod router;

pub use pattern::{decode_path, split_path, Pattern, Segment};
pub use router::{MethodFilter, RouteMatch, Router};
