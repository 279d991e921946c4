//! Execution plans
//!
//! A handler's signature is inspected once, classified into parameter and
//! result roles, and stored as an `ExecutionPlan` in the `AdaptorCache`.

mod builder;
mod cache;
mod descriptor;
mod signature;

pub use builder::{ExecutionPlan, PlanOrigin};
pub use cache::AdaptorCache;
pub use descriptor::{
    Input, InputDescriptor, InputKind, Output, OutputDescriptor, OutputKind, Slot,
};
pub use signature::{Handler, Inputs, Outcome, Outputs, Signature};
