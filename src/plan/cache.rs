//! Adaptor cache
//!
//! Maps each handler signature to its compiled plan so that plan building
//! runs at most once per signature. Signatures can be precompiled during
//! setup; anything else is built on first use with a logged warning.

use super::builder::{ExecutionPlan, PlanOrigin};
use super::signature::{Inputs, Outputs, Signature};
use crate::dispatch::{Endpoint, IntoEndpoint};
use crate::error::ConfigError;
use crate::logger;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Signature → plan table, safe for concurrent readers
#[derive(Debug, Default)]
pub struct AdaptorCache {
    plans: RwLock<HashMap<TypeId, Arc<ExecutionPlan>>>,
}

impl AdaptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and store the plan for a signature ahead of time
    pub fn precompile<Args: Inputs, Out: Outputs>(
        &self,
    ) -> Result<Arc<ExecutionPlan>, ConfigError> {
        if let Some(plan) = self.lookup(Signature::of::<Args, Out>().key()) {
            return Ok(plan);
        }
        let plan = ExecutionPlan::build::<Args, Out>(PlanOrigin::Precompiled)?;
        Ok(self.store(plan))
    }

    /// Plan for a signature, building it by introspection on first use
    pub fn plan<Args: Inputs, Out: Outputs>(&self) -> Result<Arc<ExecutionPlan>, ConfigError> {
        let signature = Signature::of::<Args, Out>();
        if let Some(plan) = self.lookup(signature.key()) {
            return Ok(plan);
        }
        logger::log_introspected_plan(&signature);
        let plan = ExecutionPlan::build::<Args, Out>(PlanOrigin::Introspected)?;
        Ok(self.store(plan))
    }

    /// Turn any handler-shaped value into an endpoint using this cache
    pub fn adapt<M, H: IntoEndpoint<M>>(&self, handler: H) -> Result<Endpoint, ConfigError> {
        handler.into_endpoint(self)
    }

    pub fn contains<Args: Inputs, Out: Outputs>(&self) -> bool {
        self.lookup(Signature::of::<Args, Out>().key()).is_some()
    }

    pub fn len(&self) -> usize {
        self.plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: TypeId) -> Option<Arc<ExecutionPlan>> {
        self.plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Insert unless another thread got there first; either way every
    /// caller sees the same instance
    fn store(&self, plan: ExecutionPlan) -> Arc<ExecutionPlan> {
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            plans
                .entry(plan.signature().key())
                .or_insert_with(|| Arc::new(plan)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Json, StatusError};
    use hyper::Method;
    use std::thread;

    type Args = (Method, Option<Method>);
    type Out = Result<Json<String>, StatusError>;

    #[test]
    fn test_plan_is_built_once() {
        let cache = AdaptorCache::new();
        assert!(cache.is_empty());

        let first = cache.plan::<Args, Out>().unwrap();
        let second = cache.plan::<Args, Out>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.origin(), PlanOrigin::Introspected);
    }

    #[test]
    fn test_precompiled_plan_is_reused() {
        let cache = AdaptorCache::new();
        let pre = cache.precompile::<Args, Out>().unwrap();
        assert_eq!(pre.origin(), PlanOrigin::Precompiled);
        assert!(cache.contains::<Args, Out>());
        assert!(!cache.contains::<Args, ()>());

        let used = cache.plan::<Args, Out>().unwrap();
        assert!(Arc::ptr_eq(&pre, &used));
    }

    #[test]
    fn test_unsupported_signature_is_not_cached() {
        let cache = AdaptorCache::new();
        assert!(cache.plan::<(Json<u8>, Json<u8>), ()>().is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_first_use_yields_one_instance() {
        let cache = Arc::new(AdaptorCache::new());
        let plans: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.plan::<Args, Out>().unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(plans.iter().all(|p| Arc::ptr_eq(p, &plans[0])));
        assert_eq!(cache.len(), 1);
    }
}
