//! Dynamic dispatcher
//!
//! Executes a cached plan against one request: bind every argument slot,
//! invoke the handler, then translate results in a fixed order (error slot,
//! responsive results, response body).

use crate::binding::{HttpError, Request, Response};
use crate::logger;
use crate::plan::{ExecutionPlan, Handler, Inputs, Outcome, Outputs, Slot};
use hyper::StatusCode;
use std::sync::Arc;

use super::Endpoint;

/// Pair a plan with a concrete handler of the same signature
pub(crate) fn adapt<H, Args>(plan: Arc<ExecutionPlan>, handler: H) -> Endpoint
where
    H: Handler<Args>,
    Args: Inputs,
{
    Arc::new(move |req: &Request| {
        let slots = match bind_inputs(&plan, req) {
            Ok(slots) => slots,
            Err(res) => return res,
        };
        let Some(args) = Args::from_slots(slots) else {
            logger::log_error(&format!(
                "argument slots do not match handler {}",
                plan.signature()
            ));
            return Response::empty(StatusCode::INTERNAL_SERVER_ERROR);
        };
        write_outputs(&plan, handler.call(args).into_outcome(), req)
    })
}

/// Populate one slot per plan input, or answer the request early.
///
/// The handler never runs unless every argument bound successfully.
pub(crate) fn bind_inputs(plan: &ExecutionPlan, req: &Request) -> Result<Vec<Slot>, Response> {
    plan.inputs()
        .iter()
        .map(|input| match input.bind(req) {
            Ok(slot) => Ok(slot),
            Err(err) if err.is_absent() => input
                .absent_slot()
                .ok_or_else(|| error_response(req, &err)),
            Err(err) => Err(error_response(req, &err)),
        })
        .collect()
}

/// Translate handler results into a response
pub(crate) fn write_outputs(plan: &ExecutionPlan, outcome: Outcome, req: &Request) -> Response {
    let Outcome { values, error } = outcome;

    if let Some(err) = error {
        return error_response(req, err.as_ref());
    }

    if values.len() != plan.outputs().len() {
        logger::log_error(&format!(
            "handler {} produced {} results, plan expects {}",
            plan.signature(),
            values.len(),
            plan.outputs().len()
        ));
        return Response::empty(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let mut res = Response::new();
    let mut body = None;
    for (index, (slot, output)) in values.into_iter().zip(plan.outputs()).enumerate() {
        if plan.response_body_index() == Some(index) {
            body = Some((slot, output));
            continue;
        }
        if let Err(err) = output.respond(slot, &mut res) {
            return error_response(req, &err);
        }
    }

    if let Some((slot, output)) = body {
        match output.encode(slot) {
            Ok(encoded) => res.write_json(&encoded),
            Err(err) => {
                logger::log_encode_error(req.method(), req.path(), &err);
                return Response::empty(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    res
}

/// Answer with the error's own status, or a bare 500 that keeps the
/// message in the server log
pub fn error_response(req: &Request, err: &dyn HttpError) -> Response {
    match err.response_code() {
        Some(code) => Response::text(code, &err.to_string()),
        None => {
            logger::log_request_error(req.method(), req.path(), err);
            Response::empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
