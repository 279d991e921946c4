//! Execution plan builder
//!
//! Turns a handler signature into an `ExecutionPlan`: which parameter is the
//! request body, which parameters are optional, whether the last result is
//! an error slot and which result is the response body. A plan is a pure
//! function of the signature and is never mutated after construction.

use super::descriptor::{InputDescriptor, InputKind, OutputDescriptor, OutputKind};
use super::signature::{Inputs, Outputs, Signature};
use crate::error::ConfigError;

/// How a plan came into the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOrigin {
    /// Registered ahead of time during setup
    Precompiled,
    /// Built on first use of the signature
    Introspected,
}

/// Compiled binding strategy for one signature
#[derive(Debug)]
pub struct ExecutionPlan {
    signature: Signature,
    inputs: Vec<InputDescriptor>,
    outputs: Vec<OutputDescriptor>,
    request_body: Option<usize>,
    response_body: Option<usize>,
    last_is_error: bool,
    origin: PlanOrigin,
}

impl ExecutionPlan {
    /// Build the plan for a handler taking `Args` and returning `Out`
    pub fn build<Args: Inputs, Out: Outputs>(origin: PlanOrigin) -> Result<Self, ConfigError> {
        Self::from_descriptors(
            Signature::of::<Args, Out>(),
            Args::descriptors(),
            Out::descriptors(),
            origin,
        )
    }

    /// Apply the role rules to already collected descriptors
    pub fn from_descriptors(
        signature: Signature,
        inputs: Vec<InputDescriptor>,
        mut outputs: Vec<OutputDescriptor>,
        origin: PlanOrigin,
    ) -> Result<Self, ConfigError> {
        let request_body = single_position(
            inputs.iter().map(|input| (input.kind() == InputKind::Body, input.type_name())),
        )
        .map_err(|(a, b)| {
            ConfigError::unsupported(
                signature,
                format!("more than one request body parameter: `{a}` and `{b}`"),
            )
        })?;

        let errors = outputs
            .iter()
            .filter(|output| output.kind() == OutputKind::Error)
            .count();
        let last_is_error = outputs
            .last()
            .is_some_and(|output| output.kind() == OutputKind::Error);
        if errors > 1 || (errors == 1 && !last_is_error) {
            return Err(ConfigError::unsupported(
                signature,
                "an error result must be the single, final result",
            ));
        }
        if last_is_error {
            outputs.pop();
        }

        let response_body = single_position(
            outputs
                .iter()
                .map(|output| (output.kind() == OutputKind::Body, output.type_name())),
        )
        .map_err(|(a, b)| {
            ConfigError::unsupported(
                signature,
                format!("more than one response body result: `{a}` and `{b}`"),
            )
        })?;

        if let Some(body) = response_body {
            let text = outputs.iter().enumerate().find(|(index, output)| {
                *index != body && output.kind() == OutputKind::Responsive && output.writes_body()
            });
            if let Some((_, text)) = text {
                return Err(ConfigError::unsupported(
                    signature,
                    format!(
                        "`{}` writes the response body and cannot be combined with body result `{}`",
                        text.type_name(),
                        outputs[body].type_name()
                    ),
                ));
            }
        }

        Ok(Self {
            signature,
            inputs,
            outputs,
            request_body,
            response_body,
            last_is_error,
            origin,
        })
    }

    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn inputs(&self) -> &[InputDescriptor] {
        &self.inputs
    }

    /// Results other than the error slot
    pub fn outputs(&self) -> &[OutputDescriptor] {
        &self.outputs
    }

    pub const fn request_body_index(&self) -> Option<usize> {
        self.request_body
    }

    pub const fn response_body_index(&self) -> Option<usize> {
        self.response_body
    }

    pub const fn last_is_error(&self) -> bool {
        self.last_is_error
    }

    pub fn is_optional(&self, index: usize) -> bool {
        self.inputs
            .get(index)
            .is_some_and(InputDescriptor::is_optional)
    }

    pub const fn origin(&self) -> PlanOrigin {
        self.origin
    }
}

/// Index of the single flagged entry, or the names of the first two
fn single_position(
    flags: impl Iterator<Item = (bool, &'static str)>,
) -> Result<Option<usize>, (&'static str, &'static str)> {
    let mut found: Option<(usize, &'static str)> = None;
    for (index, (flagged, name)) in flags.enumerate() {
        if !flagged {
            continue;
        }
        if let Some((_, first)) = found {
            return Err((first, name));
        }
        found = Some((index, name));
    }
    Ok(found.map(|(index, _)| index))
}
