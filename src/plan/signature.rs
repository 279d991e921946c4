//! Handler signatures
//!
//! `Handler` is implemented for plain functions and closures of up to eight
//! parameters. Their argument tuple implements `Inputs` and their return
//! type implements `Outputs`; together they form the `Signature` that keys
//! the adaptor cache.

use super::descriptor::{Input, InputDescriptor, Output, OutputDescriptor, Slot};
use crate::binding::HttpError;
use std::any::{type_name, TypeId};
use std::fmt;

/// Identity of a handler shape: argument tuple plus return type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    key: TypeId,
    inputs: &'static str,
    output: &'static str,
}

impl Signature {
    pub fn of<Args: Inputs, Out: Outputs>() -> Self {
        Self {
            key: TypeId::of::<(Args, Out)>(),
            inputs: type_name::<Args>(),
            output: type_name::<Out>(),
        }
    }

    pub const fn key(&self) -> TypeId {
        self.key
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{} -> {}", self.inputs, self.output)
    }
}

/// Ordered handler parameters
pub trait Inputs: Sized + Send + 'static {
    fn descriptors() -> Vec<InputDescriptor>;

    /// Rebuild the argument tuple; `None` if a slot holds the wrong type
    fn from_slots(slots: Vec<Slot>) -> Option<Self>;
}

macro_rules! impl_inputs {
    ($($ty:ident),*) => {
        impl<$($ty: Input,)*> Inputs for ($($ty,)*) {
            fn descriptors() -> Vec<InputDescriptor> {
                vec![$($ty::descriptor()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_slots(slots: Vec<Slot>) -> Option<Self> {
                let mut slots = slots.into_iter();
                let args = ($(*slots.next()?.downcast::<$ty>().ok()?,)*);
                slots.next().is_none().then_some(args)
            }
        }
    };
}

impl_inputs!();
impl_inputs!(A1);
impl_inputs!(A1, A2);
impl_inputs!(A1, A2, A3);
impl_inputs!(A1, A2, A3, A4);
impl_inputs!(A1, A2, A3, A4, A5);
impl_inputs!(A1, A2, A3, A4, A5, A6);
impl_inputs!(A1, A2, A3, A4, A5, A6, A7);
impl_inputs!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Values a handler produced, in plan order
pub struct Outcome {
    pub(crate) values: Vec<Slot>,
    pub(crate) error: Option<Box<dyn HttpError>>,
}

impl Outcome {
    const fn values(values: Vec<Slot>) -> Self {
        Self {
            values,
            error: None,
        }
    }
}

/// Ordered handler results
pub trait Outputs: Send + 'static {
    fn descriptors() -> Vec<OutputDescriptor>;

    fn into_outcome(self) -> Outcome;
}

impl Outputs for () {
    fn descriptors() -> Vec<OutputDescriptor> {
        Vec::new()
    }

    fn into_outcome(self) -> Outcome {
        Outcome::values(Vec::new())
    }
}

impl<T: Output> Outputs for T {
    fn descriptors() -> Vec<OutputDescriptor> {
        vec![T::descriptor()]
    }

    fn into_outcome(self) -> Outcome {
        Outcome::values(vec![Box::new(self)])
    }
}

macro_rules! impl_outputs {
    ($($ty:ident),+) => {
        impl<$($ty: Output,)+> Outputs for ($($ty,)+) {
            fn descriptors() -> Vec<OutputDescriptor> {
                vec![$($ty::descriptor()),+]
            }

            #[allow(non_snake_case)]
            fn into_outcome(self) -> Outcome {
                let ($($ty,)+) = self;
                Outcome::values(vec![$(Box::new($ty) as Slot),+])
            }
        }
    };
}

impl_outputs!(R1, R2);
impl_outputs!(R1, R2, R3);
impl_outputs!(R1, R2, R3, R4);

impl<X: Outputs, E: HttpError> Outputs for Result<X, E> {
    fn descriptors() -> Vec<OutputDescriptor> {
        let mut descriptors = X::descriptors();
        descriptors.push(OutputDescriptor::error::<E>());
        descriptors
    }

    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => value.into_outcome(),
            Err(err) => Outcome {
                values: Vec::new(),
                error: Some(Box::new(err)),
            },
        }
    }
}

/// A function that can serve requests once adapted
pub trait Handler<Args: Inputs>: Send + Sync + 'static {
    type Output: Outputs;

    fn call(&self, args: Args) -> Self::Output;
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: Outputs,
            $($ty: Input,)*
        {
            type Output = R;

            #[allow(non_snake_case)]
            fn call(&self, ($($ty,)*): ($($ty,)*)) -> R {
                (self)($($ty),*)
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Json, StatusError};
    use crate::plan::descriptor::{InputKind, OutputKind};
    use hyper::{Method, StatusCode};

    #[test]
    fn test_signature_identity() {
        let a = Signature::of::<(Method,), Json<u32>>();
        let b = Signature::of::<(Method,), Json<u32>>();
        let c = Signature::of::<(Option<Method>,), Json<u32>>();
        assert_eq!(a, b);
        assert_ne!(a.key(), c.key());
        assert!(a.to_string().contains("Method"));
    }

    #[test]
    fn test_from_slots_checks_types_and_arity() {
        type Args = (Method, Option<Method>);
        let kinds: Vec<_> = Args::descriptors().iter().map(InputDescriptor::kind).collect();
        assert_eq!(kinds, vec![InputKind::Extract, InputKind::Extract]);

        let good: Vec<Slot> = vec![Box::new(Method::GET), Box::new(None::<Method>)];
        assert!(Args::from_slots(good).is_some());

        let swapped: Vec<Slot> = vec![Box::new(None::<Method>), Box::new(Method::GET)];
        assert!(Args::from_slots(swapped).is_none());

        let short: Vec<Slot> = vec![Box::new(Method::GET)];
        assert!(Args::from_slots(short).is_none());
    }

    #[test]
    fn test_result_appends_error_slot() {
        type Out = Result<(StatusCode, Json<String>), StatusError>;
        let kinds: Vec<_> = Out::descriptors().iter().map(OutputDescriptor::kind).collect();
        assert_eq!(
            kinds,
            vec![OutputKind::Responsive, OutputKind::Body, OutputKind::Error]
        );

        let failed: Out = Err(StatusError::from_u16(400, "result"));
        let outcome = failed.into_outcome();
        assert!(outcome.values.is_empty());
        assert_eq!(outcome.error.unwrap().to_string(), "result");
    }

    #[test]
    fn test_closure_is_handler() {
        fn call_it<H: Handler<(Method,)>>(h: &H) -> H::Output {
            h.call((Method::DELETE,))
        }
        let out = call_it(&|m: Method| Json(m.to_string()));
        assert_eq!(out.0, "DELETE");
    }
}
