//! Per-type role descriptors
//!
//! Every parameter type reports an `InputDescriptor` and every result type
//! an `OutputDescriptor`. The descriptors are plain data plus monomorphised
//! function pointers, so the dispatcher never inspects types per request.

use crate::binding::{BindingError, FromRequest, HttpError, Json, Request, Response, ToResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt;

/// Type-erased argument or result value
pub type Slot = Box<dyn Any + Send>;

type BindFn = fn(&Request) -> Result<Slot, BindingError>;
type AbsentFn = fn() -> Slot;
type RespondFn = fn(Slot, &mut Response) -> Result<(), BindingError>;
type EncodeFn = fn(Slot) -> Result<Vec<u8>, serde_json::Error>;

/// Where a parameter's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Populated by the type's own `FromRequest`
    Extract,
    /// Decoded from the JSON request body
    Body,
}

/// Role of one handler parameter
#[derive(Clone, Copy)]
pub struct InputDescriptor {
    type_name: &'static str,
    kind: InputKind,
    bind: BindFn,
    absent: Option<AbsentFn>,
}

impl InputDescriptor {
    /// Required parameter populated by `T::from_request`
    pub fn extract<T: FromRequest + Send + 'static>() -> Self {
        Self {
            type_name: type_name::<T>(),
            kind: InputKind::Extract,
            bind: extract::<T>,
            absent: None,
        }
    }

    /// Optional parameter; pure absence leaves it `None`
    pub fn optional_extract<T: FromRequest + Send + 'static>() -> Self {
        Self {
            type_name: type_name::<Option<T>>(),
            kind: InputKind::Extract,
            bind: extract_some::<T>,
            absent: Some(absent::<T>),
        }
    }

    /// Required JSON body
    pub fn body<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            type_name: type_name::<Json<T>>(),
            kind: InputKind::Body,
            bind: decode::<T>,
            absent: None,
        }
    }

    /// Optional JSON body; an empty body leaves it `None`
    pub fn optional_body<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            type_name: type_name::<Option<Json<T>>>(),
            kind: InputKind::Body,
            bind: decode_some::<T>,
            absent: Some(absent::<Json<T>>),
        }
    }

    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub const fn kind(&self) -> InputKind {
        self.kind
    }

    pub const fn is_optional(&self) -> bool {
        self.absent.is_some()
    }

    pub(crate) fn bind(&self, req: &Request) -> Result<Slot, BindingError> {
        (self.bind)(req)
    }

    /// Value used when an optional parameter is absent
    pub(crate) fn absent_slot(&self) -> Option<Slot> {
        self.absent.map(|make| make())
    }
}

impl fmt::Debug for InputDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("optional", &self.is_optional())
            .finish()
    }
}

fn extract<T: FromRequest + Send + 'static>(req: &Request) -> Result<Slot, BindingError> {
    T::from_request(req).map(|value| Box::new(value) as Slot)
}

fn extract_some<T: FromRequest + Send + 'static>(req: &Request) -> Result<Slot, BindingError> {
    T::from_request(req).map(|value| Box::new(Some(value)) as Slot)
}

fn absent<T: Send + 'static>() -> Slot {
    Box::new(None::<T>)
}

fn decode_json<T: DeserializeOwned>(req: &Request) -> Result<Json<T>, BindingError> {
    let body = req.body();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(BindingError::MissingBody);
    }
    serde_json::from_slice(body)
        .map(Json)
        .map_err(BindingError::Body)
}

fn decode<T: DeserializeOwned + Send + 'static>(req: &Request) -> Result<Slot, BindingError> {
    decode_json::<T>(req).map(|value| Box::new(value) as Slot)
}

fn decode_some<T: DeserializeOwned + Send + 'static>(req: &Request) -> Result<Slot, BindingError> {
    decode_json::<T>(req).map(|value| Box::new(Some(value)) as Slot)
}

/// What happens to a handler result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Writes itself through `ToResponse`
    Responsive,
    /// Encoded as the JSON response body
    Body,
    /// Error slot of a `Result`
    Error,
}

#[derive(Clone, Copy)]
enum Writer {
    Respond(RespondFn),
    Encode(EncodeFn),
    Error,
}

/// Role of one handler result
#[derive(Clone, Copy)]
pub struct OutputDescriptor {
    type_name: &'static str,
    writer: Writer,
    writes_body: bool,
}

impl OutputDescriptor {
    pub fn responsive<T: ToResponse + Send + 'static>() -> Self {
        Self {
            type_name: type_name::<T>(),
            writer: Writer::Respond(respond::<T>),
            writes_body: T::WRITES_BODY,
        }
    }

    pub fn body<T: Serialize + Send + 'static>() -> Self {
        Self {
            type_name: type_name::<Json<T>>(),
            writer: Writer::Encode(encode::<T>),
            writes_body: true,
        }
    }

    pub fn error<E: HttpError>() -> Self {
        Self {
            type_name: type_name::<E>(),
            writer: Writer::Error,
            writes_body: false,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub const fn kind(&self) -> OutputKind {
        match self.writer {
            Writer::Respond(_) => OutputKind::Responsive,
            Writer::Encode(_) => OutputKind::Body,
            Writer::Error => OutputKind::Error,
        }
    }

    /// Whether writing this result appends to the response body
    pub const fn writes_body(&self) -> bool {
        self.writes_body
    }

    pub(crate) fn respond(&self, slot: Slot, res: &mut Response) -> Result<(), BindingError> {
        match self.writer {
            Writer::Respond(write) => write(slot, res),
            _ => Err(BindingError::Write(format!(
                "`{}` is not a responsive result",
                self.type_name
            ))),
        }
    }

    pub(crate) fn encode(&self, slot: Slot) -> Result<Vec<u8>, serde_json::Error> {
        match self.writer {
            Writer::Encode(encode) => encode(slot),
            _ => Err(slot_mismatch(self.type_name)),
        }
    }
}

impl fmt::Debug for OutputDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind())
            .finish()
    }
}

fn respond<T: ToResponse + Send + 'static>(slot: Slot, res: &mut Response) -> Result<(), BindingError> {
    let value = slot.downcast::<T>().map_err(|_| {
        BindingError::Write(format!("result slot does not hold `{}`", type_name::<T>()))
    })?;
    value.to_response(res)
}

fn encode<T: Serialize + Send + 'static>(slot: Slot) -> Result<Vec<u8>, serde_json::Error> {
    let value = slot
        .downcast::<Json<T>>()
        .map_err(|_| slot_mismatch(type_name::<Json<T>>()))?;
    serde_json::to_vec(&value.0)
}

fn slot_mismatch(expected: &str) -> serde_json::Error {
    <serde_json::Error as serde::ser::Error>::custom(format!(
        "result slot does not hold `{expected}`"
    ))
}

/// A type usable as a handler parameter
pub trait Input: Send + 'static {
    fn descriptor() -> InputDescriptor;
}

impl<T: FromRequest + Send + 'static> Input for T {
    fn descriptor() -> InputDescriptor {
        InputDescriptor::extract::<T>()
    }
}

impl<T: FromRequest + Send + 'static> Input for Option<T> {
    fn descriptor() -> InputDescriptor {
        InputDescriptor::optional_extract::<T>()
    }
}

impl<T: DeserializeOwned + Send + 'static> Input for Json<T> {
    fn descriptor() -> InputDescriptor {
        InputDescriptor::body::<T>()
    }
}

impl<T: DeserializeOwned + Send + 'static> Input for Option<Json<T>> {
    fn descriptor() -> InputDescriptor {
        InputDescriptor::optional_body::<T>()
    }
}

/// A type usable as a single handler result
pub trait Output: Send + 'static {
    fn descriptor() -> OutputDescriptor;
}

impl<T: ToResponse + Send + 'static> Output for T {
    fn descriptor() -> OutputDescriptor {
        OutputDescriptor::responsive::<T>()
    }
}

impl<T: Serialize + Send + 'static> Output for Json<T> {
    fn descriptor() -> OutputDescriptor {
        OutputDescriptor::body::<T>()
    }
}
