//! The deserializer collaborator.
//!
//! A [`Binder`] turns the live request into a [`Payload`]; `Bind<T>`
//! parameters then deserialize the payload into a fresh `T` and validate it.

use crate::http::{HttpRequest, mime};
use crate::Error;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Undecoded request data, ready to be deserialized into any target type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body and no query parameters.
    Empty,
    Json(Value),
    /// An urlencoded form body or query string.
    Form(String),
}

impl Payload {
    /// Deserialize into `T`. An empty payload deserializes like `{}`, so
    /// targets without required fields bind successfully.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        match self {
            Payload::Empty => serde_json::from_value(Value::Object(Default::default()))
                .map_err(|e| Error::Binding(e.to_string())),
            Payload::Json(value) => {
                T::deserialize(value).map_err(|e| Error::Binding(e.to_string()))
            }
            Payload::Form(encoded) => {
                serde_urlencoded::from_str(encoded).map_err(|e| Error::Binding(e.to_string()))
            }
        }
    }
}

/// Extracts the bindable payload from a request.
pub trait Binder: Send + Sync + 'static {
    fn payload(&self, request: &HttpRequest) -> Result<Payload, Error>;
}

/// Body first, then query string.
///
/// - non-empty body with no content type or `application/json`: JSON
/// - non-empty body with `application/x-www-form-urlencoded`: form
/// - any other body content type: [`Error::UnsupportedMediaType`]
/// - empty body: the query string as a form, or [`Payload::Empty`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBinder;

impl Binder for DefaultBinder {
    fn payload(&self, request: &HttpRequest) -> Result<Payload, Error> {
        if request.body.is_empty() {
            let query = request.query_string();
            if query.is_empty() {
                return Ok(Payload::Empty);
            }
            return Ok(Payload::Form(query));
        }

        match request.content_type().as_deref() {
            None | Some(mime::JSON) => serde_json::from_slice(&request.body)
                .map(Payload::Json)
                .map_err(|e| Error::Binding(format!("invalid JSON body: {}", e))),
            Some(mime::FORM) => String::from_utf8(request.body.clone())
                .map(Payload::Form)
                .map_err(|e| Error::Binding(format!("invalid form body: {}", e))),
            Some(other) => Err(Error::UnsupportedMediaType(other.to_string())),
        }
    }
}
