// Error types for the Bindery adapter

use crate::Status;
use bindery_validation::ValidationErrors;
use serde_json::Value;
use thiserror::Error;

/// Failures raised while registering or running a bound handler.
///
/// `InvalidTarget` is a registration error and aborts startup. Every other
/// variant is request-scoped and ends up as an error envelope.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid handler target: {0}")]
    InvalidTarget(String),

    #[error("Binding error: {0}")]
    Binding(String),

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Validation error: {message}")]
    Validation { message: String, details: Vec<Value> },

    #[error(transparent)]
    Business(Status),

    #[error("Handler panicked: {0}")]
    Panic(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the adapter.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable text code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidTarget(_) => "INVALID_TARGET",
            Error::Binding(_) => "BINDING",
            Error::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Error::Validation { .. } => "VALIDATION",
            Error::Business(_) => "BUSINESS",
            Error::Panic(_) => "PANIC",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            Error::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Error::Internal(_) => "INTERNAL",
            Error::Io(_) => "IO",
        }
    }

    /// Message without the variant prefix added by `Display`.
    pub fn message(&self) -> String {
        match self {
            Error::InvalidTarget(m)
            | Error::Binding(m)
            | Error::UnsupportedMediaType(m)
            | Error::Panic(m)
            | Error::Serialization(m)
            | Error::Config(m)
            | Error::RouteNotFound(m)
            | Error::MethodNotAllowed(m)
            | Error::Internal(m) => m.clone(),
            Error::Validation { message, .. } => message.clone(),
            Error::Business(status) => status.display_message(),
            Error::Io(e) => e.to_string(),
        }
    }

    /// HTTP semantics of the failure, used for logging only: the wire
    /// status of an envelope is always 200.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Binding(_) | Error::Validation { .. } => 400,
            Error::RouteNotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            Error::UnsupportedMediaType(_) => 415,
            Error::Business(status) => business_status_code(status),
            _ => 500,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Binding and validation failures, as opposed to business or panic errors.
    pub fn is_binding_error(&self) -> bool {
        matches!(
            self,
            Error::Binding(_) | Error::UnsupportedMediaType(_) | Error::Validation { .. }
        )
    }
}

/// A numeric status code in the 4xx/5xx range, otherwise 500.
pub(crate) fn business_status_code(status: &Status) -> u16 {
    status
        .code()
        .and_then(|c| c.as_number())
        .filter(|n| (400..600).contains(n))
        .map(|n| n as u16)
        .unwrap_or(500)
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Business(status)
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation {
            message: errors.to_string(),
            details: errors.to_details(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_validation::ValidationError;

    #[test]
    fn test_binding_errors_are_client_errors() {
        let err = Error::Binding("expected value at line 1 column 1".into());
        assert_eq!(err.status_code(), 400);
        assert!(err.is_client_error());
        assert!(err.is_binding_error());
        assert_eq!(err.code(), "BINDING");
    }

    #[test]
    fn test_panic_message_has_no_prefix() {
        let err = Error::Panic("boom".into());
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "Handler panicked: boom");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_business_status_code_passthrough() {
        let err: Error = Status::new(404, "no such user").into();
        assert_eq!(err.status_code(), 404);

        let err: Error = Status::new("X1", "bad").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "bad");
        assert!(!err.is_binding_error());
    }

    #[test]
    fn test_from_validation_errors() {
        let errors: ValidationErrors = ValidationError::new("name", "is required").into();
        let err: Error = errors.into();
        match err {
            Error::Validation { message, details } => {
                assert_eq!(message, "name: is required");
                assert_eq!(details.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
