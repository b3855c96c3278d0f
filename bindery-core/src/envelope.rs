//! The response envelope.
//!
//! Every request routed through a bound handler ends with exactly one
//! [`Envelope`], rendered with HTTP status 200 in the deployment's
//! [`EnvelopeStyle`].

use crate::config::{AdapterConfig, EnvelopeStyle};
use crate::http::{mime, HttpResponse, CONTENT_TYPE};
use crate::status::{ErrorCode, Status};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error part of an envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<Value>) -> Self {
        self.details = details;
        self
    }
}

impl From<&Status> for ErrorInfo {
    fn from(status: &Status) -> Self {
        Self {
            code: status.code().cloned(),
            message: status.display_message(),
            details: status.details().to_vec(),
        }
    }
}

impl From<Status> for ErrorInfo {
    fn from(status: Status) -> Self {
        ErrorInfo::from(&status)
    }
}

impl From<Error> for ErrorInfo {
    fn from(err: Error) -> Self {
        ErrorInfo::from(Status::from(err))
    }
}

/// The normalized response of a bound handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl Envelope {
    /// Success without data.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Success carrying `data`. A JSON `null` is treated as no data.
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: (!data.is_null()).then_some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<ErrorInfo>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// The JSON document for `style`.
    pub fn to_json(&self, config: &AdapterConfig) -> Result<Value, Error> {
        match config.envelope {
            EnvelopeStyle::SuccessFlag => Ok(serde_json::to_value(self)?),
            EnvelopeStyle::CodeMessage => Ok(serde_json::to_value(self.code_message(config))?),
        }
    }

    fn code_message(&self, config: &AdapterConfig) -> CodeMessage {
        match (&self.error, self.success) {
            (Some(error), false) => CodeMessage {
                code: error
                    .code
                    .as_ref()
                    .and_then(ErrorCode::as_number)
                    .unwrap_or(config.failure_code),
                msg: error.message.clone(),
                data: None,
            },
            (None, false) => CodeMessage {
                code: config.failure_code,
                msg: String::new(),
                data: None,
            },
            (_, true) => CodeMessage {
                code: config.success_code,
                msg: String::new(),
                data: self.data.clone(),
            },
        }
    }

    /// Render as an HTTP 200 JSON response.
    ///
    /// Never fails: if the envelope cannot be serialized, a fixed
    /// serialization-error envelope is written instead.
    pub fn render(&self, config: &AdapterConfig) -> HttpResponse {
        let body = self
            .to_json(config)
            .and_then(|value| serde_json::to_vec(&value).map_err(Error::from))
            .unwrap_or_else(|e| {
                tracing::error!(target: "bindery::envelope", error = %e, "Failed to serialize envelope");
                fallback_body(config)
            });

        HttpResponse::ok()
            .with_header(CONTENT_TYPE, mime::JSON)
            .with_body(body)
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Status> for Envelope {
    fn from(status: Status) -> Self {
        Envelope::failure(status)
    }
}

impl From<Error> for Envelope {
    fn from(err: Error) -> Self {
        Envelope::failure(err)
    }
}

#[derive(Serialize)]
struct CodeMessage {
    code: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn fallback_body(config: &AdapterConfig) -> Vec<u8> {
    match config.envelope {
        EnvelopeStyle::SuccessFlag => br#"{"success":false,"error":{"code":"SERIALIZATION","message":"failed to serialize response"}}"#.to_vec(),
        EnvelopeStyle::CodeMessage => format!(
            r#"{{"code":{},"msg":"failed to serialize response"}}"#,
            config.failure_code
        )
        .into_bytes(),
    }
}
