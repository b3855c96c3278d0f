//! Structured business errors.
//!
//! A [`Status`] is what handlers return (or `?`-propagate) to signal a
//! business failure. It carries a machine-readable code, an optional kind,
//! a developer-facing message, arbitrary JSON details and an optional
//! wrapped source error.
//!
//! Constructors capture a [`Backtrace`] of the creation site. Capture follows
//! `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`; the trace is written to failure
//! logs and never sent to clients.
//!
//! ```
//! use bindery_core::{Status, status};
//!
//! let err = Status::new("USER_LOCKED", "account is locked")
//!     .with_kind("auth")
//!     .with_detail(serde_json::json!({"retry_after": 30}));
//! assert_eq!(err.message(), "account is locked");
//!
//! let err = status!("quota exceeded for {}", "ada");
//! assert_eq!(err.message(), "quota exceeded for ada");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;

/// Error code, either textual (`"X1"`) or numeric (`40401`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl ErrorCode {
    /// Numeric value of the code, parsing textual codes when possible.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ErrorCode::Number(n) => Some(*n),
            ErrorCode::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{}", n),
            ErrorCode::Text(t) => f.write_str(t),
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode::Number(code as i64)
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        ErrorCode::Text(code.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::Text(code)
    }
}

/// A business error with code, kind, message, details and source.
#[derive(Debug, Default)]
pub struct Status {
    code: Option<ErrorCode>,
    kind: String,
    message: String,
    details: Vec<Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
    backtrace: Option<Backtrace>,
}

impl Status {
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            backtrace: Some(Backtrace::capture()),
            ..Self::default()
        }
    }

    /// A status with only a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            backtrace: Some(Backtrace::capture()),
            ..Self::default()
        }
    }

    /// A status wrapping another error; the message stays empty so the
    /// source's text is reported instead.
    pub fn from_error<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            source: Some(Box::new(source)),
            backtrace: Some(Backtrace::capture()),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replace all details.
    pub fn with_details(mut self, details: Vec<Value>) -> Self {
        self.details = details;
        self
    }

    /// Append one detail. Values that fail to serialize are recorded as
    /// their serialization error text.
    pub fn with_detail<T: Serialize>(mut self, detail: T) -> Self {
        let value =
            serde_json::to_value(detail).unwrap_or_else(|e| Value::String(e.to_string()));
        self.details.push(value);
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Replace the captured backtrace, e.g. with `Backtrace::force_capture()`.
    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[Value] {
        &self.details
    }

    /// Where the status was created, when capture is enabled.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace
            .as_ref()
            .filter(|bt| bt.status() == BacktraceStatus::Captured)
    }

    /// The message, or the source's text when no message was set.
    pub fn display_message(&self) -> String {
        match (&self.message, &self.source) {
            (m, Some(source)) if m.is_empty() => source.to_string(),
            (m, _) => m.clone(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.source) {
            (m, Some(source)) if !m.is_empty() => write!(f, "{}: {}", m, source),
            (_, Some(source)) => write!(f, "{}", source),
            (m, None) => f.write_str(m),
        }
    }
}

impl StdError for Status {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<crate::Error> for Status {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::Business(status) => status,
            crate::Error::Validation { message, details } => {
                Status::new("VALIDATION", message).with_details(details)
            }
            crate::Error::Io(e) => Status::new("IO", "").with_source(e),
            other => Status::new(other.code(), other.message()),
        }
    }
}

/// Build a [`Status`] from a format string.
#[macro_export]
macro_rules! status {
    ($($arg:tt)+) => {
        $crate::Status::error(format!($($arg)+))
    };
}
