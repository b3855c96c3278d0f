//! The failure funnel.
//!
//! A [`Funnel`] drives one request's pipeline (materialize, invoke,
//! normalize) and commits exactly one response to the request handle,
//! whatever happens inside the pipeline. The adapter receives its funnel at
//! construction, so deployments can replace the default [`EnvelopeFunnel`].

use crate::config::AdapterConfig;
use crate::context::RequestContext;
use crate::envelope::Envelope;
use crate::http::HttpResponse;
use crate::error::business_status_code;
use crate::invoke::InvocationResult;
use crate::normalize::normalize;
use crate::{Error, Status};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Message used when a panic payload is neither an error nor a string.
pub const NON_STRING_PANIC: &str = "handler panicked with a non-string payload";

/// The per-request pipeline: materialize and invoke.
pub type Call = BoxFuture<'static, Result<InvocationResult, Error>>;

/// Runs a [`Call`] and commits its response to `handle`.
///
/// Implementations must commit a response on every path; the adapter falls
/// back to an internal-error envelope when none was committed.
pub trait Funnel: Send + Sync + 'static {
    fn run(&self, handle: RequestContext, call: Call) -> BoxFuture<'static, ()>;
}

impl<F> Funnel for F
where
    F: Fn(RequestContext, Call) -> BoxFuture<'static, ()> + Send + Sync + 'static,
{
    fn run(&self, handle: RequestContext, call: Call) -> BoxFuture<'static, ()> {
        (self)(handle, call)
    }
}

/// Default funnel: catches panics, logs failures and commits an envelope.
///
/// An explicit response written through the request handle is kept when
/// the call normalizes to a success. Any failure, including an error the
/// target returned, replaces it with the error envelope. Headers set
/// through the handle are merged into whichever response is committed.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeFunnel {
    config: Arc<AdapterConfig>,
}

enum Settled {
    Explicit(HttpResponse),
    Envelope(Envelope),
}

impl EnvelopeFunnel {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

impl Funnel for EnvelopeFunnel {
    fn run(&self, handle: RequestContext, call: Call) -> BoxFuture<'static, ()> {
        let config = self.config.clone();
        Box::pin(async move {
            let pipeline = async {
                let result = call.await?;
                if let Some(status) = result.error() {
                    log_failure(&handle, &Failure::from_status(status), &config);
                }
                let envelope = normalize(result);
                if envelope.success && handle.has_explicit_response() {
                    let explicit = handle.take_explicit().unwrap_or_else(HttpResponse::ok);
                    return Ok(Settled::Explicit(explicit));
                }
                Ok::<_, Error>(Settled::Envelope(envelope))
            };

            let settled = match AssertUnwindSafe(pipeline).catch_unwind().await {
                Ok(Ok(settled)) => settled,
                Ok(Err(err)) => {
                    log_failure(&handle, &Failure::from_error(&err), &config);
                    Settled::Envelope(Envelope::from(err))
                }
                Err(payload) => {
                    let err = panic_to_error(payload);
                    log_failure(&handle, &Failure::from_error(&err), &config);
                    Settled::Envelope(Envelope::from(err))
                }
            };

            let response = match settled {
                Settled::Explicit(response) => {
                    tracing::debug!(
                        target: "bindery::funnel",
                        status = response.status,
                        "Keeping explicit response"
                    );
                    response
                }
                Settled::Envelope(envelope) => {
                    handle.take_explicit();
                    envelope.render(&config)
                }
            };

            if !handle.commit(response) {
                tracing::warn!(
                    target: "bindery::funnel",
                    method = handle.method(),
                    path = handle.path(),
                    "Response already committed"
                );
            }
        })
    }
}

/// Convert a panic payload into an [`Error`].
///
/// `Status` and `Error` payloads are kept, string payloads become
/// [`Error::Panic`] with the string as message.
pub fn panic_to_error(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Status>() {
        Ok(status) => return Error::Business(*status),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Error::Panic((*s).to_string())
    } else if let Some(s) = payload.downcast_ref::<String>() {
        Error::Panic(s.clone())
    } else {
        Error::Panic(NON_STRING_PANIC.to_string())
    }
}

/// What gets logged about one failed request.
struct Failure<'a> {
    code: String,
    error: &'a dyn fmt::Display,
    client_error: bool,
    backtrace: Option<&'a Backtrace>,
}

impl<'a> Failure<'a> {
    fn from_error(err: &'a Error) -> Self {
        match err {
            Error::Business(status) => Self::from_status(status),
            other => Self {
                code: other.code().to_string(),
                error: other,
                client_error: other.is_client_error(),
                backtrace: None,
            },
        }
    }

    fn from_status(status: &'a Status) -> Self {
        Self {
            code: status
                .code()
                .map(ToString::to_string)
                .unwrap_or_else(|| "BUSINESS".to_string()),
            error: status,
            client_error: (400..500).contains(&business_status_code(status)),
            backtrace: status.backtrace(),
        }
    }
}

/// Log a failed request. A panicking subscriber is swallowed.
fn log_failure(handle: &RequestContext, failure: &Failure<'_>, config: &AdapterConfig) {
    let _ = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let body = if config.log_request_body && !handle.body().is_empty() {
            truncate_body(handle.body(), config.max_logged_body)
        } else {
            String::new()
        };
        let backtrace = failure.backtrace.map(tracing::field::display);

        if failure.client_error {
            tracing::warn!(
                target: "bindery::funnel",
                code = %failure.code,
                error = %failure.error,
                method = handle.method(),
                path = handle.path(),
                body = %body,
                backtrace,
                "Request failed"
            );
        } else {
            tracing::error!(
                target: "bindery::funnel",
                code = %failure.code,
                error = %failure.error,
                method = handle.method(),
                path = handle.path(),
                body = %body,
                backtrace,
                "Request failed"
            );
        }
    }));
}

fn truncate_body(body: &[u8], max: usize) -> String {
    if body.len() <= max {
        String::from_utf8_lossy(body).into_owned()
    } else {
        format!("{}...", String::from_utf8_lossy(&body[..max]))
    }
}
