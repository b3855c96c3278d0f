//! Per-request values handed to bound handlers.
//!
//! [`Context`] is the ambient context: request id, deadline, cancellation
//! and typed metadata. The adapter never reconstructs it; every parameter
//! asking for it receives a clone of the same value.
//!
//! [`RequestContext`] is the raw request/response handle. It gives direct
//! access to the request and owns the response slot, which accepts exactly
//! one committed response per request.

use crate::http::{CONTENT_TYPE, HttpRequest, HttpResponse};
use crate::{Error, Extensions};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Ambient per-request context.
#[derive(Clone, Debug)]
pub struct Context {
    inner: Arc<ContextInner>,
}

#[derive(Clone, Debug)]
struct ContextInner {
    request_id: Uuid,
    deadline: Option<Instant>,
    token: CancellationToken,
    extensions: Extensions,
}

impl Context {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                request_id: Uuid::new_v4(),
                deadline: None,
                token: CancellationToken::new(),
                extensions: Extensions::new(),
            }),
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        Arc::make_mut(&mut self.inner).deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Tie this context to a token owned by the transport, so that
    /// cancelling the connection is observable by the handler.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        Arc::make_mut(&mut self.inner).token = token;
        self
    }

    pub fn with_extension<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        Arc::make_mut(&mut self.inner).extensions.insert(value);
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline; `None` without a deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.inner.token.cancel();
    }

    /// True once cancelled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
            || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves when the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.inner.deadline {
            Some(deadline) => {
                let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline));
                tokio::select! {
                    _ = self.inner.token.cancelled() => {}
                    _ = sleep => {}
                }
            }
            None => self.inner.token.cancelled().await,
        }
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.extensions.get::<T>()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.inner.extensions
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Live request/response handle for one request.
///
/// Cloning yields another handle to the same request and the same
/// response slot.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    request: HttpRequest,
    slot: Mutex<ResponseSlot>,
}

#[derive(Default)]
struct ResponseSlot {
    headers: HashMap<String, String>,
    explicit: Option<HttpResponse>,
    committed: Option<HttpResponse>,
}

impl RequestContext {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                request,
                slot: Mutex::new(ResponseSlot::default()),
            }),
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.inner.request
    }

    pub fn method(&self) -> &str {
        &self.inner.request.method
    }

    pub fn path(&self) -> &str {
        &self.inner.request.path
    }

    pub fn body(&self) -> &[u8] {
        &self.inner.request.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.request.header(name)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.inner.request.query(name)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.inner.request.param(name)
    }

    /// Set a response header. Headers are applied to whichever response
    /// is finally committed.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.slot.lock().headers.insert(name.into(), value.into());
    }

    /// Write an explicit response. The last write wins; it is committed
    /// instead of an envelope if the handler succeeds.
    pub fn respond(&self, status: u16, content_type: &str, body: impl Into<Vec<u8>>) {
        let response = HttpResponse::new(status)
            .with_header(CONTENT_TYPE, content_type)
            .with_body(body.into());
        self.inner.slot.lock().explicit = Some(response);
    }

    /// Serialize `value` as an explicit JSON response.
    pub fn json<T: Serialize>(&self, status: u16, value: &T) -> Result<(), Error> {
        let body = serde_json::to_vec(value)?;
        self.respond(status, crate::http::mime::JSON, body);
        Ok(())
    }

    /// Whether a response content type has been set, either by an explicit
    /// response or by a `Content-Type` header.
    pub fn content_type_set(&self) -> bool {
        let slot = self.inner.slot.lock();
        slot.explicit.is_some()
            || slot
                .headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case(CONTENT_TYPE))
    }

    pub fn has_explicit_response(&self) -> bool {
        self.inner.slot.lock().explicit.is_some()
    }

    /// Remove and return the explicit response, if any.
    pub fn take_explicit(&self) -> Option<HttpResponse> {
        self.inner.slot.lock().explicit.take()
    }

    /// Commit the final response. Only the first commit is kept; later
    /// calls return `false` and leave the committed response untouched.
    pub fn commit(&self, mut response: HttpResponse) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.committed.is_some() {
            return false;
        }
        for (name, value) in &slot.headers {
            if response.header(name).is_none() {
                response.headers.insert(name.clone(), value.clone());
            }
        }
        slot.committed = Some(response);
        true
    }

    pub fn is_committed(&self) -> bool {
        self.inner.slot.lock().committed.is_some()
    }

    pub(crate) fn take_committed(&self) -> Option<HttpResponse> {
        self.inner.slot.lock().committed.take()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.inner.request.method)
            .field("path", &self.inner.request.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_clone_shares_identity() {
        let ctx = Context::new().with_extension(7u32);
        let other = ctx.clone();
        assert_eq!(ctx.request_id(), other.request_id());
        assert_eq!(other.get::<u32>(), Some(&7));
        ctx.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_expired_deadline_counts_as_cancelled() {
        let ctx = Context::new().with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_cancelled_resolves_on_deadline() {
        let ctx = Context::new().with_timeout(Duration::from_millis(5));
        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_commit_happens_once() {
        let handle = RequestContext::new(HttpRequest::new("GET", "/"));
        handle.set_header("X-Trace", "abc");

        assert!(handle.commit(HttpResponse::ok().with_body(b"first".to_vec())));
        assert!(!handle.commit(HttpResponse::ok().with_body(b"second".to_vec())));

        let response = handle.take_committed().unwrap();
        assert_eq!(response.body, b"first");
        assert_eq!(response.header("x-trace"), Some("abc"));
    }

    #[test]
    fn test_content_type_set() {
        let handle = RequestContext::new(HttpRequest::new("GET", "/"));
        assert!(!handle.content_type_set());
        handle.set_header("content-type", "text/plain");
        assert!(handle.content_type_set());
        assert!(!handle.has_explicit_response());
    }

    #[test]
    fn test_explicit_response_last_write_wins() {
        let handle = RequestContext::new(HttpRequest::new("GET", "/"));
        handle.respond(200, "text/plain", "one");
        handle.respond(201, "text/plain", "two");
        let response = handle.take_explicit().unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, b"two");
        assert!(handle.take_explicit().is_none());
    }
}
