// Test client for routed handlers

use bindery_core::{Envelope, ErrorInfo, HttpMethod, HttpRequest, HttpResponse, Router};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Drives a [`Router`] without a network transport.
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    pub fn from_shared(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::GET, path).build())
            .await
    }

    /// POST `body` serialized as JSON.
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::POST, path).json(body).build())
            .await
    }

    /// PUT `body` serialized as JSON.
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::PUT, path).json(body).build())
            .await
    }

    /// PATCH `body` serialized as JSON.
    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::PATCH, path).json(body).build())
            .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(TestRequestBuilder::new(HttpMethod::DELETE, path).build())
            .await
    }

    /// Route a prepared request.
    pub async fn send(&self, request: HttpRequest) -> TestResponse {
        TestResponse::new(self.router.route(request).await)
    }
}

/// Builder for test requests
#[derive(Debug, Clone)]
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    query_params: HashMap<String, String>,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: HashMap::new(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `data` as the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if `data` cannot be serialized.
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = serde_json::to_vec(data).expect("test body must serialize to JSON");
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self
    }

    /// Urlencoded form body.
    pub fn form(mut self, pairs: &[(&str, &str)]) -> Self {
        let encoded: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect();
        self.body = encoded.join("&").into_bytes();
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> HttpRequest {
        let mut request = HttpRequest::new(self.method.as_str(), self.path).with_body(self.body);
        request.headers = self.headers;
        request.query_params = self.query_params;
        request
    }
}

fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// Response from a test request
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: HttpResponse,
}

impl TestResponse {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.response.header(key)
    }

    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.response.body.clone()).ok()
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.response.body)
            .map_err(|e| format!("Serialization error: {}", e))
    }

    /// Decode a success-flag envelope.
    pub fn envelope(&self) -> Result<Envelope, String> {
        self.body_json()
    }

    /// Assert a success envelope and return its data (`Value::Null` when absent).
    pub fn assert_success(&self) -> Value {
        let envelope = self.expect_envelope();
        assert!(
            envelope.success,
            "Expected success envelope, got error: {:?}",
            envelope.error
        );
        envelope.data.unwrap_or(Value::Null)
    }

    /// Assert an error envelope with the given code and return its error.
    pub fn assert_error_code(&self, code: &str) -> ErrorInfo {
        let envelope = self.expect_envelope();
        assert!(!envelope.success, "Expected error envelope, got success");
        let error = envelope.error.unwrap_or_default();
        let actual = error.code.as_ref().map(|c| c.to_string());
        assert_eq!(
            actual.as_deref(),
            Some(code),
            "Expected error code {:?}, got {:?} ({})",
            code,
            actual,
            error.message
        );
        error
    }

    fn expect_envelope(&self) -> Envelope {
        assert_eq!(self.status(), 200, "Envelopes are always sent with status 200");
        match self.envelope() {
            Ok(envelope) => envelope,
            Err(e) => panic!("Response is not an envelope ({}): {:?}", e, self.body_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = TestRequestBuilder::new(HttpMethod::GET, "/test")
            .header("Authorization", "Bearer token")
            .query("foo", "bar")
            .build();

        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/test");
        assert_eq!(req.header("authorization"), Some("Bearer token"));
        assert_eq!(req.query("foo"), Some("bar"));
    }

    #[test]
    fn test_form_body_is_encoded() {
        let req = TestRequestBuilder::new(HttpMethod::POST, "/")
            .form(&[("email", "a@b.c"), ("name", "x y")])
            .build();
        assert_eq!(req.body, b"email=a%40b.c&name=x%20y");
        assert_eq!(
            req.content_type().as_deref(),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_response_helpers() {
        let response = TestResponse::new(
            HttpResponse::ok().with_body(br#"{"success":false,"error":{"code":"X1","message":"bad"}}"#.to_vec()),
        );
        let error = response.assert_error_code("X1");
        assert_eq!(error.message, "bad");
    }
}
