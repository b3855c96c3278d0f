// Envelope assertions

use crate::TestResponse;
use serde_json::Value;

/// Assert that a response has a specific status code
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status();
    assert_eq!(
        actual, expected,
        "Expected status {}, got {}",
        expected, actual
    );
}

/// Assert that the envelope's data equals `expected`.
pub fn assert_data(response: &TestResponse, expected: &Value) {
    let data = response.assert_success();
    assert_eq!(&data, expected, "Envelope data does not match");
}

/// Assert a success envelope without data.
pub fn assert_empty_success(response: &TestResponse) {
    let data = response.assert_success();
    assert!(data.is_null(), "Expected no data, got {}", data);
}

/// Assert an error envelope whose message equals `expected`.
pub fn assert_error_message(response: &TestResponse, expected: &str) {
    let envelope = response
        .envelope()
        .unwrap_or_else(|e| panic!("Response is not an envelope: {}", e));
    let message = envelope.error.map(|e| e.message).unwrap_or_default();
    assert!(!envelope.success, "Expected error envelope, got success");
    assert_eq!(message, expected, "Error messages do not match");
}

/// Assert that a response has a specific header
pub fn assert_header(response: &TestResponse, key: &str, expected: &str) {
    let actual = response.header(key);
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

/// Assert that a response has JSON content type
pub fn assert_json_content_type(response: &TestResponse) {
    let content_type = response.header("Content-Type");
    assert!(
        content_type
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false),
        "Expected JSON content type, got {:?}",
        content_type
    );
}
