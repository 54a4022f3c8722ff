//! Data types for batch fan-out.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::BatchError;

/// One sub-request descriptor from the outer batch body.
#[derive(Debug, Clone, Deserialize)]
pub struct SubRequest {
    /// HTTP method name; GET, POST, PUT, PATCH and DELETE are dispatchable.
    pub method: String,

    /// Relative url (path plus optional query) within the application.
    pub url: String,

    /// Payload for POST/PUT/PATCH; ignored for other methods.
    #[serde(default)]
    pub body: Option<Value>,
}

/// One slot of the batch result array, aligned with the descriptor at the
/// same index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubResult {
    /// Status of the sub-response, or 500 for a synthesized failure.
    pub status: u16,

    /// Parsed sub-response body, or an error description string.
    pub body: Value,
}

/// A completed batch: results in input order, plus the Set-Cookie values
/// harvested from sub-responses (also in input order).
#[derive(Debug)]
pub struct BatchReply {
    pub results: Vec<SubResult>,
    pub set_cookies: Vec<HeaderValue>,
}

/// Parse the outer request body into an ordered list of descriptors.
///
/// Rejects an empty body, non-JSON, non-array JSON, and elements missing
/// `method` or `url`, all before any dispatch happens.
pub fn parse_batch(body: &[u8]) -> Result<Vec<SubRequest>, BatchError> {
    if body.is_empty() {
        return Err(BatchError::MalformedBatch(
            "request body is empty; expected a JSON array of sub-requests".to_string(),
        ));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| BatchError::MalformedBatch(format!("body is not valid JSON: {e}")))?;

    if !value.is_array() {
        return Err(BatchError::MalformedBatch(format!(
            "body must be a JSON array of sub-requests, got {}",
            json_type_name(&value)
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| BatchError::MalformedBatch(format!("invalid sub-request descriptor: {e}")))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_an_array_of_descriptors() {
        let body = serde_json::to_vec(&json!([
            { "method": "GET", "url": "/a" },
            { "method": "POST", "url": "/b", "body": { "n": 1 } },
        ]))
        .unwrap();

        let batch = parse_batch(&body).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].method, "GET");
        assert_eq!(batch[0].url, "/a");
        assert!(batch[0].body.is_none());
        assert_eq!(batch[1].body, Some(json!({ "n": 1 })));
    }

    #[test]
    fn rejects_empty_body() {
        let err = parse_batch(b"").unwrap_err();
        assert!(matches!(err, BatchError::MalformedBatch(_)));
    }

    #[test]
    fn rejects_non_array_json() {
        let err = parse_batch(br#"{ "method": "GET", "url": "/a" }"#).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn rejects_descriptor_missing_url() {
        let body = serde_json::to_vec(&json!([{ "method": "GET" }])).unwrap();
        let err = parse_batch(&body).unwrap_err();
        assert!(matches!(err, BatchError::MalformedBatch(_)));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = parse_batch(b"not json at all").unwrap_err();
        assert!(matches!(err, BatchError::MalformedBatch(_)));
    }
}
