//! Error taxonomy for batch dispatch.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failures that abort the whole batch call.
///
/// Per-item failures never take this form; they are folded into the
/// corresponding result slot as a synthetic 500 (see [`SubRequestError`]).
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The outer body is missing, not JSON, or not an array of descriptors.
    /// Rejected before any sub-request is dispatched.
    #[error("malformed batch request: {0}")]
    MalformedBatch(String),

    /// The scheduling machinery itself failed (worker task died, result
    /// slot left unfilled). Fatal: no partial result array is returned.
    #[error("batch scheduling failed: {0}")]
    Scheduling(String),
}

impl IntoResponse for BatchError {
    fn into_response(self) -> Response {
        let status = match self {
            BatchError::MalformedBatch(_) => StatusCode::BAD_REQUEST,
            BatchError::Scheduling(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failures scoped to a single sub-request.
///
/// Converted into `{status: 500, body: "<description>"}` in the item's
/// result slot; sibling items are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum SubRequestError {
    /// Method outside GET/POST/PUT/PATCH/DELETE.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The descriptor url does not parse as a request target.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The invoke capability reported an error.
    #[error("sub-request failed: {0}")]
    Invoke(String),

    /// Reading the sub-response body failed.
    #[error("reading sub-response body failed: {0}")]
    Body(String),
}
