//! JSON envelopes shared by the API handlers
//!
//! Successful responses carry `success: true` next to their payload. Failures
//! carry `error` and `success: false`, plus whatever identifies the request:
//!
//! - 400: request rejected at the boundary (bad JSON, missing or non-positive
//!   amount, missing field)
//! - 422: domain rule violated ([`WalletError`])
//! - 500: unexpected failure

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::WalletError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message.into())
    }

    /// 422 carrying the domain error message
    pub fn domain(error: WalletError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
    }

    /// Attach an identifying field, e.g. `userId`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn body(&self) -> Value {
        Value::Object(self.body.clone())
    }

    fn new(status: StatusCode, message: String) -> Self {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(message));
        body.insert("success".to_string(), Value::Bool(false));
        Self { status, body }
    }
}

impl From<WalletError> for ApiError {
    fn from(error: WalletError) -> Self {
        ApiError::domain(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}

/// Body for panics caught by the catch-all layer
pub fn internal_error_body() -> Value {
    json!({ "error": "Internal server error", "success": false })
}

/// Boundary check for amount fields: present, finite and positive
pub fn require_amount(amount: Option<f64>) -> Result<f64, ApiError> {
    match amount {
        Some(a) if a.is_finite() && a > 0.0 => Ok(a),
        _ => Err(ApiError::bad_request("Invalid amount")),
    }
}
