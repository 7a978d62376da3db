//! API error responses.
//!
//! Every failure leaves the service as `{ "code": ..., "message": ... }`.
//! Rate-limited responses also carry `Retry-After`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ValidationError};
use crate::domain::payment::{GateError, WebhookError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Gate(GateError),
    Webhook(WebhookError),
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::Gate(err)
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::Webhook(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Gate(err.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Gate(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::invalid_format("body", rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::invalid_format("query", rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ValidationError::invalid_format("path", rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Gate(err) => {
                let status = err.status_code();
                if status.is_server_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                let body = ErrorResponse::new(err.code().to_string(), err.message());
                let mut response = (status, Json(body)).into_response();
                if let GateError::RateLimited { retry_after_secs } = err {
                    if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                        response.headers_mut().insert(header::RETRY_AFTER, value);
                    }
                }
                response
            }
            ApiError::Webhook(err) => {
                let status = err.status_code();
                let code = if err.is_authenticity_failure() {
                    "INVALID_SIGNATURE"
                } else if err.is_retryable() {
                    "DATABASE_ERROR"
                } else {
                    "INVALID_PAYLOAD"
                };
                let message = match &err {
                    WebhookError::Persistence(_) => "A storage error occurred".to_string(),
                    other => other.to_string(),
                };
                (status, Json(ErrorResponse::new(code, message))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn validation_error_is_400() {
        let response = ApiError::from(ValidationError::empty_field("email")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response =
            ApiError::from(GateError::RateLimited { retry_after_secs: 42 }).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn webhook_signature_failure_is_400() {
        let response = ApiError::from(WebhookError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn webhook_persistence_failure_is_500() {
        let response =
            ApiError::from(WebhookError::Persistence("pool closed".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
