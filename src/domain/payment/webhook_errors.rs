//! Webhook error types for payment-provider webhook handling.
//!
//! Status codes determine the provider's retry behavior: 2xx acknowledges,
//! 4xx is never retried, 5xx is retried with backoff.

use axum::http::StatusCode;
use thiserror::Error;

use super::GateError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signature header accompanied the request.
    #[error("Missing signature")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// A test-mode event reached a live-only endpoint.
    #[error("Livemode mismatch")]
    LivemodeMismatch,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from an authentic event.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The primary ledger write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl WebhookError {
    /// True for failures of the authenticity gate itself.
    pub fn is_authenticity_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::LivemodeMismatch
        )
    }

    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Persistence(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::LivemodeMismatch
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WebhookError> for GateError {
    fn from(err: WebhookError) -> Self {
        if err.is_authenticity_failure() {
            return GateError::Authenticity(err.to_string());
        }
        match err {
            WebhookError::Persistence(message) => GateError::Persistence(message),
            other => GateError::Validation(
                crate::domain::foundation::ValidationError::invalid_format(
                    "payload",
                    other.to_string(),
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn missing_field_displays_field_name() {
        let err = WebhookError::MissingField("customer_email");
        assert_eq!(err.to_string(), "Missing field: customer_email");
    }

    // ══════════════════════════════════════════════════════════════
    // Status codes
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_are_bad_request() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
            WebhookError::LivemodeMismatch,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(err.is_authenticity_failure());
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn persistence_failure_triggers_retry() {
        let err = WebhookError::Persistence("pool timed out".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_retryable());
    }

    #[test]
    fn parse_error_is_not_authenticity_failure() {
        let err = WebhookError::ParseError("bad json".to_string());
        assert!(!err.is_authenticity_failure());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn converts_into_gate_error_by_category() {
        assert!(matches!(
            GateError::from(WebhookError::InvalidSignature),
            GateError::Authenticity(_)
        ));
        assert!(matches!(
            GateError::from(WebhookError::Persistence("x".into())),
            GateError::Persistence(_)
        ));
        assert!(matches!(
            GateError::from(WebhookError::MissingField("email")),
            GateError::Validation(_)
        ));
    }
}
