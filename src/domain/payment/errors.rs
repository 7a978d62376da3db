//! Request-level error taxonomy.
//!
//! # HTTP Status Mapping
//!
//! | Variant | HTTP | Retry |
//! |---------|------|-------|
//! | `Validation` | 400 | no |
//! | `Authenticity` | 400 | no |
//! | `AccountRequired` | 403 | no |
//! | `NotFound` | 404 | no |
//! | `RateLimited` | 429 | yes |
//! | `Provider` | 500 | yes |
//! | `Persistence` | 500 | yes |

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors surfaced by checkout, reconciliation and access operations.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// Missing or malformed input; the caller can correct it.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Webhook signature did not verify. Always rejected.
    #[error("Authenticity check failed: {0}")]
    Authenticity(String),

    /// Upstream payment provider failed. Message is passed through.
    #[error("Payment provider error: {0}")]
    Provider(String),

    /// A primary ledger or store write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Too many requests, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("{0}")]
    NotFound(String),

    /// This device or account already used a paid submission and must sign up.
    #[error("{0}")]
    AccountRequired(String),
}

impl GateError {
    pub fn authenticity(reason: impl Into<String>) -> Self {
        GateError::Authenticity(reason.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        GateError::Provider(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        GateError::Persistence(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        GateError::NotFound(message.into())
    }

    pub fn account_required(message: impl Into<String>) -> Self {
        GateError::AccountRequired(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GateError::Validation(_) => ErrorCode::ValidationFailed,
            GateError::Authenticity(_) => ErrorCode::InvalidSignature,
            GateError::Provider(_) => ErrorCode::ProviderError,
            GateError::Persistence(_) => ErrorCode::DatabaseError,
            GateError::RateLimited { .. } => ErrorCode::RateLimited,
            GateError::NotFound(_) => ErrorCode::PendingSubmissionNotFound,
            GateError::AccountRequired(_) => ErrorCode::AccountRequired,
        }
    }

    /// Message safe to show the caller.
    ///
    /// Provider messages are surfaced verbatim; persistence details are not.
    pub fn message(&self) -> String {
        match self {
            GateError::Provider(message) => message.clone(),
            GateError::Persistence(_) => "A storage error occurred".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::Validation(_) | GateError::Authenticity(_) => StatusCode::BAD_REQUEST,
            GateError::NotFound(_) => StatusCode::NOT_FOUND,
            GateError::AccountRequired(_) => StatusCode::FORBIDDEN,
            GateError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::Provider(_) | GateError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GateError::Provider(_) | GateError::Persistence(_) | GateError::RateLimited { .. }
        )
    }
}

impl From<DomainError> for GateError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidStateTransition => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string());
                GateError::Validation(ValidationError::invalid_format(field, err.message))
            }
            ErrorCode::PaymentNotFound
            | ErrorCode::SubmissionNotFound
            | ErrorCode::PendingSubmissionNotFound
            | ErrorCode::AccountNotFound => GateError::NotFound(err.message),
            ErrorCode::InvalidSignature => GateError::Authenticity(err.message),
            ErrorCode::AccountRequired => GateError::AccountRequired(err.message),
            ErrorCode::ProviderError => GateError::Provider(err.message),
            ErrorCode::RateLimited => GateError::RateLimited { retry_after_secs: 1 },
            ErrorCode::DatabaseError | ErrorCode::StorageError | ErrorCode::InternalError => {
                GateError::Persistence(err.message)
            }
        }
    }
}
