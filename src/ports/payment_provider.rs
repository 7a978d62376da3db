//! Payment provider port for hosted checkout and webhook verification.
//!
//! The application never talks to a provider SDK directly. Adapters turn
//! provider-specific payloads into the neutral types below.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::{
    CorrelationId, DomainError, EmailAddress, ErrorCode, Money, Timestamp,
};
use crate::domain::payment::{GateError, WebhookError};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a one-off hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verifies a webhook signature over the raw body and parses the event.
    ///
    /// Must reject before parsing when the signature does not verify.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, WebhookError>;
}

/// Request to open a hosted checkout page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub email: EmailAddress,
    pub amount: Money,
    /// Fixed product descriptor shown on the checkout page.
    pub product_name: String,
    pub payment_type: String,
    pub success_url: String,
    pub cancel_url: String,
    pub correlation_id: Option<CorrelationId>,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
    pub expires_at: Option<Timestamp>,
}

/// Provider event after signature verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEvent {
    pub id: String,
    pub event_type: String,
    pub created_at: Option<Timestamp>,
    pub kind: ProviderEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEventKind {
    /// Checkout finished. `paid` is false for delayed payment methods.
    CheckoutCompleted(CompletedCheckout),
    PaymentFailed(FailedPayment),
    /// Any event type the reconciler does not act on.
    Other,
}

/// Fields extracted from a completed checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub provider_payment_id: Option<String>,
    pub email: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub payment_type: Option<String>,
    pub correlation_id: Option<String>,
    pub paid: bool,
}

/// Fields extracted from a failed payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPayment {
    pub provider_payment_id: String,
    pub email: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub payment_type: Option<String>,
    pub correlation_id: Option<String>,
    pub failure_message: Option<String>,
}

/// Error from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Provider-specific error code, if any.
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            retryable: code.is_retryable(),
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for GateError {
    fn from(err: PaymentError) -> Self {
        GateError::Provider(err.message)
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let mut domain = DomainError::new(ErrorCode::ProviderError, err.message)
            .with_detail("payment_error_code", err.code.to_string());
        if let Some(code) = err.provider_code {
            domain = domain.with_detail("provider_code", code);
        }
        domain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    RateLimited,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimited
                | PaymentErrorCode::ProviderError
        )
    }
}

impl fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimited => "rate_limited",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
