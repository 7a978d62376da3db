//! CreateCheckoutSessionHandler - Issues hosted checkout sessions.

use std::sync::Arc;

use crate::domain::foundation::{CorrelationId, Currency, EmailAddress, Money, ValidationError};
use crate::domain::payment::{GateError, DEFAULT_PAYMENT_TYPE};
use crate::ports::{CheckoutRequest, PaymentProvider};

/// Placeholder substituted with the correlation id in return URLs.
pub const CORRELATION_PLACEHOLDER: &str = "{CORRELATION_ID}";

/// Command to create a checkout session.
#[derive(Debug, Clone, Default)]
pub struct CreateCheckoutSessionCommand {
    pub email: String,
    /// Amount in dollars.
    pub amount: Option<f64>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
    /// Reuses the caller's correlation id; a fresh one is minted otherwise.
    pub correlation_id: Option<CorrelationId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub url: String,
    pub correlation_id: CorrelationId,
}

/// Fixed product descriptor and return destinations.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub product_name: String,
    pub payment_type: String,
    pub currency: Currency,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            product_name: "Consultation".to_string(),
            payment_type: DEFAULT_PAYMENT_TYPE.to_string(),
            currency: Currency::usd(),
            success_url: format!("/payment-success?correlation_id={}", CORRELATION_PLACEHOLDER),
            cancel_url: format!("/payment-cancelled?correlation_id={}", CORRELATION_PLACEHOLDER),
        }
    }
}

pub struct CreateCheckoutSessionHandler {
    provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutSessionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, settings: CheckoutSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, GateError> {
        if cmd.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email").into());
        }
        let email = EmailAddress::parse(&cmd.email)?;
        let dollars = cmd
            .amount
            .ok_or_else(|| ValidationError::empty_field("amount"))?;
        let amount = Money::from_major(dollars, self.settings.currency.clone())?;

        let correlation_id = cmd.correlation_id.unwrap_or_default();
        let success_url = with_correlation(
            cmd.success_url.as_deref().unwrap_or(&self.settings.success_url),
            correlation_id,
        );
        let cancel_url = with_correlation(
            cmd.cancel_url.as_deref().unwrap_or(&self.settings.cancel_url),
            correlation_id,
        );

        let request = CheckoutRequest {
            email: email.clone(),
            amount: amount.clone(),
            product_name: self.settings.product_name.clone(),
            payment_type: self.settings.payment_type.clone(),
            success_url,
            cancel_url,
            correlation_id: Some(correlation_id),
        };

        let session = self
            .provider
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    retryable = e.retryable,
                    "Checkout session creation failed"
                );
                GateError::from(e)
            })?;

        tracing::info!(
            session_id = %session.session_id,
            correlation_id = %correlation_id,
            amount = %amount,
            "Checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.session_id,
            url: session.url,
            correlation_id,
        })
    }
}

fn with_correlation(template: &str, correlation_id: CorrelationId) -> String {
    template.replace(CORRELATION_PLACEHOLDER, &correlation_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::PaymentError;

    fn handler() -> (CreateCheckoutSessionHandler, MockPaymentProvider) {
        let provider = MockPaymentProvider::new("whsec_test");
        let handler =
            CreateCheckoutSessionHandler::new(Arc::new(provider.clone()), CheckoutSettings::default());
        (handler, provider)
    }

    fn cmd(email: &str, amount: Option<f64>) -> CreateCheckoutSessionCommand {
        CreateCheckoutSessionCommand {
            email: email.to_string(),
            amount,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn converts_dollars_to_minor_units() {
        let (handler, provider) = handler();
        let result = handler.handle(cmd("a@x.com", Some(499.0))).await.unwrap();

        assert!(result.url.starts_with("https://"));
        let requests = provider.checkout_requests();
        assert_eq!(requests[0].amount.minor_units(), 49_900);
        assert_eq!(requests[0].product_name, "Consultation");
    }

    #[tokio::test]
    async fn default_return_urls_carry_correlation_id() {
        let (handler, provider) = handler();
        let result = handler.handle(cmd("a@x.com", Some(10.0))).await.unwrap();

        let request = &provider.checkout_requests()[0];
        assert_eq!(
            request.success_url,
            format!("/payment-success?correlation_id={}", result.correlation_id)
        );
        assert_eq!(request.correlation_id, Some(result.correlation_id));
    }

    #[tokio::test]
    async fn caller_urls_are_used_verbatim() {
        let (handler, provider) = handler();
        let command = CreateCheckoutSessionCommand {
            success_url: Some("https://x.test/done".to_string()),
            ..cmd("a@x.com", Some(10.0))
        };
        handler.handle(command).await.unwrap();
        assert_eq!(provider.checkout_requests()[0].success_url, "https://x.test/done");
    }

    #[tokio::test]
    async fn missing_email_or_amount_is_validation_error() {
        let (handler, provider) = handler();
        let err = handler.handle(cmd("  ", Some(10.0))).await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));

        let err = handler.handle(cmd("a@x.com", None)).await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));

        let err = handler.handle(cmd("a@x.com", Some(0.0))).await.unwrap_err();
        assert!(matches!(err, GateError::Validation(_)));

        assert!(provider.checkout_requests().is_empty());
    }

    #[tokio::test]
    async fn provider_message_is_passed_through() {
        let (handler, provider) = handler();
        provider.fail_next_checkout(PaymentError::invalid_request("Amount must be at least $0.50"));

        let err = handler.handle(cmd("a@x.com", Some(0.1))).await.unwrap_err();
        assert_eq!(err.message(), "Amount must be at least $0.50");
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
