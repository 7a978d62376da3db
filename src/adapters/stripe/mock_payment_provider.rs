//! Mock payment provider for testing.
//!
//! Checkout creation is simulated in memory; webhook verification runs the
//! real Stripe verifier so tests sign payloads exactly as Stripe would.
//! Supports:
//! - Error injection
//! - Call tracking

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::payment::WebhookError;
use crate::ports::{CheckoutRequest, CheckoutSession, PaymentError, PaymentProvider, ProviderEvent};

use super::webhook_verifier::StripeWebhookVerifier;

/// Mock payment provider for testing.
///
/// ```ignore
/// let mock = MockPaymentProvider::new("whsec_test");
/// mock.fail_next_checkout(PaymentError::network("timeout"));
/// ```
#[derive(Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
    verifier: StripeWebhookVerifier,
}

#[derive(Default)]
struct MockState {
    next_error: Option<PaymentError>,
    checkout_requests: Vec<CheckoutRequest>,
    sessions_created: u32,
}

impl MockPaymentProvider {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState::default())),
            verifier: StripeWebhookVerifier::new(SecretString::new(webhook_secret.into())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next `create_checkout_session` call fail.
    pub fn fail_next_checkout(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Requests received so far, oldest first.
    pub fn checkout_requests(&self) -> Vec<CheckoutRequest> {
        self.state().checkout_requests.clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.state();
        state.checkout_requests.push(request);

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state.sessions_created += 1;
        let session_id = format!("cs_test_mock_{}", state.sessions_created);
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/c/pay/{}", session_id),
            session_id,
            expires_at: None,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, WebhookError> {
        self.verifier.verify(payload, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Currency, EmailAddress, Money};

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            email: EmailAddress::parse("a@x.com").unwrap(),
            amount: Money::from_major(10.0, Currency::usd()).unwrap(),
            product_name: "Consultation".to_string(),
            payment_type: "consultation".to_string(),
            success_url: "/ok".to_string(),
            cancel_url: "/cancel".to_string(),
            correlation_id: None,
        }
    }

    #[tokio::test]
    async fn creates_sequential_sessions_and_records_requests() {
        let mock = MockPaymentProvider::new("whsec_x");
        let first = mock.create_checkout_session(request()).await.unwrap();
        let second = mock.create_checkout_session(request()).await.unwrap();

        assert_eq!(first.session_id, "cs_test_mock_1");
        assert_eq!(second.session_id, "cs_test_mock_2");
        assert!(first.url.ends_with("cs_test_mock_1"));
        assert_eq!(mock.checkout_requests().len(), 2);
    }

    #[tokio::test]
    async fn injected_error_is_returned_once() {
        let mock = MockPaymentProvider::new("whsec_x");
        mock.fail_next_checkout(PaymentError::provider("boom"));

        assert!(mock.create_checkout_session(request()).await.is_err());
        assert!(mock.create_checkout_session(request()).await.is_ok());
    }

    #[tokio::test]
    async fn webhook_verification_is_real() {
        let mock = MockPaymentProvider::new("whsec_x");
        let result = mock.verify_webhook(b"{}", "t=1,v1=00").await;
        assert!(result.is_err());
    }
}
