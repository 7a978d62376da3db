//! Stripe payment provider adapter.
//!
//! Creates one-off hosted Checkout Sessions and verifies webhooks.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) against replays
//! - Secrets held in `secrecy::SecretString`
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::domain::foundation::Timestamp;
use crate::domain::payment::WebhookError;
use crate::ports::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentErrorCode, PaymentProvider,
    ProviderEvent,
};

use super::webhook_types::{StripeCheckoutSessionCreated, StripeErrorResponse};
use super::webhook_verifier::{StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    api_base_url: String,

    require_livemode: bool,

    webhook_tolerance_secs: i64,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.stripe_api_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
            api_base_url: config.api_base_url.clone(),
            require_livemode: config.require_livemode,
            webhook_tolerance_secs: config.webhook_tolerance_secs,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub fn verifier(&self) -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(self.webhook_secret.clone())
            .with_tolerance_secs(self.webhook_tolerance_secs)
            .with_require_livemode(self.require_livemode)
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base_url", &self.api_base_url)
            .field("require_livemode", &self.require_livemode)
            .finish_non_exhaustive()
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            verifier: config.verifier(),
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Form parameters for a one-off payment-mode Checkout Session.
    fn checkout_params(request: &CheckoutRequest) -> Vec<(String, String)> {
        let email = request.email.as_str().to_string();
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("customer_email".to_string(), email.clone()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.amount.currency().as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount.minor_units().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name.clone(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("metadata[email]".to_string(), email.clone()),
            ("metadata[paymentType]".to_string(), request.payment_type.clone()),
            // Copied onto the PaymentIntent so failure events carry context too.
            ("payment_intent_data[receipt_email]".to_string(), email.clone()),
            ("payment_intent_data[metadata][email]".to_string(), email),
            (
                "payment_intent_data[metadata][paymentType]".to_string(),
                request.payment_type.clone(),
            ),
        ];

        if let Some(correlation_id) = request.correlation_id {
            let id = correlation_id.to_string();
            params.push(("client_reference_id".to_string(), id.clone()));
            params.push(("metadata[correlation_id]".to_string(), id.clone()));
            params.push((
                "payment_intent_data[metadata][correlation_id]".to_string(),
                id,
            ));
        }

        params
    }

    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let code = match status.as_u16() {
            401 | 403 => PaymentErrorCode::AuthenticationError,
            400 | 402 | 404 => PaymentErrorCode::InvalidRequest,
            429 => PaymentErrorCode::RateLimited,
            _ => PaymentErrorCode::ProviderError,
        };

        match serde_json::from_str::<StripeErrorResponse>(&text) {
            Ok(parsed) => {
                let message = parsed
                    .error
                    .message
                    .unwrap_or_else(|| format!("Stripe API error ({})", status));
                let mut err = PaymentError::new(code, message);
                if let Some(provider_code) = parsed.error.code.or(parsed.error.error_type) {
                    err = err.with_provider_code(provider_code);
                }
                err
            }
            Err(_) => PaymentError::new(code, format!("Stripe API error: {}", text)),
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = Self::checkout_params(&request);

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params);

        if let Some(correlation_id) = request.correlation_id {
            builder = builder.header("Idempotency-Key", format!("checkout-{}", correlation_id));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(error = %err, "Stripe create_checkout_session failed");
            return Err(err);
        }

        let created: StripeCheckoutSessionCreated = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let url = created
            .url
            .ok_or_else(|| PaymentError::provider("Stripe returned a session without a url"))?;

        tracing::info!(session_id = %created.id, "Checkout session created");

        Ok(CheckoutSession {
            session_id: created.id,
            url,
            expires_at: created.expires_at.and_then(Timestamp::from_unix_secs),
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
