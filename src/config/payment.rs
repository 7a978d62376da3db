//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// Stripe API base URL (override for stripe-mock)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Reject webhook events whose livemode flag is false
    #[serde(default)]
    pub require_livemode: bool,

    /// Accepted age of a webhook signature timestamp
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,

    /// Public site origin used to build checkout return URLs
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Path the provider redirects to after a successful payment
    #[serde(default = "default_success_path")]
    pub success_path: String,

    /// Path the provider redirects to when checkout is abandoned
    #[serde(default = "default_cancel_path")]
    pub cancel_path: String,

    /// Line item name shown on the hosted checkout page
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// ISO 4217 code for checkout amounts
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Absolute success URL template; `{CORRELATION_ID}` is substituted per checkout.
    pub fn success_url(&self) -> String {
        format!(
            "{}{}?correlation_id={{CORRELATION_ID}}",
            self.site_url.trim_end_matches('/'),
            self.success_path
        )
    }

    pub fn cancel_url(&self) -> String {
        format!(
            "{}{}?correlation_id={{CORRELATION_ID}}",
            self.site_url.trim_end_matches('/'),
            self.cancel_path
        )
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.webhook_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidWebhookTolerance);
        }
        if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            return Err(ValidationError::InvalidSiteUrl);
        }
        if !self.success_path.starts_with('/') || !self.cancel_path.starts_with('/') {
            return Err(ValidationError::InvalidReturnPath);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }

        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_webhook_tolerance() -> i64 {
    300
}

fn default_site_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_success_path() -> String {
    "/payment-success".to_string()
}

fn default_cancel_path() -> String {
    "/payment-cancelled".to_string()
}

fn default_product_name() -> String {
    "Consultation".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}
