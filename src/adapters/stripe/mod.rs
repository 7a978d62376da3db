//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe:
//! - One-off Checkout Sessions (mode=payment)
//! - Webhook signature verification and event translation
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;
mod webhook_verifier;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
pub use webhook_types::{
    hex_encode, SignatureHeader, SignatureParseError, StripeCheckoutSession, StripePaymentIntent,
    StripeWebhookEvent,
};
pub use webhook_verifier::{
    sign_payload, StripeWebhookVerifier, CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED,
    CHECKOUT_SESSION_COMPLETED, PAYMENT_INTENT_PAYMENT_FAILED,
};
