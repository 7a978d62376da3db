//! Stripe webhook signature verification and event translation.
//!
//! Verification happens over the raw request bytes before any JSON parsing.
//! Nothing from an unverified body reaches the application.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::WebhookError;
use crate::ports::{CompletedCheckout, FailedPayment, ProviderEvent, ProviderEventKind};

use super::webhook_types::{
    SignatureHeader, StripeCheckoutSession, StripePaymentIntent, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for signed events.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps.
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED: &str =
    "checkout.session.async_payment_succeeded";
pub const PAYMENT_INTENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

#[derive(Clone)]
pub struct StripeWebhookVerifier {
    secret: SecretString,
    tolerance_secs: i64,
    require_livemode: bool,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            require_livemode: false,
        }
    }

    pub fn with_tolerance_secs(mut self, secs: i64) -> Self {
        self.tolerance_secs = secs;
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    /// Verifies the signature against the current clock and translates the event.
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<ProviderEvent, WebhookError> {
        self.verify_at(payload, signature, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<ProviderEvent, WebhookError> {
        if signature.trim().is_empty() {
            return Err(WebhookError::MissingSignature);
        }

        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Malformed webhook signature header");
            WebhookError::InvalidSignature
        })?;

        self.verify_signature(payload, &header, now)?;
        self.translate(payload)
    }

    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        now: i64,
    ) -> Result<(), WebhookError> {
        let age = now - header.timestamp;

        if age > self.tolerance_secs {
            tracing::warn!(
                event_timestamp = header.timestamp,
                age_secs = age,
                "Webhook event too old, possible replay"
            );
            return Err(WebhookError::TimestampOutOfRange);
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                "Webhook event timestamp in the future"
            );
            return Err(WebhookError::InvalidTimestamp);
        }

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, payload)?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected.as_slice().ct_eq(provided.as_slice()).into());

        if !matched {
            tracing::warn!("Webhook signature mismatch");
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    fn translate(&self, payload: &[u8]) -> Result<ProviderEvent, WebhookError> {
        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse verified webhook payload");
            WebhookError::ParseError(e.to_string())
        })?;

        if self.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event");
            return Err(WebhookError::LivemodeMismatch);
        }

        let kind = match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED | CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED => {
                let session: StripeCheckoutSession =
                    serde_json::from_value(event.data.object.clone()).map_err(|e| {
                        WebhookError::ParseError(format!("Invalid checkout session: {}", e))
                    })?;
                ProviderEventKind::CheckoutCompleted(CompletedCheckout {
                    provider_payment_id: session
                        .payment_intent
                        .clone()
                        .or_else(|| Some(session.id.clone())),
                    email: session.resolved_email(),
                    amount_total: session.amount_total,
                    currency: session.currency.clone(),
                    payment_type: session.metadata.get("paymentType").cloned(),
                    correlation_id: session
                        .client_reference_id
                        .clone()
                        .or_else(|| session.metadata.get("correlation_id").cloned()),
                    paid: session.is_paid(),
                    session_id: session.id,
                })
            }
            PAYMENT_INTENT_PAYMENT_FAILED => {
                let intent: StripePaymentIntent =
                    serde_json::from_value(event.data.object.clone()).map_err(|e| {
                        WebhookError::ParseError(format!("Invalid payment intent: {}", e))
                    })?;
                ProviderEventKind::PaymentFailed(FailedPayment {
                    email: intent
                        .metadata
                        .get("email")
                        .cloned()
                        .or_else(|| intent.receipt_email.clone()),
                    payment_type: intent.metadata.get("paymentType").cloned(),
                    correlation_id: intent.metadata.get("correlation_id").cloned(),
                    failure_message: intent.last_payment_error.and_then(|e| e.message),
                    amount: intent.amount,
                    currency: intent.currency,
                    provider_payment_id: intent.id,
                })
            }
            _ => ProviderEventKind::Other,
        };

        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Webhook verified");

        Ok(ProviderEvent {
            id: event.id,
            event_type: event.event_type,
            created_at: Timestamp::from_unix_secs(event.created),
            kind,
        })
    }
}

impl std::fmt::Debug for StripeWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeWebhookVerifier")
            .field("tolerance_secs", &self.tolerance_secs)
            .field("require_livemode", &self.require_livemode)
            .finish_non_exhaustive()
    }
}

/// HMAC-SHA256 over `"{timestamp}.{payload}"`.
fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::ParseError(format!("Invalid signing key: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Builds a valid signature header for `payload`. Used by tests and local tooling.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let signature = compute_signature(secret, timestamp, payload).unwrap_or_default();
    format!("t={},v1={}", timestamp, super::webhook_types::hex_encode(&signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_704_067_200;

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(SECRET.to_string()))
    }

    fn completed_payload() -> String {
        r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "livemode": false,
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "payment_intent": "pi_1",
                    "customer_email": "a@x.com",
                    "amount_total": 49900,
                    "currency": "usd",
                    "client_reference_id": "6f1c1c9e-0000-4000-8000-000000000001",
                    "payment_status": "paid",
                    "metadata": {"email": "a@x.com", "paymentType": "consultation"}
                }
            }
        }"#
        .to_string()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_is_accepted() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW, payload.as_bytes());
        assert!(verifier().verify_at(payload.as_bytes(), &sig, NOW).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = completed_payload();
        let sig = sign_payload("whsec_other", NOW, payload.as_bytes());
        assert!(matches!(
            verifier().verify_at(payload.as_bytes(), &sig, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW, payload.as_bytes());
        let tampered = payload.replace("49900", "100");
        assert!(matches!(
            verifier().verify_at(tampered.as_bytes(), &sig, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn missing_signature_is_rejected() {
        assert!(matches!(
            verifier().verify_at(b"{}", "", NOW),
            Err(WebhookError::MissingSignature)
        ));
    }

    #[test]
    fn malformed_header_is_rejected_as_invalid_signature() {
        assert!(matches!(
            verifier().verify_at(b"{}", "garbage", NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let payload = completed_payload();
        let good = sign_payload(SECRET, NOW, payload.as_bytes());
        let good_hex = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good_hex);
        assert!(verifier().verify_at(payload.as_bytes(), &header, NOW).is_ok());
    }

    #[test]
    fn timestamp_at_tolerance_boundary_is_accepted() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW - 300, payload.as_bytes());
        assert!(verifier().verify_at(payload.as_bytes(), &sig, NOW).is_ok());
    }

    #[test]
    fn timestamp_past_tolerance_is_rejected() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW - 301, payload.as_bytes());
        assert!(matches!(
            verifier().verify_at(payload.as_bytes(), &sig, NOW),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn small_future_skew_is_tolerated() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW + 30, payload.as_bytes());
        assert!(verifier().verify_at(payload.as_bytes(), &sig, NOW).is_ok());
    }

    #[test]
    fn far_future_timestamp_is_rejected() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW + 120, payload.as_bytes());
        assert!(matches!(
            verifier().verify_at(payload.as_bytes(), &sig, NOW),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn custom_tolerance_is_respected() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW - 100, payload.as_bytes());
        let strict = verifier().with_tolerance_secs(60);
        assert!(strict.verify_at(payload.as_bytes(), &sig, NOW).is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Event Translation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn completed_checkout_is_translated() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW, payload.as_bytes());
        let event = verifier().verify_at(payload.as_bytes(), &sig, NOW).unwrap();

        assert_eq!(event.id, "evt_1");
        match event.kind {
            ProviderEventKind::CheckoutCompleted(c) => {
                assert_eq!(c.session_id, "cs_test_1");
                assert_eq!(c.provider_payment_id.as_deref(), Some("pi_1"));
                assert_eq!(c.email.as_deref(), Some("a@x.com"));
                assert_eq!(c.amount_total, Some(49900));
                assert_eq!(c.payment_type.as_deref(), Some("consultation"));
                assert!(c.correlation_id.is_some());
                assert!(c.paid);
            }
            other => panic!("expected checkout completed, got {:?}", other),
        }
    }

    #[test]
    fn failed_intent_is_translated() {
        let payload = r#"{
            "id": "evt_2",
            "type": "payment_intent.payment_failed",
            "created": 1704067200,
            "data": {"object": {
                "id": "pi_2",
                "amount": 49900,
                "currency": "usd",
                "metadata": {"email": "a@x.com"},
                "last_payment_error": {"message": "Your card was declined."}
            }}
        }"#;
        let sig = sign_payload(SECRET, NOW, payload.as_bytes());
        let event = verifier().verify_at(payload.as_bytes(), &sig, NOW).unwrap();

        match event.kind {
            ProviderEventKind::PaymentFailed(f) => {
                assert_eq!(f.provider_payment_id, "pi_2");
                assert_eq!(f.email.as_deref(), Some("a@x.com"));
                assert_eq!(f.failure_message.as_deref(), Some("Your card was declined."));
            }
            other => panic!("expected payment failed, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_is_other() {
        let payload = r#"{"id":"evt_3","type":"customer.created","created":1,"data":{"object":{}}}"#;
        let sig = sign_payload(SECRET, NOW, payload.as_bytes());
        let event = verifier().verify_at(payload.as_bytes(), &sig, NOW).unwrap();
        assert_eq!(event.kind, ProviderEventKind::Other);
        assert_eq!(event.event_type, "customer.created");
    }

    #[test]
    fn invalid_json_with_valid_signature_is_parse_error() {
        let payload = b"not json";
        let sig = sign_payload(SECRET, NOW, payload);
        assert!(matches!(
            verifier().verify_at(payload, &sig, NOW),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn test_mode_event_rejected_when_livemode_required() {
        let payload = completed_payload();
        let sig = sign_payload(SECRET, NOW, payload.as_bytes());
        let live_only = verifier().with_require_livemode(true);
        assert!(matches!(
            live_only.verify_at(payload.as_bytes(), &sig, NOW),
            Err(WebhookError::LivemodeMismatch)
        ));
    }

    proptest! {
        #[test]
        fn forged_signatures_never_verify(
            body in proptest::collection::vec(any::<u8>(), 0..256),
            forged in proptest::collection::vec(any::<u8>(), 32..=32),
        ) {
            let header = format!("t={},v1={}", NOW, super::super::webhook_types::hex_encode(&forged));
            let result = verifier().verify_at(&body, &header, NOW);
            prop_assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        }
    }
}
