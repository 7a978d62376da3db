//! Stripe-specific types for webhook handling.
//!
//! These types mirror Stripe objects as they arrive in webhook payloads and
//! are converted to provider-neutral port types by the verifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    MissingHeader,
    MissingTimestamp,
    MissingV1Signature,
    InvalidTimestamp,
    /// A signature element was not valid hex.
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing signature header"),
            Self::MissingTimestamp => write!(f, "Missing timestamp (t=) in signature"),
            Self::MissingV1Signature => write!(f, "Missing v1 signature in header"),
            Self::InvalidTimestamp => write!(f, "Invalid timestamp format"),
            Self::InvalidSignatureFormat => write!(f, "Invalid signature format (not valid hex)"),
        }
    }
}

impl std::error::Error for SignatureParseError {}

/// Parsed signature header: `t=<unix>,v1=<hex>[,v1=<hex>...]`.
///
/// Stripe sends several `v1` entries while a signing secret is being
/// rolled; any one of them may match.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let bytes = hex_decode(value.trim())
                        .ok_or(SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(bytes);
                }
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let bytes = hex.as_bytes();
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return None;
    }

    bytes
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeCustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// Checkout Session object (mode=payment).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Session identifier (cs_...).
    pub id: String,

    #[serde(default)]
    pub payment_intent: Option<String>,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub customer_details: Option<StripeCustomerDetails>,

    /// Total in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub client_reference_id: Option<String>,

    /// "paid", "unpaid" or "no_payment_required".
    #[serde(default)]
    pub payment_status: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeCheckoutSession {
    /// Email the customer actually paid with, falling back to what we prefilled.
    pub fn resolved_email(&self) -> Option<String> {
        self.metadata
            .get("email")
            .cloned()
            .or_else(|| self.customer_email.clone())
            .or_else(|| {
                self.customer_details
                    .as_ref()
                    .and_then(|d| d.email.clone())
            })
    }

    pub fn is_paid(&self) -> bool {
        matches!(
            self.payment_status.as_deref(),
            Some("paid") | Some("no_payment_required")
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripePaymentError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// PaymentIntent object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentIntent {
    /// Intent identifier (pi_...).
    pub id: String,

    #[serde(default)]
    pub amount: i64,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub receipt_email: Option<String>,

    #[serde(default)]
    pub last_payment_error: Option<StripePaymentError>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Response body of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSessionCreated {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Error envelope returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Header Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_valid_header() {
        let header = SignatureHeader::parse("t=1704067200,v1=deadbeef").unwrap();
        assert_eq!(header.timestamp, 1704067200);
        assert_eq!(header.v1_signatures, vec![vec![0xde, 0xad, 0xbe, 0xef]]);
    }

    #[test]
    fn parse_collects_multiple_v1_signatures() {
        let header = SignatureHeader::parse("t=1,v1=aa,v1=bb,v0=cc").unwrap();
        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_rejects_empty_header() {
        assert_eq!(
            SignatureHeader::parse("").unwrap_err(),
            SignatureParseError::MissingHeader
        );
    }

    #[test]
    fn parse_rejects_missing_timestamp() {
        assert_eq!(
            SignatureHeader::parse("v1=abcd").unwrap_err(),
            SignatureParseError::MissingTimestamp
        );
    }

    #[test]
    fn parse_rejects_missing_v1() {
        assert_eq!(
            SignatureHeader::parse("t=123,v0=abcd").unwrap_err(),
            SignatureParseError::MissingV1Signature
        );
    }

    #[test]
    fn parse_rejects_bad_timestamp() {
        assert_eq!(
            SignatureHeader::parse("t=yesterday,v1=abcd").unwrap_err(),
            SignatureParseError::InvalidTimestamp
        );
    }

    #[test]
    fn parse_rejects_non_hex_signature() {
        assert_eq!(
            SignatureHeader::parse("t=1,v1=zz").unwrap_err(),
            SignatureParseError::InvalidSignatureFormat
        );
        assert_eq!(
            SignatureHeader::parse("t=1,v1=é0").unwrap_err(),
            SignatureParseError::InvalidSignatureFormat
        );
    }

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Object Parsing Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn checkout_session_prefers_metadata_email() {
        let session: StripeCheckoutSession = serde_json::from_str(
            r#"{
                "id": "cs_1",
                "customer_email": "typed@x.com",
                "customer_details": {"email": "card@x.com"},
                "metadata": {"email": "meta@x.com"}
            }"#,
        )
        .unwrap();
        assert_eq!(session.resolved_email().as_deref(), Some("meta@x.com"));
    }

    #[test]
    fn checkout_session_falls_back_to_customer_details() {
        let session: StripeCheckoutSession = serde_json::from_str(
            r#"{"id": "cs_1", "customer_details": {"email": "card@x.com"}}"#,
        )
        .unwrap();
        assert_eq!(session.resolved_email().as_deref(), Some("card@x.com"));
    }

    #[test]
    fn unpaid_session_is_not_paid() {
        let session: StripeCheckoutSession =
            serde_json::from_str(r#"{"id": "cs_1", "payment_status": "unpaid"}"#).unwrap();
        assert!(!session.is_paid());
    }

    #[test]
    fn payment_intent_parses_last_error() {
        let intent: StripePaymentIntent = serde_json::from_str(
            r#"{
                "id": "pi_1",
                "amount": 49900,
                "currency": "usd",
                "last_payment_error": {"code": "card_declined", "message": "Your card was declined."}
            }"#,
        )
        .unwrap();
        assert_eq!(intent.amount, 49900);
        assert_eq!(
            intent.last_payment_error.unwrap().message.as_deref(),
            Some("Your card was declined.")
        );
    }
}
