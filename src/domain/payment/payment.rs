//! Payment ledger entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    CorrelationId, EmailAddress, Money, PaymentId, Timestamp, ValidationError,
};

/// Payment type recorded when the checkout carried none.
pub const DEFAULT_PAYMENT_TYPE: &str = "consultation";

/// Outcome recorded for a provider payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

/// Context copied from the checkout session into the ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    pub payment_type: String,
    /// Provider checkout session that produced the payment.
    pub source_session_id: Option<String>,
    pub correlation_id: Option<CorrelationId>,
}

impl Default for PaymentMetadata {
    fn default() -> Self {
        Self {
            payment_type: DEFAULT_PAYMENT_TYPE.to_string(),
            source_session_id: None,
            correlation_id: None,
        }
    }
}

/// An immutable row in the payment ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    id: PaymentId,
    email: EmailAddress,
    provider_payment_id: String,
    amount: Money,
    status: PaymentStatus,
    created_at: Timestamp,
    metadata: PaymentMetadata,
}

impl Payment {
    /// Records a confirmed payment.
    pub fn succeeded(
        email: EmailAddress,
        provider_payment_id: impl Into<String>,
        amount: Money,
        metadata: PaymentMetadata,
    ) -> Result<Self, ValidationError> {
        Self::record(email, provider_payment_id, amount, PaymentStatus::Succeeded, metadata)
    }

    /// Records a failed attempt. Diagnostic only; never affects gating.
    pub fn failed(
        email: EmailAddress,
        provider_payment_id: impl Into<String>,
        amount: Money,
        metadata: PaymentMetadata,
    ) -> Result<Self, ValidationError> {
        Self::record(email, provider_payment_id, amount, PaymentStatus::Failed, metadata)
    }

    fn record(
        email: EmailAddress,
        provider_payment_id: impl Into<String>,
        amount: Money,
        status: PaymentStatus,
        metadata: PaymentMetadata,
    ) -> Result<Self, ValidationError> {
        let provider_payment_id = provider_payment_id.into();
        if provider_payment_id.trim().is_empty() {
            return Err(ValidationError::empty_field("provider_payment_id"));
        }
        Ok(Self {
            id: PaymentId::new(),
            email,
            provider_payment_id,
            amount,
            status,
            created_at: Timestamp::now(),
            metadata,
        })
    }

    /// Rebuilds a payment from storage without re-running creation rules.
    pub fn reconstitute(
        id: PaymentId,
        email: EmailAddress,
        provider_payment_id: String,
        amount: Money,
        status: PaymentStatus,
        created_at: Timestamp,
        metadata: PaymentMetadata,
    ) -> Self {
        Self {
            id,
            email,
            provider_payment_id,
            amount,
            status,
            created_at,
            metadata,
        }
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn provider_payment_id(&self) -> &str {
        &self.provider_payment_id
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    /// Amount in whole major units, as originally requested at checkout.
    pub fn amount_dollars(&self) -> i64 {
        self.amount.major_units()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == PaymentStatus::Succeeded
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn metadata(&self) -> &PaymentMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn email() -> EmailAddress {
        EmailAddress::parse("a@x.com").unwrap()
    }

    fn amount() -> Money {
        Money::from_minor(49_900, Currency::usd()).unwrap()
    }

    #[test]
    fn succeeded_payment_has_succeeded_status() {
        let payment =
            Payment::succeeded(email(), "pi_123", amount(), PaymentMetadata::default()).unwrap();
        assert!(payment.is_succeeded());
        assert_eq!(payment.provider_payment_id(), "pi_123");
        assert_eq!(payment.amount_dollars(), 499);
    }

    #[test]
    fn failed_payment_is_not_succeeded() {
        let payment =
            Payment::failed(email(), "pi_456", amount(), PaymentMetadata::default()).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Failed);
        assert!(!payment.is_succeeded());
    }

    #[test]
    fn blank_provider_payment_id_is_rejected() {
        let result = Payment::succeeded(email(), " ", amount(), PaymentMetadata::default());
        assert_eq!(
            result.unwrap_err(),
            ValidationError::empty_field("provider_payment_id")
        );
    }

    #[test]
    fn status_parses_from_storage_strings() {
        assert_eq!("succeeded".parse::<PaymentStatus>().unwrap(), PaymentStatus::Succeeded);
        assert_eq!("failed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Failed);
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn metadata_defaults_to_consultation() {
        assert_eq!(PaymentMetadata::default().payment_type, "consultation");
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let json = serde_json::to_value(PaymentMetadata {
            payment_type: "consultation".to_string(),
            source_session_id: Some("cs_1".to_string()),
            correlation_id: None,
        })
        .unwrap();
        assert_eq!(json["paymentType"], "consultation");
        assert_eq!(json["sourceSessionId"], "cs_1");
    }
}
