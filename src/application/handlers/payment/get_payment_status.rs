//! GetPaymentStatusHandler - Ledger lookup by email.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{EmailAddress, PaymentId, ValidationError};
use crate::domain::payment::GateError;
use crate::ports::PaymentLedger;

#[derive(Debug, Clone)]
pub struct GetPaymentStatusQuery {
    pub email: String,
}

/// Whether an email has a confirmed payment, and which one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusView {
    pub paid: bool,
    pub payment_id: Option<PaymentId>,
}

pub struct GetPaymentStatusHandler {
    ledger: Arc<dyn PaymentLedger>,
}

impl GetPaymentStatusHandler {
    pub fn new(ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: GetPaymentStatusQuery) -> Result<PaymentStatusView, GateError> {
        if query.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email").into());
        }
        let email = EmailAddress::parse(&query.email)?;

        let latest = self.ledger.latest_succeeded_for_email(&email).await?;
        Ok(PaymentStatusView {
            paid: latest.is_some(),
            payment_id: latest.map(|p| p.id()),
        })
    }
}
