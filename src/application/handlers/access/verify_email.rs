//! VerifyEmailHandler - Proves a prior payment from a device with no memory of it.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{EmailAddress, ValidationError};
use crate::domain::payment::GateError;
use crate::ports::{ClientStore, PaymentLedger};

#[derive(Debug, Clone)]
pub struct VerifyEmailCommand {
    pub email: String,
    /// Device whose access cache should remember the result.
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyEmailResult {
    pub paid: bool,
}

pub struct VerifyEmailHandler {
    ledger: Arc<dyn PaymentLedger>,
    client_store: Arc<dyn ClientStore>,
}

impl VerifyEmailHandler {
    pub fn new(ledger: Arc<dyn PaymentLedger>, client_store: Arc<dyn ClientStore>) -> Self {
        Self {
            ledger,
            client_store,
        }
    }

    pub async fn handle(&self, cmd: VerifyEmailCommand) -> Result<VerifyEmailResult, GateError> {
        if cmd.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email").into());
        }
        let email = EmailAddress::parse(&cmd.email)?;

        let paid = self.ledger.has_succeeded_payment(&email).await?;

        if paid {
            if let Some(namespace) = cmd.namespace.as_deref() {
                let mut state = self.client_store.load_access_state(namespace).await?;
                state.mark_paid_pending_account(email.clone());
                self.client_store.save_access_state(namespace, &state).await?;
            }
        }

        tracing::info!(paid, "Email verification checked against ledger");
        Ok(VerifyEmailResult { paid })
    }
}
