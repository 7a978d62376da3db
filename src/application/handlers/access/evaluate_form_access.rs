//! EvaluateFormAccessHandler - Runs the form-access guard for one page view.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::access::{AccessDecision, AccessEvaluator, AccessInputs, GuardState};
use crate::domain::foundation::AccountId;
use crate::domain::payment::GateError;
use crate::ports::{AccountDirectory, ClientStore, PaymentLedger};

use super::standing::resolve_standing;

#[derive(Debug, Clone)]
pub struct EvaluateFormAccessQuery {
    /// Client store namespace of the visiting device.
    pub namespace: String,
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAccessView {
    pub state: GuardState,
    #[serde(flatten)]
    pub decision: AccessDecision,
}

pub struct EvaluateFormAccessHandler {
    client_store: Arc<dyn ClientStore>,
    accounts: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn PaymentLedger>,
}

impl EvaluateFormAccessHandler {
    pub fn new(
        client_store: Arc<dyn ClientStore>,
        accounts: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn PaymentLedger>,
    ) -> Self {
        Self {
            client_store,
            accounts,
            ledger,
        }
    }

    pub async fn handle(&self, query: EvaluateFormAccessQuery) -> Result<FormAccessView, GateError> {
        let mut evaluator = AccessEvaluator::new();
        evaluator.begin_loading()?;

        let mut access_state = self.client_store.load_access_state(&query.namespace).await?;
        let resolved =
            resolve_standing(self.accounts.as_ref(), self.ledger.as_ref(), query.account_id.as_ref())
                .await?;

        let account_email_has_paid = match resolved.email() {
            Some(email) => self.ledger.has_succeeded_payment(email).await?,
            None => false,
        };

        let inputs = AccessInputs {
            standing: resolved.standing,
            account_email: resolved.email().cloned(),
            account_email_has_paid,
            access_state: access_state.clone(),
        };
        let decision = evaluator.evaluate(&inputs)?;

        // A confirmed link settles any account the cache was still waiting on.
        if resolved.standing.is_linked() && access_state.pending_account_flag {
            access_state.mark_account_created();
            self.client_store
                .save_access_state(&query.namespace, &access_state)
                .await?;
        }

        tracing::debug!(
            namespace = %query.namespace,
            standing = ?resolved.standing,
            allowed = decision.is_allowed(),
            "Form access evaluated"
        );

        Ok(FormAccessView {
            state: evaluator.state(),
            decision,
        })
    }
}
