//! GetPendingSubmissionHandler - Resolves a checkout redirect on any device.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{CorrelationId, EmailAddress, SubmissionId};
use crate::domain::payment::GateError;
use crate::domain::submission::{FormType, PendingSubmission};
use crate::ports::{PaymentLedger, PendingSubmissionRepository};

#[derive(Debug, Clone, Copy)]
pub struct GetPendingSubmissionQuery {
    pub correlation_id: CorrelationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmissionView {
    pub correlation_id: CorrelationId,
    pub email: EmailAddress,
    pub form_type: FormType,
    pub submission_id: SubmissionId,
    /// True once the ledger holds a success for this email made after the draft.
    pub paid: bool,
}

impl PendingSubmissionView {
    fn new(pending: PendingSubmission, paid: bool) -> Self {
        Self {
            correlation_id: pending.correlation_id,
            email: pending.email,
            form_type: pending.form_type,
            submission_id: pending.submission_id,
            paid,
        }
    }
}

pub struct GetPendingSubmissionHandler {
    pending: Arc<dyn PendingSubmissionRepository>,
    ledger: Arc<dyn PaymentLedger>,
}

impl GetPendingSubmissionHandler {
    pub fn new(pending: Arc<dyn PendingSubmissionRepository>, ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { pending, ledger }
    }

    pub async fn handle(
        &self,
        query: GetPendingSubmissionQuery,
    ) -> Result<PendingSubmissionView, GateError> {
        let pending = self.pending.find(query.correlation_id).await?.ok_or_else(|| {
            GateError::not_found(format!("No pending submission for {}", query.correlation_id))
        })?;

        let paid = self
            .ledger
            .latest_succeeded_for_email(&pending.email)
            .await?
            .map(|p| !p.created_at().is_before(&pending.created_at))
            .unwrap_or(false);

        Ok(PendingSubmissionView::new(pending, paid))
    }
}
