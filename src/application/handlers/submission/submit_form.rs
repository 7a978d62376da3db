//! SubmitFormHandler - Stores a submission and decides whether it needs payment.
//!
//! The free-tier rule is applied here, against the ledger and the
//! submission store, not by whoever rendered the form.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payment::GateError;
use crate::domain::submission::{
    AccountStanding, FormSubmission, FreeTierPolicy, PendingSubmission, SubmissionDecision,
};
use crate::ports::{
    AccountDirectory, FormSubmissionService, PaymentLedger, PendingSubmissionRepository,
    SubmissionRepository, SubmitFormOutcome, SubmitFormRequest,
};

use super::super::access::resolve_standing;

pub struct SubmitFormHandler {
    submissions: Arc<dyn SubmissionRepository>,
    pending: Arc<dyn PendingSubmissionRepository>,
    accounts: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn PaymentLedger>,
}

impl SubmitFormHandler {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        pending: Arc<dyn PendingSubmissionRepository>,
        accounts: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn PaymentLedger>,
    ) -> Self {
        Self {
            submissions,
            pending,
            accounts,
            ledger,
        }
    }

    pub async fn handle(&self, request: SubmitFormRequest) -> Result<SubmitFormOutcome, GateError> {
        request.payload.validate()?;

        let resolved = resolve_standing(
            self.accounts.as_ref(),
            self.ledger.as_ref(),
            request.account_id.as_ref(),
        )
        .await?;

        // A linked account only covers submissions made under its own email.
        let standing = match resolved.email() {
            Some(email) if email != &request.email => AccountStanding::Unlinked,
            _ => resolved.standing,
        };

        let prior = self.submissions.count_live_for_email(&request.email).await?;
        let decision = FreeTierPolicy::decide(prior, standing);

        let submission = match decision {
            SubmissionDecision::PaymentRequired => {
                FormSubmission::awaiting_payment(request.email.clone(), request.payload)
            }
            SubmissionDecision::FreeFirstSubmission | SubmissionDecision::CoveredByLinkedAccount => {
                FormSubmission::accepted(request.email.clone(), request.payload)
            }
        };
        self.submissions.save(&submission).await?;

        let correlation_id = if decision.needs_payment() {
            let pending = PendingSubmission::new(
                request.email.clone(),
                submission.form_type(),
                submission.id(),
            );
            self.pending.save(&pending).await?;
            Some(pending.correlation_id)
        } else {
            None
        };

        tracing::info!(
            submission_id = %submission.id(),
            form_type = %submission.form_type(),
            decision = ?decision,
            prior_submissions = prior,
            "Form submission stored"
        );

        Ok(SubmitFormOutcome {
            needs_payment: decision.needs_payment(),
            submission_id: submission.id(),
            status: submission.status(),
            correlation_id,
        })
    }
}

#[async_trait]
impl FormSubmissionService for SubmitFormHandler {
    async fn submit_form(
        &self,
        request: SubmitFormRequest,
    ) -> Result<SubmitFormOutcome, DomainError> {
        self.handle(request).await.map_err(into_domain_error)
    }
}

fn into_domain_error(err: GateError) -> DomainError {
    match err {
        GateError::Validation(v) => DomainError::from(v),
        other => DomainError::new(other.code(), other.to_string()),
    }
}
