//! Form submission collaborator contract.
//!
//! Form UIs submit through this port and learn whether payment is owed.
//! The in-process implementation applies the free-tier rule against the
//! ledger; a remote implementation may front another service.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{AccountId, CorrelationId, DomainError, EmailAddress, SubmissionId};
use crate::domain::submission::{FormPayload, SubmissionStatus};

#[derive(Debug, Clone)]
pub struct SubmitFormRequest {
    pub email: EmailAddress,
    pub payload: FormPayload,
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormOutcome {
    pub needs_payment: bool,
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    /// Set when payment is owed; carried through checkout.
    pub correlation_id: Option<CorrelationId>,
}

#[async_trait]
pub trait FormSubmissionService: Send + Sync {
    async fn submit_form(&self, request: SubmitFormRequest)
        -> Result<SubmitFormOutcome, DomainError>;
}
