//! Pending submission record bridging the checkout redirect.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CorrelationId, EmailAddress, SubmissionId, Timestamp};

use super::FormType;

/// Server-side draft addressed by the correlation id sent through checkout.
///
/// Resolvable from any device: the browser only needs the id from the
/// success URL, not its own storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmission {
    pub correlation_id: CorrelationId,
    pub email: EmailAddress,
    pub form_type: FormType,
    pub submission_id: SubmissionId,
    pub created_at: Timestamp,
}

impl PendingSubmission {
    pub fn new(email: EmailAddress, form_type: FormType, submission_id: SubmissionId) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            email,
            form_type,
            submission_id,
            created_at: Timestamp::now(),
        }
    }

    /// True once the draft has outlived the retention window.
    pub fn is_stale(&self, cutoff: &Timestamp) -> bool {
        self.created_at.is_before(cutoff)
    }
}
