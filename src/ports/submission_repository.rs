//! Form submission persistence port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress, SubmissionId, Timestamp};
use crate::domain::submission::FormSubmission;

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Inserts or replaces a submission.
    async fn save(&self, submission: &FormSubmission) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: SubmissionId) -> Result<Option<FormSubmission>, DomainError>;

    /// Counts submissions for an email that are not expired.
    async fn count_live_for_email(&self, email: &EmailAddress) -> Result<u64, DomainError>;

    /// Moves `pending_payment` submissions for the email created at or
    /// before `paid_at` to `pending`. Later submissions stay gated.
    ///
    /// Returns the number of rows promoted. Safe to repeat.
    async fn promote_awaiting_payment(
        &self,
        email: &EmailAddress,
        paid_at: Timestamp,
    ) -> Result<u64, DomainError>;

    /// Distinct emails that still have `pending_payment` submissions.
    async fn emails_awaiting_payment(&self) -> Result<Vec<EmailAddress>, DomainError>;

    /// Expires `pending_payment` submissions created before `cutoff`.
    ///
    /// Returns the ids that were expired.
    async fn expire_awaiting_payment_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<SubmissionId>, DomainError>;
}
