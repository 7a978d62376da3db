//! Pending submission records addressed by correlation id.

use async_trait::async_trait;

use crate::domain::foundation::{CorrelationId, DomainError, Timestamp};
use crate::domain::submission::PendingSubmission;

#[async_trait]
pub trait PendingSubmissionRepository: Send + Sync {
    async fn save(&self, pending: &PendingSubmission) -> Result<(), DomainError>;

    async fn find(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<PendingSubmission>, DomainError>;

    /// Removes a record. Returns false if it did not exist.
    async fn delete(&self, correlation_id: CorrelationId) -> Result<bool, DomainError>;

    /// Removes records created before `cutoff`, returning the count.
    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}
