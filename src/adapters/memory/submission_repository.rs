//! In-memory SubmissionRepository.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, SubmissionId, Timestamp};
use crate::domain::submission::{FormSubmission, SubmissionStatus};
use crate::ports::SubmissionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionRepository {
    submissions: Arc<RwLock<HashMap<SubmissionId, FormSubmission>>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored submission for `email`, oldest first.
    pub async fn for_email(&self, email: &EmailAddress) -> Vec<FormSubmission> {
        let submissions = self.submissions.read().await;
        let mut found: Vec<FormSubmission> = submissions
            .values()
            .filter(|s| s.email() == email)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at().as_datetime().cmp(b.created_at().as_datetime()));
        found
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn save(&self, submission: &FormSubmission) -> Result<(), DomainError> {
        self.submissions
            .write()
            .await
            .insert(submission.id(), submission.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: SubmissionId) -> Result<Option<FormSubmission>, DomainError> {
        Ok(self.submissions.read().await.get(&id).cloned())
    }

    async fn count_live_for_email(&self, email: &EmailAddress) -> Result<u64, DomainError> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .filter(|s| s.email() == email && s.status() != SubmissionStatus::Expired)
            .count() as u64)
    }

    async fn promote_awaiting_payment(
        &self,
        email: &EmailAddress,
        paid_at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut submissions = self.submissions.write().await;
        let mut promoted = 0;
        for submission in submissions.values_mut().filter(|s| {
            s.email() == email && s.is_awaiting_payment() && !paid_at.is_before(&s.created_at())
        }) {
            submission.promote()?;
            promoted += 1;
        }
        Ok(promoted)
    }

    async fn emails_awaiting_payment(&self) -> Result<Vec<EmailAddress>, DomainError> {
        let submissions = self.submissions.read().await;
        let emails: BTreeSet<String> = submissions
            .values()
            .filter(|s| s.is_awaiting_payment())
            .map(|s| s.email().as_str().to_string())
            .collect();
        emails
            .iter()
            .map(|e| EmailAddress::parse(e).map_err(DomainError::from))
            .collect()
    }

    async fn expire_awaiting_payment_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<SubmissionId>, DomainError> {
        let mut submissions = self.submissions.write().await;
        let mut expired = Vec::new();
        for submission in submissions
            .values_mut()
            .filter(|s| s.is_awaiting_payment() && s.created_at().is_before(&cutoff))
        {
            submission.expire()?;
            expired.push(submission.id());
        }
        Ok(expired)
    }
}
