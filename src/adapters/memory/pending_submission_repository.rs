//! In-memory PendingSubmissionRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CorrelationId, DomainError, Timestamp};
use crate::domain::submission::PendingSubmission;
use crate::ports::PendingSubmissionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPendingSubmissionRepository {
    pending: Arc<RwLock<HashMap<CorrelationId, PendingSubmission>>>,
}

impl InMemoryPendingSubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingSubmissionRepository for InMemoryPendingSubmissionRepository {
    async fn save(&self, pending: &PendingSubmission) -> Result<(), DomainError> {
        self.pending
            .write()
            .await
            .entry(pending.correlation_id)
            .or_insert_with(|| pending.clone());
        Ok(())
    }

    async fn find(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<PendingSubmission>, DomainError> {
        Ok(self.pending.read().await.get(&correlation_id).cloned())
    }

    async fn delete(&self, correlation_id: CorrelationId) -> Result<bool, DomainError> {
        Ok(self.pending.write().await.remove(&correlation_id).is_some())
    }

    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let mut pending = self.pending.write().await;
        let before = pending.len();
        pending.retain(|_, p| !p.is_stale(&cutoff));
        Ok((before - pending.len()) as u64)
    }
}
