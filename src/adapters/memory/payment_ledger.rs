//! In-memory PaymentLedger with the same uniqueness rule as the database.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, PaymentId};
use crate::domain::payment::Payment;
use crate::ports::{InsertOutcome, PaymentLedger};

#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentLedger {
    rows: Arc<RwLock<Vec<Payment>>>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, succeeded and failed.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn record(&self, payment: &Payment) -> Result<InsertOutcome, DomainError> {
        let mut rows = self.rows.write().await;

        // The write lock makes check-then-insert atomic, like the unique index.
        let duplicate = payment.is_succeeded()
            && rows.iter().any(|p| {
                p.is_succeeded() && p.provider_payment_id() == payment.provider_payment_id()
            });
        if duplicate || rows.iter().any(|p| p.id() == payment.id()) {
            return Ok(InsertOutcome::AlreadyRecorded);
        }

        rows.push(payment.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|p| p.id() == id).cloned())
    }

    async fn find_succeeded_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|p| p.is_succeeded() && p.provider_payment_id() == provider_payment_id)
            .cloned())
    }

    async fn latest_succeeded_for_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Payment>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|p| p.is_succeeded() && p.email() == email)
            .max_by_key(|p| *p.created_at().as_datetime())
            .cloned())
    }

    async fn list_for_email(&self, email: &EmailAddress) -> Result<Vec<Payment>, DomainError> {
        let rows = self.rows.read().await;
        let mut found: Vec<Payment> = rows.iter().filter(|p| p.email() == email).cloned().collect();
        found.sort_by(|a, b| b.created_at().as_datetime().cmp(a.created_at().as_datetime()));
        Ok(found)
    }
}
