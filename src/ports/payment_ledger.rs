//! Payment ledger port.
//!
//! The ledger is append-only. At most one `succeeded` row may exist per
//! provider payment id; implementations enforce that with a uniqueness
//! constraint so duplicate webhook deliveries become no-ops.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress, PaymentId};
use crate::domain::payment::Payment;

/// Outcome of appending to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A succeeded row for the same provider payment id already exists.
    AlreadyRecorded,
}

#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Appends a payment row.
    ///
    /// Returns `AlreadyRecorded` instead of an error when a succeeded row
    /// for the same provider payment id exists.
    async fn record(&self, payment: &Payment) -> Result<InsertOutcome, DomainError>;

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Succeeded row for a provider payment id, if any.
    async fn find_succeeded_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Most recent succeeded payment for an email.
    async fn latest_succeeded_for_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Payment>, DomainError>;

    /// All rows for an email, newest first. Includes failures.
    async fn list_for_email(&self, email: &EmailAddress) -> Result<Vec<Payment>, DomainError>;

    async fn has_succeeded_payment(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        Ok(self.latest_succeeded_for_email(email).await?.is_some())
    }
}
