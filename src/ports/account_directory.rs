//! External account directory port.
//!
//! Authentication and account storage live elsewhere. This service only
//! reads accounts by id or email and records the link to a payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, DomainError, EmailAddress, PaymentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    /// Payment this account was created against, if any.
    #[serde(default)]
    pub linked_payment_id: Option<PaymentId>,
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError>;

    /// Records that the account was created against `payment_id`.
    async fn link_payment(&self, id: &AccountId, payment_id: PaymentId)
        -> Result<(), DomainError>;
}
