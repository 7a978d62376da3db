//! In-memory AccountDirectory, seeded by tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AccountId, DomainError, EmailAddress, ErrorCode, PaymentId};
use crate::ports::{Account, AccountDirectory};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountDirectory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account, replacing any previous one with the same id.
    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.id.as_str().to_string(), account);
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(id.as_str()).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| &a.email == email).cloned())
    }

    async fn link_payment(
        &self,
        id: &AccountId,
        payment_id: PaymentId,
    ) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(id.as_str()).ok_or_else(|| {
            DomainError::new(ErrorCode::AccountNotFound, format!("Account {} not found", id))
        })?;
        account.linked_payment_id = Some(payment_id);
        Ok(())
    }
}
