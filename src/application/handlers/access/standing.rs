//! Account standing resolved against the ledger.
//!
//! An account only counts as linked when the payment it points at is a
//! succeeded ledger row for the account's own email. The directory's claim
//! alone is never enough.

use crate::domain::foundation::{AccountId, EmailAddress};
use crate::domain::payment::GateError;
use crate::domain::submission::AccountStanding;
use crate::ports::{Account, AccountDirectory, PaymentLedger};

/// The caller's account, if any, and what the ledger says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    pub standing: AccountStanding,
    pub account: Option<Account>,
}

impl ResolvedAccount {
    pub fn anonymous() -> Self {
        Self {
            standing: AccountStanding::Anonymous,
            account: None,
        }
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.account.as_ref().map(|a| &a.email)
    }
}

pub async fn resolve_standing(
    accounts: &dyn AccountDirectory,
    ledger: &dyn PaymentLedger,
    account_id: Option<&AccountId>,
) -> Result<ResolvedAccount, GateError> {
    let Some(account_id) = account_id else {
        return Ok(ResolvedAccount::anonymous());
    };

    let Some(account) = accounts.find_by_id(account_id).await? else {
        tracing::debug!(
            account_id = %account_id,
            "Presented account not found; treating as anonymous"
        );
        return Ok(ResolvedAccount::anonymous());
    };

    let linked = match account.linked_payment_id {
        Some(payment_id) => ledger
            .find_by_id(payment_id)
            .await?
            .map(|p| p.is_succeeded() && p.email() == &account.email)
            .unwrap_or(false),
        None => false,
    };

    Ok(ResolvedAccount {
        standing: if linked {
            AccountStanding::Linked
        } else {
            AccountStanding::Unlinked
        },
        account: Some(account),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountDirectory, InMemoryPaymentLedger};
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::payment::{Payment, PaymentMetadata};

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse(raw).unwrap()
    }

    async fn paid(ledger: &InMemoryPaymentLedger, who: &str) -> Payment {
        let payment = Payment::succeeded(
            email(who),
            format!("pi_{}", who),
            Money::from_minor(1000, Currency::usd()).unwrap(),
            PaymentMetadata::default(),
        )
        .unwrap();
        ledger.record(&payment).await.unwrap();
        payment
    }

    async fn account(
        dir: &InMemoryAccountDirectory,
        id: &str,
        who: &str,
        link: Option<&Payment>,
    ) -> AccountId {
        let id = AccountId::new(id).unwrap();
        dir.insert(Account {
            id: id.clone(),
            email: email(who),
            linked_payment_id: link.map(|p| p.id()),
        })
        .await;
        id
    }

    #[tokio::test]
    async fn no_account_is_anonymous() {
        let resolved = resolve_standing(
            &InMemoryAccountDirectory::new(),
            &InMemoryPaymentLedger::new(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(resolved, ResolvedAccount::anonymous());
    }

    #[tokio::test]
    async fn unknown_account_is_anonymous() {
        let id = AccountId::new("acct_missing").unwrap();
        let resolved = resolve_standing(
            &InMemoryAccountDirectory::new(),
            &InMemoryPaymentLedger::new(),
            Some(&id),
        )
        .await
        .unwrap();
        assert_eq!(resolved.standing, AccountStanding::Anonymous);
    }

    #[tokio::test]
    async fn account_linked_to_own_payment_is_linked() {
        let dir = InMemoryAccountDirectory::new();
        let ledger = InMemoryPaymentLedger::new();
        let payment = paid(&ledger, "a@x.com").await;
        let id = account(&dir, "acct_1", "a@x.com", Some(&payment)).await;

        let resolved = resolve_standing(&dir, &ledger, Some(&id)).await.unwrap();
        assert_eq!(resolved.standing, AccountStanding::Linked);
        assert_eq!(resolved.email(), Some(&email("a@x.com")));
    }

    #[tokio::test]
    async fn link_to_someone_elses_payment_does_not_count() {
        let dir = InMemoryAccountDirectory::new();
        let ledger = InMemoryPaymentLedger::new();
        let payment = paid(&ledger, "other@x.com").await;
        let id = account(&dir, "acct_1", "a@x.com", Some(&payment)).await;

        let resolved = resolve_standing(&dir, &ledger, Some(&id)).await.unwrap();
        assert_eq!(resolved.standing, AccountStanding::Unlinked);
    }

    #[tokio::test]
    async fn unlinked_account_is_unlinked() {
        let dir = InMemoryAccountDirectory::new();
        let ledger = InMemoryPaymentLedger::new();
        paid(&ledger, "a@x.com").await;
        let id = account(&dir, "acct_1", "a@x.com", None).await;

        let resolved = resolve_standing(&dir, &ledger, Some(&id)).await.unwrap();
        assert_eq!(resolved.standing, AccountStanding::Unlinked);
    }
}
