//! Client-local access cache.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::EmailAddress;

/// Disposable, non-authoritative hints persisted in client storage.
///
/// Rebuilt on every guard evaluation. A tampered or stale value can only
/// make the guard stricter, never unlock anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessState {
    pub cached_email: Option<EmailAddress>,
    #[serde(default)]
    pub pending_account_flag: bool,
}

impl AccessState {
    /// Records that `email` proved a prior payment and still owes an account.
    pub fn mark_paid_pending_account(&mut self, email: EmailAddress) {
        self.cached_email = Some(email);
        self.pending_account_flag = true;
    }

    /// Clears the account requirement once an account is linked.
    pub fn mark_account_created(&mut self) {
        self.pending_account_flag = false;
    }

    /// True when the cache asks the guard to block until signup.
    pub fn requires_account(&self) -> bool {
        self.pending_account_flag || self.cached_email.is_some()
    }
}
