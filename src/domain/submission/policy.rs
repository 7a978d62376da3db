//! The free-first-submission rule.
//!
//! One place decides whether a submission needs payment. The submission
//! handler and the access evaluator both derive from `AccountStanding`, so a
//! change here moves both gates together.

use serde::{Deserialize, Serialize};

/// What the account directory and the ledger say about a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStanding {
    /// No account presented.
    Anonymous,
    /// Account exists but is not linked to a succeeded payment.
    Unlinked,
    /// Account linked to a payment the ledger confirms as succeeded.
    Linked,
}

impl AccountStanding {
    pub fn is_linked(&self) -> bool {
        matches!(self, AccountStanding::Linked)
    }
}

/// Outcome of applying the free-tier rule to one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionDecision {
    FreeFirstSubmission,
    CoveredByLinkedAccount,
    PaymentRequired,
}

impl SubmissionDecision {
    pub fn needs_payment(&self) -> bool {
        matches!(self, SubmissionDecision::PaymentRequired)
    }
}

pub struct FreeTierPolicy;

impl FreeTierPolicy {
    /// Submissions per email that never require payment.
    pub const FREE_SUBMISSIONS: u64 = 1;

    /// `prior_submissions` counts the email's live (non-expired) submissions.
    pub fn decide(prior_submissions: u64, standing: AccountStanding) -> SubmissionDecision {
        if standing.is_linked() {
            SubmissionDecision::CoveredByLinkedAccount
        } else if prior_submissions < Self::FREE_SUBMISSIONS {
            SubmissionDecision::FreeFirstSubmission
        } else {
            SubmissionDecision::PaymentRequired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_submission_is_free() {
        let decision = FreeTierPolicy::decide(0, AccountStanding::Anonymous);
        assert_eq!(decision, SubmissionDecision::FreeFirstSubmission);
        assert!(!decision.needs_payment());
    }

    #[test]
    fn second_submission_requires_payment() {
        let decision = FreeTierPolicy::decide(1, AccountStanding::Anonymous);
        assert!(decision.needs_payment());
    }

    #[test]
    fn unlinked_account_gets_no_exemption() {
        assert!(FreeTierPolicy::decide(3, AccountStanding::Unlinked).needs_payment());
    }

    #[test]
    fn linked_account_is_always_covered() {
        assert_eq!(
            FreeTierPolicy::decide(10, AccountStanding::Linked),
            SubmissionDecision::CoveredByLinkedAccount
        );
    }

    proptest! {
        #[test]
        fn without_linkage_only_the_first_submission_is_free(prior in 0u64..1_000) {
            let standing = AccountStanding::Anonymous;
            prop_assert_eq!(FreeTierPolicy::decide(prior, standing).needs_payment(), prior >= 1);
        }
    }
}
