//! Per-submission UI flow.
//!
//! ```text
//! Idle ─► Submitting ─┬─► Complete
//!                     └─► NeedsPayment ─► PaymentModalOpen ─► PaymentSuccess
//!                                              │                    │
//!                                              ▼                    ▼
//!                                         NeedsPayment      AccountNudgeOpen
//!                                                            │          │
//!                                                  AccountCreated    Skipped
//!                                                            └─► Complete ◄┘
//! ```
//!
//! The state after the checkout redirect is never carried in memory; the
//! orchestrator rebuilds it from the pending submission record and the ledger.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionFlowState {
    Idle,
    Submitting,
    NeedsPayment,
    PaymentModalOpen,
    PaymentSuccess,
    AccountNudgeOpen,
    AccountCreated,
    Skipped,
    Complete,
}

impl StateMachine for SubmissionFlowState {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubmissionFlowState::*;
        match self {
            // Failed submits fall back to Idle so the user can retry.
            Idle => vec![Submitting],
            Submitting => vec![NeedsPayment, Complete, Idle],
            NeedsPayment => vec![PaymentModalOpen],
            // Closing the modal or a cancelled checkout returns to NeedsPayment.
            PaymentModalOpen => vec![PaymentSuccess, NeedsPayment],
            PaymentSuccess => vec![AccountNudgeOpen],
            AccountNudgeOpen => vec![AccountCreated, Skipped],
            AccountCreated | Skipped => vec![Complete],
            Complete => vec![],
        }
    }
}
