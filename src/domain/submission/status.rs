//! Submission lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Where a form submission sits relative to payment.
///
/// ```text
/// pending_payment ──► pending ──► submitted
///        │
///        └──► expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Waiting for a succeeded payment for the submitter's email.
    PendingPayment,
    /// Accepted and waiting to be handled.
    Pending,
    /// Handed off for review.
    Submitted,
    /// Abandoned checkout; swept by the retention job.
    Expired,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::PendingPayment => "pending_payment",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Expired => "expired",
        }
    }
}

impl StateMachine for SubmissionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, target),
            (PendingPayment, Pending) | (PendingPayment, Expired) | (Pending, Submitted)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubmissionStatus::*;
        match self {
            PendingPayment => vec![Pending, Expired],
            Pending => vec![Submitted],
            Submitted | Expired => vec![],
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(SubmissionStatus::PendingPayment),
            "pending" => Ok(SubmissionStatus::Pending),
            "submitted" => Ok(SubmissionStatus::Submitted),
            "expired" => Ok(SubmissionStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown submission status '{}'", other),
            )),
        }
    }
}
