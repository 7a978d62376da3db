//! Submission domain - intake forms and their payment lifecycle.
//!
//! A submission made while payment is outstanding waits in
//! `pending_payment` until the ledger shows a matching success.

mod flow;
mod form;
mod pending;
mod policy;
mod status;
mod submission;

pub use flow::SubmissionFlowState;
pub use form::{ConsultationRequest, FollowUp, FormPayload, FormType, GeneralIntake};
pub use pending::PendingSubmission;
pub use policy::{AccountStanding, FreeTierPolicy, SubmissionDecision};
pub use status::SubmissionStatus;
pub use submission::FormSubmission;
