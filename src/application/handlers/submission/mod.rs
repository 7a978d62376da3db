//! Submission handlers: intake, redirect resolution and the retention sweep.

mod get_pending_submission;
mod submit_form;
mod sweep_submissions;

pub use get_pending_submission::{
    GetPendingSubmissionHandler, GetPendingSubmissionQuery, PendingSubmissionView,
};
pub use submit_form::SubmitFormHandler;
pub use sweep_submissions::{SweepReport, SweepSubmissionsCommand, SweepSubmissionsHandler};
