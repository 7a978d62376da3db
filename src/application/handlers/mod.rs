//! Application handlers.
//!
//! Command and query handlers grouped by the part of the flow they serve.

pub mod access;
pub mod payment;
pub mod submission;

pub use access::{
    EvaluateFormAccessHandler, EvaluateFormAccessQuery, FormAccessView, VerifyEmailCommand,
    VerifyEmailHandler, VerifyEmailResult,
};
pub use payment::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, GetPaymentStatusHandler, GetPaymentStatusQuery,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    PaymentStatusView,
};
pub use submission::{
    GetPendingSubmissionHandler, GetPendingSubmissionQuery, PendingSubmissionView,
    SubmitFormHandler, SweepReport, SweepSubmissionsCommand, SweepSubmissionsHandler,
};
