//! Access handlers: the form-access guard and cross-device verification.

mod evaluate_form_access;
mod standing;
mod verify_email;

pub use evaluate_form_access::{EvaluateFormAccessHandler, EvaluateFormAccessQuery, FormAccessView};
pub use standing::{resolve_standing, ResolvedAccount};
pub use verify_email::{VerifyEmailCommand, VerifyEmailHandler, VerifyEmailResult};
