//! Payment domain - the ledger's vocabulary.
//!
//! A `Payment` is written once by the webhook reconciler and never mutated.
//! Successes and failures are distinct rows; the ledger is the sole
//! authority for "has this email paid".

mod errors;
mod payment;
mod webhook_errors;

pub use errors::GateError;
pub use payment::{Payment, PaymentMetadata, PaymentStatus, DEFAULT_PAYMENT_TYPE};
pub use webhook_errors::WebhookError;
