//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the intake gate: who is paying, how much, and when.

mod email;
mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use email::EmailAddress;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AccountId, CorrelationId, PaymentId, SubmissionId};
pub use money::{Currency, Money, MAX_MINOR_UNITS};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
