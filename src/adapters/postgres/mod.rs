//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresPaymentLedger` - Append-only payment ledger, idempotent per provider payment
//! - `PostgresSubmissionRepository` - Form submissions and their payment gating status
//! - `PostgresPendingSubmissionRepository` - Drafts that bridge the checkout redirect

mod payment_ledger;
mod pending_submission_repository;
mod submission_repository;

pub use payment_ledger::PostgresPaymentLedger;
pub use pending_submission_repository::PostgresPendingSubmissionRepository;
pub use submission_repository::PostgresSubmissionRepository;
