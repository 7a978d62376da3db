//! In-memory adapters for local development and tests.
//!
//! Each mirrors the semantics of its durable counterpart, including the
//! ledger's one-success-per-provider-payment rule.

mod account_directory;
mod payment_ledger;
mod pending_submission_repository;
mod submission_repository;

pub use account_directory::InMemoryAccountDirectory;
pub use payment_ledger::InMemoryPaymentLedger;
pub use pending_submission_repository::InMemoryPendingSubmissionRepository;
pub use submission_repository::InMemorySubmissionRepository;
