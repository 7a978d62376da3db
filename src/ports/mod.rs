//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Payment Ports
//!
//! - `PaymentProvider` - Hosted checkout and webhook verification
//! - `PaymentLedger` - Append-only ledger of payment outcomes
//!
//! ## Submission Ports
//!
//! - `SubmissionRepository` - Stored form submissions
//! - `PendingSubmissionRepository` - Drafts bridging the checkout redirect
//! - `FormSubmissionService` - The submit-form collaborator contract
//!
//! ## Access Ports
//!
//! - `AccountDirectory` - External account lookup and payment linkage
//! - `ClientStore` - Durable per-device key-value storage
//! - `RateLimiter` - Throttling for lookup endpoints

mod account_directory;
mod client_store;
mod form_submission_service;
mod payment_ledger;
mod payment_provider;
mod pending_submission_repository;
mod rate_limiter;
mod submission_repository;

pub use account_directory::{Account, AccountDirectory};
pub use client_store::{
    validate_namespace, ClientDraft, ClientStore, ClientStoreError, ACCESS_STATE_KEY,
    SUBMISSION_DRAFT_KEY,
};
pub use form_submission_service::{FormSubmissionService, SubmitFormOutcome, SubmitFormRequest};
pub use payment_ledger::{InsertOutcome, PaymentLedger};
pub use payment_provider::{
    CheckoutRequest, CheckoutSession, CompletedCheckout, FailedPayment, PaymentError,
    PaymentErrorCode, PaymentProvider, ProviderEvent, ProviderEventKind,
};
pub use pending_submission_repository::PendingSubmissionRepository;
pub use rate_limiter::{
    RateLimitError, RateLimitKey, RateLimitResult, RateLimitedAction, RateLimiter,
};
pub use submission_repository::SubmissionRepository;
