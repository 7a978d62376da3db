//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::application::handlers::{
    CheckoutSettings, CreateCheckoutSessionHandler, EvaluateFormAccessHandler,
    GetPaymentStatusHandler, GetPendingSubmissionHandler, HandlePaymentWebhookHandler,
    SubmitFormHandler, VerifyEmailHandler,
};
use crate::ports::{
    AccountDirectory, ClientStore, PaymentLedger, PaymentProvider, PendingSubmissionRepository,
    RateLimiter, SubmissionRepository,
};

/// Cloned per request; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn PaymentProvider>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub pending: Arc<dyn PendingSubmissionRepository>,
    pub accounts: Arc<dyn AccountDirectory>,
    pub client_store: Arc<dyn ClientStore>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub checkout_settings: CheckoutSettings,
}

impl AppState {
    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(self.provider.clone(), self.checkout_settings.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.provider.clone(),
            self.ledger.clone(),
            self.submissions.clone(),
        )
    }

    pub fn payment_status_handler(&self) -> GetPaymentStatusHandler {
        GetPaymentStatusHandler::new(self.ledger.clone())
    }

    pub fn verify_email_handler(&self) -> VerifyEmailHandler {
        VerifyEmailHandler::new(self.ledger.clone(), self.client_store.clone())
    }

    pub fn form_access_handler(&self) -> EvaluateFormAccessHandler {
        EvaluateFormAccessHandler::new(
            self.client_store.clone(),
            self.accounts.clone(),
            self.ledger.clone(),
        )
    }

    pub fn submit_form_handler(&self) -> SubmitFormHandler {
        SubmitFormHandler::new(
            self.submissions.clone(),
            self.pending.clone(),
            self.accounts.clone(),
            self.ledger.clone(),
        )
    }

    pub fn pending_submission_handler(&self) -> GetPendingSubmissionHandler {
        GetPendingSubmissionHandler::new(self.pending.clone(), self.ledger.clone())
    }
}
