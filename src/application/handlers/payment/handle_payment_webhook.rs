//! HandlePaymentWebhookHandler - Applies verified provider events to the ledger.
//!
//! The ledger write is the only step that decides the response. Promotion
//! of waiting submissions runs on a detached task and is allowed to fail.

use std::sync::Arc;

use crate::domain::foundation::{CorrelationId, Currency, EmailAddress, Money, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentMetadata, WebhookError, DEFAULT_PAYMENT_TYPE};
use crate::ports::{
    CompletedCheckout, FailedPayment, InsertOutcome, PaymentLedger, PaymentProvider,
    ProviderEventKind, SubmissionRepository,
};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    pub signature: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    PaymentRecorded {
        payment_id: PaymentId,
        provider_payment_id: String,
    },
    /// Redelivery of an already-recorded success.
    AlreadyRecorded { provider_payment_id: String },
    FailureRecorded { provider_payment_id: String },
    /// Event acknowledged but no action taken.
    Acknowledged,
}

pub struct HandlePaymentWebhookHandler {
    provider: Arc<dyn PaymentProvider>,
    ledger: Arc<dyn PaymentLedger>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        ledger: Arc<dyn PaymentLedger>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            provider,
            ledger,
            submissions,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify before touching the body
        let signature = cmd
            .signature
            .filter(|s| !s.trim().is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let event = self
            .provider
            .verify_webhook(&cmd.payload, &signature)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected payment webhook");
                e
            })?;

        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Webhook verified");

        // 2. Dispatch
        match event.kind {
            ProviderEventKind::CheckoutCompleted(checkout) => {
                self.handle_checkout_completed(&event.id, checkout).await
            }
            ProviderEventKind::PaymentFailed(failed) => {
                self.handle_payment_failed(&event.id, failed).await
            }
            ProviderEventKind::Other => {
                tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
                Ok(HandlePaymentWebhookResult::Acknowledged)
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event_id: &str,
        checkout: CompletedCheckout,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        if !checkout.paid {
            tracing::info!(
                event_id,
                session_id = %checkout.session_id,
                "Checkout completed without payment yet; waiting for async confirmation"
            );
            return Ok(HandlePaymentWebhookResult::Acknowledged);
        }

        let email = checkout
            .email
            .as_deref()
            .ok_or(WebhookError::MissingField("email"))
            .and_then(parse_email)?;
        let amount_total = checkout
            .amount_total
            .ok_or(WebhookError::MissingField("amount_total"))?;
        let amount = Money::from_minor(amount_total, parse_currency(checkout.currency.as_deref())?)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let provider_payment_id = checkout
            .provider_payment_id
            .clone()
            .unwrap_or_else(|| checkout.session_id.clone());

        let metadata = PaymentMetadata {
            payment_type: checkout
                .payment_type
                .unwrap_or_else(|| DEFAULT_PAYMENT_TYPE.to_string()),
            source_session_id: Some(checkout.session_id),
            correlation_id: parse_correlation(checkout.correlation_id.as_deref()),
        };

        let payment = Payment::succeeded(email.clone(), &provider_payment_id, amount, metadata)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let outcome = self.ledger.record(&payment).await.map_err(|e| {
            tracing::error!(
                event_id,
                provider_payment_id = %provider_payment_id,
                error = %e,
                "Failed to record payment"
            );
            WebhookError::Persistence(e.message)
        })?;

        let (paid_at, result) = match outcome {
            InsertOutcome::Inserted => {
                tracing::info!(
                    event_id,
                    payment_id = %payment.id(),
                    provider_payment_id = %provider_payment_id,
                    amount = %payment.amount(),
                    "Payment recorded"
                );
                (
                    payment.created_at(),
                    HandlePaymentWebhookResult::PaymentRecorded {
                        payment_id: payment.id(),
                        provider_payment_id,
                    },
                )
            }
            InsertOutcome::AlreadyRecorded => {
                tracing::info!(
                    event_id,
                    provider_payment_id = %provider_payment_id,
                    "Duplicate payment event; ledger unchanged"
                );
                let paid_at = self
                    .ledger
                    .find_succeeded_by_provider_id(&provider_payment_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|existing| existing.created_at())
                    .unwrap_or_else(|| payment.created_at());
                (
                    paid_at,
                    HandlePaymentWebhookResult::AlreadyRecorded {
                        provider_payment_id,
                    },
                )
            }
        };

        self.spawn_promotion(email, paid_at);
        Ok(result)
    }

    async fn handle_payment_failed(
        &self,
        event_id: &str,
        failed: FailedPayment,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let email = match failed.email.as_deref().map(parse_email).transpose()? {
            Some(email) => email,
            None => {
                tracing::warn!(
                    event_id,
                    provider_payment_id = %failed.provider_payment_id,
                    "Failed payment carries no email; not recorded"
                );
                return Ok(HandlePaymentWebhookResult::Acknowledged);
            }
        };

        let amount = Money::from_minor(failed.amount, parse_currency(Some(&failed.currency))?)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let metadata = PaymentMetadata {
            payment_type: failed
                .payment_type
                .unwrap_or_else(|| DEFAULT_PAYMENT_TYPE.to_string()),
            source_session_id: None,
            correlation_id: parse_correlation(failed.correlation_id.as_deref()),
        };
        let payment = Payment::failed(email, &failed.provider_payment_id, amount, metadata)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        self.ledger.record(&payment).await.map_err(|e| {
            tracing::error!(
                event_id,
                provider_payment_id = %failed.provider_payment_id,
                error = %e,
                "Failed to record failed payment"
            );
            WebhookError::Persistence(e.message)
        })?;

        tracing::info!(
            event_id,
            provider_payment_id = %failed.provider_payment_id,
            reason = failed.failure_message.as_deref().unwrap_or("unknown"),
            "Failed payment recorded"
        );

        Ok(HandlePaymentWebhookResult::FailureRecorded {
            provider_payment_id: failed.provider_payment_id,
        })
    }

    /// Best effort. Drift left behind is repaired by the sweep job.
    fn spawn_promotion(&self, email: EmailAddress, paid_at: Timestamp) {
        let submissions = Arc::clone(&self.submissions);
        tokio::spawn(async move {
            match submissions.promote_awaiting_payment(&email, paid_at).await {
                Ok(0) => {}
                Ok(promoted) => {
                    tracing::info!(email = %email, promoted, "Promoted submissions awaiting payment")
                }
                Err(e) => tracing::warn!(
                    email = %email,
                    error = %e,
                    "Failed to promote submissions awaiting payment"
                ),
            }
        });
    }
}

fn parse_email(raw: &str) -> Result<EmailAddress, WebhookError> {
    EmailAddress::parse(raw).map_err(|e| WebhookError::ParseError(e.to_string()))
}

fn parse_currency(raw: Option<&str>) -> Result<Currency, WebhookError> {
    match raw {
        Some(code) => Currency::new(code).map_err(|e| WebhookError::ParseError(e.to_string())),
        None => Ok(Currency::usd()),
    }
}

fn parse_correlation(raw: Option<&str>) -> Option<CorrelationId> {
    raw.and_then(|s| s.parse().ok())
}
