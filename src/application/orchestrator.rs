//! SubmissionOrchestrator - Drives one device through submit, pay and signup.
//!
//! Nothing the orchestrator holds in memory is needed after the checkout
//! redirect. Every step writes the flow state into the client store, and
//! `resume_from_redirect` rebuilds it from the server-side pending record,
//! so a checkout finished on another device or tab still resolves.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::access::{AllowReason, BlockReason};
use crate::domain::foundation::{
    AccountId, CorrelationId, EmailAddress, PaymentId, StateMachine, SubmissionId,
};
use crate::domain::payment::GateError;
use crate::domain::submission::{FormPayload, SubmissionFlowState};
use crate::ports::{
    AccountDirectory, ClientDraft, ClientStore, FormSubmissionService, PaymentLedger,
    PendingSubmissionRepository, SubmitFormRequest, SUBMISSION_DRAFT_KEY,
};

use super::handlers::access::{EvaluateFormAccessHandler, EvaluateFormAccessQuery};
use super::handlers::payment::{CreateCheckoutSessionCommand, CreateCheckoutSessionHandler};

/// Collaborators shared by every orchestrator instance.
#[derive(Clone)]
pub struct OrchestratorPorts {
    pub forms: Arc<dyn FormSubmissionService>,
    pub checkout: Arc<CreateCheckoutSessionHandler>,
    pub pending: Arc<dyn PendingSubmissionRepository>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub accounts: Arc<dyn AccountDirectory>,
    pub client_store: Arc<dyn ClientStore>,
}

/// Ledger polling after the redirect.
#[derive(Debug, Clone)]
pub struct ConfirmationPolling {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolling {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub signup_path: String,
    pub polling: ConfirmationPolling,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            signup_path: "/signup".to_string(),
            polling: ConfirmationPolling::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SubmitStep {
    Complete { submission_id: SubmissionId },
    NeedsPayment {
        submission_id: SubmissionId,
        correlation_id: CorrelationId,
    },
    /// Nothing was submitted; this device owes an account first.
    AccountRequired {
        email: EmailAddress,
        signup_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    pub session_id: String,
    pub url: String,
}

/// Context carried into the signup page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNudge {
    pub email: EmailAddress,
    pub payment_id: PaymentId,
    pub signup_path: String,
}

pub struct SubmissionOrchestrator {
    ports: OrchestratorPorts,
    settings: OrchestratorSettings,
    namespace: String,
    state: SubmissionFlowState,
    draft: Option<ClientDraft>,
    confirmed_payment: Option<PaymentId>,
}

impl SubmissionOrchestrator {
    pub fn new(
        ports: OrchestratorPorts,
        settings: OrchestratorSettings,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            ports,
            settings,
            namespace: namespace.into(),
            state: SubmissionFlowState::Idle,
            draft: None,
            confirmed_payment: None,
        }
    }

    /// Picks up whatever flow this device left in its client store.
    pub async fn restore(
        ports: OrchestratorPorts,
        settings: OrchestratorSettings,
        namespace: impl Into<String>,
    ) -> Result<Self, GateError> {
        let mut orchestrator = Self::new(ports, settings, namespace);
        if let Some(draft) = orchestrator
            .ports
            .client_store
            .load_draft(&orchestrator.namespace)
            .await?
        {
            orchestrator.state = draft.flow_state;
            orchestrator.draft = Some(draft);
        }
        Ok(orchestrator)
    }

    pub fn state(&self) -> SubmissionFlowState {
        self.state
    }

    pub fn draft(&self) -> Option<&ClientDraft> {
        self.draft.as_ref()
    }

    pub async fn submit(
        &mut self,
        email: EmailAddress,
        payload: FormPayload,
        account_id: Option<AccountId>,
    ) -> Result<SubmitStep, GateError> {
        if self.state.is_terminal() {
            self.state = SubmissionFlowState::Idle;
        }
        if let Err(reason) = self.check_access(account_id.as_ref()).await? {
            tracing::info!(
                namespace = %self.namespace,
                "Submission blocked until an account is created"
            );
            let signup_path = reason.signup_path(&self.settings.signup_path);
            let BlockReason::AccountRequired { email } = reason;
            return Ok(SubmitStep::AccountRequired { email, signup_path });
        }
        self.advance(SubmissionFlowState::Submitting)?;
        let form_type = payload.form_type();

        let request = SubmitFormRequest {
            email: email.clone(),
            payload,
            account_id,
        };
        let outcome = match self.ports.forms.submit_form(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.advance(SubmissionFlowState::Idle)?;
                return Err(e.into());
            }
        };

        match outcome.correlation_id.filter(|_| outcome.needs_payment) {
            Some(correlation_id) => {
                self.advance(SubmissionFlowState::NeedsPayment)?;
                self.draft = Some(ClientDraft {
                    correlation_id,
                    email,
                    form_type,
                    flow_state: self.state,
                });
                self.persist_draft().await?;
                Ok(SubmitStep::NeedsPayment {
                    submission_id: outcome.submission_id,
                    correlation_id,
                })
            }
            None => {
                self.advance(SubmissionFlowState::Complete)?;
                Ok(SubmitStep::Complete {
                    submission_id: outcome.submission_id,
                })
            }
        }
    }

    /// Opens checkout for the held submission. Errors return to `NeedsPayment`.
    pub async fn open_payment(&mut self, amount: f64) -> Result<CheckoutRedirect, GateError> {
        let draft = self.require_draft()?.clone();
        self.advance(SubmissionFlowState::PaymentModalOpen)?;

        let cmd = CreateCheckoutSessionCommand {
            email: draft.email.to_string(),
            amount: Some(amount),
            correlation_id: Some(draft.correlation_id),
            ..Default::default()
        };
        match self.ports.checkout.handle(cmd).await {
            Ok(session) => {
                self.persist_draft().await?;
                Ok(CheckoutRedirect {
                    session_id: session.session_id,
                    url: session.url,
                })
            }
            Err(e) => {
                self.advance(SubmissionFlowState::NeedsPayment)?;
                self.persist_draft().await?;
                Err(e)
            }
        }
    }

    /// The user closed the payment prompt or came back from a cancelled checkout.
    pub async fn cancel_payment(&mut self) -> Result<(), GateError> {
        self.advance(SubmissionFlowState::NeedsPayment)?;
        self.persist_draft().await
    }

    /// Rebuilds the post-checkout state from the server-side pending record.
    pub async fn resume_from_redirect(
        &mut self,
        correlation_id: CorrelationId,
    ) -> Result<SubmissionFlowState, GateError> {
        let pending = self.ports.pending.find(correlation_id).await?.ok_or_else(|| {
            GateError::not_found(format!("No pending submission for {}", correlation_id))
        })?;

        self.state = SubmissionFlowState::PaymentModalOpen;
        self.confirmed_payment = None;
        self.draft = Some(ClientDraft {
            correlation_id,
            email: pending.email,
            form_type: pending.form_type,
            flow_state: self.state,
        });
        self.persist_draft().await?;

        tracing::debug!(correlation_id = %correlation_id, "Resumed submission flow after redirect");
        Ok(self.state)
    }

    /// Polls the ledger until the webhook has recorded the payment.
    ///
    /// Returns `None` when the timeout elapses first; the browser may come
    /// back before the provider delivers the webhook.
    pub async fn await_payment_confirmation(&self) -> Result<Option<PaymentId>, GateError> {
        let draft = self.require_draft()?;
        let started = self
            .ports
            .pending
            .find(draft.correlation_id)
            .await?
            .map(|p| p.created_at);

        let polling = &self.settings.polling;
        let deadline = tokio::time::Instant::now() + polling.timeout;
        let mut delay = polling.initial_delay;

        loop {
            let latest = self.ports.ledger.latest_succeeded_for_email(&draft.email).await?;
            if let Some(payment) = latest {
                let after_draft = started
                    .map(|s| !payment.created_at().is_before(&s))
                    .unwrap_or(true);
                if after_draft {
                    return Ok(Some(payment.id()));
                }
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                tracing::info!(
                    correlation_id = %draft.correlation_id,
                    "Payment not confirmed before polling timeout"
                );
                return Ok(None);
            }
            tokio::time::sleep(delay.min(deadline - now)).await;
            delay = (delay * 2).min(polling.max_delay);
        }
    }

    /// Opens the account nudge once the ledger confirms `payment_id`.
    pub async fn on_payment_success(
        &mut self,
        payment_id: PaymentId,
    ) -> Result<AccountNudge, GateError> {
        let email = self.require_draft()?.email.clone();

        let confirmed = self
            .ports
            .ledger
            .find_by_id(payment_id)
            .await?
            .filter(|p| p.is_succeeded() && p.email() == &email);
        if confirmed.is_none() {
            return Err(GateError::not_found(format!(
                "Payment {} is not confirmed for this submission",
                payment_id
            )));
        }

        self.advance(SubmissionFlowState::PaymentSuccess)?;
        self.advance(SubmissionFlowState::AccountNudgeOpen)?;
        self.confirmed_payment = Some(payment_id);
        self.persist_draft().await?;

        let payment_param = payment_id.to_string();
        let signup_path = BlockReason::AccountRequired {
            email: email.clone(),
        }
        .signup_path_with(&self.settings.signup_path, &[("paymentId", &payment_param)]);

        Ok(AccountNudge {
            signup_path,
            email,
            payment_id,
        })
    }

    /// Closes the nudge and blocks gated forms on this device until signup.
    pub async fn on_skip_account(&mut self) -> Result<(), GateError> {
        let email = self.require_draft()?.email.clone();
        self.advance(SubmissionFlowState::Skipped)?;

        let mut access = self.ports.client_store.load_access_state(&self.namespace).await?;
        access.mark_paid_pending_account(email);
        self.ports
            .client_store
            .save_access_state(&self.namespace, &access)
            .await?;

        self.finish().await
    }

    /// Links the new account to the payment and lifts the account requirement.
    pub async fn on_account_created(&mut self, account_id: AccountId) -> Result<(), GateError> {
        let email = self.require_draft()?.email.clone();
        // Validate before linking anything.
        self.state.transition_to(SubmissionFlowState::AccountCreated)?;

        let payment_id = match self.confirmed_payment {
            Some(id) => id,
            None => self
                .ports
                .ledger
                .latest_succeeded_for_email(&email)
                .await?
                .map(|p| p.id())
                .ok_or_else(|| GateError::not_found("No confirmed payment to link"))?,
        };

        self.ports.accounts.link_payment(&account_id, payment_id).await?;
        self.advance(SubmissionFlowState::AccountCreated)?;

        let mut access = self.ports.client_store.load_access_state(&self.namespace).await?;
        access.mark_account_created();
        self.ports
            .client_store
            .save_access_state(&self.namespace, &access)
            .await?;

        tracing::info!(
            account_id = %account_id,
            payment_id = %payment_id,
            "Account linked to payment"
        );
        self.finish().await
    }

    async fn finish(&mut self) -> Result<(), GateError> {
        self.advance(SubmissionFlowState::Complete)?;
        self.draft = None;
        self.confirmed_payment = None;
        self.ports
            .client_store
            .remove(&self.namespace, SUBMISSION_DRAFT_KEY)
            .await?;
        Ok(())
    }

    /// Runs the form-access guard for this device before anything is stored.
    async fn check_access(
        &self,
        account_id: Option<&AccountId>,
    ) -> Result<Result<AllowReason, BlockReason>, GateError> {
        let guard = EvaluateFormAccessHandler::new(
            self.ports.client_store.clone(),
            self.ports.accounts.clone(),
            self.ports.ledger.clone(),
        );
        let view = guard
            .handle(EvaluateFormAccessQuery {
                namespace: self.namespace.clone(),
                account_id: account_id.cloned(),
            })
            .await?;
        Ok(view.decision.into_result())
    }

    fn advance(&mut self, next: SubmissionFlowState) -> Result<(), GateError> {
        self.state = self.state.transition_to(next)?;
        if let Some(draft) = self.draft.as_mut() {
            draft.flow_state = self.state;
        }
        Ok(())
    }

    fn require_draft(&self) -> Result<&ClientDraft, GateError> {
        self.draft
            .as_ref()
            .ok_or_else(|| GateError::not_found("No submission is waiting for payment"))
    }

    async fn persist_draft(&self) -> Result<(), GateError> {
        if let Some(draft) = &self.draft {
            self.ports.client_store.save_draft(&self.namespace, draft).await?;
        }
        Ok(())
    }
}
