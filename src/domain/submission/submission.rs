//! Form submission entity.

use crate::domain::foundation::{
    EmailAddress, StateMachine, SubmissionId, Timestamp, ValidationError,
};

use super::{FormPayload, FormType, SubmissionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    id: SubmissionId,
    email: EmailAddress,
    payload: FormPayload,
    status: SubmissionStatus,
    created_at: Timestamp,
}

impl FormSubmission {
    /// A submission that needs no payment: free tier or already covered.
    pub fn accepted(email: EmailAddress, payload: FormPayload) -> Self {
        Self::create(email, payload, SubmissionStatus::Pending)
    }

    /// A submission held until a payment for `email` is confirmed.
    pub fn awaiting_payment(email: EmailAddress, payload: FormPayload) -> Self {
        Self::create(email, payload, SubmissionStatus::PendingPayment)
    }

    fn create(email: EmailAddress, payload: FormPayload, status: SubmissionStatus) -> Self {
        Self {
            id: SubmissionId::new(),
            email,
            payload,
            status,
            created_at: Timestamp::now(),
        }
    }

    pub fn reconstitute(
        id: SubmissionId,
        email: EmailAddress,
        payload: FormPayload,
        status: SubmissionStatus,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            payload,
            status,
            created_at,
        }
    }

    /// Moves a `pending_payment` submission to `pending`.
    pub fn promote(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(SubmissionStatus::Pending)?;
        Ok(())
    }

    pub fn expire(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(SubmissionStatus::Expired)?;
        Ok(())
    }

    pub fn mark_submitted(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(SubmissionStatus::Submitted)?;
        Ok(())
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn form_type(&self) -> FormType {
        self.payload.form_type()
    }

    pub fn payload(&self) -> &FormPayload {
        &self.payload
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn is_awaiting_payment(&self) -> bool {
        self.status == SubmissionStatus::PendingPayment
    }
}
