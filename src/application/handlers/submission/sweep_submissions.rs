//! SweepSubmissionsHandler - Periodic reconciliation of unpaid submissions.
//!
//! Repairs promotions the webhook's detached task failed to apply, then
//! expires submissions whose checkout was abandoned.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::GateError;
use crate::ports::{PaymentLedger, PendingSubmissionRepository, SubmissionRepository};

#[derive(Debug, Clone, Copy)]
pub struct SweepSubmissionsCommand {
    pub now: Timestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub promoted: u64,
    pub expired: u64,
    pub purged_pending: u64,
}

pub struct SweepSubmissionsHandler {
    submissions: Arc<dyn SubmissionRepository>,
    pending: Arc<dyn PendingSubmissionRepository>,
    ledger: Arc<dyn PaymentLedger>,
    ttl_hours: i64,
}

impl SweepSubmissionsHandler {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        pending: Arc<dyn PendingSubmissionRepository>,
        ledger: Arc<dyn PaymentLedger>,
        ttl_hours: i64,
    ) -> Self {
        Self {
            submissions,
            pending,
            ledger,
            ttl_hours,
        }
    }

    pub async fn handle(&self, cmd: SweepSubmissionsCommand) -> Result<SweepReport, GateError> {
        let mut report = SweepReport::default();

        // 1. Promote drift. Runs first so a paid submission is never expired.
        for email in self.submissions.emails_awaiting_payment().await? {
            if let Some(payment) = self.ledger.latest_succeeded_for_email(&email).await? {
                report.promoted += self
                    .submissions
                    .promote_awaiting_payment(&email, payment.created_at())
                    .await?;
            }
        }

        // 2. Expire abandoned checkouts
        let cutoff = cmd.now.minus_hours(self.ttl_hours);
        report.expired = self
            .submissions
            .expire_awaiting_payment_before(cutoff)
            .await?
            .len() as u64;
        report.purged_pending = self.pending.delete_before(cutoff).await?;

        if report != SweepReport::default() {
            tracing::info!(
                promoted = report.promoted,
                expired = report.expired,
                purged_pending = report.purged_pending,
                "Submission sweep applied changes"
            );
        } else {
            tracing::debug!("Submission sweep found nothing to do");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryPaymentLedger, InMemoryPendingSubmissionRepository, InMemorySubmissionRepository,
    };
    use crate::domain::foundation::{Currency, EmailAddress, Money, PaymentId, SubmissionId};
    use crate::domain::payment::{Payment, PaymentMetadata, PaymentStatus};
    use crate::domain::submission::{
        FormPayload, FormSubmission, GeneralIntake, PendingSubmission, SubmissionStatus,
    };

    struct Fixture {
        handler: SweepSubmissionsHandler,
        submissions: InMemorySubmissionRepository,
        pending: InMemoryPendingSubmissionRepository,
        ledger: InMemoryPaymentLedger,
    }

    fn fixture() -> Fixture {
        let submissions = InMemorySubmissionRepository::new();
        let pending = InMemoryPendingSubmissionRepository::new();
        let ledger = InMemoryPaymentLedger::new();
        let handler = SweepSubmissionsHandler::new(
            Arc::new(submissions.clone()),
            Arc::new(pending.clone()),
            Arc::new(ledger.clone()),
            24,
        );
        Fixture {
            handler,
            submissions,
            pending,
            ledger,
        }
    }

    fn email() -> EmailAddress {
        EmailAddress::parse("a@x.com").unwrap()
    }

    fn awaiting(created_at: Timestamp) -> FormSubmission {
        FormSubmission::reconstitute(
            SubmissionId::new(),
            email(),
            FormPayload::GeneralIntake(GeneralIntake {
                full_name: "Ada".to_string(),
                phone: None,
                concern: "help".to_string(),
            }),
            SubmissionStatus::PendingPayment,
            created_at,
        )
    }

    fn payment_at(created_at: Timestamp) -> Payment {
        Payment::reconstitute(
            PaymentId::new(),
            email(),
            "pi_1".to_string(),
            Money::from_minor(49_900, Currency::usd()).unwrap(),
            PaymentStatus::Succeeded,
            created_at,
            PaymentMetadata::default(),
        )
    }

    fn now() -> SweepSubmissionsCommand {
        SweepSubmissionsCommand {
            now: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn repairs_missed_promotion() {
        let f = fixture();
        let t0 = Timestamp::now().minus_hours(1);
        let stuck = awaiting(t0);
        f.submissions.save(&stuck).await.unwrap();
        f.ledger.record(&payment_at(t0.plus_secs(60))).await.unwrap();

        let report = f.handler.handle(now()).await.unwrap();

        assert_eq!(report.promoted, 1);
        let stored = f.submissions.find_by_id(stuck.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SubmissionStatus::Pending);
    }

    #[tokio::test]
    async fn does_not_promote_submissions_after_the_payment() {
        let f = fixture();
        let t0 = Timestamp::now().minus_hours(1);
        f.ledger.record(&payment_at(t0)).await.unwrap();
        let later = awaiting(t0.plus_secs(60));
        f.submissions.save(&later).await.unwrap();

        let report = f.handler.handle(now()).await.unwrap();

        assert_eq!(report.promoted, 0);
        let stored = f.submissions.find_by_id(later.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SubmissionStatus::PendingPayment);
    }

    #[tokio::test]
    async fn expires_abandoned_checkouts_and_their_drafts() {
        let f = fixture();
        let old = Timestamp::now().minus_hours(48);
        let abandoned = awaiting(old);
        f.submissions.save(&abandoned).await.unwrap();

        let mut draft = PendingSubmission::new(email(), abandoned.form_type(), abandoned.id());
        draft.created_at = old;
        f.pending.save(&draft).await.unwrap();

        let report = f.handler.handle(now()).await.unwrap();

        assert_eq!(report.expired, 1);
        assert_eq!(report.purged_pending, 1);
        let stored = f.submissions.find_by_id(abandoned.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SubmissionStatus::Expired);
        assert!(f.pending.find(draft.correlation_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recent_unpaid_submissions_are_left_alone() {
        let f = fixture();
        f.submissions.save(&awaiting(Timestamp::now())).await.unwrap();

        let report = f.handler.handle(now()).await.unwrap();
        assert_eq!(report, SweepReport::default());
    }
}
