//! PostgreSQL implementation of SubmissionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, EmailAddress, ErrorCode, SubmissionId, Timestamp, ValidationError,
};
use crate::domain::submission::{FormPayload, FormSubmission, SubmissionStatus};
use crate::ports::SubmissionRepository;

pub struct PostgresSubmissionRepository {
    pool: PgPool,
}

impl PostgresSubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    email: String,
    payload: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for FormSubmission {
    type Error = DomainError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: String| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid {} in form_submissions row {}: {}", field, row.id, e),
            )
        };

        let email = EmailAddress::parse(&row.email).map_err(|e| corrupt("email", e.to_string()))?;
        let payload: FormPayload =
            serde_json::from_str(&row.payload).map_err(|e| corrupt("payload", e.to_string()))?;
        let status: SubmissionStatus = row
            .status
            .parse()
            .map_err(|e: ValidationError| corrupt("status", e.to_string()))?;

        Ok(FormSubmission::reconstitute(
            SubmissionId::from_uuid(row.id),
            email,
            payload,
            status,
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepository {
    async fn save(&self, submission: &FormSubmission) -> Result<(), DomainError> {
        let payload = serde_json::to_string(submission.payload()).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize payload: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO form_submissions (id, email, form_type, payload, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4::jsonb, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(submission.id().as_uuid())
        .bind(submission.email().as_str())
        .bind(submission.form_type().as_str())
        .bind(payload)
        .bind(submission.status().as_str())
        .bind(submission.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save submission", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: SubmissionId) -> Result<Option<FormSubmission>, DomainError> {
        let row: Option<SubmissionRow> = sqlx::query_as(
            r#"
            SELECT id, email, payload::text AS payload, status, created_at
            FROM form_submissions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load submission", e))?;

        row.map(FormSubmission::try_from).transpose()
    }

    async fn count_live_for_email(&self, email: &EmailAddress) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM form_submissions WHERE email = $1 AND status <> 'expired'",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count submissions", e))?;

        Ok(count.max(0) as u64)
    }

    async fn promote_awaiting_payment(
        &self,
        email: &EmailAddress,
        paid_at: Timestamp,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE form_submissions
            SET status = 'pending', updated_at = NOW()
            WHERE email = $1 AND status = 'pending_payment' AND created_at <= $2
            "#,
        )
        .bind(email.as_str())
        .bind(paid_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to promote submissions", e))?;

        Ok(result.rows_affected())
    }

    async fn emails_awaiting_payment(&self) -> Result<Vec<EmailAddress>, DomainError> {
        let emails: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT email FROM form_submissions WHERE status = 'pending_payment'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list awaiting submissions", e))?;

        emails
            .iter()
            .map(|e| EmailAddress::parse(e).map_err(DomainError::from))
            .collect()
    }

    async fn expire_awaiting_payment_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<SubmissionId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE form_submissions
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'pending_payment' AND created_at < $1
            RETURNING id
            "#,
        )
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to expire submissions", e))?;

        Ok(ids.into_iter().map(SubmissionId::from_uuid).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(payload: &str, status: &str) -> SubmissionRow {
        SubmissionRow {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            payload: payload.to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }

    const INTAKE: &str = r#"{"formType":"general_intake","payload":{"fullName":"Ada","concern":"help"}}"#;

    #[test]
    fn row_converts_to_submission() {
        let submission = FormSubmission::try_from(row(INTAKE, "pending_payment")).unwrap();
        assert!(submission.is_awaiting_payment());
        assert_eq!(submission.form_type().as_str(), "general_intake");
    }

    #[test]
    fn row_with_bad_payload_is_rejected() {
        let err = FormSubmission::try_from(row("{}", "pending")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        assert!(FormSubmission::try_from(row(INTAKE, "archived")).is_err());
    }
}
