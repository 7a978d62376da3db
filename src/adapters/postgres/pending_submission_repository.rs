//! PostgreSQL implementation of PendingSubmissionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CorrelationId, DomainError, EmailAddress, ErrorCode, SubmissionId, Timestamp, ValidationError,
};
use crate::domain::submission::{FormType, PendingSubmission};
use crate::ports::PendingSubmissionRepository;

pub struct PostgresPendingSubmissionRepository {
    pool: PgPool,
}

impl PostgresPendingSubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    correlation_id: Uuid,
    email: String,
    form_type: String,
    submission_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<PendingRow> for PendingSubmission {
    type Error = DomainError;

    fn try_from(row: PendingRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: ValidationError| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!(
                    "Invalid {} in pending_submissions row {}: {}",
                    field, row.correlation_id, e
                ),
            )
        };

        Ok(PendingSubmission {
            correlation_id: CorrelationId::from_uuid(row.correlation_id),
            email: EmailAddress::parse(&row.email).map_err(|e| corrupt("email", e))?,
            form_type: row
                .form_type
                .parse::<FormType>()
                .map_err(|e| corrupt("form_type", e))?,
            submission_id: SubmissionId::from_uuid(row.submission_id),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl PendingSubmissionRepository for PostgresPendingSubmissionRepository {
    async fn save(&self, pending: &PendingSubmission) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO pending_submissions (correlation_id, email, form_type, submission_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (correlation_id) DO NOTHING
            "#,
        )
        .bind(pending.correlation_id.as_uuid())
        .bind(pending.email.as_str())
        .bind(pending.form_type.as_str())
        .bind(pending.submission_id.as_uuid())
        .bind(pending.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save pending submission", e))?;

        Ok(())
    }

    async fn find(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<PendingSubmission>, DomainError> {
        let row: Option<PendingRow> = sqlx::query_as(
            r#"
            SELECT correlation_id, email, form_type, submission_id, created_at
            FROM pending_submissions
            WHERE correlation_id = $1
            "#,
        )
        .bind(correlation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load pending submission", e))?;

        row.map(PendingSubmission::try_from).transpose()
    }

    async fn delete(&self, correlation_id: CorrelationId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM pending_submissions WHERE correlation_id = $1")
            .bind(correlation_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete pending submission", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM pending_submissions WHERE created_at < $1")
            .bind(cutoff.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to purge pending submissions", e))?;

        Ok(result.rows_affected())
    }
}
