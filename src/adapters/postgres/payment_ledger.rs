//! PostgreSQL implementation of PaymentLedger.
//!
//! Idempotency rests on the partial unique index
//! `payments_succeeded_provider_payment_id_key`; inserts use
//! `ON CONFLICT DO NOTHING` and report a skipped row as `AlreadyRecorded`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CorrelationId, Currency, DomainError, EmailAddress, ErrorCode, Money, PaymentId, Timestamp,
};
use crate::domain::payment::{Payment, PaymentMetadata, PaymentStatus};
use crate::ports::{InsertOutcome, PaymentLedger};

pub struct PostgresPaymentLedger {
    pool: PgPool,
}

impl PostgresPaymentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    email: String,
    provider_payment_id: String,
    amount_minor: i64,
    currency: String,
    status: String,
    payment_type: String,
    source_session_id: Option<String>,
    correlation_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: String| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid {} in payments row {}: {}", field, row.id, e),
            )
        };

        let email = EmailAddress::parse(&row.email).map_err(|e| corrupt("email", e.to_string()))?;
        let currency =
            Currency::new(&row.currency).map_err(|e| corrupt("currency", e.to_string()))?;
        let amount = Money::from_minor(row.amount_minor, currency)
            .map_err(|e| corrupt("amount_minor", e.to_string()))?;
        let status = row
            .status
            .parse::<PaymentStatus>()
            .map_err(|e| corrupt("status", e.to_string()))?;

        Ok(Payment::reconstitute(
            PaymentId::from_uuid(row.id),
            email,
            row.provider_payment_id,
            amount,
            status,
            Timestamp::from_datetime(row.created_at),
            PaymentMetadata {
                payment_type: row.payment_type,
                source_session_id: row.source_session_id,
                correlation_id: row.correlation_id.map(CorrelationId::from_uuid),
            },
        ))
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, email, provider_payment_id, amount_minor, currency, status,
           payment_type, source_session_id, correlation_id, created_at
    FROM payments
"#;

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl PaymentLedger for PostgresPaymentLedger {
    async fn record(&self, payment: &Payment) -> Result<InsertOutcome, DomainError> {
        let metadata = payment.metadata();
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, email, provider_payment_id, amount_minor, currency, status,
                payment_type, source_session_id, correlation_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(payment.id().as_uuid())
        .bind(payment.email().as_str())
        .bind(payment.provider_payment_id())
        .bind(payment.amount().minor_units())
        .bind(payment.amount().currency().as_str())
        .bind(payment.status().as_str())
        .bind(&metadata.payment_type)
        .bind(&metadata.source_session_id)
        .bind(metadata.correlation_id.map(|c| *c.as_uuid()))
        .bind(payment.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record payment", e))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyRecorded)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_succeeded_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let sql = format!(
            "{} WHERE provider_payment_id = $1 AND status = 'succeeded'",
            SELECT_COLUMNS
        );
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(provider_payment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn latest_succeeded_for_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Payment>, DomainError> {
        let sql = format!(
            "{} WHERE email = $1 AND status = 'succeeded' ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to query ledger", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn list_for_email(&self, email: &EmailAddress) -> Result<Vec<Payment>, DomainError> {
        let sql = format!("{} WHERE email = $1 ORDER BY created_at DESC", SELECT_COLUMNS);
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql)
            .bind(email.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to query ledger", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn has_succeeded_payment(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM payments WHERE email = $1 AND status = 'succeeded')",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to query ledger", e))?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> PaymentRow {
        PaymentRow {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            provider_payment_id: "pi_1".to_string(),
            amount_minor: 49_900,
            currency: "usd".to_string(),
            status: "succeeded".to_string(),
            payment_type: "consultation".to_string(),
            source_session_id: Some("cs_1".to_string()),
            correlation_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_payment() {
        let payment = Payment::try_from(row()).unwrap();
        assert!(payment.is_succeeded());
        assert_eq!(payment.amount_dollars(), 499);
        assert_eq!(payment.metadata().source_session_id.as_deref(), Some("cs_1"));
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        let mut bad = row();
        bad.status = "refunded".to_string();
        let err = Payment::try_from(bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn row_with_corrupt_email_is_rejected() {
        let mut bad = row();
        bad.email = "nobody".to_string();
        assert!(Payment::try_from(bad).is_err());
    }
}
