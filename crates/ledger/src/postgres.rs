use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Money, NewPaymentRecord, OrderId, PaymentId, PaymentRecord, Result, UserId,
    store::LedgerStore,
};

/// PostgreSQL-backed ledger writing to the `payments` table.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL ledger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: PgRow) -> Result<PaymentRecord> {
        Ok(PaymentRecord {
            id: PaymentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            amount: Money::from_cents(row.try_get("amount_cents")?),
            provider: row.try_get("provider")?,
            receipt_id: row.try_get("receipt_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[tracing::instrument(skip(self, record), fields(order_id = %record.order_id))]
    async fn save(&self, record: NewPaymentRecord) -> Result<PaymentRecord> {
        let record = record.into_record(Utc::now().trunc_subsecs(6));

        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, user_id, amount_cents, provider, receipt_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.order_id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(record.amount.cents())
        .bind(&record.provider)
        .bind(&record.receipt_id)
        .bind(&record.status)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, user_id, amount_cents, provider, receipt_id, status, created_at, updated_at
            FROM payments
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
