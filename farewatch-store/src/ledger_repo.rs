use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use farewatch_dispatch::{DeliveryLedger, DeliveryRecord};

/// Append-only delivery ledger. The primary key on (recipient_id,
/// deal_key) enforces the at-most-once invariant at the store level
/// too; the insert is a no-op on conflict so retried runs stay
/// idempotent.
pub struct PgDeliveryLedger {
    pool: PgPool,
}

impl PgDeliveryLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLedger for PgDeliveryLedger {
    async fn is_delivered(
        &self,
        recipient_id: Uuid,
        deal_key: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM delivery_records WHERE recipient_id = $1 AND deal_key = $2)",
        )
        .bind(recipient_id)
        .bind(deal_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<bool, _>(0))
    }

    async fn record(
        &self,
        record: &DeliveryRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO delivery_records (recipient_id, deal_key, channel, sent_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (recipient_id, deal_key) DO NOTHING
            "#,
        )
        .bind(record.recipient_id)
        .bind(&record.deal_key)
        .bind(record.channel.to_string())
        .bind(record.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn any_delivered(
        &self,
        deal_key: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM delivery_records WHERE deal_key = $1)")
            .bind(deal_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>(0))
    }
}
