use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::Row;

use farewatch_archive::{ArchiveEntry, ArchiveStore};

/// Archive entry store. The unique index on slug backs the collision
/// check with a hard guarantee.
pub struct PgArchive {
    pool: PgPool,
}

impl PgArchive {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveStore for PgArchive {
    async fn slug_exists(
        &self,
        slug: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM archive_entries WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>(0))
    }

    async fn insert(
        &self,
        entry: &ArchiveEntry,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO archive_entries
                (id, slug, origin, destination_city, destination_country, price, currency,
                 departure_date, savings_pct, hours_active, meta_title, meta_description,
                 published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.slug)
        .bind(&entry.origin)
        .bind(&entry.destination_city)
        .bind(&entry.destination_country)
        .bind(entry.price)
        .bind(&entry.currency)
        .bind(entry.departure_date)
        .bind(i32::from(entry.savings_pct))
        .bind(entry.hours_active)
        .bind(&entry.meta_title)
        .bind(&entry.meta_description)
        .bind(entry.published_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn published_count_since(
        &self,
        origin: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT COUNT(*) FROM archive_entries WHERE origin = $1 AND published_at >= $2",
        )
        .bind(origin)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>(0).max(0) as u64)
    }
}
