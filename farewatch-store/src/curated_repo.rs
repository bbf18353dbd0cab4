use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use farewatch_core::deal::{Destination, RawDeal};
use farewatch_core::scorer::ScoreBreakdown;
use farewatch_curate::{CuratedDeal, CuratedDealStore, CurationSource, Lifecycle, Tier};

pub struct PgCuratedDeals {
    pool: PgPool,
}

impl PgCuratedDeals {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CuratedDealRow {
    id: Uuid,
    deal_key: String,
    raw_deal_id: Uuid,
    origin: String,
    destination_city: String,
    airport_code: String,
    country: String,
    price: f64,
    currency: String,
    departure_date: NaiveDate,
    return_date: NaiveDate,
    airline: String,
    stops: i32,
    duration_hours: f64,
    observed_at: DateTime<Utc>,
    score: i32,
    breakdown: serde_json::Value,
    tier: String,
    description: String,
    source: String,
    status: String,
    curated_at: DateTime<Utc>,
    expired_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
    instant_alert_sent_at: Option<DateTime<Utc>>,
}

impl CuratedDealRow {
    fn into_domain(self) -> Result<CuratedDeal, Box<dyn std::error::Error + Send + Sync>> {
        let lifecycle = match self.status.as_str() {
            "active" => Lifecycle::Active {
                curated_at: self.curated_at,
            },
            "expired" => Lifecycle::Expired {
                curated_at: self.curated_at,
                expired_at: self
                    .expired_at
                    .ok_or_else(|| format!("deal {} is expired without expired_at", self.id))?,
            },
            "published" => Lifecycle::Published {
                curated_at: self.curated_at,
                expired_at: self
                    .expired_at
                    .ok_or_else(|| format!("deal {} is published without expired_at", self.id))?,
                published_at: self
                    .published_at
                    .ok_or_else(|| format!("deal {} is published without published_at", self.id))?,
            },
            other => return Err(format!("deal {} has unknown status {}", self.id, other).into()),
        };

        let tier: Tier = self.tier.parse()?;
        let source: CurationSource = self.source.parse()?;
        let breakdown: ScoreBreakdown = serde_json::from_value(self.breakdown)?;

        Ok(CuratedDeal {
            id: self.id,
            deal_key: self.deal_key,
            deal: RawDeal {
                id: self.raw_deal_id,
                origin: self.origin,
                destination: Destination {
                    city: self.destination_city,
                    airport_code: self.airport_code,
                    country: self.country,
                },
                price: self.price,
                currency: self.currency,
                departure_date: self.departure_date,
                return_date: self.return_date,
                airline: self.airline,
                stops: self.stops.max(0) as u32,
                duration_hours: self.duration_hours,
                observed_at: self.observed_at,
            },
            score: self.score.clamp(0, 100) as u8,
            breakdown,
            tier,
            description: self.description,
            source,
            lifecycle,
            instant_alert_sent_at: self.instant_alert_sent_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, deal_key, raw_deal_id, origin, destination_city, airport_code, country,
           price, currency, departure_date, return_date, airline, stops, duration_hours,
           observed_at, score, breakdown, tier, description, source, status,
           curated_at, expired_at, published_at, instant_alert_sent_at
    FROM curated_deals
"#;

#[async_trait]
impl CuratedDealStore for PgCuratedDeals {
    async fn insert(
        &self,
        deal: &CuratedDeal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let breakdown = serde_json::to_value(deal.breakdown)?;

        sqlx::query(
            r#"
            INSERT INTO curated_deals
                (id, deal_key, raw_deal_id, origin, destination_city, airport_code, country,
                 price, currency, departure_date, return_date, airline, stops, duration_hours,
                 observed_at, score, breakdown, tier, description, source, status,
                 curated_at, expired_at, published_at, instant_alert_sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            "#,
        )
        .bind(deal.id)
        .bind(&deal.deal_key)
        .bind(deal.deal.id)
        .bind(&deal.deal.origin)
        .bind(&deal.deal.destination.city)
        .bind(&deal.deal.destination.airport_code)
        .bind(&deal.deal.destination.country)
        .bind(deal.deal.price)
        .bind(&deal.deal.currency)
        .bind(deal.deal.departure_date)
        .bind(deal.deal.return_date)
        .bind(&deal.deal.airline)
        .bind(deal.deal.stops as i32)
        .bind(deal.deal.duration_hours)
        .bind(deal.deal.observed_at)
        .bind(i32::from(deal.score))
        .bind(breakdown)
        .bind(deal.tier.as_str())
        .bind(&deal.description)
        .bind(deal.source.as_str())
        .bind(deal.lifecycle.status_str())
        .bind(deal.lifecycle.curated_at())
        .bind(deal.lifecycle.expired_at())
        .bind(deal.lifecycle.published_at())
        .bind(deal.instant_alert_sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(
        &self,
        deal_key: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM curated_deals WHERE deal_key = $1)")
            .bind(deal_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>(0))
    }

    async fn mark_instant_alert(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE curated_deals
            SET instant_alert_sent_at = $2
            WHERE id = $1 AND instant_alert_sent_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_active(
        &self,
    ) -> Result<Vec<CuratedDeal>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("{} WHERE status = 'active'", SELECT_COLUMNS);
        let rows = sqlx::query_as::<_, CuratedDealRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CuratedDealRow::into_domain).collect()
    }

    async fn list_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CuratedDeal>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            "{} WHERE status = 'expired' AND expired_at <= $1",
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, CuratedDealRow>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CuratedDealRow::into_domain).collect()
    }

    async fn transition(
        &self,
        id: Uuid,
        lifecycle: &Lifecycle,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE curated_deals
            SET status = $2, expired_at = $3, published_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(lifecycle.status_str())
        .bind(lifecycle.expired_at())
        .bind(lifecycle.published_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
