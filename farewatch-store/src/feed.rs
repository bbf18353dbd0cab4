use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use farewatch_core::deal::{Destination, RawDeal};
use farewatch_core::feed::DealFeed;

/// Reads fresh observations out of the ingestion feed's landing table.
pub struct PgDealFeed {
    pool: PgPool,
    freshness_hours: i32,
}

impl PgDealFeed {
    pub fn new(pool: PgPool, freshness_hours: i32) -> Self {
        Self {
            pool,
            freshness_hours,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RawDealRow {
    id: Uuid,
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
}

impl From<RawDealRow> for RawDeal {
    fn from(row: RawDealRow) -> Self {
        RawDeal {
            id: row.id,
            origin: row.origin,
            destination: Destination {
                city: row.destination_city,
                airport_code: row.airport_code,
                country: row.country,
            },
            price: row.price,
            currency: row.currency,
            departure_date: row.departure_date,
            return_date: row.return_date,
            airline: row.airline,
            stops: row.stops.max(0) as u32,
            duration_hours: row.duration_hours,
            observed_at: row.observed_at,
        }
    }
}

#[async_trait]
impl DealFeed for PgDealFeed {
    async fn pending_deals(
        &self,
        locale: &str,
    ) -> Result<Vec<RawDeal>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, RawDealRow>(
            r#"
            SELECT id, origin, destination_city, airport_code, country, price, currency,
                   departure_date, return_date, airline, stops, duration_hours, observed_at
            FROM raw_deals
            WHERE origin = $1
              AND observed_at >= NOW() - make_interval(hours => $2)
            ORDER BY observed_at DESC
            "#,
        )
        .bind(locale)
        .bind(self.freshness_hours)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RawDeal::from).collect())
    }
}
