use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Width of the price bucket used in deal keys. Two observations of the
/// same route whose prices land in the same bucket are the same deal.
pub const PRICE_BUCKET_USD: f64 = 50.0;

/// Destination of a fare observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub city: String,
    pub airport_code: String,
    pub country: String,
}

/// A raw flight-price observation from the ingestion feed.
/// Immutable once ingested; identified by `deal_key()` for dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDeal {
    pub id: Uuid,
    /// Departure locale slug, e.g. "new-york"
    pub origin: String,
    pub destination: Destination,
    /// Round-trip price
    pub price: f64,
    pub currency: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub airline: String,
    pub stops: u32,
    /// Outbound flight duration
    pub duration_hours: f64,
    pub observed_at: DateTime<Utc>,
}

impl RawDeal {
    pub fn trip_length_days(&self) -> i64 {
        (self.return_date - self.departure_date).num_days()
    }

    /// Stable dedup identity: locale + destination + dates + price bucket.
    /// The feed is at-least-once, so everything downstream keys on this.
    pub fn deal_key(&self) -> String {
        let bucket = (self.price / PRICE_BUCKET_USD).round() as i64 * PRICE_BUCKET_USD as i64;
        format!(
            "{}:{}:{}:{}:{}",
            self.origin,
            self.destination.airport_code.to_lowercase(),
            self.departure_date,
            self.return_date,
            bucket
        )
    }

    pub fn route(&self) -> String {
        format!(
            "{} -> {} ({})",
            self.origin, self.destination.city, self.destination.airport_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observation(price: f64) -> RawDeal {
        RawDeal {
            id: Uuid::new_v4(),
            origin: "new-york".to_string(),
            destination: Destination {
                city: "Tokyo".to_string(),
                airport_code: "NRT".to_string(),
                country: "Japan".to_string(),
            },
            price,
            currency: "USD".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            airline: "ANA".to_string(),
            stops: 0,
            duration_hours: 14.0,
            observed_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_deal_key_buckets_nearby_prices() {
        // 493 and 507 both round to the 500 bucket
        assert_eq!(observation(493.0).deal_key(), observation(507.0).deal_key());
        // 520 rounds to 500, 530 rounds to 550
        assert_ne!(observation(520.0).deal_key(), observation(530.0).deal_key());
    }

    #[test]
    fn test_deal_key_is_stable_across_observations() {
        let a = observation(612.0);
        let mut b = observation(612.0);
        b.id = Uuid::new_v4();
        b.observed_at = Utc.with_ymd_and_hms(2026, 8, 2, 9, 30, 0).unwrap();
        assert_eq!(a.deal_key(), b.deal_key());
    }

    #[test]
    fn test_trip_length() {
        assert_eq!(observation(500.0).trip_length_days(), 9);
    }
}
