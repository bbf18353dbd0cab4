use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use farewatch_curate::CuratedDeal;

/// Flat savings estimate used on public entries: the true "normal
/// price" isn't always available, so the original fare is assumed to
/// be twice the deal price. A documented approximation.
pub const ESTIMATED_SAVINGS_PCT: u8 = 50;

/// Public, SEO-facing projection of a published deal. Created once by
/// the archive publisher and never mutated (only counted in stats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub id: Uuid,
    pub slug: String,
    pub origin: String,
    pub destination_city: String,
    pub destination_country: String,
    pub price: f64,
    pub currency: String,
    pub departure_date: NaiveDate,
    pub savings_pct: u8,
    /// How long the deal lived before expiring, curation to expiry
    pub hours_active: i64,
    pub meta_title: String,
    pub meta_description: String,
    pub published_at: DateTime<Utc>,
}

impl ArchiveEntry {
    /// Build the projection for a deal that just transitioned to
    /// published. Expects an expired lifecycle; the publisher proves
    /// that before calling.
    pub fn project(deal: &CuratedDeal, slug: String, published_at: DateTime<Utc>) -> Self {
        let hours_active = deal
            .lifecycle
            .expired_at()
            .map(|expired| (expired - deal.lifecycle.curated_at()).num_hours())
            .unwrap_or(0);

        let meta_title = format!(
            "{} to {} for ${:.0} round trip",
            deal.deal.origin, deal.deal.destination.city, deal.deal.price
        );
        let meta_description = format!(
            "We found {} to {} for ${:.0} round trip on {} — about {}% below the usual fare. \
             Deals like this go out to subscribers the moment we spot them.",
            deal.deal.origin,
            deal.deal.destination.city,
            deal.deal.price,
            deal.deal.airline,
            ESTIMATED_SAVINGS_PCT
        );

        Self {
            id: Uuid::new_v4(),
            slug,
            origin: deal.deal.origin.clone(),
            destination_city: deal.deal.destination.city.clone(),
            destination_country: deal.deal.destination.country.clone(),
            price: deal.deal.price,
            currency: deal.deal.currency.clone(),
            departure_date: deal.deal.departure_date,
            savings_pct: ESTIMATED_SAVINGS_PCT,
            hours_active,
            meta_title,
            meta_description,
            published_at,
        }
    }
}
