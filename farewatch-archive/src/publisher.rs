use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use farewatch_curate::{CuratedDeal, CuratedDealStore};

use crate::entry::ArchiveEntry;
use crate::slug::archive_slug;

/// Sampling and cooldown knobs for the publish sweep.
#[derive(Debug, Clone)]
pub struct ArchivePolicy {
    /// Minimum hours between expiry and archive publication
    pub delay_hours: i64,
    /// Fraction of eligible deals to publish, 0.0-1.0
    pub publish_percentage: f64,
    /// Weekly per-locale floor so quiet locales still accrue archive pages
    pub min_deals_per_locale_per_week: u64,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self {
            delay_hours: 48,
            publish_percentage: 0.10,
            min_deals_per_locale_per_week: 3,
        }
    }
}

/// Persistent store for public archive entries.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    async fn slug_exists(
        &self,
        slug: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn insert(
        &self,
        entry: &ArchiveEntry,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn published_count_since(
        &self,
        origin: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Default, Serialize)]
pub struct ExpireSummary {
    pub scanned: usize,
    pub expired: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct PublishSummary {
    pub candidates: usize,
    pub published: usize,
    pub slug_collisions: usize,
    pub locales: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("store unavailable: {0}")]
    Store(String),
}

impl PublishError {
    fn store(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        PublishError::Store(e.to_string())
    }
}

/// Drives the active -> expired -> published lifecycle. Publishing
/// deliberately samples a minority of expired deals, after a cooldown,
/// to keep the live service's exclusivity intact.
pub struct ArchivePublisher {
    deals: Arc<dyn CuratedDealStore>,
    archive: Arc<dyn ArchiveStore>,
    policy: ArchivePolicy,
}

impl ArchivePublisher {
    pub fn new(
        deals: Arc<dyn CuratedDealStore>,
        archive: Arc<dyn ArchiveStore>,
        policy: ArchivePolicy,
    ) -> Self {
        Self {
            deals,
            archive,
            policy,
        }
    }

    /// active -> expired for every deal whose travel date has passed.
    pub async fn expire_sweep(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ExpireSummary, PublishError> {
        let active = self.deals.list_active().await.map_err(PublishError::store)?;
        let mut summary = ExpireSummary {
            scanned: active.len(),
            ..ExpireSummary::default()
        };

        for deal in active {
            if deal.deal.departure_date >= today {
                continue;
            }
            match deal.lifecycle.expire(now) {
                Ok(lifecycle) => {
                    self.deals
                        .transition(deal.id, &lifecycle)
                        .await
                        .map_err(PublishError::store)?;
                    summary.expired += 1;
                }
                Err(e) => {
                    // list_active returned a non-active row; skip it
                    tracing::error!(deal_key = %deal.deal_key, error = %e, "illegal expire transition");
                }
            }
        }

        Ok(summary)
    }

    /// expired -> published for the sampled top slice of each locale,
    /// once the cooldown has elapsed. Slug collisions are skipped, not
    /// retried with a suffix; the deal stays expired for the next run.
    pub async fn publish_sweep(&self, now: DateTime<Utc>) -> Result<PublishSummary, PublishError> {
        let cutoff = now - Duration::hours(self.policy.delay_hours);
        let eligible = self
            .deals
            .list_expired_before(cutoff)
            .await
            .map_err(PublishError::store)?;

        let mut summary = PublishSummary {
            candidates: eligible.len(),
            ..PublishSummary::default()
        };

        let mut by_locale: HashMap<String, Vec<CuratedDeal>> = HashMap::new();
        for deal in eligible {
            by_locale.entry(deal.deal.origin.clone()).or_default().push(deal);
        }
        summary.locales = by_locale.len();

        for (locale, mut deals) in by_locale {
            // exceptional-first, then by score
            deals.sort_by(|a, b| a.tier.cmp(&b.tier).then(b.score.cmp(&a.score)));

            let quota = self.locale_quota(&locale, deals.len(), now).await?;

            for deal in deals.into_iter().take(quota) {
                let slug = archive_slug(&deal);
                if self
                    .archive
                    .slug_exists(&slug)
                    .await
                    .map_err(PublishError::store)?
                {
                    tracing::warn!(slug = %slug, deal_key = %deal.deal_key, "slug collision, skipping this run");
                    summary.slug_collisions += 1;
                    continue;
                }

                let lifecycle = match deal.lifecycle.publish(now) {
                    Ok(lc) => lc,
                    Err(e) => {
                        tracing::error!(deal_key = %deal.deal_key, error = %e, "illegal publish transition");
                        continue;
                    }
                };

                let entry = ArchiveEntry::project(&deal, slug, now);
                self.archive
                    .insert(&entry)
                    .await
                    .map_err(PublishError::store)?;
                self.deals
                    .transition(deal.id, &lifecycle)
                    .await
                    .map_err(PublishError::store)?;
                summary.published += 1;
            }
        }

        Ok(summary)
    }

    /// ceil(candidates x percentage), topped up to the weekly floor for
    /// the locale, never more than the candidates available.
    async fn locale_quota(
        &self,
        locale: &str,
        candidates: usize,
        now: DateTime<Utc>,
    ) -> Result<usize, PublishError> {
        let sampled = (candidates as f64 * self.policy.publish_percentage).ceil() as usize;

        let week_ago = now - Duration::days(7);
        let published_this_week = self
            .archive
            .published_count_since(locale, week_ago)
            .await
            .map_err(PublishError::store)?;
        let floor_topup = self
            .policy
            .min_deals_per_locale_per_week
            .saturating_sub(published_this_week) as usize;

        Ok(sampled.max(floor_topup).min(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use farewatch_core::deal::{Destination, RawDeal};
    use farewatch_core::scorer::{self, ScoredDeal};
    use farewatch_core::ReferenceTables;
    use farewatch_curate::{CurationSource, Lifecycle, Tier};
    use std::sync::Mutex;
    use uuid::Uuid;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()
    }

    fn curated(city: &str, price: f64, tier: Tier, departure: NaiveDate) -> CuratedDeal {
        let deal = RawDeal {
            id: Uuid::new_v4(),
            origin: "new-york".to_string(),
            destination: Destination {
                city: city.to_string(),
                airport_code: "LIS".to_string(),
                country: "Portugal".to_string(),
            },
            price,
            currency: "USD".to_string(),
            departure_date: departure,
            return_date: departure + Duration::days(8),
            airline: "TAP".to_string(),
            stops: 0,
            duration_hours: 7.0,
            observed_at: base_time(),
        };
        let tables = ReferenceTables::builtin();
        let breakdown = scorer::score(&deal, &tables);
        let scored = ScoredDeal { deal, breakdown };
        CuratedDeal::new(
            &scored,
            tier,
            "A perfectly fine description.".to_string(),
            CurationSource::Classifier,
            base_time(),
        )
    }

    #[derive(Default)]
    struct MemoryDeals {
        rows: Mutex<Vec<CuratedDeal>>,
    }

    impl MemoryDeals {
        fn with(deals: Vec<CuratedDeal>) -> Self {
            Self {
                rows: Mutex::new(deals),
            }
        }

        fn status_of(&self, id: Uuid) -> String {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.lifecycle.status_str().to_string())
                .unwrap()
        }
    }

    #[async_trait]
    impl CuratedDealStore for MemoryDeals {
        async fn insert(
            &self,
            deal: &CuratedDeal,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.rows.lock().unwrap().push(deal.clone());
            Ok(())
        }

        async fn exists(
            &self,
            deal_key: &str,
        ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.rows.lock().unwrap().iter().any(|d| d.deal_key == deal_key))
        }

        async fn mark_instant_alert(
            &self,
            id: Uuid,
            at: DateTime<Utc>,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(d) = rows.iter_mut().find(|d| d.id == id) {
                d.instant_alert_sent_at = Some(at);
            }
            Ok(())
        }

        async fn list_active(
            &self,
        ) -> Result<Vec<CuratedDeal>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|d| matches!(d.lifecycle, Lifecycle::Active { .. }))
                .cloned()
                .collect())
        }

        async fn list_expired_before(
            &self,
            cutoff: DateTime<Utc>,
        ) -> Result<Vec<CuratedDeal>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|d| matches!(d.lifecycle, Lifecycle::Expired { expired_at, .. } if expired_at <= cutoff))
                .cloned()
                .collect())
        }

        async fn transition(
            &self,
            id: Uuid,
            lifecycle: &Lifecycle,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(d) = rows.iter_mut().find(|d| d.id == id) {
                d.lifecycle = *lifecycle;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryArchive {
        entries: Mutex<Vec<ArchiveEntry>>,
    }

    #[async_trait]
    impl ArchiveStore for MemoryArchive {
        async fn slug_exists(
            &self,
            slug: &str,
        ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.entries.lock().unwrap().iter().any(|e| e.slug == slug))
        }

        async fn insert(
            &self,
            entry: &ArchiveEntry,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn published_count_since(
            &self,
            origin: &str,
            since: DateTime<Utc>,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.origin == origin && e.published_at >= since)
                .count() as u64)
        }
    }

    fn expired_deal(city: &str, price: f64, tier: Tier, expired_at: DateTime<Utc>) -> CuratedDeal {
        let mut deal = curated(city, price, tier, NaiveDate::from_ymd_opt(2026, 7, 20).unwrap());
        deal.lifecycle = deal.lifecycle.expire(expired_at).unwrap();
        deal
    }

    #[tokio::test]
    async fn test_expire_sweep_moves_departed_deals() {
        let departed = curated("Lisbon", 350.0, Tier::Good, NaiveDate::from_ymd_opt(2026, 7, 20).unwrap());
        let upcoming = curated("Porto", 390.0, Tier::Good, NaiveDate::from_ymd_opt(2026, 9, 20).unwrap());
        let store = Arc::new(MemoryDeals::with(vec![departed.clone(), upcoming.clone()]));
        let archive = Arc::new(MemoryArchive::default());
        let publisher = ArchivePublisher::new(store.clone(), archive, ArchivePolicy::default());

        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let summary = publisher.expire_sweep(today, base_time()).await.unwrap();

        assert_eq!(summary.expired, 1);
        assert_eq!(store.status_of(departed.id), "expired");
        assert_eq!(store.status_of(upcoming.id), "active");
    }

    #[tokio::test]
    async fn test_cooldown_window_gates_publishing() {
        // expired 47h ago: not eligible; 49h ago: eligible
        let now = base_time() + Duration::hours(100);
        let fresh = expired_deal("Lisbon", 350.0, Tier::Good, now - Duration::hours(47));
        let cooled = expired_deal("Porto", 390.0, Tier::Good, now - Duration::hours(49));
        let store = Arc::new(MemoryDeals::with(vec![fresh.clone(), cooled.clone()]));
        let archive = Arc::new(MemoryArchive::default());
        let publisher = ArchivePublisher::new(store.clone(), archive, ArchivePolicy::default());

        let summary = publisher.publish_sweep(now).await.unwrap();

        assert_eq!(summary.candidates, 1);
        assert_eq!(summary.published, 1);
        assert_eq!(store.status_of(fresh.id), "expired");
        assert_eq!(store.status_of(cooled.id), "published");
    }

    #[tokio::test]
    async fn test_publish_delay_invariant() {
        let now = base_time() + Duration::hours(200);
        let deals: Vec<CuratedDeal> = (0..6)
            .map(|i| expired_deal("Lisbon", 300.0 + f64::from(i) * 30.0, Tier::Good, now - Duration::hours(44 + 2 * i64::from(i))))
            .collect();
        let store = Arc::new(MemoryDeals::with(deals));
        let archive = Arc::new(MemoryArchive::default());
        let publisher = ArchivePublisher::new(store.clone(), archive, ArchivePolicy::default());

        publisher.publish_sweep(now).await.unwrap();

        let delay = Duration::hours(ArchivePolicy::default().delay_hours);
        for row in store.rows.lock().unwrap().iter() {
            if let (Some(published_at), Some(expired_at)) =
                (row.lifecycle.published_at(), row.lifecycle.expired_at())
            {
                assert!(published_at - expired_at >= delay);
            }
        }
    }

    #[tokio::test]
    async fn test_sampling_quota_and_weekly_floor() {
        let now = base_time() + Duration::hours(300);
        let deals: Vec<CuratedDeal> = (0..20)
            .map(|i| expired_deal("Lisbon", 300.0 + f64::from(i) * 10.0, Tier::Good, now - Duration::hours(60)))
            .collect();
        let store = Arc::new(MemoryDeals::with(deals));
        let archive = Arc::new(MemoryArchive::default());
        let policy = ArchivePolicy::default();
        let publisher = ArchivePublisher::new(store, archive.clone(), policy);

        let summary = publisher.publish_sweep(now).await.unwrap();

        // ceil(20 x 0.10) = 2, weekly floor tops it up to 3
        assert_eq!(summary.published, 3);
    }

    #[tokio::test]
    async fn test_sampling_quota_without_floor() {
        let now = base_time() + Duration::hours(300);
        let deals: Vec<CuratedDeal> = (0..15)
            .map(|i| expired_deal("Lisbon", 300.0 + f64::from(i) * 10.0, Tier::Good, now - Duration::hours(60)))
            .collect();
        let store = Arc::new(MemoryDeals::with(deals));
        let archive = Arc::new(MemoryArchive::default());
        let policy = ArchivePolicy {
            min_deals_per_locale_per_week: 0,
            ..ArchivePolicy::default()
        };
        let publisher = ArchivePublisher::new(store, archive, policy);

        let summary = publisher.publish_sweep(now).await.unwrap();

        // ceil(15 x 0.10) = 2 with no floor in play
        assert_eq!(summary.published, 2);
    }

    #[tokio::test]
    async fn test_exceptional_published_first() {
        let now = base_time() + Duration::hours(300);
        let good = expired_deal("Porto", 250.0, Tier::Good, now - Duration::hours(60));
        let exceptional = expired_deal("Lisbon", 500.0, Tier::Exceptional, now - Duration::hours(60));
        let store = Arc::new(MemoryDeals::with(vec![good.clone(), exceptional.clone()]));
        let archive = Arc::new(MemoryArchive::default());
        let policy = ArchivePolicy {
            min_deals_per_locale_per_week: 1,
            ..ArchivePolicy::default()
        };
        let publisher = ArchivePublisher::new(store.clone(), archive, policy);

        let summary = publisher.publish_sweep(now).await.unwrap();
        assert_eq!(summary.published, 1);
        assert_eq!(store.status_of(exceptional.id), "published");
        assert_eq!(store.status_of(good.id), "expired");
    }

    #[tokio::test]
    async fn test_slug_collision_skipped_and_reconsidered() {
        let now = base_time() + Duration::hours(300);
        let deal = expired_deal("Lisbon", 350.0, Tier::Good, now - Duration::hours(60));
        let store = Arc::new(MemoryDeals::with(vec![deal.clone()]));
        let archive = Arc::new(MemoryArchive::default());

        // seed an entry occupying the same slug
        let taken = ArchiveEntry::project(&deal, archive_slug(&deal), now - Duration::days(30));
        archive.insert(&taken).await.unwrap();

        let publisher = ArchivePublisher::new(store.clone(), archive.clone(), ArchivePolicy::default());
        let summary = publisher.publish_sweep(now).await.unwrap();

        assert_eq!(summary.slug_collisions, 1);
        assert_eq!(summary.published, 0);
        // still expired: reconsidered on the next run
        assert_eq!(store.status_of(deal.id), "expired");
        assert_eq!(archive.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_two_entries_share_a_slug() {
        let now = base_time() + Duration::hours(300);
        // identical route/price/date: identical slug
        let a = expired_deal("Lisbon", 350.0, Tier::Good, now - Duration::hours(60));
        let b = expired_deal("Lisbon", 350.0, Tier::Good, now - Duration::hours(70));
        let store = Arc::new(MemoryDeals::with(vec![a, b]));
        let archive = Arc::new(MemoryArchive::default());
        let publisher = ArchivePublisher::new(store, archive.clone(), ArchivePolicy::default());

        let summary = publisher.publish_sweep(now).await.unwrap();

        assert_eq!(summary.published, 1);
        assert_eq!(summary.slug_collisions, 1);
        let entries = archive.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
    }
}
