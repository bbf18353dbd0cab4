use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{CuratedDeal, Lifecycle};

/// Persistent store for curated deals: the cross-run source of truth
/// for lifecycle state.
#[async_trait]
pub trait CuratedDealStore: Send + Sync {
    async fn insert(
        &self,
        deal: &CuratedDeal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Whether any curated deal already carries this deal key, in any
    /// lifecycle state. The feed is at-least-once; this is the dedup.
    async fn exists(
        &self,
        deal_key: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn mark_instant_alert(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_active(
        &self,
    ) -> Result<Vec<CuratedDeal>, Box<dyn std::error::Error + Send + Sync>>;

    /// Expired deals whose expiry is at or before the cutoff, i.e. the
    /// cooldown window has fully elapsed.
    async fn list_expired_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CuratedDeal>, Box<dyn std::error::Error + Send + Sync>>;

    /// Persist a lifecycle transition already proven legal in the
    /// domain (see `Lifecycle::expire` / `Lifecycle::publish`).
    async fn transition(
        &self,
        id: Uuid,
        lifecycle: &Lifecycle,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
