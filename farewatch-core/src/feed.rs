use async_trait::async_trait;

use crate::deal::RawDeal;

/// Ingestion-feed collaborator. Delivery is at-least-once; callers dedup
/// by deal key against already-curated deals.
#[async_trait]
pub trait DealFeed: Send + Sync {
    async fn pending_deals(
        &self,
        locale: &str,
    ) -> Result<Vec<RawDeal>, Box<dyn std::error::Error + Send + Sync>>;
}
