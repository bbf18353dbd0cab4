use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Instant,
    Digest,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Instant => f.write_str("instant"),
            Channel::Digest => f.write_str("digest"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instant" => Ok(Channel::Instant),
            "digest" => Ok(Channel::Digest),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

/// Proof that a deal reached a recipient. Append-only; at most one per
/// (recipient, deal key) regardless of channel: once delivered by any
/// channel, the deal is permanently "seen" by that recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub recipient_id: Uuid,
    pub deal_key: String,
    pub channel: Channel,
    pub sent_at: DateTime<Utc>,
}

/// The single source of truth for deduplication. No component caches
/// its answers across runs.
#[async_trait]
pub trait DeliveryLedger: Send + Sync {
    async fn is_delivered(
        &self,
        recipient_id: Uuid,
        deal_key: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn record(
        &self,
        record: &DeliveryRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Aggregate read: has this deal reached anyone at all. Computed on
    /// demand instead of a stored per-deal flag so the two can't drift.
    async fn any_delivered(
        &self,
        deal_key: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
