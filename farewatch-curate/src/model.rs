use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use farewatch_core::scorer::{ScoreBreakdown, ScoredDeal};
use farewatch_core::RawDeal;

/// Curation-assigned urgency. Exceptional drives the instant channel;
/// Good and Notable feed the batched digest. Ordering is urgency rank
/// (Exceptional first), which the archive sampler relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Exceptional,
    Good,
    Notable,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Exceptional => "exceptional",
            Tier::Good => "good",
            Tier::Notable => "notable",
        }
    }

    pub fn is_instant(&self) -> bool {
        matches!(self, Tier::Exceptional)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exceptional" => Ok(Tier::Exceptional),
            "good" => Ok(Tier::Good),
            "notable" => Ok(Tier::Notable),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct UnknownTier(pub String);

/// Where the tier/description came from, flagged so fallback volume can
/// be monitored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationSource {
    Classifier,
    Fallback,
}

impl CurationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurationSource::Classifier => "classifier",
            CurationSource::Fallback => "fallback",
        }
    }
}

impl FromStr for CurationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classifier" => Ok(CurationSource::Classifier),
            "fallback" => Ok(CurationSource::Fallback),
            other => Err(format!("unknown curation source: {}", other)),
        }
    }
}

/// Deal lifecycle. Each state carries the timestamps that prove how it
/// got there, so a backward transition has no representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Lifecycle {
    Active {
        curated_at: DateTime<Utc>,
    },
    Expired {
        curated_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
    },
    Published {
        curated_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
        published_at: DateTime<Utc>,
    },
}

impl Lifecycle {
    pub fn active(curated_at: DateTime<Utc>) -> Self {
        Lifecycle::Active { curated_at }
    }

    /// active -> expired; anything else is illegal
    pub fn expire(self, at: DateTime<Utc>) -> Result<Self, TransitionError> {
        match self {
            Lifecycle::Active { curated_at } => Ok(Lifecycle::Expired {
                curated_at,
                expired_at: at,
            }),
            other => Err(TransitionError::NotActive(other.status_str())),
        }
    }

    /// expired -> published; published is terminal
    pub fn publish(self, at: DateTime<Utc>) -> Result<Self, TransitionError> {
        match self {
            Lifecycle::Expired {
                curated_at,
                expired_at,
            } => Ok(Lifecycle::Published {
                curated_at,
                expired_at,
                published_at: at,
            }),
            other => Err(TransitionError::NotExpired(other.status_str())),
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            Lifecycle::Active { .. } => "active",
            Lifecycle::Expired { .. } => "expired",
            Lifecycle::Published { .. } => "published",
        }
    }

    pub fn curated_at(&self) -> DateTime<Utc> {
        match self {
            Lifecycle::Active { curated_at }
            | Lifecycle::Expired { curated_at, .. }
            | Lifecycle::Published { curated_at, .. } => *curated_at,
        }
    }

    pub fn expired_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active { .. } => None,
            Lifecycle::Expired { expired_at, .. }
            | Lifecycle::Published { expired_at, .. } => Some(*expired_at),
        }
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Published { published_at, .. } => Some(*published_at),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot expire a deal in state {0}")]
    NotActive(&'static str),

    #[error("cannot publish a deal in state {0}")]
    NotExpired(&'static str),
}

/// A scored deal the curator decided is worth telling humans about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedDeal {
    pub id: Uuid,
    pub deal_key: String,
    pub deal: RawDeal,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub tier: Tier,
    pub description: String,
    pub source: CurationSource,
    pub lifecycle: Lifecycle,
    pub instant_alert_sent_at: Option<DateTime<Utc>>,
}

impl CuratedDeal {
    pub fn new(
        scored: &ScoredDeal,
        tier: Tier,
        description: String,
        source: CurationSource,
        curated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deal_key: scored.deal.deal_key(),
            deal: scored.deal.clone(),
            score: scored.score(),
            breakdown: scored.breakdown,
            tier,
            description,
            source,
            lifecycle: Lifecycle::active(curated_at),
            instant_alert_sent_at: None,
        }
    }
}
