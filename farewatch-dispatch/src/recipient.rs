use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientStatus {
    Trial,
    Active,
    Cancelled,
    Expired,
}

impl RecipientStatus {
    /// Trialing and paying subscribers both receive deals
    pub fn is_active(&self) -> bool {
        matches!(self, RecipientStatus::Trial | RecipientStatus::Active)
    }
}

impl fmt::Display for RecipientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecipientStatus::Trial => "trial",
            RecipientStatus::Active => "active",
            RecipientStatus::Cancelled => "cancelled",
            RecipientStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

impl FromStr for RecipientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(RecipientStatus::Trial),
            "active" => Ok(RecipientStatus::Active),
            "cancelled" => Ok(RecipientStatus::Cancelled),
            "expired" => Ok(RecipientStatus::Expired),
            other => Err(format!("unknown recipient status: {}", other)),
        }
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            other => Err(format!("unknown plan tier: {}", other)),
        }
    }
}

/// A subscriber, as seen by the pipeline. Owned by the subscription
/// collaborator; we only read locale + plan + status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: Uuid,
    pub home_locale: String,
    pub plan: PlanTier,
    pub status: RecipientStatus,
}

/// Read-only view into the subscription collaborator's directory.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Departure cities that currently have at least one active recipient
    async fn active_locales(
        &self,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    async fn active_recipients(
        &self,
        locale: &str,
    ) -> Result<Vec<Recipient>, Box<dyn std::error::Error + Send + Sync>>;
}
