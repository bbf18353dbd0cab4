use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use farewatch_curate::CuratedDeal;

use crate::recipient::Recipient;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(String),

    #[error("notification rejected with HTTP {0}")]
    Rejected(u16),
}

/// Notification/email collaborator. The pipeline hands over (recipient,
/// payload, channel) and gets success/failure; rendering and delivery
/// mechanics are not its business.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_instant(
        &self,
        recipient: &Recipient,
        deal: &CuratedDeal,
    ) -> Result<(), NotifyError>;

    async fn send_digest(
        &self,
        recipient: &Recipient,
        deals: &[&CuratedDeal],
    ) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct InstantPayload<'a> {
    recipient_id: uuid::Uuid,
    channel: &'static str,
    deal: &'a CuratedDeal,
}

#[derive(Serialize)]
struct DigestPayload<'a> {
    recipient_id: uuid::Uuid,
    channel: &'static str,
    deals: &'a [&'a CuratedDeal],
}

/// JSON webhook into the notification collaborator.
pub struct HttpNotifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: String, timeout_seconds: u64) -> Result<Self, NotifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    async fn post<T: Serialize>(&self, payload: &T) -> Result<(), NotifyError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_instant(
        &self,
        recipient: &Recipient,
        deal: &CuratedDeal,
    ) -> Result<(), NotifyError> {
        self.post(&InstantPayload {
            recipient_id: recipient.id,
            channel: "instant",
            deal,
        })
        .await
    }

    async fn send_digest(
        &self,
        recipient: &Recipient,
        deals: &[&CuratedDeal],
    ) -> Result<(), NotifyError> {
        self.post(&DigestPayload {
            recipient_id: recipient.id,
            channel: "digest",
            deals,
        })
        .await
    }
}
