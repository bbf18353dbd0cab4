use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use farewatch_curate::CuratedDeal;

use crate::ledger::{Channel, DeliveryLedger, DeliveryRecord};
use crate::notifier::Notifier;
use crate::pacer::Pacer;
use crate::recipient::RecipientDirectory;

/// Counters for one locale's dispatch, merged into the run summary.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DispatchSummary {
    pub recipients: usize,
    pub instant_sent: usize,
    pub digests_sent: usize,
    pub digest_deals_sent: usize,
    pub duplicates_skipped: usize,
    pub recipients_with_nothing_new: usize,
    pub notify_failures: usize,
    /// Exceptional deals that reached at least one recipient, so the
    /// caller can stamp instant_alert_sent_at
    #[serde(skip)]
    pub instant_deal_ids: Vec<Uuid>,
}

impl DispatchSummary {
    pub fn merge(&mut self, other: DispatchSummary) {
        self.recipients += other.recipients;
        self.instant_sent += other.instant_sent;
        self.digests_sent += other.digests_sent;
        self.digest_deals_sent += other.digest_deals_sent;
        self.duplicates_skipped += other.duplicates_skipped;
        self.recipients_with_nothing_new += other.recipients_with_nothing_new;
        self.notify_failures += other.notify_failures;
        self.instant_deal_ids.extend(other.instant_deal_ids);
    }
}

/// Only infrastructure failures surface here; per-recipient send
/// failures are contained inside the loop.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("recipient directory unavailable: {0}")]
    Directory(String),

    #[error("delivery ledger unavailable: {0}")]
    Ledger(String),
}

/// Fans curated deals out to a locale's recipients: exceptional deals
/// as individual instant alerts, good/notable as one digest per
/// recipient, always deduplicated through the ledger.
pub struct Dispatcher {
    directory: Arc<dyn RecipientDirectory>,
    ledger: Arc<dyn DeliveryLedger>,
    notifier: Arc<dyn Notifier>,
    pacer: Arc<dyn Pacer>,
}

impl Dispatcher {
    pub fn new(
        directory: Arc<dyn RecipientDirectory>,
        ledger: Arc<dyn DeliveryLedger>,
        notifier: Arc<dyn Notifier>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            directory,
            ledger,
            notifier,
            pacer,
        }
    }

    pub async fn dispatch(
        &self,
        locale: &str,
        deals: &[CuratedDeal],
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        // 1. Split by channel
        let (instant, digest): (Vec<&CuratedDeal>, Vec<&CuratedDeal>) =
            deals.iter().partition(|d| d.tier.is_instant());

        // 2. Recipients are processed sequentially; no concurrent
        //    fan-out, so ledger writes within a run cannot race.
        let recipients = self
            .directory
            .active_recipients(locale)
            .await
            .map_err(|e| DispatchError::Directory(e.to_string()))?;
        summary.recipients = recipients.len();

        for recipient in &recipients {
            // 3. Instant channel: one send per exceptional deal, the
            //    moment curation completes.
            for deal in &instant {
                let delivered = self
                    .ledger
                    .is_delivered(recipient.id, &deal.deal_key)
                    .await
                    .map_err(|e| DispatchError::Ledger(e.to_string()))?;
                if delivered {
                    summary.duplicates_skipped += 1;
                    continue;
                }

                self.pacer.pause().await;
                match self.notifier.send_instant(recipient, deal).await {
                    Ok(()) => {
                        // record before the deal counts as sent
                        self.ledger
                            .record(&DeliveryRecord {
                                recipient_id: recipient.id,
                                deal_key: deal.deal_key.clone(),
                                channel: Channel::Instant,
                                sent_at: now,
                            })
                            .await
                            .map_err(|e| DispatchError::Ledger(e.to_string()))?;
                        summary.instant_sent += 1;
                        if !summary.instant_deal_ids.contains(&deal.id) {
                            summary.instant_deal_ids.push(deal.id);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            locale = %locale,
                            recipient = %recipient.id,
                            deal_key = %deal.deal_key,
                            error = %e,
                            "instant send failed, continuing"
                        );
                        summary.notify_failures += 1;
                    }
                }
            }

            // 4. Digest channel: whatever survives dedup, or silence.
            let mut eligible: Vec<&CuratedDeal> = Vec::new();
            for deal in &digest {
                let delivered = self
                    .ledger
                    .is_delivered(recipient.id, &deal.deal_key)
                    .await
                    .map_err(|e| DispatchError::Ledger(e.to_string()))?;
                if delivered {
                    summary.duplicates_skipped += 1;
                } else {
                    eligible.push(*deal);
                }
            }

            if eligible.is_empty() {
                // no empty digests; nothing new is a non-event
                summary.recipients_with_nothing_new += 1;
                continue;
            }

            self.pacer.pause().await;
            match self.notifier.send_digest(recipient, &eligible).await {
                Ok(()) => {
                    for deal in &eligible {
                        self.ledger
                            .record(&DeliveryRecord {
                                recipient_id: recipient.id,
                                deal_key: deal.deal_key.clone(),
                                channel: Channel::Digest,
                                sent_at: now,
                            })
                            .await
                            .map_err(|e| DispatchError::Ledger(e.to_string()))?;
                    }
                    summary.digests_sent += 1;
                    summary.digest_deals_sent += eligible.len();
                }
                Err(e) => {
                    tracing::warn!(
                        locale = %locale,
                        recipient = %recipient.id,
                        error = %e,
                        "digest send failed, continuing"
                    );
                    summary.notify_failures += 1;
                }
            }
        }

        Ok(summary)
    }
}
