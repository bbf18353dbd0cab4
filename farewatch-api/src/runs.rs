use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;

use farewatch_archive::{ArchivePublisher, ExpireSummary, PublishSummary};
use farewatch_core::filter::{self, FilterOutcome};
use farewatch_core::scorer::{self, ScoredDeal};
use farewatch_curate::{Curator, CurationSource};
use farewatch_dispatch::{DispatchSummary, Dispatcher};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Run Summaries
// ============================================================================

#[derive(Debug, Default, Serialize)]
pub struct CurationRunSummary {
    pub locales: usize,
    pub deals_seen: usize,
    pub already_curated: usize,
    pub filtered_out: usize,
    pub scored: usize,
    pub candidates: usize,
    pub quiet_locales: usize,
    pub curated: usize,
    pub fallback_locales: Vec<String>,
    pub dispatch: DispatchSummary,
}

#[derive(Debug, Serialize)]
pub struct ArchiveRunSummary {
    pub expire: ExpireSummary,
    pub publish: PublishSummary,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/runs/curation
/// Full curation + dispatch pass over every locale with active
/// recipients. Sub-daily schedule; safe to re-run after a partial
/// failure because every write is idempotent.
pub async fn run_curation(
    State(state): State<AppState>,
) -> Result<Json<CurationRunSummary>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();

    let curator = Curator::new(state.classifier.clone(), state.tables.clone());
    let dispatcher = Dispatcher::new(
        state.directory.clone(),
        state.ledger.clone(),
        state.notifier.clone(),
        state.pacer.clone(),
    );

    // 1. Locales are processed sequentially; a failure below is either
    //    per-unit (contained downstream) or fatal (bubbles up here).
    let locales = state.directory.active_locales().await?;
    let mut summary = CurationRunSummary {
        locales: locales.len(),
        ..CurationRunSummary::default()
    };

    for locale in locales {
        // 2. Pull fresh observations and drop everything implausible
        //    or already curated.
        let raw_deals = state.feed.pending_deals(&locale).await?;
        summary.deals_seen += raw_deals.len();

        let mut batch_keys: HashSet<String> = HashSet::new();
        let mut scored: Vec<ScoredDeal> = Vec::new();
        for deal in raw_deals {
            let deal_key = deal.deal_key();
            // the feed is at-least-once: dedup within the batch and
            // against everything curated before
            if !batch_keys.insert(deal_key.clone()) {
                summary.already_curated += 1;
                continue;
            }
            if state.curated.exists(&deal_key).await? {
                summary.already_curated += 1;
                continue;
            }

            match filter::evaluate(&deal, &state.tables, today) {
                FilterOutcome::Reject(reason) => {
                    tracing::trace!(deal_key = %deal_key, reason = ?reason, "hard filter rejection");
                    summary.filtered_out += 1;
                }
                FilterOutcome::Pass => {
                    let breakdown = scorer::score(&deal, &state.tables);
                    scored.push(ScoredDeal { deal, breakdown });
                }
            }
        }
        summary.scored += scored.len();

        // 3. Shortlist for curation
        let candidates = scorer::shortlist(
            scored,
            state.curation.min_score,
            state.curation.max_candidates,
        );
        if candidates.is_empty() {
            summary.quiet_locales += 1;
            continue;
        }
        summary.candidates += candidates.len();

        // 4. Curate (classifier, or deterministic fallback)
        let outcome = curator.curate(&locale, &candidates, now).await;
        if outcome.source == CurationSource::Fallback {
            summary.fallback_locales.push(locale.clone());
        }
        for deal in &outcome.deals {
            state.curated.insert(deal).await?;
        }
        summary.curated += outcome.deals.len();

        // 5. Dispatch through the ledger
        let dispatched = dispatcher.dispatch(&locale, &outcome.deals, now).await?;
        for deal_id in &dispatched.instant_deal_ids {
            state.curated.mark_instant_alert(*deal_id, now).await?;
        }
        summary.dispatch.merge(dispatched);
    }

    tracing::info!(
        locales = summary.locales,
        curated = summary.curated,
        instant = summary.dispatch.instant_sent,
        digests = summary.dispatch.digests_sent,
        failures = summary.dispatch.notify_failures,
        "curation run complete"
    );

    Ok(Json(summary))
}

/// POST /v1/runs/archive
/// Daily sweep: expire departed deals, then publish the sampled slice
/// of deals whose cooldown has elapsed.
pub async fn run_archive(State(state): State<AppState>) -> Result<Json<ArchiveRunSummary>, AppError> {
    let now = Utc::now();
    let publisher = ArchivePublisher::new(
        state.curated.clone(),
        state.archive.clone(),
        state.archive_policy.clone(),
    );

    let expire = publisher.expire_sweep(now.date_naive(), now).await?;
    let publish = publisher.publish_sweep(now).await?;

    tracing::info!(
        expired = expire.expired,
        published = publish.published,
        collisions = publish.slug_collisions,
        "archive run complete"
    );

    Ok(Json(ArchiveRunSummary { expire, publish }))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
