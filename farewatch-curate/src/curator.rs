use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use farewatch_core::scorer::ScoredDeal;
use farewatch_core::{RawDeal, ReferenceTables};

use crate::classifier::{
    CandidateSummary, ClassifierRequest, ClassifierResponse, DealClassifier,
};
use crate::model::{CuratedDeal, CurationSource, Tier};
use crate::prompt::{build_prompt, stops_phrase};

pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const FALLBACK_SELECTION_COUNT: usize = 3;

/// Result of curating one locale's shortlist.
#[derive(Debug)]
pub struct CurationOutcome {
    pub deals: Vec<CuratedDeal>,
    pub source: CurationSource,
    pub reasoning: Option<String>,
}

/// Sends shortlisted candidates to the classifier, validates the reply,
/// and falls back to a deterministic selection when the classifier
/// fails. Never errors past its boundary while candidates exist.
pub struct Curator {
    classifier: Arc<dyn DealClassifier>,
    tables: Arc<ReferenceTables>,
}

impl Curator {
    pub fn new(classifier: Arc<dyn DealClassifier>, tables: Arc<ReferenceTables>) -> Self {
        Self { classifier, tables }
    }

    pub async fn curate(
        &self,
        locale: &str,
        candidates: &[ScoredDeal],
        now: DateTime<Utc>,
    ) -> CurationOutcome {
        if candidates.is_empty() {
            // nothing to report for this locale; not an error
            return CurationOutcome {
                deals: Vec::new(),
                source: CurationSource::Classifier,
                reasoning: None,
            };
        }

        let summaries: Vec<CandidateSummary> = candidates
            .iter()
            .enumerate()
            .map(|(i, scored)| CandidateSummary::from_scored(i, scored, &self.tables))
            .collect();

        let request = ClassifierRequest {
            locale: locale.to_string(),
            prompt: build_prompt(locale, &summaries),
            candidates: summaries,
        };

        match self.classifier.classify(&request).await {
            Ok(response) => match validate(&response, candidates.len()) {
                Ok(()) => {
                    let deals = response
                        .selections
                        .iter()
                        .map(|sel| {
                            // indices and tiers were just validated
                            let tier: Tier = sel.tier.parse().unwrap_or(Tier::Notable);
                            CuratedDeal::new(
                                &candidates[sel.index],
                                tier,
                                sel.description.trim().to_string(),
                                CurationSource::Classifier,
                                now,
                            )
                        })
                        .collect();
                    CurationOutcome {
                        deals,
                        source: CurationSource::Classifier,
                        reasoning: response.reasoning,
                    }
                }
                Err(issue) => {
                    tracing::warn!(
                        locale = %locale,
                        issue = %issue,
                        "classifier reply failed validation, using fallback curation"
                    );
                    self.fallback(candidates, now)
                }
            },
            Err(err) => {
                tracing::warn!(
                    locale = %locale,
                    error = %err,
                    "classifier unavailable, using fallback curation"
                );
                self.fallback(candidates, now)
            }
        }
    }

    /// Deterministic fallback: top candidates by pre-score, all Good,
    /// template descriptions from the raw fields. Guarantees the
    /// pipeline produces something rather than going quiet for a locale.
    fn fallback(&self, candidates: &[ScoredDeal], now: DateTime<Utc>) -> CurationOutcome {
        let deals = candidates
            .iter()
            .take(FALLBACK_SELECTION_COUNT)
            .map(|scored| {
                CuratedDeal::new(
                    scored,
                    Tier::Good,
                    fallback_description(&scored.deal),
                    CurationSource::Fallback,
                    now,
                )
            })
            .collect();
        CurationOutcome {
            deals,
            source: CurationSource::Fallback,
            reasoning: None,
        }
    }
}

pub fn fallback_description(deal: &RawDeal) -> String {
    format!(
        "{} for ${:.0} round trip — {} on {}.",
        deal.destination.city,
        deal.price,
        stops_phrase(deal.stops),
        deal.airline
    )
}

/// All-or-nothing validation of a classifier reply. Any bad selection
/// rejects the whole reply.
fn validate(response: &ClassifierResponse, candidate_count: usize) -> Result<(), String> {
    if response.selections.is_empty() {
        return Err("empty selections".to_string());
    }

    let mut seen = HashSet::new();
    for sel in &response.selections {
        if sel.index >= candidate_count {
            return Err(format!(
                "index {} out of range (have {} candidates)",
                sel.index, candidate_count
            ));
        }
        if !seen.insert(sel.index) {
            return Err(format!("index {} selected twice", sel.index));
        }
        if sel.tier.parse::<Tier>().is_err() {
            return Err(format!("unknown tier {:?}", sel.tier));
        }
        if sel.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(format!(
                "description for index {} shorter than {} chars",
                sel.index, MIN_DESCRIPTION_CHARS
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierError, MockClassifier, Selection};
    use chrono::{NaiveDate, TimeZone};
    use farewatch_core::deal::Destination;
    use farewatch_core::scorer;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn scored_pool(count: usize) -> Vec<ScoredDeal> {
        let tables = ReferenceTables::builtin();
        (0..count)
            .map(|i| {
                let deal = RawDeal {
                    id: Uuid::new_v4(),
                    origin: "new-york".to_string(),
                    destination: Destination {
                        city: "Lisbon".to_string(),
                        airport_code: "LIS".to_string(),
                        country: "Portugal".to_string(),
                    },
                    price: 350.0 + (i as f64) * 40.0,
                    currency: "USD".to_string(),
                    departure_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
                    return_date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
                    airline: "TAP".to_string(),
                    stops: 0,
                    duration_hours: 7.5,
                    observed_at: now(),
                };
                let breakdown = scorer::score(&deal, &tables);
                ScoredDeal { deal, breakdown }
            })
            .collect()
    }

    fn curator_with(classifier: MockClassifier) -> Curator {
        Curator::new(
            Arc::new(classifier),
            Arc::new(ReferenceTables::builtin()),
        )
    }

    fn valid_response() -> ClassifierResponse {
        ClassifierResponse {
            selections: vec![
                Selection {
                    index: 0,
                    tier: "exceptional".to_string(),
                    description: "Unreal nonstop fare to Lisbon for late summer.".to_string(),
                },
                Selection {
                    index: 2,
                    tier: "good".to_string(),
                    description: "Solid shoulder-season Portugal pricing.".to_string(),
                },
            ],
            reasoning: Some("Lisbon fares rarely dip under $400 nonstop.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_classifier_reply_drives_curation() {
        let curator = curator_with(MockClassifier::replying(valid_response()));
        let pool = scored_pool(5);
        let outcome = curator.curate("new-york", &pool, now()).await;

        assert_eq!(outcome.source, CurationSource::Classifier);
        assert_eq!(outcome.deals.len(), 2);
        assert_eq!(outcome.deals[0].tier, Tier::Exceptional);
        assert_eq!(outcome.deals[0].deal_key, pool[0].deal.deal_key());
        assert_eq!(outcome.deals[1].tier, Tier::Good);
        assert!(outcome.reasoning.is_some());
        assert!(outcome
            .deals
            .iter()
            .all(|d| d.source == CurationSource::Classifier));
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_top_three_good() {
        let curator = curator_with(MockClassifier::failing(ClassifierError::Timeout));
        let pool = scored_pool(5);
        let outcome = curator.curate("new-york", &pool, now()).await;

        assert_eq!(outcome.source, CurationSource::Fallback);
        assert_eq!(outcome.deals.len(), 3);
        assert!(outcome.deals.iter().all(|d| d.tier == Tier::Good));
        assert!(outcome.deals.iter().all(|d| d.source == CurationSource::Fallback));
        // template description from the raw fields
        assert_eq!(
            outcome.deals[0].description,
            "Lisbon for $350 round trip — nonstop on TAP."
        );
    }

    #[tokio::test]
    async fn test_out_of_range_index_rejects_whole_reply() {
        let mut response = valid_response();
        response.selections[1].index = 9;
        let curator = curator_with(MockClassifier::replying(response));
        let outcome = curator.curate("new-york", &scored_pool(5), now()).await;
        assert_eq!(outcome.source, CurationSource::Fallback);
        assert_eq!(outcome.deals.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_tier_rejects_whole_reply() {
        let mut response = valid_response();
        response.selections[0].tier = "amazing".to_string();
        let curator = curator_with(MockClassifier::replying(response));
        let outcome = curator.curate("new-york", &scored_pool(5), now()).await;
        assert_eq!(outcome.source, CurationSource::Fallback);
    }

    #[tokio::test]
    async fn test_short_description_rejects_whole_reply() {
        let mut response = valid_response();
        response.selections[0].description = "wow".to_string();
        let curator = curator_with(MockClassifier::replying(response));
        let outcome = curator.curate("new-york", &scored_pool(5), now()).await;
        assert_eq!(outcome.source, CurationSource::Fallback);
    }

    #[tokio::test]
    async fn test_duplicate_index_rejects_whole_reply() {
        let mut response = valid_response();
        response.selections[1].index = 0;
        let curator = curator_with(MockClassifier::replying(response));
        let outcome = curator.curate("new-york", &scored_pool(5), now()).await;
        assert_eq!(outcome.source, CurationSource::Fallback);
    }

    #[tokio::test]
    async fn test_empty_selections_rejects_whole_reply() {
        let response = ClassifierResponse {
            selections: vec![],
            reasoning: None,
        };
        let curator = curator_with(MockClassifier::replying(response));
        let outcome = curator.curate("new-york", &scored_pool(5), now()).await;
        assert_eq!(outcome.source, CurationSource::Fallback);
        assert!(!outcome.deals.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_with_fewer_than_three_candidates() {
        let curator = curator_with(MockClassifier::failing(ClassifierError::Http(503)));
        let outcome = curator.curate("new-york", &scored_pool(2), now()).await;
        assert_eq!(outcome.deals.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_shortlist_yields_empty_outcome() {
        let curator = curator_with(MockClassifier::failing(ClassifierError::Timeout));
        let outcome = curator.curate("new-york", &[], now()).await;
        assert!(outcome.deals.is_empty());
    }
}
