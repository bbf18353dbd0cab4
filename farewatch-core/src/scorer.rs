use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::deal::RawDeal;
use crate::reference::ReferenceTables;

pub const BASE_POINTS: f64 = 50.0;
/// A deal at 40% of the expected price earns the full 40 price points
pub const PRICE_FACTOR_SCALE: f64 = 66.67;
pub const MAX_PRICE_POINTS: f64 = 40.0;

pub const DEFAULT_MIN_SCORE: u8 = 55;
pub const DEFAULT_MAX_CANDIDATES: usize = 15;

/// Per-factor audit trail for a computed score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub price_points: f64,
    pub appeal_points: f64,
    pub quality_points: f64,
    pub trip_length_points: f64,
    pub seasonality_points: f64,
    pub total: u8,
}

/// A raw deal with its computed quality score. Derived, recomputed on
/// demand; never the persisted source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDeal {
    pub deal: RawDeal,
    pub breakdown: ScoreBreakdown,
}

impl ScoredDeal {
    pub fn score(&self) -> u8 {
        self.breakdown.total
    }
}

/// Compute the 0-100 quality score. Pure function: same deal + same tables
/// always yields the same integer.
pub fn score(deal: &RawDeal, tables: &ReferenceTables) -> ScoreBreakdown {
    // Price factor: how far below the expected price this fare sits.
    // Missing threshold contributes nothing (the hard filter already
    // rejects those before scoring).
    let price_points = match tables.threshold(&deal.destination.country) {
        Some(threshold) if threshold > 0.0 => {
            let discount = 1.0 - deal.price / threshold;
            (discount * PRICE_FACTOR_SCALE).clamp(0.0, MAX_PRICE_POINTS)
        }
        _ => 0.0,
    };

    let tier = tables.appeal_tier(&deal.destination.country);
    let appeal_points = f64::from(5 - i32::from(tier).clamp(1, 4)) * 5.0;

    let quality_points = match deal.stops {
        0 => 10.0,
        1 => 5.0,
        _ => 0.0,
    };

    // Ordered guards; the 7-10 day overlap resolves to the first band.
    let days = deal.trip_length_days();
    let trip_length_points = if (7..=14).contains(&days) {
        5.0
    } else if (5..=10).contains(&days) {
        3.0
    } else {
        0.0
    };

    let seasonality_points = if tables.is_peak_month(&deal.destination.country, deal.departure_date.month()) {
        10.0
    } else {
        0.0
    };

    let sum = BASE_POINTS
        + price_points
        + appeal_points
        + quality_points
        + trip_length_points
        + seasonality_points;
    let total = sum.clamp(0.0, 100.0).round() as u8;

    ScoreBreakdown {
        base: BASE_POINTS,
        price_points,
        appeal_points,
        quality_points,
        trip_length_points,
        seasonality_points,
        total,
    }
}

/// Pre-filter for curation: drop below the minimum, rank descending,
/// keep the top N. Empty result means the locale has nothing to report.
pub fn shortlist(scored: Vec<ScoredDeal>, min_score: u8, max_candidates: usize) -> Vec<ScoredDeal> {
    let mut survivors: Vec<ScoredDeal> = scored
        .into_iter()
        .filter(|s| s.score() >= min_score)
        .collect();
    // stable sort keeps feed order among score ties
    survivors.sort_by(|a, b| b.score().cmp(&a.score()));
    survivors.truncate(max_candidates);
    survivors
}
