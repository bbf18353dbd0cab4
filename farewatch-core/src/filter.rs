use chrono::NaiveDate;
use serde::Serialize;

use crate::deal::RawDeal;
use crate::reference::ReferenceTables;

pub const MAX_OUTBOUND_HOURS: f64 = 30.0;
pub const MIN_TRIP_DAYS: i64 = 3;
pub const MAX_TRIP_DAYS: i64 = 21;

/// Why a raw observation was dropped before scoring.
/// Rejections are routine, high-volume behavior: counted, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Destination country has no expected-price entry, so the deal
    /// cannot be price-compared at all
    NoThreshold,
    PriceAtOrAboveThreshold,
    ExcessiveDuration,
    TripTooShort,
    TripTooLong,
    DepartureInPast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Pass,
    Reject(RejectReason),
}

impl FilterOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, FilterOutcome::Pass)
    }
}

/// Reject physically or commercially implausible deals. Pure predicate.
pub fn evaluate(deal: &RawDeal, tables: &ReferenceTables, today: NaiveDate) -> FilterOutcome {
    let Some(threshold) = tables.threshold(&deal.destination.country) else {
        return FilterOutcome::Reject(RejectReason::NoThreshold);
    };

    if deal.price >= threshold {
        return FilterOutcome::Reject(RejectReason::PriceAtOrAboveThreshold);
    }

    if deal.duration_hours > MAX_OUTBOUND_HOURS {
        return FilterOutcome::Reject(RejectReason::ExcessiveDuration);
    }

    // Guard against malformed or mistaken date pairs
    let trip_days = deal.trip_length_days();
    if trip_days < MIN_TRIP_DAYS {
        return FilterOutcome::Reject(RejectReason::TripTooShort);
    }
    if trip_days > MAX_TRIP_DAYS {
        return FilterOutcome::Reject(RejectReason::TripTooLong);
    }

    if deal.departure_date < today {
        return FilterOutcome::Reject(RejectReason::DepartureInPast);
    }

    FilterOutcome::Pass
}
