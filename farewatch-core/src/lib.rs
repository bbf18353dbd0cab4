pub mod deal;
pub mod feed;
pub mod filter;
pub mod reference;
pub mod scorer;

pub use deal::{Destination, RawDeal};
pub use filter::{FilterOutcome, RejectReason};
pub use reference::{CountryProfile, ReferenceTables};
pub use scorer::{ScoreBreakdown, ScoredDeal};
