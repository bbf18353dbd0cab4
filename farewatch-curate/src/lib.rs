pub mod classifier;
pub mod curator;
pub mod model;
pub mod prompt;
pub mod repository;

pub use classifier::{
    CandidateSummary, ClassifierError, ClassifierRequest, ClassifierResponse, DealClassifier,
    HttpClassifier, MockClassifier, Selection,
};
pub use curator::{CurationOutcome, Curator};
pub use model::{CuratedDeal, CurationSource, Lifecycle, Tier, TransitionError};
pub use repository::CuratedDealStore;
